use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use ringlog::*;
use std::path::PathBuf;

mod cli;

fn main() {
    let args = command().get_matches();

    let verbose = *args.get_one::<u8>("VERBOSE").unwrap_or(&0);
    let mut log = configure_logging(verbose);

    let result = run(&args);

    let _ = log.flush();

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn command() -> Command {
    Command::new(env!("CARGO_BIN_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate Grafana dashboards from Graphite to Prometheus")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("VERBOSE")
                .long("verbose")
                .short('v')
                .help("Increase verbosity")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("CONFIG")
                .long("config")
                .short('c')
                .help("TOML file with datasource and function mapping overrides")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(cli::convert::command())
        .subcommand(cli::query::command())
}

fn run(args: &ArgMatches) -> anyhow::Result<()> {
    match args.subcommand() {
        Some(("convert", args)) => cli::convert::run(cli::convert::Config::try_from(args)?),
        Some(("translate", args)) => cli::query::run(cli::query::Config::try_from(args)?),
        _ => unreachable!("subcommand is required"),
    }
}

fn configure_logging(verbose: u8) -> Box<dyn Drain> {
    let debug_output: Box<dyn Output> = Box::new(Stderr::new());

    let level = match verbose {
        0 => Level::Info,
        1 => Level::Debug,
        _ => Level::Trace,
    };

    let debug_log = if level <= Level::Info {
        LogBuilder::new().format(ringlog::default_format)
    } else {
        LogBuilder::new()
    }
    .output(debug_output)
    .build()
    .expect("failed to initialize debug log");

    MultiLogBuilder::new()
        .level_filter(level.to_level_filter())
        .default(debug_log)
        .build()
        .start()
}
