use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use ringlog::*;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

use graphite2prom::error::{Error, Result};

/// Configuration for a single `convert` run
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: graphite2prom::Config,
}

impl TryFrom<&ArgMatches> for Config {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> anyhow::Result<Self> {
        let mut settings = super::load_settings(args)?;

        if let Some(datasource) = args.get_one::<String>("DATASOURCE") {
            settings.set_datasource(datasource.as_str());
        }

        Ok(Config {
            input: args
                .get_one::<PathBuf>("INPUT")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT)),
            output: args
                .get_one::<PathBuf>("OUTPUT")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            settings,
        })
    }
}

const DEFAULT_INPUT: &str = "graphite_dashboard.json";
const DEFAULT_OUTPUT: &str = "prometheus_dashboard.json";

/// Create the convert subcommand
pub fn command() -> Command {
    Command::new("convert")
        .about("Convert a Grafana dashboard from Graphite targets to Prometheus expressions")
        .arg(
            Arg::new("INPUT")
                .help("Dashboard JSON exported from Grafana")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_INPUT)
                .index(1),
        )
        .arg(
            Arg::new("OUTPUT")
                .help("Where to write the converted dashboard")
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_OUTPUT)
                .index(2),
        )
        .arg(
            Arg::new("DATASOURCE")
                .long("datasource")
                .short('d')
                .help("Datasource name to assign to every panel that has one"),
        )
}

/// Run the convert subcommand
pub fn run(config: Config) -> anyhow::Result<()> {
    let converter = config.settings.converter()?;

    info!("loading dashboard from: {}", config.input.display());
    let dashboard = load_dashboard(&config.input)?;

    let conversion = converter.convert_with_report(&dashboard);
    let report = conversion.report;

    info!(
        "panels: {} translated: {} skipped: {} datasources: {}",
        report.panels, report.translated, report.skipped, report.datasources
    );
    if report.skipped > 0 {
        warn!("{} target(s) left unconverted", report.skipped);
    }

    save_dashboard(&config.output, &conversion.dashboard)
        .with_context(|| format!("failed to save dashboard to {}", config.output.display()))?;

    println!("Dashboard converted and saved to {}", config.output.display());

    Ok(())
}

/// Read and parse a dashboard JSON document.
pub fn load_dashboard(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a dashboard as pretty printed JSON with two space indentation.
pub fn save_dashboard(path: &Path, dashboard: &Value) -> Result<()> {
    let io_error = |source: std::io::Error| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut json = serde_json::to_string_pretty(dashboard).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;
    json.push('\n');

    let mut file = std::fs::File::create(path).map_err(io_error)?;
    file.write_all(json.as_bytes()).map_err(io_error)?;

    Ok(())
}
