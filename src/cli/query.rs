use clap::{Arg, ArgAction, ArgMatches, Command};
use ringlog::*;
use std::io::{BufRead, Write};

use graphite2prom::QueryTranslator;

/// Configuration for the `translate` subcommand
pub struct Config {
    pub queries: Vec<String>,
    pub settings: graphite2prom::Config,
}

impl TryFrom<&ArgMatches> for Config {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> anyhow::Result<Self> {
        Ok(Config {
            queries: args
                .get_many::<String>("QUERY")
                .map(|queries| queries.cloned().collect())
                .unwrap_or_default(),
            settings: super::load_settings(args)?,
        })
    }
}

/// Create the translate subcommand
pub fn command() -> Command {
    Command::new("translate")
        .about("Translate Graphite queries to Prometheus expressions")
        .long_about(
            "Translate Graphite queries to Prometheus expressions. \
             Queries are read one per line from stdin when none are given.",
        )
        .arg(
            Arg::new("QUERY")
                .help("Graphite target queries")
                .action(ArgAction::Append)
                .num_args(0..),
        )
}

/// Run the translate subcommand
pub fn run(config: Config) -> anyhow::Result<()> {
    let translator = config.settings.translator()?;
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    if config.queries.is_empty() {
        debug!("reading queries from stdin");
        translate_lines(&translator, std::io::stdin().lock(), &mut stdout)?;
    } else {
        for query in &config.queries {
            writeln!(stdout, "{}", translator.translate_query(query))?;
        }
    }

    stdout.flush()?;
    Ok(())
}

/// Translate each line of `reader`, writing one expression per line.
///
/// Invalid UTF-8 is replaced rather than ending the stream.
pub fn translate_lines<R: BufRead, W: Write>(
    translator: &QueryTranslator,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<()> {
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let mut line = buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest.strip_suffix(b"\r").unwrap_or(rest);
        }

        let line = String::from_utf8_lossy(line);
        writeln!(writer, "{}", translator.translate_query(&line))?;
    }

    Ok(())
}
