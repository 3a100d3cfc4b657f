use clap::ArgMatches;
use std::path::PathBuf;

pub mod convert;
pub mod query;

/// Load the settings file named by the global `--config` flag, if any.
///
/// Subcommand matches built without the global flag (as in tests) fall back
/// to the defaults.
fn load_settings(args: &ArgMatches) -> anyhow::Result<graphite2prom::Config> {
    match args.try_get_one::<PathBuf>("CONFIG").ok().flatten() {
        Some(path) => Ok(graphite2prom::Config::load(path)?),
        None => Ok(graphite2prom::Config::default()),
    }
}
