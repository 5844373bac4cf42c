//! xrep-check - XBRL report checker
//!
//! Reads the validation engine's JSON log, prints the user-facing messages
//! and the final verdict, and exits 1 when the report is invalid.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use xrep_check::logging::{apply_config_level, init_tracing};
use xrep_check::{build_banner, check, Args, Settings, EXIT_USAGE};
use xrep_common::config::TomlConfig;

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let (filter_handle, filter_source) = init_tracing();
    info!("Starting {}", build_banner());

    let config = TomlConfig::load(args.config.as_deref())?;
    if apply_config_level(&filter_handle, filter_source, &config.logging.level)? {
        info!("Log level set to {:?} from config", config.logging.level);
    }

    let settings = Settings::resolve(&args, &config);

    match check(&args, settings) {
        Ok(outcome) => {
            print!("{}", outcome.report);
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Err(e) => match e.downcast_ref::<xrep_common::Error>() {
            Some(xrep_common::Error::InvalidInput(msg)) => {
                eprintln!("error: {}", msg);
                Ok(ExitCode::from(EXIT_USAGE))
            }
            _ => Err(e),
        },
    }
}
