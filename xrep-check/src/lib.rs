//! # xrep-check
//!
//! Checks the JSON log written by the external XBRL validation engine and
//! reports whether the XBRL report is valid.
//!
//! The log is imported inside a timed stage, the resulting messages are
//! frozen into [`ConversionResults`] and the verdict over the selected
//! message types decides the final word and the process exit code:
//!
//! | Verdict | Exit code |
//! |---------|-----------|
//! | Error   | 1         |
//! | Warning | 0         |
//! | Info    | 0         |
//!
//! A log without any records means the report was never validated; the
//! import stage stops early and the checker exits with 1.

pub mod logging;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use xrep_common::config::TomlConfig;
use xrep_common::{
    ConversionResults, ConversionResultsBuilder, EarlyAbort, MessageLog, ProcessingContext,
    Severity, ValidationEngineResult, VerdictScope,
};

/// Exit code for an invalid or unvalidated report
pub const EXIT_INVALID: u8 = 1;

/// Exit code for conflicting or malformed command-line options
pub const EXIT_USAGE: u8 = 2;

const NOT_VALIDATED: &str =
    "The XBRL report has NOT been validated (the validation log has no records).";

/// Command-line arguments
#[derive(Parser, Debug, Clone, Default)]
#[clap(name = "xrep-check")]
#[clap(about = "Check an XBRL validation engine log and report whether the report is valid")]
#[clap(version)]
pub struct Args {
    /// JSON log written by the validation engine
    #[clap(value_name = "LOG")]
    pub log_file: PathBuf,

    /// Print user messages even when there are no errors or warnings
    #[clap(short, long)]
    pub verbose: bool,

    /// Also print developer information messages
    #[clap(long)]
    pub devinfo: bool,

    /// Echo stage progress to stdout while checking
    #[clap(long)]
    pub console: bool,

    /// Plain-text output captured from the validation engine, listed with
    /// the developer messages
    #[clap(long, value_name = "FILE")]
    pub engine_output: Option<PathBuf>,

    /// Write the frozen results as JSON to this file
    #[clap(long, value_name = "FILE")]
    pub results_out: Option<PathBuf>,

    /// Run identifier (a fresh UUID is generated when omitted)
    #[clap(long, value_name = "RUN_ID")]
    pub id: Option<String>,

    /// Compute the verdict without XBRL validation messages
    #[clap(long)]
    pub without_xbrl_validation: bool,

    /// Compute the verdict from XBRL validation messages only
    #[clap(long)]
    pub just_xbrl_validation: bool,

    /// Config file (overrides XREP_CONFIG and the platform config file)
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Output switches after merging the config file with command-line flags.
/// A flag given on the command line always turns its switch on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub verbose: bool,
    pub devinfo: bool,
    pub console_output: bool,
}

impl Settings {
    pub fn resolve(args: &Args, config: &TomlConfig) -> Self {
        Self {
            verbose: args.verbose || config.verbose,
            devinfo: args.devinfo || config.developer_messages,
            console_output: args.console || config.console_output,
        }
    }
}

/// Everything a front end needs after a check
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub results: ConversionResults,
    /// Overall severity over the selected scope
    pub verdict: Severity,
    /// False when the validation log had no records
    pub validated: bool,
    /// Lines of the engine's plain-text output (`--engine-output`)
    pub engine_log: Vec<String>,
    /// Rendered text report, ready for stdout
    pub report: String,
}

impl CheckOutcome {
    pub fn final_word(&self) -> &'static str {
        if self.validated {
            final_word(self.verdict)
        } else {
            NOT_VALIDATED
        }
    }

    pub fn exit_code(&self) -> u8 {
        if self.validated {
            exit_code(self.verdict)
        } else {
            EXIT_INVALID
        }
    }
}

/// Startup banner: version plus the build identification captured by
/// `build.rs`
pub fn build_banner() -> String {
    format!(
        "xrep-check v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

/// Closing line of the report for a verdict
pub fn final_word(verdict: Severity) -> &'static str {
    match verdict {
        Severity::Error => {
            "The XBRL report is INVALID (has errors). Please check the output above."
        }
        Severity::Warning => "The XBRL report is VALID but there are WARNINGS.",
        Severity::Info => "The XBRL report is VALID and has no errors or warnings.",
    }
}

pub fn exit_code(verdict: Severity) -> u8 {
    match verdict {
        Severity::Error => EXIT_INVALID,
        Severity::Warning | Severity::Info => 0,
    }
}

/// Run a complete check.
///
/// # Errors
///
/// - [`xrep_common::Error::InvalidInput`] (downcastable) when both verdict
///   scope flags are set
/// - the log file cannot be read or is not a validation engine log
/// - `--engine-output` cannot be read
/// - `--results-out` cannot be written
pub fn check(args: &Args, settings: Settings) -> anyhow::Result<CheckOutcome> {
    let scope = VerdictScope::from_flags(args.without_xbrl_validation, args.just_xbrl_validation)?;

    let mut builder = ConversionResultsBuilder::new(args.id.clone(), settings.console_output);
    let stage_name = format!("Check {}", args.log_file.display());
    let imported = builder.run_stage(stage_name, |pc| {
        import_validation_log(pc, &args.log_file, args.engine_output.as_deref())
    })?;

    let validated = match &imported {
        Some(engine) => {
            info!(
                "Imported {} of {} records from {}",
                engine.messages().len(),
                engine.record_count(),
                args.log_file.display()
            );
            true
        }
        None => {
            warn!(
                "Validation log {} has no records, report not validated",
                args.log_file.display()
            );
            false
        }
    };

    let results = builder.build();
    let verdict = results.get_overall_severity(scope);
    info!(
        "Conversion {}: verdict {} over {:?}",
        results.conversion_id(),
        verdict.name(),
        scope
    );

    if let Some(path) = &args.results_out {
        write_results(&results, path)?;
    }

    let mut outcome = CheckOutcome {
        results,
        verdict,
        validated,
        engine_log: imported.map(|e| e.log_lines()).unwrap_or_default(),
        report: String::new(),
    };
    outcome.report = render_report(&outcome, settings);
    Ok(outcome)
}

fn import_validation_log(
    pc: &mut ProcessingContext<'_>,
    path: &Path,
    engine_output: Option<&Path>,
) -> anyhow::Result<ValidationEngineResult> {
    pc.mark(Some("Reading validation log"), &path.display().to_string());
    let json = fs::read_to_string(path)
        .with_context(|| format!("Cannot read validation log {}", path.display()))?;

    let log_lines: Vec<String> = match engine_output {
        Some(output) => {
            pc.mark(Some("Reading engine output"), &output.display().to_string());
            fs::read_to_string(output)
                .with_context(|| format!("Cannot read engine output {}", output.display()))?
                .lines()
                .map(str::to_string)
                .collect()
        }
        None => Vec::new(),
    };

    pc.mark(Some("Importing validation messages"), "");
    let engine = ValidationEngineResult::from_json(&json, log_lines)
        .with_context(|| format!("{} is not a validation engine log", path.display()))?;

    if engine.record_count() == 0 {
        pc.add_dev_info_message(format!(
            "{} contains no log records, the report has not been validated",
            path.display()
        ));
        return Err(EarlyAbort::new("empty validation log").into());
    }

    let messages = engine.messages();
    pc.add_dev_info_message(format!(
        "Kept {} of {} validation log records",
        messages.len(),
        engine.record_count()
    ));
    pc.results().add_messages(messages);
    Ok(engine)
}

fn write_results(results: &ConversionResults, path: &Path) -> anyhow::Result<()> {
    let json = results.to_json()?;
    fs::write(path, json).with_context(|| format!("Cannot write results to {}", path.display()))?;
    info!("Results written to {}", path.display());
    Ok(())
}

/// Render the text report: user messages when there is something to say,
/// developer messages on request, then the final word.
pub fn render_report(outcome: &CheckOutcome, settings: Settings) -> String {
    let results = &outcome.results;
    let mut lines: Vec<String> = Vec::new();

    let user_messages = results.user_messages();
    if (settings.verbose && !user_messages.is_empty()) || results.has_errors_or_warnings() {
        lines.push(String::new());
        let heading = if results.has_errors() {
            "The report has errors:"
        } else if results.has_warnings() {
            "The report has warnings:"
        } else {
            "Messages:"
        };
        lines.push(heading.to_string());
        lines.extend(user_messages.iter().map(|m| format!("\t{}", m)));
    }

    let developer_messages = results.developer_messages();
    if settings.devinfo && !developer_messages.is_empty() {
        lines.push(String::new());
        lines.push("All messages (including developer messages):".to_string());
        lines.extend(developer_messages.iter().map(|m| format!("\t{}", m)));
    }

    if settings.devinfo && !outcome.engine_log.is_empty() {
        lines.push(String::new());
        lines.push("Validation engine output:".to_string());
        lines.extend(outcome.engine_log.iter().map(|l| format!("\t{}", l)));
    }

    lines.push(String::new());
    lines.push(outcome.final_word().to_string());
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_word_table() {
        assert!(final_word(Severity::Error).contains("INVALID (has errors)"));
        assert!(final_word(Severity::Warning).contains("VALID but there are WARNINGS"));
        assert!(final_word(Severity::Info).contains("VALID and has no errors or warnings"));
        assert_eq!(exit_code(Severity::Error), 1);
        assert_eq!(exit_code(Severity::Warning), 0);
        assert_eq!(exit_code(Severity::Info), 0);
    }

    #[test]
    fn test_build_banner_identifies_build() {
        let banner = build_banner();
        assert!(banner.starts_with(&format!("xrep-check v{} [", env!("CARGO_PKG_VERSION"))));
        let hash = env!("GIT_HASH");
        assert!(
            hash == "unknown" || (hash.len() == 8 && hash.chars().all(|c| c.is_ascii_hexdigit())),
            "unexpected git hash {:?}",
            hash
        );
        assert!(!env!("BUILD_TIMESTAMP").is_empty());
        assert!(banner.ends_with(&format!("({})", env!("BUILD_PROFILE"))));
    }

    #[test]
    fn test_flags_override_config() {
        let config = TomlConfig {
            verbose: true,
            ..TomlConfig::default()
        };
        let args = Args {
            console: true,
            ..Args::default()
        };
        let settings = Settings::resolve(&args, &config);
        assert_eq!(
            settings,
            Settings {
                verbose: true,
                devinfo: false,
                console_output: true,
            }
        );
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "xrep-check",
            "log.json",
            "--devinfo",
            "--id",
            "run-7",
            "--just-xbrl-validation",
        ])
        .unwrap();
        assert_eq!(args.log_file, PathBuf::from("log.json"));
        assert!(args.devinfo);
        assert!(args.just_xbrl_validation);
        assert!(!args.without_xbrl_validation);
        assert_eq!(args.id.as_deref(), Some("run-7"));
    }

    #[test]
    fn test_log_file_is_required() {
        assert!(Args::try_parse_from(["xrep-check"]).is_err());
    }
}
