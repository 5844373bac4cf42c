//! Scoped, timed tracking of pipeline stages
//!
//! A [`ProcessingContext`] wraps one stage of a conversion run. Entering it
//! records a `Starting` progress message; leaving it records how the stage
//! ended and how long it took. Sub-sections inside a stage are timed with
//! [`ProcessingContext::mark`].
//!
//! # Outcomes
//!
//! | Stage result             | Recorded message                                    | Caller sees       |
//! |--------------------------|-----------------------------------------------------|-------------------|
//! | `Ok(value)`              | `Finished: "<name>" in <t>.` (Info)                 | `Ok(Some(value))` |
//! | `Err` holding EarlyAbort | `Processing of "<name>" aborted after <t>.` (Info)  | `Ok(None)`        |
//! | any other `Err`          | `... finished abnormally after <t>.` (Error)        | the same `Err`    |
//!
//! The early abort stops at the nearest context and never reaches an outer
//! one. A context that is dropped without [`ProcessingContext::exit`] (for
//! example while a stage panics) is closed as abnormal.

use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

use crate::human_time::format_time_ns;
use crate::results::ConversionResultsBuilder;
use crate::severity::{MessageType, Severity};

/// Deliberate, recoverable request to stop the current stage early.
///
/// Return it (converted into `anyhow::Error`) from a stage body; the
/// enclosing [`ProcessingContext`] swallows it.
#[derive(Debug, Clone, Error)]
#[error("processing stopped early: {reason}")]
pub struct EarlyAbort {
    reason: String,
}

impl EarlyAbort {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Lifecycle of a [`ProcessingContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Open,
    ClosedSuccess,
    ClosedAbnormal,
}

#[derive(Debug)]
struct Section {
    name: String,
    started: Instant,
}

/// Timing and progress tracker for one pipeline stage
pub struct ProcessingContext<'a> {
    results: &'a mut ConversionResultsBuilder,
    name: String,
    started: Instant,
    section: Option<Section>,
    state: ContextState,
}

impl<'a> ProcessingContext<'a> {
    pub(crate) fn enter(
        results: &'a mut ConversionResultsBuilder,
        name: impl Into<String>,
    ) -> Self {
        let mut context = Self {
            results,
            name: name.into(),
            started: Instant::now(),
            section: None,
            state: ContextState::Open,
        };
        let text = format!("Starting: \"{}\".", context.name);
        context.log_progress(text, Severity::Info);
        context
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn succeeded(&self) -> bool {
        self.state == ContextState::ClosedSuccess
    }

    /// The builder this stage writes into, for stage messages, cell
    /// statistics and nested contexts
    pub fn results(&mut self) -> &mut ConversionResultsBuilder {
        &mut *self.results
    }

    /// Close the open sub-section (if any) and optionally start a new one.
    ///
    /// `info` is appended to the new section's starting message.
    pub fn mark(&mut self, new_section: Option<&str>, info: &str) {
        let now = Instant::now();
        if let Some(section) = self.section.take() {
            let elapsed = now.duration_since(section.started).as_nanos();
            let text = format!("Finished: [{}] in {}.", section.name, format_time_ns(elapsed));
            self.log_progress(text, Severity::Info);
        }

        if let Some(name) = new_section {
            let text = format!("Starting: [{}]. {}", name, info);
            self.section = Some(Section {
                name: name.to_string(),
                started: now,
            });
            self.log_progress(text, Severity::Info);
        }
    }

    /// Record a developer-only note without touching section timing
    pub fn add_dev_info_message(&mut self, text: impl Into<String>) {
        self.results
            .add_message(text, Severity::Info, MessageType::DevInfo, None, None);
    }

    /// Leave the stage, recording how it ended.
    ///
    /// # Errors
    ///
    /// Returns `outcome`'s error unless it is an [`EarlyAbort`], which is
    /// swallowed and reported as `Ok(None)`.
    pub fn exit<T>(mut self, outcome: anyhow::Result<T>) -> anyhow::Result<Option<T>> {
        self.mark(None, "");
        let elapsed = format_time_ns(self.started.elapsed().as_nanos());

        match outcome {
            Ok(value) => {
                self.state = ContextState::ClosedSuccess;
                let text = format!("Finished: \"{}\" in {}.", self.name, elapsed);
                self.log_progress(text, Severity::Info);
                Ok(Some(value))
            }
            Err(err) if err.downcast_ref::<EarlyAbort>().is_some() => {
                self.state = ContextState::ClosedAbnormal;
                debug!("Stage \"{}\" aborted early: {}", self.name, err);
                let text = format!("Processing of \"{}\" aborted after {}.", self.name, elapsed);
                self.log_progress(text, Severity::Info);
                Ok(None)
            }
            Err(err) => {
                self.close_abnormally(&elapsed);
                warn!("Stage \"{}\" failed: {:#}", self.name, err);
                Err(err)
            }
        }
    }

    fn close_abnormally(&mut self, elapsed: &str) {
        self.state = ContextState::ClosedAbnormal;
        let text = format!(
            "Processing of \"{}\" finished abnormally after {}.",
            self.name, elapsed
        );
        self.log_progress(text, Severity::Error);
    }

    fn log_progress(&mut self, text: String, severity: Severity) {
        debug!("{}", text);
        if self.results.console_output() {
            println!("{}", text);
        }
        self.results
            .add_message(text, severity, MessageType::Progress, None, None);
    }
}

impl Drop for ProcessingContext<'_> {
    fn drop(&mut self) {
        if self.state == ContextState::Open {
            self.mark(None, "");
            let elapsed = format_time_ns(self.started.elapsed().as_nanos());
            self.close_abnormally(&elapsed);
            if std::thread::panicking() {
                warn!("Stage \"{}\" unwound by a panic", self.name);
            } else {
                warn!("Stage \"{}\" dropped without reporting an outcome", self.name);
            }
        }
    }
}
