//! Conversion results: message accumulation, filtered views and verdicts
//!
//! A [`ConversionResultsBuilder`] is created once per conversion attempt and
//! handed to every pipeline stage. When the run is over it is frozen with
//! [`ConversionResultsBuilder::build`] into an immutable
//! [`ConversionResults`], which is what rendering and persistence see.
//!
//! # Verdicts
//!
//! The overall severity is the most severe message among a filtered set of
//! message types (see [`VerdictScope`]). No matching messages means
//! [`Severity::Info`]: an empty run is clean, not broken.
//!
//! - `conversion_successful` ignores validation-engine findings: only
//!   spreadsheet parsing and conversion errors fail a run.
//! - `is_xbrl_valid` looks only at validation-engine findings, and reads
//!   `false` until at least one such message exists.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

use crate::message::Message;
use crate::processing::ProcessingContext;
use crate::severity::{MessageType, Severity};
use crate::uuid_utils;
use crate::{Error, Result};

// ============================================================================
// Verdict scope and RAG summary
// ============================================================================

/// Which message types count towards an overall severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerdictScope {
    /// Every user-facing type
    #[default]
    All,
    /// User-facing types minus validation-engine findings
    WithoutXbrlValidation,
    /// Validation-engine findings only
    JustXbrlValidation,
}

impl VerdictScope {
    /// Resolve the pair of boolean filter flags used by callers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when both flags are set; the two
    /// filters are mutually exclusive.
    pub fn from_flags(without_xbrl_validation: bool, just_xbrl_validation: bool) -> Result<Self> {
        match (without_xbrl_validation, just_xbrl_validation) {
            (true, true) => Err(Error::InvalidInput(
                "'without_xbrl_validation' and 'just_xbrl_validation' cannot both be set"
                    .to_string(),
            )),
            (true, false) => Ok(VerdictScope::WithoutXbrlValidation),
            (false, true) => Ok(VerdictScope::JustXbrlValidation),
            (false, false) => Ok(VerdictScope::All),
        }
    }

    /// Message types considered under this scope
    pub fn message_types(self) -> BTreeSet<MessageType> {
        match self {
            VerdictScope::JustXbrlValidation => BTreeSet::from([MessageType::XbrlValidation]),
            VerdictScope::WithoutXbrlValidation => {
                let mut wanted = MessageType::user_facing();
                wanted.remove(&MessageType::XbrlValidation);
                wanted
            }
            VerdictScope::All => MessageType::user_facing(),
        }
    }
}

/// Red/amber/green summary of a verdict; exactly one flag is set.
///
/// Only constructible from a [`Severity`] and has no setters, so a value
/// handed out can never change or influence a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rag {
    red: bool,
    amber: bool,
    green: bool,
}

impl Rag {
    pub fn red(&self) -> bool {
        self.red
    }

    pub fn amber(&self) -> bool {
        self.amber
    }

    pub fn green(&self) -> bool {
        self.green
    }

    /// Key/value view (`red`, `amber`, `green`)
    pub fn as_map(&self) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([("red", self.red), ("amber", self.amber), ("green", self.green)])
    }
}

impl From<Severity> for Rag {
    fn from(severity: Severity) -> Self {
        Self {
            red: severity == Severity::Error,
            amber: severity == Severity::Warning,
            green: severity == Severity::Info,
        }
    }
}

// ============================================================================
// Shared query behaviour
// ============================================================================

/// Filtered views and verdicts over an ordered message list.
///
/// Implemented by both the live builder and the frozen results so that
/// stages can consult the verdict mid-run.
pub trait MessageLog {
    /// All messages in insertion order
    fn messages(&self) -> &[Message];

    /// Messages whose type and severity are both wanted, in original order
    fn get_messages(
        &self,
        wanted_types: &BTreeSet<MessageType>,
        wanted_severities: &BTreeSet<Severity>,
    ) -> Vec<&Message> {
        self.messages()
            .iter()
            .filter(|m| wanted_types.contains(&m.message_type))
            .filter(|m| wanted_severities.contains(&m.severity))
            .collect()
    }

    /// Every message, unfiltered
    fn developer_messages(&self) -> Vec<&Message> {
        self.messages().iter().collect()
    }

    /// Messages meant for end users (no developer info, no progress)
    fn user_messages(&self) -> Vec<&Message> {
        self.get_messages(&MessageType::user_facing(), &Severity::all())
    }

    /// Most severe message within `scope`, or Info when nothing matches
    fn get_overall_severity(&self, scope: VerdictScope) -> Severity {
        let wanted = scope.message_types();
        self.messages()
            .iter()
            .filter(|m| wanted.contains(&m.message_type))
            .map(|m| m.severity)
            .max()
            .unwrap_or(Severity::Info)
    }

    /// Two-flag form of [`MessageLog::get_overall_severity`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when both flags are set.
    fn overall_severity_for_flags(
        &self,
        without_xbrl_validation: bool,
        just_xbrl_validation: bool,
    ) -> Result<Severity> {
        let scope = VerdictScope::from_flags(without_xbrl_validation, just_xbrl_validation)?;
        Ok(self.get_overall_severity(scope))
    }

    fn get_rag(&self, scope: VerdictScope) -> Rag {
        Rag::from(self.get_overall_severity(scope))
    }

    /// Two-flag form of [`MessageLog::get_rag`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when both flags are set.
    fn rag_for_flags(
        &self,
        without_xbrl_validation: bool,
        just_xbrl_validation: bool,
    ) -> Result<Rag> {
        Ok(Rag::from(
            self.overall_severity_for_flags(without_xbrl_validation, just_xbrl_validation)?,
        ))
    }

    fn has_errors(&self) -> bool {
        self.user_messages()
            .iter()
            .any(|m| m.severity == Severity::Error)
    }

    fn has_warnings(&self) -> bool {
        self.user_messages()
            .iter()
            .any(|m| m.severity == Severity::Warning)
    }

    fn has_errors_or_warnings(&self) -> bool {
        self.user_messages()
            .iter()
            .any(|m| matches!(m.severity, Severity::Error | Severity::Warning))
    }

    fn has_messages(&self, user_only: bool) -> bool {
        if user_only {
            !self.user_messages().is_empty()
        } else {
            !self.messages().is_empty()
        }
    }

    fn len(&self) -> usize {
        self.messages().len()
    }

    fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    /// True only if validation has produced findings and none is an error
    fn is_xbrl_valid(&self) -> bool {
        let has_validation_messages = self
            .messages()
            .iter()
            .any(|m| m.message_type == MessageType::XbrlValidation);
        has_validation_messages
            && self.get_overall_severity(VerdictScope::JustXbrlValidation) != Severity::Error
    }
}

// ============================================================================
// Cell usage
// ============================================================================

/// A single spreadsheet cell: sheet name, row and column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            col,
        }
    }
}

impl<S: Into<String>> From<(S, u32, u32)> for CellRef {
    fn from((sheet, row, col): (S, u32, u32)) -> Self {
        CellRef::new(sheet, row, col)
    }
}

// ============================================================================
// Frozen results
// ============================================================================

/// Immutable outcome of one conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResults {
    #[serde(rename = "id")]
    conversion_id: String,
    #[serde(rename = "m")]
    messages: Vec<Message>,
    #[serde(rename = "q")]
    cells_queried: usize,
    #[serde(rename = "p")]
    cells_populated: usize,
    #[serde(rename = "success")]
    conversion_successful: bool,
}

impl ConversionResults {
    pub fn new(
        conversion_id: impl Into<String>,
        messages: Vec<Message>,
        cells_queried: usize,
        cells_populated: usize,
        conversion_successful: bool,
    ) -> Self {
        Self {
            conversion_id: conversion_id.into(),
            messages,
            cells_queried,
            cells_populated,
            conversion_successful,
        }
    }

    pub fn conversion_id(&self) -> &str {
        &self.conversion_id
    }

    pub fn num_cell_queries(&self) -> usize {
        self.cells_queried
    }

    pub fn num_cells_populated(&self) -> usize {
        self.cells_populated
    }

    /// Success flag captured when the builder was frozen
    pub fn conversion_successful(&self) -> bool {
        self.conversion_successful
    }

    pub fn to_record(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Decode a record produced by [`ConversionResults::to_record`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for missing keys or unknown severity or
    /// message type names in any contained message.
    pub fn from_record(record: &serde_json::Value) -> Result<Self> {
        Ok(Self::deserialize(record)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl MessageLog for ConversionResults {
    fn messages(&self) -> &[Message] {
        &self.messages
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Mutable per-run accumulator
#[derive(Debug)]
pub struct ConversionResultsBuilder {
    conversion_id: String,
    messages: Vec<Message>,
    cells_queried: HashSet<CellRef>,
    cells_populated: HashSet<CellRef>,
    console_output: bool,
}

impl ConversionResultsBuilder {
    /// Start a run. A fresh UUID is used when no identifier is supplied.
    pub fn new(conversion_id: Option<String>, console_output: bool) -> Self {
        let conversion_id = conversion_id.unwrap_or_else(uuid_utils::new_run_id);
        debug!("Created results builder for conversion {}", conversion_id);
        Self {
            conversion_id,
            messages: Vec::new(),
            cells_queried: HashSet::new(),
            cells_populated: HashSet::new(),
            console_output,
        }
    }

    pub fn conversion_id(&self) -> &str {
        &self.conversion_id
    }

    /// Whether progress messages are echoed to stdout
    pub fn console_output(&self) -> bool {
        self.console_output
    }

    /// Append a message. No deduplication.
    pub fn add_message(
        &mut self,
        text: impl Into<String>,
        severity: Severity,
        message_type: MessageType,
        concept_ref: Option<&str>,
        location_ref: Option<&str>,
    ) {
        self.messages.push(Message {
            text: text.into(),
            severity,
            message_type,
            concept_ref: concept_ref.map(str::to_string),
            location_ref: location_ref.map(str::to_string),
        });
    }

    /// Append already-built messages, keeping their order
    pub fn add_messages(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn add_cell_queries<I, C>(&mut self, delta: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<CellRef>,
    {
        self.cells_queried.extend(delta.into_iter().map(Into::into));
    }

    pub fn add_cells_with_data<I, C>(&mut self, delta: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<CellRef>,
    {
        self.cells_populated.extend(delta.into_iter().map(Into::into));
    }

    pub fn num_cell_queries(&self) -> usize {
        self.cells_queried.len()
    }

    pub fn num_cells_populated(&self) -> usize {
        self.cells_populated.len()
    }

    /// Live view: false once any parsing or conversion error has been
    /// recorded. Validation-engine errors alone do not count.
    pub fn conversion_successful(&self) -> bool {
        self.get_overall_severity(VerdictScope::WithoutXbrlValidation) != Severity::Error
    }

    /// Enter a timed stage; see [`ProcessingContext`]
    pub fn processing_context(&mut self, name: impl Into<String>) -> ProcessingContext<'_> {
        ProcessingContext::enter(self, name)
    }

    /// Run `stage` inside a [`ProcessingContext`].
    ///
    /// Returns `Ok(Some(value))` on success and `Ok(None)` when the stage
    /// stopped early with [`crate::EarlyAbort`].
    ///
    /// # Errors
    ///
    /// Any other error from `stage` is recorded and then returned.
    pub fn run_stage<T, F>(
        &mut self,
        name: impl Into<String>,
        stage: F,
    ) -> anyhow::Result<Option<T>>
    where
        F: FnOnce(&mut ProcessingContext<'_>) -> anyhow::Result<T>,
    {
        let mut context = self.processing_context(name);
        let outcome = stage(&mut context);
        context.exit(outcome)
    }

    /// Freeze into an immutable [`ConversionResults`]
    pub fn build(self) -> ConversionResults {
        let conversion_successful = self.conversion_successful();
        debug!(
            "Freezing conversion {}: {} messages, successful={}",
            self.conversion_id,
            self.messages.len(),
            conversion_successful
        );
        ConversionResults {
            cells_queried: self.cells_queried.len(),
            cells_populated: self.cells_populated.len(),
            conversion_id: self.conversion_id,
            messages: self.messages,
            conversion_successful,
        }
    }
}

impl Default for ConversionResultsBuilder {
    fn default() -> Self {
        Self::new(None, false)
    }
}

impl MessageLog for ConversionResultsBuilder {
    fn messages(&self) -> &[Message] {
        &self.messages
    }
}
