//! Import of the external validation engine's JSON log
//!
//! The engine reports everything it does, from option parsing to timing
//! lines to genuine validation findings, as records inside a
//! `{"log": [...]}` envelope:
//!
//! ```json
//! {"log": [{"code": "xbrl:foo", "level": "error",
//!           "message": {"text": "...", "fact": "ns:Concept"}}]}
//! ```
//!
//! Only findings and two milestone lines become [`Message`]s:
//!
//! - `code == "info"` with text starting `"Option "` → dropped
//! - empty code, or `code == "info"` mentioning a milestone → Info / DevInfo
//! - any other `code == "info"` → dropped
//! - everything else → `"[code] text"`, severity parsed from `level`,
//!   type XbrlValidation, concept ref from `fact`

use serde::Deserialize;
use tracing::debug;

use crate::message::Message;
use crate::severity::{MessageType, Severity};
use crate::Result;

const INFO_CODE: &str = "info";
const OPTION_PREFIX: &str = "Option ";
const MILESTONE_MARKERS: [&str; 2] = ["validated in", "loaded in"];

/// Top-level envelope of the engine's JSON log
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationLog {
    /// Required: a JSON object without it is not an engine log
    pub log: Vec<LogRecord>,
}

/// One record of the engine's log
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub message: LogRecordMessage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogRecordMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub fact: Option<String>,
}

impl LogRecord {
    pub fn new(code: impl Into<String>, level: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            level: level.into(),
            message: LogRecordMessage {
                text: text.into(),
                fact: None,
            },
        }
    }

    pub fn with_fact(mut self, fact: impl Into<String>) -> Self {
        self.message.fact = Some(fact.into());
        self
    }

    /// Classify this record, returning `None` for engine noise
    pub fn to_message(&self) -> Option<Message> {
        let text = &self.message.text;
        let is_info = self.code == INFO_CODE;

        if is_info && text.starts_with(OPTION_PREFIX) {
            return None;
        }

        if self.code.is_empty() || is_info {
            let milestone = MILESTONE_MARKERS.iter().any(|m| text.contains(m));
            return (self.code.is_empty() || milestone)
                .then(|| Message::new(text.clone(), Severity::Info, MessageType::DevInfo));
        }

        let mut message = Message::new(
            format!("[{}] {}", self.code, text),
            Severity::from_log_level_string(&self.level, None),
            MessageType::XbrlValidation,
        );
        message.concept_ref = self.message.fact.clone();
        Some(message)
    }
}

/// Convert engine records into messages, dropping noise. Order is kept.
pub fn import_records<'a>(records: impl IntoIterator<Item = &'a LogRecord>) -> Vec<Message> {
    let mut seen = 0usize;
    let messages: Vec<Message> = records
        .into_iter()
        .inspect(|r| {
            seen += 1;
            debug!(
                "code={:?} level={:?} text={:?} fact={:?}",
                r.code, r.level, r.message.text, r.message.fact
            );
        })
        .filter_map(LogRecord::to_message)
        .collect();
    debug!(
        "Imported {} of {} validation log records ({} discarded)",
        messages.len(),
        seen,
        seen - messages.len()
    );
    messages
}

/// Parse the engine's JSON log and convert it into messages.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] if `json` is not a valid log envelope,
/// including any object without a `log` key.
pub fn import_log_json(json: &str) -> Result<Vec<Message>> {
    let log: ValidationLog = serde_json::from_str(json)?;
    Ok(import_records(&log.log))
}

/// Outcome of one validation engine invocation: the imported messages plus
/// the engine's plain-text log lines
#[derive(Debug, Clone, Default)]
pub struct ValidationEngineResult {
    messages: Vec<Message>,
    log_lines: Vec<String>,
    record_count: usize,
}

impl ValidationEngineResult {
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if `json` is not a valid log envelope.
    pub fn from_json(json: &str, log_lines: Vec<String>) -> Result<Self> {
        let log: ValidationLog = serde_json::from_str(json)?;
        Ok(Self {
            messages: import_records(&log.log),
            log_lines,
            record_count: log.log.len(),
        })
    }

    /// Copy of the imported messages
    pub fn messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Copy of the plain-text log lines
    pub fn log_lines(&self) -> Vec<String> {
        self.log_lines.clone()
    }

    /// Number of records the engine emitted, kept or not
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_lines_are_dropped() {
        let record = LogRecord::new("info", "info", "Option foo set");
        assert!(record.to_message().is_none());
    }

    #[test]
    fn test_empty_code_becomes_dev_info() {
        let message = LogRecord::new("", "", "x").to_message().unwrap();
        assert_eq!(message.text, "x");
        assert_eq!(message.severity, Severity::Info);
        assert_eq!(message.message_type, MessageType::DevInfo);
    }

    #[test]
    fn test_option_text_with_empty_code_is_kept() {
        // Empty code is not "info", so the option filter does not apply
        let message = LogRecord::new("", "", "Option foo set").to_message();
        assert!(message.is_some());
    }

    #[test]
    fn test_info_milestones_kept_other_info_dropped() {
        let validated = LogRecord::new("info", "info", "[info] validated in 1.2 secs");
        let loaded = LogRecord::new("info", "info", "report.zip loaded in 0.4 secs");
        let chatter = LogRecord::new("info", "info", "Loading plugin");
        assert_eq!(
            validated.to_message().unwrap().message_type,
            MessageType::DevInfo
        );
        assert!(loaded.to_message().is_some());
        assert!(chatter.to_message().is_none());
    }

    #[test]
    fn test_findings_become_validation_messages() {
        let record = LogRecord::new(
            "xbrl.5.2.5.2:calcInconsistency",
            "inconsistency",
            "Calc mismatch",
        )
        .with_fact("vsme:Revenue");
        let message = record.to_message().unwrap();
        assert_eq!(
            message.text,
            "[xbrl.5.2.5.2:calcInconsistency] Calc mismatch"
        );
        assert_eq!(message.severity, Severity::Warning);
        assert_eq!(message.message_type, MessageType::XbrlValidation);
        assert_eq!(message.concept_ref.as_deref(), Some("vsme:Revenue"));
        assert_eq!(message.location_ref, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let log: ValidationLog =
            serde_json::from_str(r#"{"log": [{"message": {"text": "bare"}}, {}]}"#).unwrap();
        let messages = import_records(&log.log);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.message_type == MessageType::DevInfo));
    }

    #[test]
    fn test_envelope_requires_log_key() {
        assert!(serde_json::from_str::<ValidationLog>("{}").is_err());
        assert!(serde_json::from_str::<ValidationLog>(r#"{"id": "x", "m": []}"#).is_err());
    }
}
