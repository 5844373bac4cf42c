//! Message classification: severity levels and message origins
//!
//! Both enumerations are closed. Their canonical identifiers (the serde
//! names) are what goes into persisted records; the display text is for
//! humans only and may change without breaking stored results.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Severity
// ============================================================================

/// Ordered severity of a diagnostic message: Info < Warning < Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

static SEVERITY_MAX_WIDTH: Lazy<usize> = Lazy::new(|| {
    Severity::ALL
        .iter()
        .map(|s| s.display_text().chars().count())
        .max()
        .unwrap_or(0)
});

impl Severity {
    /// Every severity, most severe first
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    /// Numeric rank used for `max` comparisons (Info=0, Warning=1, Error=2)
    pub fn rank(self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }

    /// Canonical identifier, stable across locales
    pub fn name(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    /// Human-readable text
    pub fn display_text(self) -> &'static str {
        match self {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }

    /// The full set of severities
    pub fn all() -> BTreeSet<Severity> {
        Self::ALL.into_iter().collect()
    }

    /// Width of the longest display text, for column alignment
    pub fn max_name_width() -> usize {
        *SEVERITY_MAX_WIDTH
    }

    /// Interpret a free-text log level reported by an external tool.
    ///
    /// Tries, in order:
    /// 1. a case-insensitive match of the whole string against a severity name
    /// 2. a match of any word in the string (split on non-word characters),
    ///    checking names from most to least severe
    /// 3. `default`, or [`Severity::Warning`] when no default is given
    ///
    /// Never fails.
    pub fn from_log_level_string(level: &str, default: Option<Severity>) -> Severity {
        let lowered = level.to_lowercase();

        if let Some(severity) = Self::from_lowercase_name(&lowered) {
            return severity;
        }

        let words: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
            .collect();

        Self::ALL
            .into_iter()
            .find(|s| words.iter().any(|w| *w == s.name().to_lowercase()))
            .unwrap_or(default.unwrap_or(Severity::Warning))
    }

    fn from_lowercase_name(lowered: &str) -> Option<Severity> {
        match lowered {
            "error" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_text())
    }
}

// ============================================================================
// MessageType
// ============================================================================

/// Origin of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Developer-only information, hidden from end users
    DevInfo,
    /// Problems found while reading the spreadsheet
    ExcelParsing,
    /// Problems found while assembling the report
    Conversion,
    /// Findings reported by the external validation engine
    XbrlValidation,
    /// Stage start/finish timing
    Progress,
}

static MESSAGE_TYPE_MAX_WIDTH: Lazy<usize> = Lazy::new(|| {
    MessageType::ALL
        .iter()
        .map(|t| t.display_text().chars().count())
        .max()
        .unwrap_or(0)
});

impl MessageType {
    pub const ALL: [MessageType; 5] = [
        MessageType::DevInfo,
        MessageType::ExcelParsing,
        MessageType::Conversion,
        MessageType::XbrlValidation,
        MessageType::Progress,
    ];

    /// Canonical identifier, stable across locales
    pub fn name(self) -> &'static str {
        match self {
            MessageType::DevInfo => "DevInfo",
            MessageType::ExcelParsing => "ExcelParsing",
            MessageType::Conversion => "Conversion",
            MessageType::XbrlValidation => "XbrlValidation",
            MessageType::Progress => "Progress",
        }
    }

    /// Human-readable text
    pub fn display_text(self) -> &'static str {
        match self {
            MessageType::DevInfo => "Dev Info",
            MessageType::ExcelParsing => "Excel Parsing",
            MessageType::Conversion => "Conversion",
            MessageType::XbrlValidation => "XBRL Validation",
            MessageType::Progress => "Progress Status",
        }
    }

    /// The closed set of all message types
    pub fn all_types() -> BTreeSet<MessageType> {
        Self::ALL.into_iter().collect()
    }

    /// Every message type except the ones listed
    pub fn all_except(excluded: &[MessageType]) -> BTreeSet<MessageType> {
        Self::ALL
            .into_iter()
            .filter(|t| !excluded.contains(t))
            .collect()
    }

    /// Types shown to end users (everything but developer info and progress)
    pub fn user_facing() -> BTreeSet<MessageType> {
        Self::all_except(&[MessageType::DevInfo, MessageType::Progress])
    }

    /// Width of the longest display text, for column alignment
    pub fn max_name_width() -> usize {
        *MESSAGE_TYPE_MAX_WIDTH
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering() {
        assert!(Severity::Error.rank() > Severity::Warning.rank());
        assert!(Severity::Warning.rank() > Severity::Info.rank());
        assert!(Severity::Error > Severity::Info);
        assert_eq!(Severity::ALL.into_iter().max(), Some(Severity::Error));
    }

    #[test]
    fn test_from_log_level_exact_names() {
        assert_eq!(
            Severity::from_log_level_string("error", None),
            Severity::Error
        );
        assert_eq!(
            Severity::from_log_level_string("WARNING", None),
            Severity::Warning
        );
        assert_eq!(
            Severity::from_log_level_string("Info", None),
            Severity::Info
        );
    }

    #[test]
    fn test_from_log_level_tokenized() {
        assert_eq!(
            Severity::from_log_level_string("assertion-error", None),
            Severity::Error
        );
        assert_eq!(
            Severity::from_log_level_string("calc info", None),
            Severity::Info
        );
        // Most severe name wins when several words match
        assert_eq!(
            Severity::from_log_level_string("info/error", None),
            Severity::Error
        );
    }

    #[test]
    fn test_from_log_level_fallback() {
        assert_eq!(Severity::from_log_level_string("", None), Severity::Warning);
        assert_eq!(
            Severity::from_log_level_string("inconsistency", None),
            Severity::Warning
        );
        assert_eq!(
            Severity::from_log_level_string("debug", Some(Severity::Info)),
            Severity::Info
        );
        // Substrings of words do not count
        assert_eq!(
            Severity::from_log_level_string("errors", Some(Severity::Info)),
            Severity::Info
        );
    }

    #[test]
    fn test_from_log_level_is_idempotent() {
        for level in ["ERROR", "warning", "x-info-y", "nonsense", "💥"] {
            let first = Severity::from_log_level_string(level, None);
            assert_eq!(first, Severity::from_log_level_string(level, None));
            assert_eq!(first, Severity::from_log_level_string(first.name(), None));
        }
    }

    #[test]
    fn test_max_name_widths() {
        assert_eq!(Severity::max_name_width(), "Warning".len());
        assert_eq!(MessageType::max_name_width(), "XBRL Validation".len());
        assert_eq!(Severity::max_name_width(), Severity::max_name_width());
    }

    #[test]
    fn test_all_except() {
        assert_eq!(MessageType::all_types().len(), 5);
        let user = MessageType::user_facing();
        assert_eq!(
            user.into_iter().collect::<Vec<_>>(),
            vec![
                MessageType::ExcelParsing,
                MessageType::Conversion,
                MessageType::XbrlValidation
            ]
        );
        assert!(MessageType::all_except(&MessageType::ALL).is_empty());
        assert_eq!(MessageType::all_except(&[]), MessageType::all_types());
    }

    #[test]
    fn test_canonical_names_serialize() {
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"WARNING\""
        );
        assert_eq!(
            serde_json::to_string(&MessageType::XbrlValidation).unwrap(),
            "\"XbrlValidation\""
        );
        for s in Severity::ALL {
            assert_eq!(serde_json::to_value(s).unwrap(), s.name());
        }
        for t in MessageType::ALL {
            assert_eq!(serde_json::to_value(t).unwrap(), t.name());
        }
    }

    #[test]
    fn test_unknown_names_fail_to_decode() {
        assert!(serde_json::from_str::<Severity>("\"Error\"").is_err());
        assert!(serde_json::from_str::<MessageType>("\"XBRL Validation\"").is_err());
    }
}
