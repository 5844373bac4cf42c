//! A single diagnostic record produced by a pipeline stage

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::severity::{MessageType, Severity};
use crate::Result;

/// One diagnostic message.
///
/// Serialized with compact keys (`m`, `s`, `mt`, `c`, `e`); severity and
/// type are stored by canonical name and decoding an unknown name fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "m")]
    pub text: String,
    #[serde(rename = "s")]
    pub severity: Severity,
    #[serde(rename = "mt")]
    pub message_type: MessageType,
    /// Taxonomy concept the message pertains to
    #[serde(rename = "c")]
    pub concept_ref: Option<String>,
    /// Spreadsheet cell or range reference
    #[serde(rename = "e")]
    pub location_ref: Option<String>,
}

impl Message {
    pub fn new(text: impl Into<String>, severity: Severity, message_type: MessageType) -> Self {
        Self {
            text: text.into(),
            severity,
            message_type,
            concept_ref: None,
            location_ref: None,
        }
    }

    /// Attach a taxonomy concept reference
    pub fn with_concept(mut self, concept_ref: impl Into<String>) -> Self {
        self.concept_ref = Some(concept_ref.into());
        self
    }

    /// Attach a spreadsheet location reference
    pub fn with_location(mut self, location_ref: impl Into<String>) -> Self {
        self.location_ref = Some(location_ref.into());
        self
    }

    pub fn to_record(&self) -> serde_json::Value {
        // Plain struct of strings and enums; serialization cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Decode a record produced by [`Message::to_record`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] when a key is missing or a severity
    /// or message type name is not recognised.
    pub fn from_record(record: &serde_json::Value) -> Result<Self> {
        Ok(Self::deserialize(record)?)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:sw$} : {:tw$} : {}",
            self.severity,
            self.message_type,
            self.text,
            sw = Severity::max_name_width(),
            tw = MessageType::max_name_width(),
        )?;
        if let Some(location) = &self.location_ref {
            write!(f, " (Excel: {})", location)?;
        }
        if let Some(concept) = &self.concept_ref {
            write!(f, " (taxonomy concept: {})", concept)?;
        }
        Ok(())
    }
}
