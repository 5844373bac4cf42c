//! # xrep Common Library
//!
//! Result aggregation and severity classification for the spreadsheet to
//! XBRL conversion pipeline:
//! - Severity and message-origin taxonomy
//! - Diagnostic messages and their persisted record form
//! - Per-run results builder, frozen results and verdict computation
//! - Timed stage tracking with early-abort support
//! - Import of the external validation engine's log
//! - Bootstrap configuration
//!
//! ```
//! use xrep_common::{ConversionResultsBuilder, MessageLog, MessageType, Severity, VerdictScope};
//!
//! let mut builder = ConversionResultsBuilder::new(Some("run-1".into()), false);
//! builder.add_message("Cell empty", Severity::Warning, MessageType::ExcelParsing, None, Some("A1"));
//! let results = builder.build();
//! assert!(results.conversion_successful());
//! assert_eq!(results.get_overall_severity(VerdictScope::All), Severity::Warning);
//! assert!(!results.is_xbrl_valid());
//! ```

pub mod config;
pub mod error;
pub mod human_time;
pub mod log_import;
pub mod message;
pub mod processing;
pub mod results;
pub mod severity;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use log_import::{import_log_json, LogRecord, ValidationEngineResult};
pub use message::Message;
pub use processing::{ContextState, EarlyAbort, ProcessingContext};
pub use results::{
    CellRef, ConversionResults, ConversionResultsBuilder, MessageLog, Rag, VerdictScope,
};
pub use severity::{MessageType, Severity};
