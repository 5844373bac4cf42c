//! Integration tests for importing the validation engine's JSON log

use serde_json::json;
use xrep_common::log_import::{import_records, ValidationLog};
use xrep_common::{
    import_log_json, ConversionResultsBuilder, Error, LogRecord, MessageLog, MessageType,
    Severity, ValidationEngineResult, VerdictScope,
};

fn sample_log() -> String {
    json!({
        "log": [
            {"code": "info", "level": "info", "message": {"text": "Option disclosureSystem set"}},
            {"code": "info", "level": "info", "message": {"text": "[info] loaded in 0.31 secs"}},
            {"code": "info", "level": "info", "message": {"text": "Plugin activated"}},
            {"code": "", "level": "info", "message": {"text": "Startup banner"}},
            {"code": "xbrl.4.9:periodType", "level": "error",
             "message": {"text": "Wrong period type", "fact": "vsme:Employees"}},
            {"code": "calc11e:inconsistentCalculation", "level": "inconsistency",
             "message": {"text": "Calculation mismatch"}},
            {"code": "info", "level": "info", "message": {"text": "[info] validated in 1.02 secs"}}
        ]
    })
    .to_string()
}

#[test]
fn test_import_full_log() {
    let messages = import_log_json(&sample_log()).unwrap();
    let summary: Vec<_> = messages
        .iter()
        .map(|m| (m.text.as_str(), m.severity, m.message_type))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("[info] loaded in 0.31 secs", Severity::Info, MessageType::DevInfo),
            ("Startup banner", Severity::Info, MessageType::DevInfo),
            (
                "[xbrl.4.9:periodType] Wrong period type",
                Severity::Error,
                MessageType::XbrlValidation
            ),
            (
                "[calc11e:inconsistentCalculation] Calculation mismatch",
                Severity::Warning,
                MessageType::XbrlValidation
            ),
            ("[info] validated in 1.02 secs", Severity::Info, MessageType::DevInfo),
        ]
    );
    assert_eq!(messages[2].concept_ref.as_deref(), Some("vsme:Employees"));
    assert_eq!(messages[3].concept_ref, None);
}

#[test]
fn test_option_record_produces_nothing() {
    let log = json!({"log": [{"code": "info", "message": {"text": "Option foo set"}}]}).to_string();
    assert!(import_log_json(&log).unwrap().is_empty());
}

#[test]
fn test_empty_code_record_produces_dev_info() {
    let log = json!({"log": [{"code": "", "message": {"text": "x"}}]}).to_string();
    let messages = import_log_json(&log).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Info);
    assert_eq!(messages[0].message_type, MessageType::DevInfo);
}

#[test]
fn test_empty_envelope() {
    assert!(import_log_json(r#"{"log": []}"#).unwrap().is_empty());
}

#[test]
fn test_object_without_log_key_is_a_decode_error() {
    assert!(matches!(import_log_json("{}"), Err(Error::Decode(_))));

    // Frozen conversion results are JSON too, but not an engine log
    let results = json!({"id": "x", "m": [], "q": 0, "p": 0, "success": true}).to_string();
    assert!(matches!(import_log_json(&results), Err(Error::Decode(_))));
    assert!(matches!(
        ValidationEngineResult::from_json(&results, vec![]),
        Err(Error::Decode(_))
    ));
}

#[test]
fn test_malformed_log_is_a_decode_error() {
    assert!(matches!(import_log_json("not json"), Err(Error::Decode(_))));
    assert!(matches!(
        import_log_json(r#"{"log": "nope"}"#),
        Err(Error::Decode(_))
    ));
}

#[test]
fn test_import_records_from_typed_log() {
    let log = ValidationLog {
        log: vec![
            LogRecord::new("x:y", "WARNING", "careful"),
            LogRecord::new("info", "info", "chatter"),
        ],
    };
    let messages = import_records(&log.log);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].severity, Severity::Warning);
}

#[test]
fn test_engine_result_feeds_verdict() {
    let engine =
        ValidationEngineResult::from_json(&sample_log(), vec!["line 1".to_string()]).unwrap();
    assert_eq!(engine.record_count(), 7);
    assert_eq!(engine.messages().len(), 5);
    assert_eq!(engine.log_lines(), vec!["line 1".to_string()]);

    let mut builder = ConversionResultsBuilder::default();
    builder.add_messages(engine.messages());
    assert!(builder.conversion_successful());

    let results = builder.build();
    assert!(!results.is_xbrl_valid());
    assert_eq!(
        results.get_overall_severity(VerdictScope::JustXbrlValidation),
        Severity::Error
    );
    assert_eq!(results.user_messages().len(), 2);
}

#[test]
fn test_engine_result_returns_copies() {
    let engine = ValidationEngineResult::from_json(&sample_log(), vec![]).unwrap();
    let mut first = engine.messages();
    first.clear();
    assert_eq!(engine.messages().len(), 5);
}
