//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a fresh conversion run identifier (hyphenated UUIDv4 string)
pub fn new_run_id() -> String {
    generate().to_string()
}
