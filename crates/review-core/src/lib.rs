//! Review session core for compliance form autofill
//!
//! This crate provides:
//! - The `ReviewSession` state machine: one field at a time, explicit save
//!   required before forward navigation, unrestricted backward movement
//! - The extraction result adapter: turns raw field/explanation mappings from
//!   the extraction service into the ordered field sequence a session reviews
//!
//! Sessions are plain in-memory values. They are created fresh per extraction
//! result and replaced wholesale by the next one; nothing is persisted.

pub mod fields;
pub mod session;

// Re-export commonly used types
pub use fields::{
    fields_from_extraction, humanize_label, placeholder_fields, FieldItem, DEFAULT_REASON,
    FORM_FIELD_KEYS,
};
pub use session::{ReviewSession, SessionError};
