//! The save-gated review session state machine
//!
//! A session presents exactly one field at a time for editing. Forward
//! navigation requires an explicit save whose value still matches the current
//! draft; backward navigation is always allowed and un-saves nothing. The
//! cursor ranges over `0..=len`, where `len` is the absorbing terminal state
//! reached once every field has been stepped past.

use thiserror::Error;

use crate::fields::FieldItem;

/// Precondition violations on session operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session is in the terminal state; only a fresh session can follow.
    #[error("review session is complete; no field is active")]
    Terminal,

    /// `next()` was called without a save matching the current draft.
    #[error("current field has not been saved")]
    NotSaved,
}

/// In-memory review session over an ordered field sequence.
///
/// Constructed fresh per extraction result; replacing a session is plain
/// value assignment. An empty field sequence is legal and starts terminal.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    fields: Vec<FieldItem>,
    current_index: usize,
    /// In-progress draft per field, seeded from each field's original value
    edited: Vec<String>,
    /// Present only once the user explicitly saved that index
    saved: Vec<Option<String>>,
}

impl ReviewSession {
    /// Initialize a session over `fields`: cursor at 0, drafts seeded from
    /// the original values, no field saved.
    pub fn new(fields: Vec<FieldItem>) -> Self {
        let edited = fields.iter().map(|f| f.value.clone()).collect();
        let saved = vec![None; fields.len()];
        Self {
            fields,
            current_index: 0,
            edited,
            saved,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// True once the cursor has stepped past the last field.
    pub fn is_terminal(&self) -> bool {
        self.current_index >= self.fields.len()
    }

    /// The active field, `None` in the terminal state.
    pub fn current(&self) -> Option<&FieldItem> {
        self.fields.get(self.current_index)
    }

    /// The active field's draft text, `None` in the terminal state.
    pub fn current_draft(&self) -> Option<&str> {
        self.edited.get(self.current_index).map(String::as_str)
    }

    pub fn fields(&self) -> &[FieldItem] {
        &self.fields
    }

    /// Replace the active field's draft. Rejected in the terminal state;
    /// never touches saved state.
    pub fn edit(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        if self.is_terminal() {
            return Err(SessionError::Terminal);
        }
        self.edited[self.current_index] = text.into();
        Ok(())
    }

    /// Discard the active field's draft.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.edit("")
    }

    /// Record the current draft as the saved value for the active field.
    /// Idempotent while the draft is unchanged.
    pub fn save(&mut self) -> Result<(), SessionError> {
        if self.is_terminal() {
            return Err(SessionError::Terminal);
        }
        self.saved[self.current_index] = Some(self.edited[self.current_index].clone());
        Ok(())
    }

    /// True iff the active field has a saved value equal to its current
    /// draft. Editing after a save invalidates the saved status until the
    /// field is saved again. Always false in the terminal state.
    pub fn is_current_saved(&self) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            &self.saved[self.current_index],
            Some(saved) if *saved == self.edited[self.current_index]
        )
    }

    /// Move the cursor back one field. Always legal; a no-op at index 0.
    pub fn back(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Advance the cursor. Gated: the active field must carry a save
    /// matching its current draft, so no field can be skipped without an
    /// explicit save. On the last field this enters the terminal state.
    pub fn next(&mut self) -> Result<(), SessionError> {
        if self.is_terminal() {
            return Err(SessionError::Terminal);
        }
        if !self.is_current_saved() {
            return Err(SessionError::NotSaved);
        }
        self.current_index += 1;
        Ok(())
    }
}
