//! Error visibility per field

use std::collections::HashMap;

use crate::schema::validator::ValidationErrors;

/// Interaction state of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    /// Never edited; errors stay hidden
    #[default]
    Untouched,
    /// Edited by the user
    Touched,
    /// Failed a `Next`/`Submit` attempt
    SubmittedInvalid,
}

/// Field path → interaction state
#[derive(Debug, Clone, Default)]
pub struct FieldStates {
    states: HashMap<String, FieldState>,
}

impl FieldStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> FieldState {
        self.states.get(path).copied().unwrap_or_default()
    }

    /// Record a user edit
    pub fn touch(&mut self, path: impl Into<String>) {
        self.states.insert(path.into(), FieldState::Touched);
    }

    /// Reveal every error in `errors` after a rejected navigation attempt
    pub fn mark_submitted(&mut self, errors: &ValidationErrors) {
        for path in errors.paths() {
            self.states.insert(path.to_string(), FieldState::SubmittedInvalid);
        }
    }

    /// Follow the removal of `prefix.index`: its states go, and states of
    /// later entries shift down one index so they stay on the same entry
    pub fn remove_index(&mut self, prefix: &str, index: usize) {
        let dotted = format!("{}.", prefix);
        let states = std::mem::take(&mut self.states);
        for (path, state) in states {
            let Some(rest) = path.strip_prefix(&dotted) else {
                self.states.insert(path, state);
                continue;
            };
            let (position, field) = rest.split_once('.').unwrap_or((rest, ""));
            let Ok(position) = position.parse::<usize>() else {
                self.states.insert(path, state);
                continue;
            };
            if position == index {
                continue;
            }
            let position = if position > index { position - 1 } else { position };
            let renumbered = if field.is_empty() {
                format!("{}{}", dotted, position)
            } else {
                format!("{}{}.{}", dotted, position, field)
            };
            self.states.insert(renumbered, state);
        }
    }

    /// Errors the user should see now
    pub fn visible(&self, errors: &ValidationErrors) -> ValidationErrors {
        errors.filtered(|path| self.get(path) != FieldState::Untouched)
    }
}
