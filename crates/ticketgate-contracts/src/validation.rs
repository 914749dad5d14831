//! Field-level validation results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Messages keyed by field name.
///
/// Collect every problem with a submission before returning, so the caller
/// can show them all at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record `REQUIRED` if `value` is blank, and a length message if it is
    /// longer than `max_chars`.
    pub fn check_text(&mut self, field: &str, value: &str, max_chars: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.add(field, REQUIRED);
            return;
        }
        let len = trimmed.chars().count();
        if len > max_chars {
            self.add(
                field,
                format!("Ensure this value has at most {max_chars} characters (it has {len})."),
            );
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`, empty if none.
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, `ValidationFailed` otherwise.
    pub fn into_result(self) -> GateResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(GateError::ValidationFailed(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}
