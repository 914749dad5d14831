//! Error taxonomy for the ticketgate authorization layer.
//!
//! Every fallible operation returns `GateResult<T>`. The hosting layer maps
//! the variants onto its own responses: login redirect, forbidden, not found,
//! form re-display, or server fault.

use std::fmt;

use thiserror::Error;

use crate::{action::Action, validation::ValidationErrors};

#[derive(Debug, Error)]
pub enum GateError {
    /// No principal was resolved for the request, or the resolved principal
    /// no longer exists or is inactive.
    #[error("authentication required")]
    AuthenticationRequired,

    /// The principal lacks the required permission or ownership relation.
    ///
    /// The message deliberately does not say which check failed.
    #[error("not permitted to {action}")]
    AuthorizationDenied { action: Action },

    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Submitted field data violated entity constraints. Nothing was saved.
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// A deployment defect, e.g. a route requiring a permission that is not
    /// registered. Fatal to the request.
    #[error("configuration fault: {reason}")]
    ConfigurationFault { reason: String },

    /// The backing store could not be read or written.
    #[error("storage error: {reason}")]
    Storage { reason: String },
}

impl GateError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn denied(action: Action) -> Self {
        Self::AuthorizationDenied { action }
    }
}

pub type GateResult<T> = Result<T, GateError>;
