//! Per-request identity context.
//!
//! The core never authenticates anyone. The hosting layer resolves the
//! session to a principal id (or to nothing) and hands the result in as a
//! `RequestContext`. There is no ambient "current user": every desk call
//! takes the context explicitly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::PrincipalId;

/// Unique identifier for one incoming request, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub uuid::Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who is asking, as resolved by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub request_id: RequestId,
    /// `None` when the caller is not logged in.
    pub principal: Option<PrincipalId>,
}

impl RequestContext {
    /// A request made on behalf of `principal`.
    pub fn authenticated(principal: PrincipalId) -> Self {
        Self {
            request_id: RequestId::new(),
            principal: Some(principal),
        }
    }

    /// A request with no resolved principal.
    pub fn anonymous() -> Self {
        Self {
            request_id: RequestId::new(),
            principal: None,
        }
    }
}
