//! Submitted field data for create and update operations.
//!
//! These are the raw values a form or API body carries before validation.
//! Desk operations take them by reference, so when validation fails the
//! caller still owns the submitted input and can present it again next to the
//! field messages.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, PermissionId, PrincipalId, RoleId, StatusId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFields {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFields {
    pub name: String,
    #[serde(default)]
    pub permissions: BTreeSet<PermissionId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFields {
    pub name: String,
}

/// Administrative create/edit of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalFields {
    pub email: String,
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,
    pub is_active: bool,
    pub is_staff: bool,
}

impl PrincipalFields {
    /// An active, non-staff principal with no roles.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            roles: BTreeSet::new(),
            is_active: true,
            is_staff: false,
        }
    }
}

/// Self-service sign-up. The password has already been hashed by the
/// authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFields {
    pub name: String,
    #[serde(default)]
    pub members: BTreeSet<PrincipalId>,
}

/// Full-field ticket edit (create and `edit_ticket`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFields {
    pub name: String,
    pub status: Option<StatusId>,
    pub note: Option<String>,
    pub assigned_user: Option<PrincipalId>,
    pub assigned_group: Option<GroupId>,
}

/// Status-only ticket edit (`change_ticket_status`). Touches `status` and
/// `note`, never ownership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStatusFields {
    pub status: Option<StatusId>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentFields {
    pub text: String,
}
