//! Role and principal types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{PermissionId, PrincipalId, RoleId};

/// Name of the built-in superuser role.
///
/// A principal holding a role with exactly this name may view and comment on
/// every ticket regardless of ownership. This is a role-name check, separate
/// from the permission system: renaming the role removes the bypass, and
/// granting every permission to some other role does not add it.
pub const ADMIN_ROLE: &str = "Admin";

/// A named bundle of permissions, managed by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    /// Unique name, e.g. `"Analyst"`.
    pub name: String,
    pub permissions: BTreeSet<PermissionId>,
}

/// An identity that can hold roles, own tickets, and belong to groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    /// Unique login identifier. The domain part is stored lowercased.
    pub email: String,
    /// Opaque credential digest produced by the authentication layer.
    /// The core never reads it.
    pub password_hash: Option<String>,
    /// Inactive principals are treated as unauthenticated.
    pub is_active: bool,
    /// Staff principals may administer roles, permissions and statuses.
    pub is_staff: bool,
    pub roles: BTreeSet<RoleId>,
}
