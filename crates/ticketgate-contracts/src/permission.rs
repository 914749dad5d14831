//! Permission types.
//!
//! Permissions are flat, unordered capability tokens identified by name.
//! There is no hierarchy: holding `edit_tickets` says nothing about
//! `view_tickets`. A principal's effective permissions are the union of the
//! permission sets of all roles it holds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::PermissionId;

pub const VIEW_USERS: &str = "view_users";
pub const EDIT_USERS: &str = "edit_users";
pub const DELETE_USERS: &str = "delete_users";
pub const VIEW_GROUPS: &str = "view_groups";
pub const EDIT_GROUPS: &str = "edit_groups";
pub const DELETE_GROUPS: &str = "delete_groups";
pub const VIEW_TICKETS: &str = "view_tickets";
pub const EDIT_TICKETS: &str = "edit_tickets";
pub const DELETE_TICKETS: &str = "delete_tickets";
pub const CHANGE_TICKET_STATUS: &str = "change_ticket_status";

/// The fixed vocabulary the bootstrap seed registers.
pub const VOCABULARY: [&str; 10] = [
    VIEW_USERS,
    EDIT_USERS,
    DELETE_USERS,
    VIEW_GROUPS,
    EDIT_GROUPS,
    DELETE_GROUPS,
    VIEW_TICKETS,
    EDIT_TICKETS,
    DELETE_TICKETS,
    CHANGE_TICKET_STATUS,
];

/// A registered permission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    /// Unique name, e.g. `"change_ticket_status"`.
    pub name: String,
}

/// A set of permission names, as held by a principal at decision time.
///
/// Built fresh for every decision; never cached between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    inner: BTreeSet<String>,
}

impl PermissionSet {
    /// Add a permission name to this set.
    pub fn grant(&mut self, name: impl Into<String>) {
        self.inner.insert(name.into());
    }

    /// Return true if the set contains `name`.
    pub fn has(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    /// All names in the set, in lexical order.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        for name in iter {
            set.grant(name);
        }
        set
    }
}
