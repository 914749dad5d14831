//! Groups, statuses, tickets and comments.
//!
//! A ticket is "owned" by the union of its direct owner (`assigned_user`)
//! and the members of its owner group (`assigned_group`). Either side may be
//! absent; with both absent only the superuser role can reach the ticket.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommentId, GroupId, PrincipalId, StatusId, TicketId};

/// A named collection of principals used as a ticket ownership scope.
///
/// Groups do not nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub members: BTreeSet<PrincipalId>,
}

impl Group {
    pub fn has_member(&self, principal: PrincipalId) -> bool {
        self.members.contains(&principal)
    }
}

/// One of the admin-managed ticket states, e.g. `"In Review"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: StatusId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub name: String,
    pub status: StatusId,
    pub note: Option<String>,
    /// Direct owner.
    pub assigned_user: Option<PrincipalId>,
    /// Scope owner; every member of this group shares ownership.
    pub assigned_group: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ticket together with its comment thread, as shown on the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    /// Oldest first.
    pub comments: Vec<Comment>,
}

/// One entry in a ticket's append-only comment thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub ticket: TicketId,
    pub author: PrincipalId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
