//! The catalogue of guarded actions.
//!
//! Every desk entry point corresponds to exactly one `Action`, and every
//! action belongs to exactly one `Tier`. The tier decides which gate runs
//! before the action touches any data.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an action is authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Tier A: the principal must hold the permission the route table
    /// declares for the action. Ownership is never consulted.
    Permission,
    /// Tier B: the principal must own the ticket (directly, through group
    /// membership, or via the superuser role). Listings are filtered rather
    /// than denied.
    Ownership,
    /// The principal must carry the staff flag.
    Staff,
    /// Any active, authenticated principal.
    Authenticated,
    /// No principal required.
    Open,
}

/// A named operation a caller can request.
///
/// Names are snake_case in TOML route tables, e.g. `action = "edit_ticket"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Tickets
    ListTickets,
    ViewTicket,
    CommentOnTicket,
    CreateTicket,
    EditTicket,
    ChangeTicketStatus,
    DeleteTicket,
    // Users
    Register,
    ListUsers,
    ViewUser,
    CreateUser,
    EditUser,
    DeleteUser,
    // Groups
    ListGroups,
    ViewGroup,
    CreateGroup,
    EditGroup,
    DeleteGroup,
    // Administration
    ListRoles,
    CreateRole,
    EditRole,
    DeleteRole,
    ListPermissions,
    CreatePermission,
    DeletePermission,
    ListStatuses,
    CreateStatus,
    DeleteStatus,
}

impl Action {
    pub const ALL: [Action; 28] = [
        Action::ListTickets,
        Action::ViewTicket,
        Action::CommentOnTicket,
        Action::CreateTicket,
        Action::EditTicket,
        Action::ChangeTicketStatus,
        Action::DeleteTicket,
        Action::Register,
        Action::ListUsers,
        Action::ViewUser,
        Action::CreateUser,
        Action::EditUser,
        Action::DeleteUser,
        Action::ListGroups,
        Action::ViewGroup,
        Action::CreateGroup,
        Action::EditGroup,
        Action::DeleteGroup,
        Action::ListRoles,
        Action::CreateRole,
        Action::EditRole,
        Action::DeleteRole,
        Action::ListPermissions,
        Action::CreatePermission,
        Action::DeletePermission,
        Action::ListStatuses,
        Action::CreateStatus,
        Action::DeleteStatus,
    ];

    /// The gate this action passes through.
    pub fn tier(self) -> Tier {
        match self {
            Action::ListTickets | Action::ViewTicket | Action::CommentOnTicket => Tier::Ownership,

            Action::CreateTicket
            | Action::EditTicket
            | Action::ChangeTicketStatus
            | Action::DeleteTicket
            | Action::ListUsers
            | Action::ViewUser
            | Action::CreateUser
            | Action::EditUser
            | Action::DeleteUser
            | Action::ListGroups
            | Action::ViewGroup
            | Action::CreateGroup
            | Action::EditGroup
            | Action::DeleteGroup => Tier::Permission,

            Action::ListRoles
            | Action::CreateRole
            | Action::EditRole
            | Action::DeleteRole
            | Action::ListPermissions
            | Action::CreatePermission
            | Action::DeletePermission
            | Action::CreateStatus
            | Action::DeleteStatus => Tier::Staff,

            Action::ListStatuses => Tier::Authenticated,

            Action::Register => Tier::Open,
        }
    }

    /// The snake_case name used in route tables and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::ListTickets => "list_tickets",
            Action::ViewTicket => "view_ticket",
            Action::CommentOnTicket => "comment_on_ticket",
            Action::CreateTicket => "create_ticket",
            Action::EditTicket => "edit_ticket",
            Action::ChangeTicketStatus => "change_ticket_status",
            Action::DeleteTicket => "delete_ticket",
            Action::Register => "register",
            Action::ListUsers => "list_users",
            Action::ViewUser => "view_user",
            Action::CreateUser => "create_user",
            Action::EditUser => "edit_user",
            Action::DeleteUser => "delete_user",
            Action::ListGroups => "list_groups",
            Action::ViewGroup => "view_group",
            Action::CreateGroup => "create_group",
            Action::EditGroup => "edit_group",
            Action::DeleteGroup => "delete_group",
            Action::ListRoles => "list_roles",
            Action::CreateRole => "create_role",
            Action::EditRole => "edit_role",
            Action::DeleteRole => "delete_role",
            Action::ListPermissions => "list_permissions",
            Action::CreatePermission => "create_permission",
            Action::DeletePermission => "delete_permission",
            Action::ListStatuses => "list_statuses",
            Action::CreateStatus => "create_status",
            Action::DeleteStatus => "delete_status",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
