//! Route table types and configuration schema.
//!
//! A `RouteConfig` is deserialized from TOML and holds one `Route` per
//! permission-tier action. Action names use the same snake_case spelling as
//! log lines (`edit_ticket`, `delete_group`, ...).

use serde::{Deserialize, Serialize};

use ticketgate_contracts::{action::Action, role::ADMIN_ROLE};

/// One guarded entry point and the permission it requires.
///
/// Example in TOML:
/// ```toml
/// [[routes]]
/// action = "delete_ticket"
/// permission = "delete_tickets"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// The desk action this route guards. Must be a permission-tier action.
    pub action: Action,

    /// Name of the permission a principal must hold through one of its roles.
    pub permission: String,
}

/// The top-level structure deserialized from a TOML route file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Role name that bypasses ticket ownership checks.
    #[serde(default = "default_superuser_role")]
    pub superuser_role: String,

    /// At most one route per action.
    #[serde(default)]
    pub routes: Vec<Route>,
}

fn default_superuser_role() -> String {
    ADMIN_ROLE.to_string()
}
