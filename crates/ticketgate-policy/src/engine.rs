//! TOML-driven route policy implementation.
//!
//! `TomlRoutePolicy` loads a `RouteConfig` from a TOML string or file and
//! implements the `RoutePolicy` trait from ticketgate-core.
//!
//! Loading checks the table's shape only:
//!
//! 1. Every route names a permission-tier action.
//! 2. No action is routed twice.
//! 3. Permission names and the superuser role name are non-blank.
//!
//! Whether the named permissions exist is a property of the directory, not
//! of the file. `validate_against` checks that at startup; the desk checks it
//! again on every call.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, error};

use ticketgate_contracts::{
    action::{Action, Tier},
    error::{GateError, GateResult},
};
use ticketgate_core::{directory::Directory, traits::RoutePolicy};

use crate::route::RouteConfig;

const DEFAULT_POLICY: &str = include_str!("../policies/default.toml");

/// A `RoutePolicy` implementation that reads its table from a TOML document.
///
/// ```rust,ignore
/// use ticketgate_policy::engine::TomlRoutePolicy;
///
/// let routes = TomlRoutePolicy::from_file(Path::new("policies/default.toml"))?;
/// let desk = Desk::new(store, Box::new(routes));
/// ```
#[derive(Debug)]
pub struct TomlRoutePolicy {
    config: RouteConfig,
    table: BTreeMap<Action, String>,
}

impl TomlRoutePolicy {
    /// Parse `s` as TOML and build a `TomlRoutePolicy`.
    ///
    /// Returns `GateError::ConfigurationFault` if the TOML is malformed, names
    /// an unknown action, or breaks one of the shape rules above.
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        let config: RouteConfig = toml::from_str(s).map_err(|e| GateError::ConfigurationFault {
            reason: format!("failed to parse route TOML: {}", e),
        })?;
        Self::from_config(config)
    }

    /// Read the file at `path` and parse it as a route table.
    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::ConfigurationFault {
            reason: format!("failed to read route file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The route table shipped with the crate.
    pub fn default_policy() -> GateResult<Self> {
        Self::from_toml_str(DEFAULT_POLICY)
    }

    /// Build from an already-deserialized configuration.
    pub fn from_config(config: RouteConfig) -> GateResult<Self> {
        if config.superuser_role.trim().is_empty() {
            return Err(fault("superuser_role must not be blank".to_string()));
        }

        let mut table = BTreeMap::new();
        for route in &config.routes {
            if route.action.tier() != Tier::Permission {
                return Err(fault(format!(
                    "'{}' is a {:?}-tier action and cannot be routed to a permission",
                    route.action,
                    route.action.tier()
                )));
            }
            if route.permission.trim().is_empty() {
                return Err(fault(format!("route '{}' names a blank permission", route.action)));
            }
            if table.insert(route.action, route.permission.clone()).is_some() {
                return Err(fault(format!("action '{}' is routed more than once", route.action)));
            }
        }

        debug!(
            routes = table.len(),
            superuser_role = %config.superuser_role,
            "route policy loaded"
        );
        Ok(Self { config, table })
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// `(action, permission)` pairs in action order.
    pub fn routes(&self) -> impl Iterator<Item = (Action, &str)> {
        self.table.iter().map(|(action, perm)| (*action, perm.as_str()))
    }

    /// Permission-tier actions with no route. Calling any of them through the
    /// desk is a configuration fault.
    pub fn unrouted(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| a.tier() == Tier::Permission && !self.table.contains_key(a))
            .collect()
    }

    /// Check the table against a live directory: every permission-tier action
    /// is routed and every routed permission is registered.
    ///
    /// All problems are reported together in one `ConfigurationFault`.
    pub fn validate_against(&self, dir: &Directory) -> GateResult<()> {
        let mut problems = Vec::new();
        for action in self.unrouted() {
            problems.push(format!("no route for '{action}'"));
        }
        for (action, permission) in self.routes() {
            if dir.permission_by_name(permission).is_none() {
                problems.push(format!("route '{action}' requires unknown permission '{permission}'"));
            }
        }
        if problems.is_empty() {
            return Ok(());
        }

        let reason = problems.join("; ");
        error!(reason = %reason, "route policy does not match directory");
        Err(fault(reason))
    }
}

impl RoutePolicy for TomlRoutePolicy {
    fn required_permission(&self, action: Action) -> Option<&str> {
        self.table.get(&action).map(String::as_str)
    }

    fn superuser_role(&self) -> &str {
        &self.config.superuser_role
    }
}

fn fault(reason: String) -> GateError {
    GateError::ConfigurationFault { reason }
}
