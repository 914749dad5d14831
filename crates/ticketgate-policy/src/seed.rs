//! Bootstrap seed: permissions, statuses and roles a fresh directory needs.
//!
//! `Seed::apply` is get-or-create. Running it twice leaves the directory as
//! it was after the first run, and running it over an edited directory only
//! ever adds: a role that exists keeps every permission it already has and
//! gains whatever the seed lists for it.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ticketgate_contracts::{
    error::{GateError, GateResult},
    fields::{PermissionFields, RoleFields, StatusFields},
    ids::PermissionId,
};
use ticketgate_core::directory::Directory;

const DEFAULT_SEED: &str = include_str!("../policies/seed.toml");

/// A role and the permission names it is granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRole {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// The top-level structure deserialized from a TOML seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub roles: Vec<SeedRole>,
}

/// What one `apply` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub permissions_created: usize,
    pub statuses_created: usize,
    pub roles_created: usize,
    /// Permissions newly granted to roles that already existed.
    pub grants_added: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        *self == SeedReport::default()
    }
}

impl Seed {
    pub fn from_toml_str(s: &str) -> GateResult<Self> {
        toml::from_str(s).map_err(|e| GateError::ConfigurationFault {
            reason: format!("failed to parse seed TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> GateResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GateError::ConfigurationFault {
            reason: format!("failed to read seed file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The ten-permission vocabulary, the Admin / Manager / Analyst roles and
    /// the Pending / In Review / Closed statuses.
    pub fn default_seed() -> GateResult<Self> {
        Self::from_toml_str(DEFAULT_SEED)
    }

    /// Get-or-create everything the seed lists.
    ///
    /// A role naming a permission the seed does not list is rejected before
    /// anything is written. Validation failures from the directory (an
    /// over-long name, say) propagate as `ValidationFailed`; callers that need
    /// all-or-nothing run this inside `Store::write`.
    pub fn apply(&self, dir: &mut Directory) -> GateResult<SeedReport> {
        self.check()?;
        let mut report = SeedReport::default();

        for name in &self.permissions {
            if dir.permission_by_name(name).is_some() {
                debug!(permission = %name, "permission exists");
                continue;
            }
            dir.create_permission(&PermissionFields { name: name.clone() })?;
            info!(permission = %name, "permission created");
            report.permissions_created += 1;
        }

        for name in &self.statuses {
            if dir.status_by_name(name).is_some() {
                debug!(status = %name, "status exists");
                continue;
            }
            dir.create_status(&StatusFields { name: name.clone() })?;
            info!(status = %name, "status created");
            report.statuses_created += 1;
        }

        for role in &self.roles {
            let wanted = permission_ids(dir, &role.permissions)?;
            let found = dir.role_by_name(&role.name).cloned();
            match found {
                Some(existing) => {
                    let missing: BTreeSet<PermissionId> =
                        wanted.difference(&existing.permissions).copied().collect();
                    if missing.is_empty() {
                        debug!(role = %role.name, "role exists");
                        continue;
                    }
                    let permissions = existing.permissions.union(&missing).copied().collect();
                    dir.update_role(
                        existing.id,
                        &RoleFields {
                            name: existing.name.clone(),
                            permissions,
                        },
                    )?;
                    info!(role = %role.name, added = missing.len(), "role permissions extended");
                    report.grants_added += missing.len();
                }
                None => {
                    dir.create_role(&RoleFields {
                        name: role.name.clone(),
                        permissions: wanted,
                    })?;
                    info!(role = %role.name, "role created");
                    report.roles_created += 1;
                }
            }
        }

        Ok(report)
    }

    /// Every role grant must refer to a permission listed in this seed.
    fn check(&self) -> GateResult<()> {
        let listed: BTreeSet<&str> = self.permissions.iter().map(String::as_str).collect();
        for role in &self.roles {
            if let Some(unknown) = role.permissions.iter().find(|p| !listed.contains(p.as_str())) {
                return Err(GateError::ConfigurationFault {
                    reason: format!("seed role '{}' grants unknown permission '{}'", role.name, unknown),
                });
            }
        }
        Ok(())
    }
}

fn permission_ids(dir: &Directory, names: &[String]) -> GateResult<BTreeSet<PermissionId>> {
    names
        .iter()
        .map(|name| {
            dir.permission_by_name(name)
                .map(|p| p.id)
                .ok_or_else(|| GateError::not_found("permission", name))
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
