//! Demo accounts and customer groups for the helpdesk reference deployment.
//!
//! Applied on top of the default seed:
//!
//! | account                 | role    | staff | groups                |
//! |-------------------------|---------|-------|-----------------------|
//! | admin@example.com       | Admin   | yes   | Customer 1            |
//! | managerN@example.com    | Manager | no    | Customer N (N = 1..3) |
//! | analystN@example.com    | Analyst | no    | Customer N (N = 1..3) |
//!
//! All addresses are fictional. Accounts carry no credential.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use ticketgate_contracts::{
    error::{GateError, GateResult},
    fields::{GroupFields, PrincipalFields},
    ids::{PrincipalId, RoleId, StatusId},
};
use ticketgate_core::{directory::Directory, traits::Store, Desk};
use ticketgate_policy::{Seed, TomlRoutePolicy};
use ticketgate_store::MemoryStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const CUSTOMERS: u32 = 3;

pub fn manager_email(n: u32) -> String {
    format!("manager{n}@example.com")
}

pub fn analyst_email(n: u32) -> String {
    format!("analyst{n}@example.com")
}

pub fn customer_group(n: u32) -> String {
    format!("Customer {n}")
}

/// What one `apply` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixtureReport {
    pub principals_created: usize,
    /// Existing demo accounts whose roles were put back to the stock role.
    pub roles_reset: usize,
    pub groups_created: usize,
}

/// Get-or-create the demo accounts and groups.
///
/// Requires the Admin, Manager and Analyst roles; run the seed first.
/// Existing demo accounts are reset to their stock role. Existing groups gain
/// missing members and keep the ones they have.
pub fn apply(dir: &mut Directory) -> GateResult<FixtureReport> {
    let admin_role = role(dir, "Admin")?;
    let manager_role = role(dir, "Manager")?;
    let analyst_role = role(dir, "Analyst")?;
    let mut report = FixtureReport::default();

    let admin = account(dir, &mut report, ADMIN_EMAIL, admin_role, true)?;
    for n in 1..=CUSTOMERS {
        let manager = account(dir, &mut report, &manager_email(n), manager_role, false)?;
        let analyst = account(dir, &mut report, &analyst_email(n), analyst_role, false)?;

        let mut members = BTreeSet::from([manager, analyst]);
        if n == 1 {
            members.insert(admin);
        }
        group(dir, &mut report, &customer_group(n), members)?;
    }

    Ok(report)
}

/// A seeded, fixture-loaded desk over an in-memory store, guarded by the
/// default route table.
pub fn helpdesk() -> GateResult<Desk<MemoryStore>> {
    let seed = Seed::default_seed()?;
    let routes = TomlRoutePolicy::default_policy()?;
    let store = MemoryStore::default();

    store.write(|dir| {
        seed.apply(dir)?;
        apply(dir)?;
        routes.validate_against(dir)
    })?;

    Ok(Desk::new(store, Box::new(routes)))
}

/// Id of the account registered under `email`.
pub fn principal_id(desk: &Desk<MemoryStore>, email: &str) -> GateResult<PrincipalId> {
    desk.store()
        .read(|dir| dir.principal_by_email(email).map(|p| p.id))?
        .ok_or_else(|| GateError::not_found("user", email))
}

/// Id of the status named `name`.
pub fn status_id(desk: &Desk<MemoryStore>, name: &str) -> GateResult<StatusId> {
    desk.store()
        .read(|dir| dir.status_by_name(name).map(|s| s.id))?
        .ok_or_else(|| GateError::not_found("status", name))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn role(dir: &Directory, name: &str) -> GateResult<RoleId> {
    dir.role_by_name(name)
        .map(|r| r.id)
        .ok_or_else(|| GateError::ConfigurationFault {
            reason: format!("fixtures need role '{name}'; apply the seed first"),
        })
}

fn account(
    dir: &mut Directory,
    report: &mut FixtureReport,
    email: &str,
    role: RoleId,
    is_staff: bool,
) -> GateResult<PrincipalId> {
    let found = dir.principal_by_email(email).cloned();
    if let Some(existing) = found {
        let stock = BTreeSet::from([role]);
        if existing.roles == stock {
            debug!(email = %email, "account exists");
            return Ok(existing.id);
        }
        dir.update_principal(
            existing.id,
            &PrincipalFields {
                email: existing.email.clone(),
                roles: stock,
                is_active: existing.is_active,
                is_staff: existing.is_staff,
            },
        )?;
        info!(email = %email, principal = %existing.id, "account roles reset");
        report.roles_reset += 1;
        return Ok(existing.id);
    }
    let mut fields = PrincipalFields::new(email);
    fields.roles.insert(role);
    fields.is_staff = is_staff;
    let principal = dir.create_principal(&fields)?;
    info!(email = %email, principal = %principal.id, "account created");
    report.principals_created += 1;
    Ok(principal.id)
}

fn group(
    dir: &mut Directory,
    report: &mut FixtureReport,
    name: &str,
    members: BTreeSet<PrincipalId>,
) -> GateResult<()> {
    let found = dir.groups().find(|g| g.name == name).cloned();
    match found {
        Some(existing) if members.is_subset(&existing.members) => {
            debug!(group = %name, "group exists");
        }
        Some(existing) => {
            let members = existing.members.union(&members).copied().collect();
            dir.update_group(
                existing.id,
                &GroupFields {
                    name: existing.name.clone(),
                    members,
                },
            )?;
            info!(group = %name, "group members extended");
        }
        None => {
            dir.create_group(&GroupFields {
                name: name.to_string(),
                members,
            })?;
            info!(group = %name, "group created");
            report.groups_created += 1;
        }
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use ticketgate_contracts::{error::GateError, permission, request::RequestContext};
    use ticketgate_core::directory::Directory;
    use ticketgate_policy::Seed;

    use super::*;

    #[test]
    fn fixtures_need_seeded_roles() {
        let mut dir = Directory::new();
        match apply(&mut dir) {
            Err(GateError::ConfigurationFault { reason }) => assert!(reason.contains("Admin")),
            other => panic!("expected ConfigurationFault, got {:?}", other),
        }
    }

    #[test]
    fn fixtures_are_idempotent() {
        let mut dir = Directory::new();
        Seed::default_seed().unwrap().apply(&mut dir).unwrap();

        let first = apply(&mut dir).unwrap();
        assert_eq!(
            first,
            FixtureReport {
                principals_created: 7,
                roles_reset: 0,
                groups_created: 3,
            }
        );
        let snapshot = dir.clone();
        assert_eq!(apply(&mut dir).unwrap(), FixtureReport::default());
        assert_eq!(dir, snapshot);
    }

    #[test]
    fn rerun_resets_demo_account_roles() {
        let mut dir = Directory::new();
        Seed::default_seed().unwrap().apply(&mut dir).unwrap();
        apply(&mut dir).unwrap();

        let analyst = dir.principal_by_email(&analyst_email(1)).unwrap().clone();
        let analyst_role = role(&dir, "Analyst").unwrap();
        let admin_role = role(&dir, "Admin").unwrap();
        dir.update_principal(
            analyst.id,
            &PrincipalFields {
                email: analyst.email.clone(),
                roles: BTreeSet::from([admin_role, analyst_role]),
                is_active: true,
                is_staff: false,
            },
        )
        .unwrap();

        let report = apply(&mut dir).unwrap();
        assert_eq!(report.roles_reset, 1);
        assert_eq!(report.principals_created, 0);
        assert_eq!(
            dir.principal(analyst.id).unwrap().roles,
            BTreeSet::from([analyst_role])
        );
    }

    #[test]
    fn admin_sits_in_first_customer_group_only() {
        let desk = helpdesk().unwrap();
        let admin = principal_id(&desk, ADMIN_EMAIL).unwrap();
        let groups = desk
            .store()
            .read(|dir| dir.groups_of(admin).map(|g| g.name.clone()).collect::<Vec<_>>())
            .unwrap();
        assert_eq!(groups, vec![customer_group(1)]);
    }

    #[test]
    fn helpdesk_roles_carry_expected_permissions() {
        let desk = helpdesk().unwrap();
        let manager = RequestContext::authenticated(principal_id(&desk, &manager_email(2)).unwrap());
        let analyst = RequestContext::authenticated(principal_id(&desk, &analyst_email(3)).unwrap());

        assert!(desk.has_permission(&manager, permission::EDIT_USERS).unwrap());
        assert!(!desk.has_permission(&manager, permission::DELETE_USERS).unwrap());
        assert_eq!(desk.effective_permissions(&analyst).unwrap().len(), 2);
        assert!(status_id(&desk, "In Review").is_ok());
        assert!(matches!(
            principal_id(&desk, "nobody@example.com"),
            Err(GateError::NotFound { .. })
        ));
    }
}
