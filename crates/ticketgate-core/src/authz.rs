//! The authorization decision engine.
//!
//! `Authorizer` answers the three questions the rest of the system asks:
//!
//! - does principal P hold permission N? (`has_permission`)
//! - may P act on ticket T? (`can_access_resource`)
//! - which tickets may P enumerate? (`visibility` / `visible_tickets`)
//!
//! Every answer is computed from the directory as it is at call time.
//! Nothing is cached, so a role edit is visible to the very next decision.

use std::collections::BTreeSet;

use tracing::debug;

use ticketgate_contracts::{
    permission::PermissionSet,
    role::{Principal, ADMIN_ROLE},
    ticket::Ticket,
};

use crate::{directory::Directory, visibility::Visibility};

/// Pure decision functions over a `Directory` snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorizer {
    superuser_role: String,
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(ADMIN_ROLE)
    }
}

impl Authorizer {
    /// Build an authorizer whose ownership bypass is granted by holding the
    /// role named `superuser_role`.
    pub fn new(superuser_role: impl Into<String>) -> Self {
        Self {
            superuser_role: superuser_role.into(),
        }
    }

    pub fn superuser_role(&self) -> &str {
        &self.superuser_role
    }

    /// True if `principal` holds the superuser role (by name).
    ///
    /// This bypass covers ownership only. It does not grant permissions.
    pub fn is_superuser(&self, dir: &Directory, principal: &Principal) -> bool {
        dir.roles_of(principal)
            .any(|role| role.name == self.superuser_role)
    }

    /// True iff `name` is granted by at least one role `principal` holds.
    ///
    /// Unknown permission names are simply not held by anyone.
    pub fn has_permission(&self, dir: &Directory, principal: &Principal, name: &str) -> bool {
        dir.roles_of(principal).any(|role| {
            role.permissions
                .iter()
                .filter_map(|id| dir.permission(*id))
                .any(|p| p.name == name)
        })
    }

    /// The union of permission names across all of `principal`'s roles.
    pub fn effective_permissions(&self, dir: &Directory, principal: &Principal) -> PermissionSet {
        dir.roles_of(principal)
            .flat_map(|role| role.permissions.iter())
            .filter_map(|id| dir.permission(*id))
            .map(|p| p.name.clone())
            .collect()
    }

    /// Superuser, OR direct owner, OR member of the owner group.
    pub fn can_access_resource(&self, dir: &Directory, principal: &Principal, ticket: &Ticket) -> bool {
        if self.is_superuser(dir, principal) {
            return true;
        }
        if ticket.assigned_user == Some(principal.id) {
            return true;
        }
        ticket
            .assigned_group
            .and_then(|id| dir.group(id))
            .is_some_and(|group| group.has_member(principal.id))
    }

    /// The listing predicate for `principal`.
    pub fn visibility(&self, dir: &Directory, principal: &Principal) -> Visibility {
        if self.is_superuser(dir, principal) {
            return Visibility::All;
        }
        let groups: BTreeSet<_> = dir.groups_of(principal.id).map(|g| g.id).collect();
        debug!(
            principal = %principal.id,
            group_count = groups.len(),
            "scoped ticket visibility"
        );
        Visibility::Scoped {
            principal: principal.id,
            groups,
        }
    }

    /// Tickets `principal` may enumerate, in creation order, each once.
    pub fn visible_tickets<'d>(&self, dir: &'d Directory, principal: &Principal) -> Vec<&'d Ticket> {
        self.visibility(dir, principal).filter(dir.tickets())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use ticketgate_contracts::{
        fields::{GroupFields, PermissionFields, PrincipalFields, RoleFields, StatusFields, TicketFields},
        ids::{GroupId, PrincipalId, RoleId, TicketId},
        role::Principal,
    };

    use crate::{directory::Directory, visibility::Visibility};

    use super::Authorizer;

    // ── Fixture ───────────────────────────────────────────────────────────────

    /// Admin (Admin role), Analyst (change_ticket_status, in no group),
    /// B, C and D in group G (B and C hold no roles), E in nothing.
    struct World {
        dir: Directory,
        admin: PrincipalId,
        analyst: PrincipalId,
        analyst_role: RoleId,
        b: PrincipalId,
        c: PrincipalId,
        d: PrincipalId,
        e: PrincipalId,
        owned_by_b: TicketId,
        owned_by_g: TicketId,
        owned_by_b_and_g: TicketId,
        unowned: TicketId,
    }

    fn world() -> World {
        let mut dir = Directory::new();
        let edit = dir.create_permission(&PermissionFields { name: "edit_tickets".into() }).unwrap();
        let status = dir.create_permission(&PermissionFields { name: "change_ticket_status".into() }).unwrap();
        let admin_role = dir
            .create_role(&RoleFields {
                name: "Admin".into(),
                permissions: BTreeSet::from([edit.id, status.id]),
            })
            .unwrap();
        let analyst_role = dir
            .create_role(&RoleFields {
                name: "Analyst".into(),
                permissions: BTreeSet::from([status.id]),
            })
            .unwrap();

        let with_role = |dir: &mut Directory, email: &str, roles: &[RoleId]| -> PrincipalId {
            let mut fields = PrincipalFields::new(email);
            fields.roles = roles.iter().copied().collect();
            dir.create_principal(&fields).unwrap().id
        };
        let admin = with_role(&mut dir, "admin@example.com", &[admin_role.id]);
        let analyst = with_role(&mut dir, "analyst@example.com", &[analyst_role.id]);
        let b = with_role(&mut dir, "b@example.com", &[]);
        let c = with_role(&mut dir, "c@example.com", &[]);
        let d = with_role(&mut dir, "d@example.com", &[analyst_role.id]);
        let e = with_role(&mut dir, "e@example.com", &[]);

        let g = dir
            .create_group(&GroupFields { name: "G".into(), members: BTreeSet::from([b, c, d]) })
            .unwrap();
        let pending = dir.create_status(&StatusFields { name: "Pending".into() }).unwrap();

        let new_ticket = |dir: &mut Directory,
                          name: &str,
                          user: Option<PrincipalId>,
                          group: Option<GroupId>| {
            dir.create_ticket(
                &TicketFields {
                    name: name.into(),
                    status: Some(pending.id),
                    note: None,
                    assigned_user: user,
                    assigned_group: group,
                },
                Utc::now(),
            )
            .unwrap()
            .id
        };
        let owned_by_b = new_ticket(&mut dir, "direct", Some(b), None);
        let owned_by_g = new_ticket(&mut dir, "group", None, Some(g.id));
        let owned_by_b_and_g = new_ticket(&mut dir, "both", Some(b), Some(g.id));
        let unowned = new_ticket(&mut dir, "nobody", None, None);

        World {
            dir,
            admin,
            analyst,
            analyst_role: analyst_role.id,
            b,
            c,
            d,
            e,
            owned_by_b,
            owned_by_g,
            owned_by_b_and_g,
            unowned,
        }
    }

    impl World {
        fn p(&self, id: PrincipalId) -> &Principal {
            self.dir.principal(id).unwrap()
        }

        fn can(&self, who: PrincipalId, ticket: TicketId) -> bool {
            Authorizer::default().can_access_resource(&self.dir, self.p(who), self.dir.ticket(ticket).unwrap())
        }

        fn visible(&self, who: PrincipalId) -> Vec<TicketId> {
            Authorizer::default()
                .visible_tickets(&self.dir, self.p(who))
                .into_iter()
                .map(|t| t.id)
                .collect()
        }
    }

    // ── has_permission ────────────────────────────────────────────────────────

    #[test]
    fn has_permission_is_union_of_role_permissions() {
        let w = world();
        let authz = Authorizer::default();

        assert!(authz.has_permission(&w.dir, w.p(w.analyst), "change_ticket_status"));
        assert!(!authz.has_permission(&w.dir, w.p(w.analyst), "edit_tickets"));
        assert!(authz.has_permission(&w.dir, w.p(w.admin), "edit_tickets"));

        // No roles => no permissions.
        assert!(!authz.has_permission(&w.dir, w.p(w.b), "change_ticket_status"));
        assert!(authz.effective_permissions(&w.dir, w.p(w.b)).is_empty());
    }

    #[test]
    fn unknown_permission_fails_closed() {
        let w = world();
        assert!(!Authorizer::default().has_permission(&w.dir, w.p(w.admin), "launch_missiles"));
    }

    #[test]
    fn role_edits_apply_to_the_next_decision() {
        let mut w = world();
        let authz = Authorizer::default();
        assert!(authz.has_permission(&w.dir, w.p(w.analyst), "change_ticket_status"));

        w.dir
            .update_role(w.analyst_role, &RoleFields { name: "Analyst".into(), permissions: BTreeSet::new() })
            .unwrap();

        assert!(!authz.has_permission(&w.dir, w.p(w.analyst), "change_ticket_status"));
        assert!(!authz.has_permission(&w.dir, w.p(w.d), "change_ticket_status"));
    }

    #[test]
    fn effective_permissions_lists_names() {
        let w = world();
        let perms = Authorizer::default().effective_permissions(&w.dir, w.p(w.admin));
        let names: Vec<&str> = perms.all().collect();
        assert_eq!(names, vec!["change_ticket_status", "edit_tickets"]);
    }

    // ── can_access_resource ───────────────────────────────────────────────────

    #[test]
    fn admin_role_reaches_every_ticket() {
        let w = world();
        for t in [w.owned_by_b, w.owned_by_g, w.owned_by_b_and_g, w.unowned] {
            assert!(w.can(w.admin, t));
        }
    }

    #[test]
    fn owners_reach_their_tickets() {
        let w = world();
        assert!(w.can(w.b, w.owned_by_b));
        assert!(w.can(w.c, w.owned_by_g));
        assert!(w.can(w.d, w.owned_by_g));
        assert!(w.can(w.c, w.owned_by_b_and_g));
    }

    #[test]
    fn non_owners_are_refused_regardless_of_permissions() {
        let w = world();
        assert!(!w.can(w.e, w.owned_by_b));
        assert!(!w.can(w.e, w.owned_by_g));
        assert!(!w.can(w.c, w.owned_by_b));
        // Holding change_ticket_status grants nothing at the instance level.
        assert!(!w.can(w.analyst, w.owned_by_g));
        assert!(!w.can(w.b, w.unowned));
    }

    #[test]
    fn superuser_is_a_role_name_not_a_permission_set() {
        let w = world();
        // Same permission set as Admin, different name: no bypass.
        let renamed = Authorizer::new("Root");
        let admin = w.p(w.admin);
        assert!(!renamed.is_superuser(&w.dir, admin));
        assert!(!renamed.can_access_resource(&w.dir, admin, w.dir.ticket(w.unowned).unwrap()));
        assert!(Authorizer::default().is_superuser(&w.dir, admin));
    }

    // ── visibility ────────────────────────────────────────────────────────────

    #[test]
    fn admin_sees_all_tickets() {
        let w = world();
        assert_eq!(Authorizer::default().visibility(&w.dir, w.p(w.admin)), Visibility::All);
        assert_eq!(w.visible(w.admin).len(), 4);
    }

    #[test]
    fn visible_tickets_never_repeats_a_ticket() {
        let w = world();
        // b owns "both" directly and through G.
        assert_eq!(w.visible(w.b), vec![w.owned_by_b, w.owned_by_g, w.owned_by_b_and_g]);
    }

    #[test]
    fn group_members_share_visibility() {
        let w = world();
        assert_eq!(w.visible(w.c), vec![w.owned_by_g, w.owned_by_b_and_g]);
        assert_eq!(w.visible(w.d), vec![w.owned_by_g, w.owned_by_b_and_g]);
        assert!(w.visible(w.e).is_empty());
    }

    #[test]
    fn visibility_agrees_with_can_access_resource() {
        let w = world();
        let authz = Authorizer::default();
        for who in [w.admin, w.analyst, w.b, w.c, w.d, w.e] {
            let visible = w.visible(who);
            for ticket in w.dir.tickets() {
                assert_eq!(
                    visible.contains(&ticket.id),
                    authz.can_access_resource(&w.dir, w.p(who), ticket),
                    "principal {who} / ticket {}",
                    ticket.id
                );
            }
        }
    }
}
