//! The relational state behind the authorization layer.
//!
//! `Directory` holds every table (permissions, roles, principals, groups,
//! statuses, tickets, comments) and owns the integrity rules between them:
//! field validation, uniqueness, foreign-key existence and the cascade
//! behavior on delete.
//!
//! Every mutating method validates the complete submission before it changes
//! anything, so a `ValidationFailed` or `NotFound` return leaves the tables
//! untouched. Stores add the second half of the guarantee by running each
//! request against a staged copy and committing only on success.
//!
//! The directory performs no authorization. Callers reach it through
//! `Desk`, which gates every action first.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lettre::Address;
use serde::{Deserialize, Serialize};

use ticketgate_contracts::{
    error::{GateError, GateResult},
    fields::{
        CommentFields, GroupFields, PermissionFields, PrincipalFields, Registration, RoleFields,
        StatusFields, TicketFields, TicketStatusFields,
    },
    ids::{CommentId, GroupId, PermissionId, PrincipalId, RoleId, StatusId, TicketId},
    permission::Permission,
    role::{Principal, Role},
    ticket::{Comment, Group, Status, Ticket},
    validation::{ValidationErrors, INVALID_CHOICE, INVALID_EMAIL, REQUIRED},
};

const PERMISSION_NAME_MAX: usize = 50;
const ROLE_NAME_MAX: usize = 50;
const STATUS_NAME_MAX: usize = 50;
const GROUP_NAME_MAX: usize = 100;
const TICKET_NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 254;

/// All persisted tables, keyed by primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    permissions: BTreeMap<PermissionId, Permission>,
    roles: BTreeMap<RoleId, Role>,
    principals: BTreeMap<PrincipalId, Principal>,
    groups: BTreeMap<GroupId, Group>,
    statuses: BTreeMap<StatusId, Status>,
    tickets: BTreeMap<TicketId, Ticket>,
    comments: BTreeMap<CommentId, Comment>,
    /// Last primary key handed out. Keys are never reused.
    last_id: u64,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    pub fn permission(&self, id: PermissionId) -> Option<&Permission> {
        self.permissions.get(&id)
    }

    pub fn permission_by_name(&self, name: &str) -> Option<&Permission> {
        self.permissions.values().find(|p| p.name == name)
    }

    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.values()
    }

    pub fn role(&self, id: RoleId) -> Option<&Role> {
        self.roles.get(&id)
    }

    pub fn role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// The roles `principal` currently holds. Dangling ids are skipped.
    pub fn roles_of<'a>(&'a self, principal: &'a Principal) -> impl Iterator<Item = &'a Role> + 'a {
        principal.roles.iter().filter_map(move |id| self.roles.get(id))
    }

    pub fn principal(&self, id: PrincipalId) -> Option<&Principal> {
        self.principals.get(&id)
    }

    /// Lookup by email. Only the domain part is case-insensitive.
    pub fn principal_by_email(&self, email: &str) -> Option<&Principal> {
        let wanted = normalize_email(email);
        self.principals.values().find(|p| p.email == wanted)
    }

    pub fn principals(&self) -> impl Iterator<Item = &Principal> {
        self.principals.values()
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Groups that list `principal` as a member.
    pub fn groups_of(&self, principal: PrincipalId) -> impl Iterator<Item = &Group> {
        self.groups.values().filter(move |g| g.has_member(principal))
    }

    pub fn status(&self, id: StatusId) -> Option<&Status> {
        self.statuses.get(&id)
    }

    pub fn status_by_name(&self, name: &str) -> Option<&Status> {
        self.statuses.values().find(|s| s.name == name)
    }

    pub fn statuses(&self) -> impl Iterator<Item = &Status> {
        self.statuses.values()
    }

    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.get(&id)
    }

    /// Every ticket, in creation order.
    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }

    /// The comment thread of `ticket`, oldest first.
    pub fn comments_on(&self, ticket: TicketId) -> impl Iterator<Item = &Comment> {
        self.comments.values().filter(move |c| c.ticket == ticket)
    }

    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    pub fn require_permission(&self, id: PermissionId) -> GateResult<&Permission> {
        self.permission(id).ok_or_else(|| GateError::not_found("permission", id))
    }

    pub fn require_role(&self, id: RoleId) -> GateResult<&Role> {
        self.role(id).ok_or_else(|| GateError::not_found("role", id))
    }

    pub fn require_principal(&self, id: PrincipalId) -> GateResult<&Principal> {
        self.principal(id).ok_or_else(|| GateError::not_found("user", id))
    }

    pub fn require_group(&self, id: GroupId) -> GateResult<&Group> {
        self.group(id).ok_or_else(|| GateError::not_found("group", id))
    }

    pub fn require_status(&self, id: StatusId) -> GateResult<&Status> {
        self.status(id).ok_or_else(|| GateError::not_found("status", id))
    }

    pub fn require_ticket(&self, id: TicketId) -> GateResult<&Ticket> {
        self.ticket(id).ok_or_else(|| GateError::not_found("ticket", id))
    }

    // ── Permissions ──────────────────────────────────────────────────────────

    pub fn create_permission(&mut self, fields: &PermissionFields) -> GateResult<Permission> {
        let mut errors = ValidationErrors::new();
        let name = fields.name.trim();
        errors.check_text("name", name, PERMISSION_NAME_MAX);
        if self.permission_by_name(name).is_some() {
            errors.add("name", "Permission with this name already exists.");
        }
        errors.into_result()?;

        let permission = Permission {
            id: PermissionId(self.next_id()),
            name: name.to_string(),
        };
        self.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    /// Remove a permission and detach it from every role that grants it.
    pub fn delete_permission(&mut self, id: PermissionId) -> GateResult<Permission> {
        self.require_permission(id)?;
        for role in self.roles.values_mut() {
            role.permissions.remove(&id);
        }
        self.permissions
            .remove(&id)
            .ok_or_else(|| GateError::not_found("permission", id))
    }

    // ── Roles ────────────────────────────────────────────────────────────────

    pub fn create_role(&mut self, fields: &RoleFields) -> GateResult<Role> {
        self.validate_role(None, fields)?;
        let role = Role {
            id: RoleId(self.next_id()),
            name: fields.name.trim().to_string(),
            permissions: fields.permissions.clone(),
        };
        self.roles.insert(role.id, role.clone());
        Ok(role)
    }

    /// Replace a role's name and permission set. Every principal holding the
    /// role sees the new set on its next decision.
    pub fn update_role(&mut self, id: RoleId, fields: &RoleFields) -> GateResult<Role> {
        self.require_role(id)?;
        self.validate_role(Some(id), fields)?;
        let role = self
            .roles
            .get_mut(&id)
            .ok_or_else(|| GateError::not_found("role", id))?;
        role.name = fields.name.trim().to_string();
        role.permissions = fields.permissions.clone();
        Ok(role.clone())
    }

    /// Remove a role and detach it from every principal holding it.
    pub fn delete_role(&mut self, id: RoleId) -> GateResult<Role> {
        self.require_role(id)?;
        for principal in self.principals.values_mut() {
            principal.roles.remove(&id);
        }
        self.roles
            .remove(&id)
            .ok_or_else(|| GateError::not_found("role", id))
    }

    fn validate_role(&self, existing: Option<RoleId>, fields: &RoleFields) -> GateResult<()> {
        let mut errors = ValidationErrors::new();
        let name = fields.name.trim();
        errors.check_text("name", name, ROLE_NAME_MAX);
        if self
            .role_by_name(name)
            .is_some_and(|other| Some(other.id) != existing)
        {
            errors.add("name", "Role with this name already exists.");
        }
        for id in &fields.permissions {
            if self.permission(*id).is_none() {
                errors.add("permissions", invalid_choice(id));
            }
        }
        errors.into_result()
    }

    // ── Principals ───────────────────────────────────────────────────────────

    pub fn create_principal(&mut self, fields: &PrincipalFields) -> GateResult<Principal> {
        let email = normalize_email(&fields.email);
        let mut errors = ValidationErrors::new();
        self.check_email(&mut errors, None, &email);
        self.check_roles(&mut errors, &fields.roles);
        errors.into_result()?;

        let principal = Principal {
            id: PrincipalId(self.next_id()),
            email,
            password_hash: None,
            is_active: fields.is_active,
            is_staff: fields.is_staff,
            roles: fields.roles.clone(),
        };
        self.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    /// Self-service sign-up: an active, non-staff principal with no roles.
    pub fn register_principal(&mut self, registration: &Registration) -> GateResult<Principal> {
        let email = normalize_email(&registration.email);
        let mut errors = ValidationErrors::new();
        self.check_email(&mut errors, None, &email);
        if registration.password_hash.trim().is_empty() {
            errors.add("password_hash", REQUIRED);
        }
        errors.into_result()?;

        let principal = Principal {
            id: PrincipalId(self.next_id()),
            email,
            password_hash: Some(registration.password_hash.clone()),
            is_active: true,
            is_staff: false,
            roles: BTreeSet::new(),
        };
        self.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    /// Replace a principal's email, roles and flags. The credential is kept.
    pub fn update_principal(
        &mut self,
        id: PrincipalId,
        fields: &PrincipalFields,
    ) -> GateResult<Principal> {
        self.require_principal(id)?;
        let email = normalize_email(&fields.email);
        let mut errors = ValidationErrors::new();
        self.check_email(&mut errors, Some(id), &email);
        self.check_roles(&mut errors, &fields.roles);
        errors.into_result()?;

        let principal = self
            .principals
            .get_mut(&id)
            .ok_or_else(|| GateError::not_found("user", id))?;
        principal.email = email;
        principal.roles = fields.roles.clone();
        principal.is_active = fields.is_active;
        principal.is_staff = fields.is_staff;
        Ok(principal.clone())
    }

    /// Remove a principal.
    ///
    /// The principal leaves every group, tickets it owned directly become
    /// unassigned (the tickets survive), and comments it authored are removed.
    pub fn delete_principal(&mut self, id: PrincipalId) -> GateResult<Principal> {
        self.require_principal(id)?;
        for group in self.groups.values_mut() {
            group.members.remove(&id);
        }
        for ticket in self.tickets.values_mut() {
            if ticket.assigned_user == Some(id) {
                ticket.assigned_user = None;
            }
        }
        self.comments.retain(|_, c| c.author != id);
        self.principals
            .remove(&id)
            .ok_or_else(|| GateError::not_found("user", id))
    }

    fn check_email(&self, errors: &mut ValidationErrors, existing: Option<PrincipalId>, email: &str) {
        if email.is_empty() {
            errors.add("email", REQUIRED);
            return;
        }
        if email.chars().count() > EMAIL_MAX || !is_valid_email(email) {
            errors.add("email", INVALID_EMAIL);
            return;
        }
        if self
            .principal_by_email(email)
            .is_some_and(|other| Some(other.id) != existing)
        {
            errors.add("email", "User with this email already exists.");
        }
    }

    fn check_roles(&self, errors: &mut ValidationErrors, roles: &BTreeSet<RoleId>) {
        for id in roles {
            if self.role(*id).is_none() {
                errors.add("roles", invalid_choice(id));
            }
        }
    }

    // ── Groups ───────────────────────────────────────────────────────────────

    pub fn create_group(&mut self, fields: &GroupFields) -> GateResult<Group> {
        self.validate_group(fields)?;
        let group = Group {
            id: GroupId(self.next_id()),
            name: fields.name.trim().to_string(),
            members: fields.members.clone(),
        };
        self.groups.insert(group.id, group.clone());
        Ok(group)
    }

    pub fn update_group(&mut self, id: GroupId, fields: &GroupFields) -> GateResult<Group> {
        self.require_group(id)?;
        self.validate_group(fields)?;
        let group = self
            .groups
            .get_mut(&id)
            .ok_or_else(|| GateError::not_found("group", id))?;
        group.name = fields.name.trim().to_string();
        group.members = fields.members.clone();
        Ok(group.clone())
    }

    /// Remove a group. Tickets it owned lose their group reference but are
    /// otherwise untouched.
    pub fn delete_group(&mut self, id: GroupId) -> GateResult<Group> {
        self.require_group(id)?;
        for ticket in self.tickets.values_mut() {
            if ticket.assigned_group == Some(id) {
                ticket.assigned_group = None;
            }
        }
        self.groups
            .remove(&id)
            .ok_or_else(|| GateError::not_found("group", id))
    }

    fn validate_group(&self, fields: &GroupFields) -> GateResult<()> {
        let mut errors = ValidationErrors::new();
        errors.check_text("name", &fields.name, GROUP_NAME_MAX);
        for id in &fields.members {
            if self.principal(*id).is_none() {
                errors.add("members", invalid_choice(id));
            }
        }
        errors.into_result()
    }

    // ── Statuses ─────────────────────────────────────────────────────────────

    pub fn create_status(&mut self, fields: &StatusFields) -> GateResult<Status> {
        let mut errors = ValidationErrors::new();
        let name = fields.name.trim();
        errors.check_text("name", name, STATUS_NAME_MAX);
        if self.status_by_name(name).is_some() {
            errors.add("name", "Status with this name already exists.");
        }
        errors.into_result()?;

        let status = Status {
            id: StatusId(self.next_id()),
            name: name.to_string(),
        };
        self.statuses.insert(status.id, status.clone());
        Ok(status)
    }

    /// Remove a status together with every ticket in it (and their comments).
    pub fn delete_status(&mut self, id: StatusId) -> GateResult<Status> {
        self.require_status(id)?;
        let doomed: BTreeSet<TicketId> = self
            .tickets
            .values()
            .filter(|t| t.status == id)
            .map(|t| t.id)
            .collect();
        self.tickets.retain(|tid, _| !doomed.contains(tid));
        self.comments.retain(|_, c| !doomed.contains(&c.ticket));
        self.statuses
            .remove(&id)
            .ok_or_else(|| GateError::not_found("status", id))
    }

    // ── Tickets ──────────────────────────────────────────────────────────────

    pub fn create_ticket(&mut self, fields: &TicketFields, now: DateTime<Utc>) -> GateResult<Ticket> {
        let status = self.validate_ticket(fields)?;
        let ticket = Ticket {
            id: TicketId(self.next_id()),
            name: fields.name.trim().to_string(),
            status,
            note: clean_note(fields.note.as_deref()),
            assigned_user: fields.assigned_user,
            assigned_group: fields.assigned_group,
            created_at: now,
            updated_at: now,
        };
        self.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    /// Full-field edit: name, status, note and both ownership references.
    pub fn update_ticket(
        &mut self,
        id: TicketId,
        fields: &TicketFields,
        now: DateTime<Utc>,
    ) -> GateResult<Ticket> {
        self.require_ticket(id)?;
        let status = self.validate_ticket(fields)?;
        let ticket = self
            .tickets
            .get_mut(&id)
            .ok_or_else(|| GateError::not_found("ticket", id))?;
        ticket.name = fields.name.trim().to_string();
        ticket.status = status;
        ticket.note = clean_note(fields.note.as_deref());
        ticket.assigned_user = fields.assigned_user;
        ticket.assigned_group = fields.assigned_group;
        ticket.updated_at = now;
        Ok(ticket.clone())
    }

    /// Status-only edit: status and note. Ownership is never touched here.
    pub fn update_ticket_status(
        &mut self,
        id: TicketId,
        fields: &TicketStatusFields,
        now: DateTime<Utc>,
    ) -> GateResult<Ticket> {
        self.require_ticket(id)?;
        let mut errors = ValidationErrors::new();
        let status = self.check_status(&mut errors, fields.status);
        errors.into_result()?;
        let status = status.ok_or_else(|| GateError::not_found("status", "none"))?;

        let ticket = self
            .tickets
            .get_mut(&id)
            .ok_or_else(|| GateError::not_found("ticket", id))?;
        ticket.status = status;
        ticket.note = clean_note(fields.note.as_deref());
        ticket.updated_at = now;
        Ok(ticket.clone())
    }

    /// Hard-delete a ticket and its comment thread.
    pub fn delete_ticket(&mut self, id: TicketId) -> GateResult<Ticket> {
        self.require_ticket(id)?;
        self.comments.retain(|_, c| c.ticket != id);
        self.tickets
            .remove(&id)
            .ok_or_else(|| GateError::not_found("ticket", id))
    }

    /// Returns the validated status id.
    fn validate_ticket(&self, fields: &TicketFields) -> GateResult<StatusId> {
        let mut errors = ValidationErrors::new();
        errors.check_text("name", &fields.name, TICKET_NAME_MAX);
        let status = self.check_status(&mut errors, fields.status);
        if let Some(user) = fields.assigned_user {
            if self.principal(user).is_none() {
                errors.add("assigned_user", invalid_choice(user));
            }
        }
        if let Some(group) = fields.assigned_group {
            if self.group(group).is_none() {
                errors.add("assigned_group", invalid_choice(group));
            }
        }
        errors.into_result()?;
        status.ok_or_else(|| GateError::not_found("status", "none"))
    }

    fn check_status(&self, errors: &mut ValidationErrors, status: Option<StatusId>) -> Option<StatusId> {
        match status {
            None => {
                errors.add("status", REQUIRED);
                None
            }
            Some(id) if self.status(id).is_none() => {
                errors.add("status", invalid_choice(id));
                None
            }
            Some(id) => Some(id),
        }
    }

    // ── Comments ─────────────────────────────────────────────────────────────

    /// Append a comment to a ticket's thread.
    pub fn create_comment(
        &mut self,
        ticket: TicketId,
        author: PrincipalId,
        fields: &CommentFields,
        now: DateTime<Utc>,
    ) -> GateResult<Comment> {
        self.require_ticket(ticket)?;
        self.require_principal(author)?;
        let mut errors = ValidationErrors::new();
        if fields.text.trim().is_empty() {
            errors.add("text", REQUIRED);
        }
        errors.into_result()?;

        let comment = Comment {
            id: CommentId(self.next_id()),
            ticket,
            author,
            text: fields.text.clone(),
            created_at: now,
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn invalid_choice(id: impl std::fmt::Display) -> String {
    format!("{INVALID_CHOICE} ({id})")
}

fn clean_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Trim and lowercase the domain part. The local part is kept as typed.
pub fn normalize_email(raw: &str) -> String {
    let email = raw.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// A bare `user@domain` address. Hostname labels may not start or end with a
/// hyphen, and the domain needs a dot unless it is `localhost`.
fn is_valid_email(email: &str) -> bool {
    let Ok(address) = Address::from_str(email) else {
        return false;
    };
    let domain = address.domain();
    if domain == "localhost" {
        return true;
    }
    domain.contains('.')
        && domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;

    use ticketgate_contracts::{
        error::GateError,
        fields::{
            CommentFields, GroupFields, PermissionFields, PrincipalFields, Registration,
            RoleFields, StatusFields, TicketFields, TicketStatusFields,
        },
        ids::{PrincipalId, StatusId, TicketId},
        validation::REQUIRED,
    };

    use super::{normalize_email, Directory};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn expect_invalid<T: std::fmt::Debug>(result: Result<T, GateError>, field: &str) {
        match result {
            Err(GateError::ValidationFailed(errors)) => {
                assert!(errors.has(field), "expected error on '{field}', got: {errors}");
            }
            other => panic!("expected ValidationFailed on '{field}', got {:?}", other),
        }
    }

    fn status(dir: &mut Directory, name: &str) -> StatusId {
        dir.create_status(&StatusFields { name: name.to_string() }).unwrap().id
    }

    fn user(dir: &mut Directory, email: &str) -> PrincipalId {
        dir.create_principal(&PrincipalFields::new(email)).unwrap().id
    }

    fn ticket(dir: &mut Directory, name: &str, status: StatusId) -> TicketId {
        dir.create_ticket(
            &TicketFields {
                name: name.to_string(),
                status: Some(status),
                ..TicketFields::default()
            },
            Utc::now(),
        )
        .unwrap()
        .id
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn permission_names_are_unique_and_required() {
        let mut dir = Directory::new();
        dir.create_permission(&PermissionFields { name: "edit_tickets".into() }).unwrap();

        expect_invalid(
            dir.create_permission(&PermissionFields { name: "edit_tickets".into() }),
            "name",
        );
        expect_invalid(dir.create_permission(&PermissionFields { name: "  ".into() }), "name");
        expect_invalid(
            dir.create_permission(&PermissionFields { name: "x".repeat(51) }),
            "name",
        );
        assert_eq!(dir.permissions().count(), 1);
    }

    #[test]
    fn role_rejects_unknown_permission_without_saving() {
        let mut dir = Directory::new();
        let fields = RoleFields {
            name: "Analyst".into(),
            permissions: BTreeSet::from([ticketgate_contracts::ids::PermissionId(999)]),
        };
        expect_invalid(dir.create_role(&fields), "permissions");
        assert_eq!(dir.roles().count(), 0);
    }

    #[test]
    fn role_rename_keeps_own_name_available() {
        let mut dir = Directory::new();
        let role = dir
            .create_role(&RoleFields { name: "Manager".into(), permissions: BTreeSet::new() })
            .unwrap();
        dir.create_role(&RoleFields { name: "Analyst".into(), permissions: BTreeSet::new() })
            .unwrap();

        // Saving under its own name is fine; taking another role's is not.
        dir.update_role(role.id, &RoleFields { name: "Manager".into(), permissions: BTreeSet::new() })
            .unwrap();
        expect_invalid(
            dir.update_role(role.id, &RoleFields { name: "Analyst".into(), permissions: BTreeSet::new() }),
            "name",
        );
    }

    #[test]
    fn principal_email_is_normalized_validated_and_unique() {
        let mut dir = Directory::new();
        let p = dir.create_principal(&PrincipalFields::new(" Ana@Example.COM ")).unwrap();
        assert_eq!(p.email, "Ana@example.com");
        assert_eq!(normalize_email("bob@EXAMPLE.com"), "bob@example.com");

        expect_invalid(dir.create_principal(&PrincipalFields::new("not-an-email")), "email");
        expect_invalid(dir.create_principal(&PrincipalFields::new("a b@example.com")), "email");
        expect_invalid(dir.create_principal(&PrincipalFields::new("")), "email");
        assert!(dir.principal_by_email("Ana@EXAMPLE.com").is_some());
        assert!(dir.principal_by_email("ANA@example.com").is_none());
    }

    #[test]
    fn email_uniqueness_ignores_case_only_in_the_domain() {
        let mut dir = Directory::new();
        let lower = user(&mut dir, "ana@example.com");
        let upper = user(&mut dir, "Ana@example.com");
        assert_ne!(lower, upper);

        expect_invalid(dir.create_principal(&PrincipalFields::new("ana@EXAMPLE.com")), "email");
        assert_eq!(dir.principal_by_email("ana@Example.Com").map(|p| p.id), Some(lower));
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        let mut dir = Directory::new();
        for bad in [
            "a..b@example.com",
            "a@-example-.com",
            "a(b)@example.com",
            ".a@example.com",
            "a,b@example.com",
            "a@example",
            "a@example..com",
            "Ana <a@example.com>",
        ] {
            expect_invalid(dir.create_principal(&PrincipalFields::new(bad)), "email");
        }
        assert_eq!(dir.principals().count(), 0);

        user(&mut dir, "first.last+tag@mail.example.com");
    }

    #[test]
    fn registration_requires_a_credential() {
        let mut dir = Directory::new();
        expect_invalid(
            dir.register_principal(&Registration {
                email: "new@example.com".into(),
                password_hash: "".into(),
            }),
            "password_hash",
        );

        let p = dir
            .register_principal(&Registration {
                email: "new@example.com".into(),
                password_hash: "argon2$abc".into(),
            })
            .unwrap();
        assert!(p.roles.is_empty());
        assert!(p.is_active);
        assert!(!p.is_staff);
        assert_eq!(p.password_hash.as_deref(), Some("argon2$abc"));
    }

    #[test]
    fn ticket_collects_every_field_error_at_once() {
        let mut dir = Directory::new();
        let fields = TicketFields {
            name: "".into(),
            status: None,
            note: None,
            assigned_user: Some(PrincipalId(404)),
            assigned_group: Some(ticketgate_contracts::ids::GroupId(405)),
        };
        match dir.create_ticket(&fields, Utc::now()) {
            Err(GateError::ValidationFailed(errors)) => {
                assert_eq!(errors.messages("name"), &[REQUIRED.to_string()]);
                assert_eq!(errors.messages("status"), &[REQUIRED.to_string()]);
                assert!(errors.has("assigned_user"));
                assert!(errors.has("assigned_group"));
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
        assert_eq!(dir.tickets().count(), 0);
    }

    #[test]
    fn status_change_touches_status_and_note_only() {
        let mut dir = Directory::new();
        let pending = status(&mut dir, "Pending");
        let closed = status(&mut dir, "Closed");
        let owner = user(&mut dir, "owner@example.com");
        let created = dir
            .create_ticket(
                &TicketFields {
                    name: "Printer on fire".into(),
                    status: Some(pending),
                    note: None,
                    assigned_user: Some(owner),
                    assigned_group: None,
                },
                Utc::now(),
            )
            .unwrap();

        let later = created.created_at + chrono::Duration::seconds(5);
        let updated = dir
            .update_ticket_status(
                created.id,
                &TicketStatusFields { status: Some(closed), note: Some("resolved".into()) },
                later,
            )
            .unwrap();

        assert_eq!(updated.status, closed);
        assert_eq!(updated.note.as_deref(), Some("resolved"));
        assert_eq!(updated.assigned_user, Some(owner));
        assert_eq!(updated.name, "Printer on fire");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.updated_at, later);

        expect_invalid(
            dir.update_ticket_status(created.id, &TicketStatusFields { status: None, note: None }, later),
            "status",
        );
    }

    #[test]
    fn blank_comment_is_rejected() {
        let mut dir = Directory::new();
        let s = status(&mut dir, "Pending");
        let t = ticket(&mut dir, "T", s);
        let author = user(&mut dir, "a@example.com");
        expect_invalid(
            dir.create_comment(t, author, &CommentFields { text: "   ".into() }, Utc::now()),
            "text",
        );
        assert_eq!(dir.comment_count(), 0);
    }

    #[test]
    fn missing_targets_are_not_found() {
        let mut dir = Directory::new();
        assert!(matches!(
            dir.delete_ticket(TicketId(1)),
            Err(GateError::NotFound { entity: "ticket", .. })
        ));
        assert!(matches!(
            dir.delete_principal(PrincipalId(1)),
            Err(GateError::NotFound { entity: "user", .. })
        ));
    }

    // ── Cascades ──────────────────────────────────────────────────────────────

    #[test]
    fn deleting_a_permission_detaches_it_from_roles() {
        let mut dir = Directory::new();
        let edit = dir.create_permission(&PermissionFields { name: "edit_tickets".into() }).unwrap();
        let view = dir.create_permission(&PermissionFields { name: "view_tickets".into() }).unwrap();
        let role = dir
            .create_role(&RoleFields {
                name: "Manager".into(),
                permissions: BTreeSet::from([edit.id, view.id]),
            })
            .unwrap();

        dir.delete_permission(edit.id).unwrap();

        let role = dir.role(role.id).unwrap();
        assert_eq!(role.permissions, BTreeSet::from([view.id]));
        assert!(dir.permission_by_name("edit_tickets").is_none());
    }

    #[test]
    fn deleting_a_role_detaches_it_from_principals() {
        let mut dir = Directory::new();
        let analyst = dir
            .create_role(&RoleFields { name: "Analyst".into(), permissions: BTreeSet::new() })
            .unwrap();
        let mut fields = PrincipalFields::new("a@example.com");
        fields.roles.insert(analyst.id);
        let a = dir.create_principal(&fields).unwrap();
        fields.email = "b@example.com".into();
        let b = dir.create_principal(&fields).unwrap();

        dir.delete_role(analyst.id).unwrap();

        assert!(dir.principal(a.id).unwrap().roles.is_empty());
        assert!(dir.principal(b.id).unwrap().roles.is_empty());
        assert_eq!(dir.principals().count(), 2);
    }

    #[test]
    fn deleting_a_group_unassigns_its_tickets() {
        let mut dir = Directory::new();
        let s = status(&mut dir, "Pending");
        let member = user(&mut dir, "m@example.com");
        let group = dir
            .create_group(&GroupFields {
                name: "Customer 1".into(),
                members: BTreeSet::from([member]),
            })
            .unwrap();
        let t = dir
            .create_ticket(
                &TicketFields {
                    name: "T".into(),
                    status: Some(s),
                    assigned_group: Some(group.id),
                    ..TicketFields::default()
                },
                Utc::now(),
            )
            .unwrap();

        dir.delete_group(group.id).unwrap();

        let t = dir.ticket(t.id).expect("ticket must survive its group");
        assert_eq!(t.assigned_group, None);
        assert!(dir.principal(member).is_some());
    }

    #[test]
    fn deleting_a_principal_unassigns_tickets_and_leaves_groups() {
        let mut dir = Directory::new();
        let s = status(&mut dir, "Pending");
        let owner = user(&mut dir, "owner@example.com");
        let other = user(&mut dir, "other@example.com");
        let group = dir
            .create_group(&GroupFields {
                name: "Customer 2".into(),
                members: BTreeSet::from([owner, other]),
            })
            .unwrap();
        let t = dir
            .create_ticket(
                &TicketFields {
                    name: "T".into(),
                    status: Some(s),
                    assigned_user: Some(owner),
                    ..TicketFields::default()
                },
                Utc::now(),
            )
            .unwrap();
        dir.create_comment(t.id, owner, &CommentFields { text: "mine".into() }, Utc::now())
            .unwrap();
        dir.create_comment(t.id, other, &CommentFields { text: "theirs".into() }, Utc::now())
            .unwrap();

        dir.delete_principal(owner).unwrap();

        assert_eq!(dir.ticket(t.id).unwrap().assigned_user, None);
        assert_eq!(dir.group(group.id).unwrap().members, BTreeSet::from([other]));
        let thread: Vec<&str> = dir.comments_on(t.id).map(|c| c.text.as_str()).collect();
        assert_eq!(thread, vec!["theirs"]);
    }

    #[test]
    fn deleting_a_ticket_removes_its_thread() {
        let mut dir = Directory::new();
        let s = status(&mut dir, "Pending");
        let author = user(&mut dir, "a@example.com");
        let keep = ticket(&mut dir, "keep", s);
        let gone = ticket(&mut dir, "gone", s);
        dir.create_comment(keep, author, &CommentFields { text: "k".into() }, Utc::now()).unwrap();
        dir.create_comment(gone, author, &CommentFields { text: "d".into() }, Utc::now()).unwrap();

        dir.delete_ticket(gone).unwrap();

        assert_eq!(dir.comment_count(), 1);
        assert_eq!(dir.comments_on(keep).count(), 1);
    }

    #[test]
    fn deleting_a_status_removes_its_tickets() {
        let mut dir = Directory::new();
        let pending = status(&mut dir, "Pending");
        let closed = status(&mut dir, "Closed");
        let author = user(&mut dir, "a@example.com");
        let open_ticket = ticket(&mut dir, "open", pending);
        let closed_ticket = ticket(&mut dir, "done", closed);
        dir.create_comment(closed_ticket, author, &CommentFields { text: "x".into() }, Utc::now())
            .unwrap();

        dir.delete_status(closed).unwrap();

        assert!(dir.ticket(open_ticket).is_some());
        assert!(dir.ticket(closed_ticket).is_none());
        assert_eq!(dir.comment_count(), 0);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut dir = Directory::new();
        let s = status(&mut dir, "Pending");
        let first = ticket(&mut dir, "a", s);
        dir.delete_ticket(first).unwrap();
        let second = ticket(&mut dir, "b", s);
        assert!(second > first);
    }
}
