//! The desk: every guarded entry point of the ticket system.
//!
//! Each call follows the same ordering:
//!
//!   Principal → Tier gate → Instance lookup → Ownership → Validation → Mutation
//!
//! Nothing is read from the target instance, and nothing is written, until
//! the tier gate has passed. For permission-tier actions this means a denial
//! always wins over `NotFound`. Mutations run inside `Store::write`, so any
//! error at any step leaves the stored directory untouched.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use ticketgate_contracts::{
    action::{Action, Tier},
    error::{GateError, GateResult},
    fields::{
        CommentFields, GroupFields, PermissionFields, PrincipalFields, Registration, RoleFields,
        StatusFields, TicketFields, TicketStatusFields,
    },
    ids::{GroupId, PermissionId, PrincipalId, RoleId, StatusId, TicketId},
    permission::{Permission, PermissionSet},
    request::RequestContext,
    role::{Principal, Role},
    ticket::{Comment, Group, Status, Ticket, TicketDetail},
};

use crate::{
    authz::Authorizer,
    directory::Directory,
    traits::{RoutePolicy, Store},
};

/// Guarded access to a `Store`.
///
/// The desk owns the store and the route table, and is the only component
/// that turns a `RequestContext` into a principal. Callers never touch the
/// `Directory` directly for anything that needs authorization.
pub struct Desk<S: Store> {
    store: S,
    routes: Box<dyn RoutePolicy>,
    authorizer: Authorizer,
}

impl<S: Store> Desk<S> {
    /// Build a desk over `store`, guarded by `routes`.
    ///
    /// The superuser role name is taken from the route policy.
    pub fn new(store: S, routes: Box<dyn RoutePolicy>) -> Self {
        let authorizer = Authorizer::new(routes.superuser_role());
        Self { store, routes, authorizer }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Guard ────────────────────────────────────────────────────────────────

    /// Resolve the caller and run the tier gate for `action`.
    ///
    /// Ownership-tier actions pass here for any authenticated principal; the
    /// ownership check itself needs the instance and happens in the action.
    fn admit<'d>(
        &self,
        dir: &'d Directory,
        ctx: &RequestContext,
        action: Action,
    ) -> GateResult<&'d Principal> {
        let principal = resolve(dir, ctx)?;

        match action.tier() {
            Tier::Permission => {
                let Some(required) = self.routes.required_permission(action) else {
                    error!(request_id = %ctx.request_id, action = %action, "no route declares a permission");
                    return Err(GateError::ConfigurationFault {
                        reason: format!("no route for '{action}'"),
                    });
                };
                if dir.permission_by_name(required).is_none() {
                    error!(
                        request_id = %ctx.request_id,
                        action = %action,
                        permission = %required,
                        "route requires an unregistered permission"
                    );
                    return Err(GateError::ConfigurationFault {
                        reason: format!("route '{action}' requires unknown permission '{required}'"),
                    });
                }
                if !self.authorizer.has_permission(dir, principal, required) {
                    warn!(
                        request_id = %ctx.request_id,
                        principal = %principal.id,
                        action = %action,
                        permission = %required,
                        "permission missing"
                    );
                    return Err(GateError::denied(action));
                }
            }
            Tier::Staff => {
                if !principal.is_staff {
                    warn!(
                        request_id = %ctx.request_id,
                        principal = %principal.id,
                        action = %action,
                        "staff flag missing"
                    );
                    return Err(GateError::denied(action));
                }
            }
            Tier::Ownership | Tier::Authenticated | Tier::Open => {}
        }

        debug!(request_id = %ctx.request_id, principal = %principal.id, action = %action, "action admitted");
        Ok(principal)
    }

    /// Ownership check for a single ticket.
    fn ensure_access(
        &self,
        dir: &Directory,
        ctx: &RequestContext,
        principal: &Principal,
        ticket: &Ticket,
        action: Action,
    ) -> GateResult<()> {
        if self.authorizer.can_access_resource(dir, principal, ticket) {
            return Ok(());
        }
        warn!(
            request_id = %ctx.request_id,
            principal = %principal.id,
            action = %action,
            ticket = %ticket.id,
            "ticket not owned by principal"
        );
        Err(GateError::denied(action))
    }

    fn read<R>(&self, f: impl FnOnce(&Directory) -> GateResult<R>) -> GateResult<R> {
        self.store.read(f)?
    }

    // ── Engine questions ─────────────────────────────────────────────────────

    /// Does the caller hold permission `name` through any of its roles?
    pub fn has_permission(&self, ctx: &RequestContext, name: &str) -> GateResult<bool> {
        self.read(|dir| {
            let principal = resolve(dir, ctx)?;
            Ok(self.authorizer.has_permission(dir, principal, name))
        })
    }

    /// May the caller see and comment on ticket `id`?
    pub fn can_access_ticket(&self, ctx: &RequestContext, id: TicketId) -> GateResult<bool> {
        self.read(|dir| {
            let principal = self.admit(dir, ctx, Action::ViewTicket)?;
            let ticket = dir.require_ticket(id)?;
            Ok(self.authorizer.can_access_resource(dir, principal, ticket))
        })
    }

    /// Union of the caller's role permissions.
    pub fn effective_permissions(&self, ctx: &RequestContext) -> GateResult<PermissionSet> {
        self.read(|dir| {
            let principal = resolve(dir, ctx)?;
            Ok(self.authorizer.effective_permissions(dir, principal))
        })
    }

    // ── Tickets ──────────────────────────────────────────────────────────────

    /// Tickets the caller owns directly or through a group. Everything for
    /// the superuser role.
    pub fn list_tickets(&self, ctx: &RequestContext) -> GateResult<Vec<Ticket>> {
        self.read(|dir| {
            let principal = self.admit(dir, ctx, Action::ListTickets)?;
            let visible: Vec<Ticket> = self
                .authorizer
                .visible_tickets(dir, principal)
                .into_iter()
                .cloned()
                .collect();
            debug!(request_id = %ctx.request_id, count = visible.len(), "tickets listed");
            Ok(visible)
        })
    }

    /// A ticket and its comment thread, for owners and the superuser role.
    pub fn view_ticket(&self, ctx: &RequestContext, id: TicketId) -> GateResult<TicketDetail> {
        self.read(|dir| {
            let principal = self.admit(dir, ctx, Action::ViewTicket)?;
            let ticket = dir.require_ticket(id)?;
            self.ensure_access(dir, ctx, principal, ticket, Action::ViewTicket)?;
            Ok(TicketDetail {
                ticket: ticket.clone(),
                comments: dir.comments_on(id).cloned().collect(),
            })
        })
    }

    /// Append a comment authored by the caller. Requires ticket ownership.
    pub fn comment_on_ticket(
        &self,
        ctx: &RequestContext,
        id: TicketId,
        fields: &CommentFields,
    ) -> GateResult<Comment> {
        let comment = self.store.write(|dir| {
            let author = self.admit(dir, ctx, Action::CommentOnTicket)?.id;
            let ticket = dir.require_ticket(id)?;
            let principal = dir.require_principal(author)?;
            self.ensure_access(dir, ctx, principal, ticket, Action::CommentOnTicket)?;
            dir.create_comment(id, author, fields, Utc::now())
        })?;
        info!(request_id = %ctx.request_id, ticket = %id, comment = %comment.id, "comment added");
        Ok(comment)
    }

    pub fn create_ticket(&self, ctx: &RequestContext, fields: &TicketFields) -> GateResult<Ticket> {
        let ticket = self.store.write(|dir| {
            self.admit(dir, ctx, Action::CreateTicket)?;
            dir.create_ticket(fields, Utc::now())
        })?;
        info!(request_id = %ctx.request_id, ticket = %ticket.id, "ticket created");
        Ok(ticket)
    }

    /// Full edit. Permission-gated only: ownership is not consulted.
    pub fn edit_ticket(
        &self,
        ctx: &RequestContext,
        id: TicketId,
        fields: &TicketFields,
    ) -> GateResult<Ticket> {
        let ticket = self.store.write(|dir| {
            self.admit(dir, ctx, Action::EditTicket)?;
            dir.update_ticket(id, fields, Utc::now())
        })?;
        info!(request_id = %ctx.request_id, ticket = %id, "ticket edited");
        Ok(ticket)
    }

    /// Status and note only. Permission-gated only: ownership is not consulted.
    pub fn change_ticket_status(
        &self,
        ctx: &RequestContext,
        id: TicketId,
        fields: &TicketStatusFields,
    ) -> GateResult<Ticket> {
        let ticket = self.store.write(|dir| {
            self.admit(dir, ctx, Action::ChangeTicketStatus)?;
            dir.update_ticket_status(id, fields, Utc::now())
        })?;
        info!(request_id = %ctx.request_id, ticket = %id, status = %ticket.status, "ticket status changed");
        Ok(ticket)
    }

    pub fn delete_ticket(&self, ctx: &RequestContext, id: TicketId) -> GateResult<Ticket> {
        let ticket = self.store.write(|dir| {
            self.admit(dir, ctx, Action::DeleteTicket)?;
            dir.delete_ticket(id)
        })?;
        info!(request_id = %ctx.request_id, ticket = %id, "ticket deleted");
        Ok(ticket)
    }

    // ── Principals ───────────────────────────────────────────────────────────

    /// Self-registration. Open to anonymous callers; the new account holds
    /// no roles.
    pub fn register(&self, ctx: &RequestContext, registration: &Registration) -> GateResult<Principal> {
        let principal = self.store.write(|dir| dir.register_principal(registration))?;
        info!(request_id = %ctx.request_id, principal = %principal.id, "principal registered");
        Ok(principal)
    }

    pub fn list_users(&self, ctx: &RequestContext) -> GateResult<Vec<Principal>> {
        self.read(|dir| {
            self.admit(dir, ctx, Action::ListUsers)?;
            Ok(dir.principals().cloned().collect())
        })
    }

    pub fn view_user(&self, ctx: &RequestContext, id: PrincipalId) -> GateResult<Principal> {
        self.read(|dir| {
            self.admit(dir, ctx, Action::ViewUser)?;
            dir.require_principal(id).cloned()
        })
    }

    pub fn create_user(&self, ctx: &RequestContext, fields: &PrincipalFields) -> GateResult<Principal> {
        let principal = self.store.write(|dir| {
            self.admit(dir, ctx, Action::CreateUser)?;
            dir.create_principal(fields)
        })?;
        info!(request_id = %ctx.request_id, principal = %principal.id, "user created");
        Ok(principal)
    }

    pub fn edit_user(
        &self,
        ctx: &RequestContext,
        id: PrincipalId,
        fields: &PrincipalFields,
    ) -> GateResult<Principal> {
        let principal = self.store.write(|dir| {
            self.admit(dir, ctx, Action::EditUser)?;
            dir.update_principal(id, fields)
        })?;
        info!(request_id = %ctx.request_id, principal = %id, "user edited");
        Ok(principal)
    }

    pub fn delete_user(&self, ctx: &RequestContext, id: PrincipalId) -> GateResult<Principal> {
        let principal = self.store.write(|dir| {
            self.admit(dir, ctx, Action::DeleteUser)?;
            dir.delete_principal(id)
        })?;
        info!(request_id = %ctx.request_id, principal = %id, "user deleted");
        Ok(principal)
    }

    // ── Groups ───────────────────────────────────────────────────────────────

    pub fn list_groups(&self, ctx: &RequestContext) -> GateResult<Vec<Group>> {
        self.read(|dir| {
            self.admit(dir, ctx, Action::ListGroups)?;
            Ok(dir.groups().cloned().collect())
        })
    }

    pub fn view_group(&self, ctx: &RequestContext, id: GroupId) -> GateResult<Group> {
        self.read(|dir| {
            self.admit(dir, ctx, Action::ViewGroup)?;
            dir.require_group(id).cloned()
        })
    }

    pub fn create_group(&self, ctx: &RequestContext, fields: &GroupFields) -> GateResult<Group> {
        let group = self.store.write(|dir| {
            self.admit(dir, ctx, Action::CreateGroup)?;
            dir.create_group(fields)
        })?;
        info!(request_id = %ctx.request_id, group = %group.id, "group created");
        Ok(group)
    }

    pub fn edit_group(&self, ctx: &RequestContext, id: GroupId, fields: &GroupFields) -> GateResult<Group> {
        let group = self.store.write(|dir| {
            self.admit(dir, ctx, Action::EditGroup)?;
            dir.update_group(id, fields)
        })?;
        info!(request_id = %ctx.request_id, group = %id, "group edited");
        Ok(group)
    }

    pub fn delete_group(&self, ctx: &RequestContext, id: GroupId) -> GateResult<Group> {
        let group = self.store.write(|dir| {
            self.admit(dir, ctx, Action::DeleteGroup)?;
            dir.delete_group(id)
        })?;
        info!(request_id = %ctx.request_id, group = %id, "group deleted");
        Ok(group)
    }

    // ── Roles and permissions (staff) ────────────────────────────────────────

    pub fn list_roles(&self, ctx: &RequestContext) -> GateResult<Vec<Role>> {
        self.read(|dir| {
            self.admit(dir, ctx, Action::ListRoles)?;
            Ok(dir.roles().cloned().collect())
        })
    }

    pub fn create_role(&self, ctx: &RequestContext, fields: &RoleFields) -> GateResult<Role> {
        let role = self.store.write(|dir| {
            self.admit(dir, ctx, Action::CreateRole)?;
            dir.create_role(fields)
        })?;
        info!(request_id = %ctx.request_id, role = %role.name, "role created");
        Ok(role)
    }

    pub fn edit_role(&self, ctx: &RequestContext, id: RoleId, fields: &RoleFields) -> GateResult<Role> {
        let role = self.store.write(|dir| {
            self.admit(dir, ctx, Action::EditRole)?;
            dir.update_role(id, fields)
        })?;
        info!(request_id = %ctx.request_id, role = %role.name, "role edited");
        Ok(role)
    }

    /// Delete a role. Principals holding it keep their accounts.
    pub fn delete_role(&self, ctx: &RequestContext, id: RoleId) -> GateResult<Role> {
        let role = self.store.write(|dir| {
            self.admit(dir, ctx, Action::DeleteRole)?;
            dir.delete_role(id)
        })?;
        info!(request_id = %ctx.request_id, role = %role.name, "role deleted");
        Ok(role)
    }

    pub fn list_permissions(&self, ctx: &RequestContext) -> GateResult<Vec<Permission>> {
        self.read(|dir| {
            self.admit(dir, ctx, Action::ListPermissions)?;
            Ok(dir.permissions().cloned().collect())
        })
    }

    pub fn create_permission(
        &self,
        ctx: &RequestContext,
        fields: &PermissionFields,
    ) -> GateResult<Permission> {
        let permission = self.store.write(|dir| {
            self.admit(dir, ctx, Action::CreatePermission)?;
            dir.create_permission(fields)
        })?;
        info!(request_id = %ctx.request_id, permission = %permission.name, "permission created");
        Ok(permission)
    }

    /// Delete a permission. Roles lose it; a route still naming it becomes a
    /// configuration fault on its next use.
    pub fn delete_permission(&self, ctx: &RequestContext, id: PermissionId) -> GateResult<Permission> {
        let permission = self.store.write(|dir| {
            self.admit(dir, ctx, Action::DeletePermission)?;
            dir.delete_permission(id)
        })?;
        info!(request_id = %ctx.request_id, permission = %permission.name, "permission deleted");
        Ok(permission)
    }

    // ── Statuses ─────────────────────────────────────────────────────────────

    pub fn list_statuses(&self, ctx: &RequestContext) -> GateResult<Vec<Status>> {
        self.read(|dir| {
            self.admit(dir, ctx, Action::ListStatuses)?;
            Ok(dir.statuses().cloned().collect())
        })
    }

    pub fn create_status(&self, ctx: &RequestContext, fields: &StatusFields) -> GateResult<Status> {
        let status = self.store.write(|dir| {
            self.admit(dir, ctx, Action::CreateStatus)?;
            dir.create_status(fields)
        })?;
        info!(request_id = %ctx.request_id, status = %status.name, "status created");
        Ok(status)
    }

    /// Delete a status together with every ticket in it.
    pub fn delete_status(&self, ctx: &RequestContext, id: StatusId) -> GateResult<Status> {
        let status = self.store.write(|dir| {
            self.admit(dir, ctx, Action::DeleteStatus)?;
            dir.delete_status(id)
        })?;
        info!(request_id = %ctx.request_id, status = %status.name, "status deleted");
        Ok(status)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// The active principal behind `ctx`.
fn resolve<'d>(dir: &'d Directory, ctx: &RequestContext) -> GateResult<&'d Principal> {
    ctx.principal
        .and_then(|id| dir.principal(id))
        .filter(|p| p.is_active)
        .ok_or_else(|| {
            debug!(request_id = %ctx.request_id, "no active principal");
            GateError::AuthenticationRequired
        })
}

// ── Tests ────────────────────────────────────────────────────────────────────
