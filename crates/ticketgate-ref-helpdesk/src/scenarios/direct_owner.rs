//! Scenario 2: Direct Owner Without Roles
//!
//! A self-registered principal holds no roles at all. An admin assigns a
//! ticket to it directly.
//!
//! - Ticket detail (ownership-tier)        → allowed
//! - Comment on the ticket (ownership)     → allowed
//! - Delete the ticket (needs delete_tickets) → AuthorizationDenied

use ticketgate_contracts::{
    action::Action,
    error::{GateError, GateResult},
    fields::{CommentFields, Registration, TicketFields},
    request::RequestContext,
};
use ticketgate_core::Desk;
use ticketgate_store::MemoryStore;

use crate::fixtures::{helpdesk, principal_id, status_id, ADMIN_EMAIL};

pub const OWNER_EMAIL: &str = "owner@example.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub view_allowed: bool,
    pub comments_seen: usize,
    pub delete_denied: bool,
    pub ticket_survived: bool,
}

pub fn evaluate(desk: &Desk<MemoryStore>) -> GateResult<Outcome> {
    let admin = RequestContext::authenticated(principal_id(desk, ADMIN_EMAIL)?);
    let owner = desk.register(
        &RequestContext::anonymous(),
        &Registration {
            email: OWNER_EMAIL.into(),
            password_hash: "pbkdf2_sha256$fixture".into(),
        },
    )?;
    let owner_ctx = RequestContext::authenticated(owner.id);

    let ticket = desk.create_ticket(
        &admin,
        &TicketFields {
            name: "Cannot reset password".into(),
            status: Some(status_id(desk, "Pending")?),
            assigned_user: Some(owner.id),
            ..TicketFields::default()
        },
    )?;

    desk.comment_on_ticket(
        &owner_ctx,
        ticket.id,
        &CommentFields { text: "Still failing this morning.".into() },
    )?;
    let detail = desk.view_ticket(&owner_ctx, ticket.id)?;

    let delete_denied = match desk.delete_ticket(&owner_ctx, ticket.id) {
        Err(GateError::AuthorizationDenied { action: Action::DeleteTicket }) => true,
        Err(e) => return Err(e),
        Ok(_) => false,
    };
    let ticket_survived = desk.can_access_ticket(&owner_ctx, ticket.id)?;

    Ok(Outcome {
        view_allowed: detail.ticket.id == ticket.id,
        comments_seen: detail.comments.len(),
        delete_denied,
        ticket_survived,
    })
}

/// Run Scenario 2: Direct Owner Without Roles.
pub fn run_scenario() -> GateResult<()> {
    println!("=== Scenario 2: Direct Owner Without Roles ===");
    println!();
    println!("  Principal:  {OWNER_EMAIL} (self-registered, no roles)");
    println!("  Ticket:     assigned directly to the principal");
    println!();

    let desk = helpdesk()?;
    let outcome = evaluate(&desk)?;

    println!(
        "  View ticket detail (ownership):     {}",
        if outcome.view_allowed { "ALLOWED (expected)" } else { "DENIED (unexpected)" }
    );
    println!("  Comments visible in thread:         {}", outcome.comments_seen);
    println!(
        "  Delete ticket (needs delete_tickets): {}",
        if outcome.delete_denied { "DENIED (expected)" } else { "ALLOWED (unexpected)" }
    );
    println!(
        "  Ticket still present:               {}",
        if outcome.ticket_survived { "yes" } else { "no" }
    );
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_reads_and_comments_but_cannot_delete() {
        let desk = helpdesk().unwrap();
        let outcome = evaluate(&desk).unwrap();

        assert_eq!(
            outcome,
            Outcome {
                view_allowed: true,
                comments_seen: 1,
                delete_denied: true,
                ticket_survived: true,
            }
        );
    }

    #[test]
    fn owner_has_no_effective_permissions() {
        let desk = helpdesk().unwrap();
        evaluate(&desk).unwrap();

        let owner = RequestContext::authenticated(principal_id(&desk, OWNER_EMAIL).unwrap());
        assert!(desk.effective_permissions(&owner).unwrap().is_empty());
        assert_eq!(desk.list_tickets(&owner).unwrap().len(), 1);
    }

    #[test]
    fn scenario_runs() {
        run_scenario().unwrap();
    }
}
