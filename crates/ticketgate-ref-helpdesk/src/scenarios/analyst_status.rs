//! Scenario 1: Analyst Status Change
//!
//! The Analyst role holds `change_ticket_status` but not `edit_tickets`.
//! analyst2 works for Customer 2 and is neither the assignee nor a member of
//! the assigned group of a Customer 1 ticket.
//!
//! - Full edit of that ticket         → AuthorizationDenied
//! - Status change on the same ticket → allowed, persisted
//!
//! Both actions are permission-tier: ownership plays no part in either.

use ticketgate_contracts::{
    action::Action,
    error::{GateError, GateResult},
    fields::{TicketFields, TicketStatusFields},
    ids::StatusId,
    request::RequestContext,
};
use ticketgate_core::{traits::Store, Desk};
use ticketgate_store::MemoryStore;

use crate::fixtures::{analyst_email, helpdesk, principal_id, status_id, ADMIN_EMAIL};

/// What the scenario observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub edit_denied: bool,
    pub status_changed: bool,
    /// Status read back from the store after the change.
    pub stored_status: StatusId,
    pub in_review: StatusId,
}

/// Play the scenario against `desk`.
pub fn evaluate(desk: &Desk<MemoryStore>) -> GateResult<Outcome> {
    let admin = RequestContext::authenticated(principal_id(desk, ADMIN_EMAIL)?);
    let analyst = RequestContext::authenticated(principal_id(desk, &analyst_email(2))?);
    let pending = status_id(desk, "Pending")?;
    let in_review = status_id(desk, "In Review")?;
    let customer_one = desk
        .store()
        .read(|dir| dir.groups().find(|g| g.name == "Customer 1").map(|g| g.id))?;

    let ticket = desk.create_ticket(
        &admin,
        &TicketFields {
            name: "Invoices export times out".into(),
            status: Some(pending),
            note: None,
            assigned_user: None,
            assigned_group: customer_one,
        },
    )?;

    let edit_denied = match desk.edit_ticket(
        &analyst,
        ticket.id,
        &TicketFields {
            name: "Invoices export (analyst rename)".into(),
            status: Some(in_review),
            ..TicketFields::default()
        },
    ) {
        Err(GateError::AuthorizationDenied { action: Action::EditTicket }) => true,
        Err(e) => return Err(e),
        Ok(_) => false,
    };

    let changed = desk.change_ticket_status(
        &analyst,
        ticket.id,
        &TicketStatusFields {
            status: Some(in_review),
            note: Some("reproduced, escalating".into()),
        },
    )?;

    let stored_status = desk.view_ticket(&admin, ticket.id)?.ticket.status;

    Ok(Outcome {
        edit_denied,
        status_changed: changed.status == in_review,
        stored_status,
        in_review,
    })
}

/// Run Scenario 1: Analyst Status Change.
pub fn run_scenario() -> GateResult<()> {
    println!("=== Scenario 1: Analyst Status Change ===");
    println!();
    println!("  Principal:  analyst2@example.com (role Analyst, group Customer 2)");
    println!("  Ticket:     assigned to group Customer 1, no direct assignee");
    println!();

    let desk = helpdesk()?;
    let outcome = evaluate(&desk)?;

    println!(
        "  Edit ticket (needs edit_tickets):            {}",
        if outcome.edit_denied { "DENIED (expected)" } else { "ALLOWED (unexpected)" }
    );
    println!(
        "  Change status (needs change_ticket_status):  {}",
        if outcome.status_changed { "ALLOWED (expected)" } else { "NOT APPLIED (unexpected)" }
    );
    println!(
        "  Stored status:                               {}",
        if outcome.stored_status == outcome.in_review { "In Review" } else { "unchanged" }
    );
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}
