//! Scenario 3: Group Visibility
//!
//! Group Customer 2 has members {manager2, analyst2}. A ticket is assigned to
//! the group with no direct assignee.
//!
//! - manager2 and analyst2 list it
//! - analyst3 (Customer 3, not the assignee) does not
//! - the admin lists it through the superuser role
//!
//! A second ticket owned both directly by analyst2 and through the group is
//! listed once.

use ticketgate_contracts::{
    error::{GateError, GateResult},
    fields::TicketFields,
    ids::TicketId,
    request::RequestContext,
};
use ticketgate_core::{traits::Store, Desk};
use ticketgate_store::MemoryStore;

use crate::fixtures::{
    analyst_email, customer_group, helpdesk, manager_email, principal_id, status_id, ADMIN_EMAIL,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub group_ticket: TicketId,
    pub doubly_owned: TicketId,
    pub manager_sees: Vec<TicketId>,
    pub analyst_sees: Vec<TicketId>,
    pub outsider_sees: Vec<TicketId>,
    pub admin_sees: Vec<TicketId>,
}

pub fn evaluate(desk: &Desk<MemoryStore>) -> GateResult<Outcome> {
    let admin = RequestContext::authenticated(principal_id(desk, ADMIN_EMAIL)?);
    let manager = RequestContext::authenticated(principal_id(desk, &manager_email(2))?);
    let analyst_id = principal_id(desk, &analyst_email(2))?;
    let analyst = RequestContext::authenticated(analyst_id);
    let outsider = RequestContext::authenticated(principal_id(desk, &analyst_email(3))?);

    let group_name = customer_group(2);
    let group = desk
        .store()
        .read(|dir| dir.groups().find(|g| g.name == group_name).map(|g| g.id))?
        .ok_or_else(|| GateError::not_found("group", &group_name))?;
    let pending = status_id(desk, "Pending")?;

    let group_ticket = desk
        .create_ticket(
            &admin,
            &TicketFields {
                name: "Nightly sync missing rows".into(),
                status: Some(pending),
                assigned_group: Some(group),
                ..TicketFields::default()
            },
        )?
        .id;
    let doubly_owned = desk
        .create_ticket(
            &admin,
            &TicketFields {
                name: "Dashboard widget blank".into(),
                status: Some(pending),
                assigned_user: Some(analyst_id),
                assigned_group: Some(group),
                ..TicketFields::default()
            },
        )?
        .id;

    let ids = |ctx: &RequestContext| -> GateResult<Vec<TicketId>> {
        Ok(desk.list_tickets(ctx)?.into_iter().map(|t| t.id).collect())
    };

    Ok(Outcome {
        group_ticket,
        doubly_owned,
        manager_sees: ids(&manager)?,
        analyst_sees: ids(&analyst)?,
        outsider_sees: ids(&outsider)?,
        admin_sees: ids(&admin)?,
    })
}

/// Run Scenario 3: Group Visibility.
pub fn run_scenario() -> GateResult<()> {
    println!("=== Scenario 3: Group Visibility ===");
    println!();
    println!("  Group:      Customer 2 = {{manager2, analyst2}}");
    println!("  Tickets:    one assigned to the group, one to analyst2 AND the group");
    println!();

    let desk = helpdesk()?;
    let o = evaluate(&desk)?;

    let shows = |seen: &[TicketId]| if seen.contains(&o.group_ticket) { "listed" } else { "hidden" };
    println!("  manager2  (member):       group ticket {}", shows(&o.manager_sees));
    println!(
        "  analyst2  (member+owner): group ticket {}, {} ticket(s) total, no duplicates",
        shows(&o.analyst_sees),
        o.analyst_sees.len()
    );
    println!("  analyst3  (outsider):     group ticket {}", shows(&o.outsider_sees));
    println!("  admin     (superuser):    group ticket {}", shows(&o.admin_sees));
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}
