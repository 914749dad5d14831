//! The ticket visibility predicate.
//!
//! Listing authorization happens in two explicit steps: compute a
//! `Visibility` for the principal, then apply it to the ticket table. Keeping
//! the predicate as a value means it can be tested without a store and
//! reused by any backend that can evaluate "assigned_user = P OR
//! assigned_group IN (P's groups)".

use std::collections::BTreeSet;

use ticketgate_contracts::{
    ids::{GroupId, PrincipalId},
    ticket::Ticket,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Every ticket, unfiltered. Held by the superuser role.
    All,
    /// Tickets directly assigned to `principal`, or assigned to any group in
    /// `groups` (the groups `principal` is a member of).
    Scoped {
        principal: PrincipalId,
        groups: BTreeSet<GroupId>,
    },
}

impl Visibility {
    /// Direct ownership OR group ownership.
    pub fn admits(&self, ticket: &Ticket) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Scoped { principal, groups } => {
                ticket.assigned_user == Some(*principal)
                    || ticket.assigned_group.is_some_and(|g| groups.contains(&g))
            }
        }
    }

    /// Keep the admitted tickets in one pass.
    ///
    /// Each input ticket is tested once against the whole predicate, so a
    /// ticket that matches both the direct and the group condition is still
    /// returned once, provided the input holds each ticket once.
    pub fn filter<'t, I>(&self, tickets: I) -> Vec<&'t Ticket>
    where
        I: IntoIterator<Item = &'t Ticket>,
    {
        tickets.into_iter().filter(|t| self.admits(t)).collect()
    }
}
