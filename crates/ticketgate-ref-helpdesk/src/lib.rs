//! # ticketgate-ref-helpdesk
//!
//! Helpdesk reference deployment for the ticketgate authorization layer.
//!
//! Demonstrates three access patterns against the default seed and fixtures:
//!
//! 1. **Analyst status change**: a permission-tier action allowed without
//!    ownership, next to a denied full edit.
//! 2. **Direct owner**: a principal with no roles reads its own ticket but
//!    cannot delete it.
//! 3. **Group visibility**: ticket listing scoped by group membership.
//!
//! All data is in memory and fictional.

pub mod fixtures;
pub mod scenarios;
