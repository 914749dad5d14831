//! Helpdesk reference scenarios.
//!
//! Each scenario builds a fresh seeded desk from `fixtures::helpdesk`, plays
//! one access pattern through the real desk, route policy and store, and
//! prints what happened. `evaluate` returns the observed outcome so tests can
//! assert on it without parsing output.

pub mod analyst_status;
pub mod direct_owner;
pub mod group_visibility;
