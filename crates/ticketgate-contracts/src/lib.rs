//! # ticketgate-contracts
//!
//! Shared entity types, field data, and the error taxonomy for the
//! ticketgate authorization layer.
//!
//! All crates in the workspace import from here. No authorization logic
//! lives in this crate, only data definitions and small helpers.

pub mod action;
pub mod error;
pub mod fields;
pub mod ids;
pub mod permission;
pub mod request;
pub mod role;
pub mod ticket;
pub mod validation;
