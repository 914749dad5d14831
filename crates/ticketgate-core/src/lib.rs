//! # ticketgate-core
//!
//! The authorization engine and guarded entry points for ticketgate.
//!
//! This crate provides:
//! - `Directory`, the in-memory tables of permissions, roles, principals,
//!   groups, statuses, tickets and comments, with validated mutations
//! - `Authorizer`, the pure decision functions (`has_permission`,
//!   `can_access_resource`, `visible_tickets`)
//! - `Visibility`, the ticket listing predicate
//! - The two seams (`Store`, `RoutePolicy`) and the `Desk` that wires them
//!   together in guard order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ticketgate_core::{Desk, traits::{RoutePolicy, Store}};
//!
//! let desk = Desk::new(store, Box::new(routes));
//! let tickets = desk.list_tickets(&RequestContext::authenticated(id))?;
//! ```

pub mod authz;
pub mod desk;
pub mod directory;
pub mod traits;
pub mod visibility;

pub use authz::Authorizer;
pub use desk::Desk;
pub use directory::Directory;
pub use visibility::Visibility;
