//! The two seams between the desk and its collaborators.
//!
//! - `Store`: where the directory lives (memory, a JSON file, ...)
//! - `RoutePolicy`: which permission each permission-tier action requires
//!
//! `Desk` is written against these traits only. Concrete implementations
//! live in `ticketgate-store` and `ticketgate-policy`.

use ticketgate_contracts::{action::Action, error::GateResult, role::ADMIN_ROLE};

use crate::directory::Directory;

/// Persistent home of the `Directory`.
///
/// Implementations must make `write` atomic: the closure sees the current
/// state, and its changes become visible only if it returns `Ok`. An `Err`
/// (a denial, a validation failure, a half-finished cascade) must leave the
/// stored state exactly as it was.
pub trait Store: Send + Sync {
    /// Run `f` against a consistent view of the directory.
    fn read<R>(&self, f: impl FnOnce(&Directory) -> R) -> GateResult<R>;

    /// Run `f` against a staged copy of the directory and commit the copy
    /// only when `f` returns `Ok`.
    fn write<R>(&self, f: impl FnOnce(&mut Directory) -> GateResult<R>) -> GateResult<R>;
}

/// The route table: which permission guards each permission-tier action.
pub trait RoutePolicy: Send + Sync {
    /// Name of the permission `action` requires, or `None` when no route
    /// declares one. A permission-tier action without a route is a
    /// deployment defect, not a denial.
    fn required_permission(&self, action: Action) -> Option<&str>;

    /// Name of the role that bypasses ticket ownership checks.
    fn superuser_role(&self) -> &str {
        ADMIN_ROLE
    }
}
