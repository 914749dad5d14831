//! # ticketgate-policy
//!
//! TOML configuration for ticketgate: the route table and the bootstrap seed.
//!
//! ## Overview
//!
//! [`TomlRoutePolicy`] implements the
//! [`RoutePolicy`](ticketgate_core::traits::RoutePolicy) trait. Each route
//! names a permission-tier action and the permission it requires. A
//! permission-tier action with no route is never silently allowed: the desk
//! reports it as a configuration fault.
//!
//! [`Seed`] bootstraps a fresh directory with permissions, statuses and roles.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use ticketgate_policy::{Seed, TomlRoutePolicy};
//!
//! let routes = TomlRoutePolicy::from_file(Path::new("policies/default.toml"))?;
//! store.write(|dir| Seed::default_seed()?.apply(dir))?;
//! store.read(|dir| routes.validate_against(dir))??;
//! ```

pub mod engine;
pub mod route;
pub mod seed;

pub use engine::TomlRoutePolicy;
pub use route::{Route, RouteConfig};
pub use seed::{Seed, SeedReport, SeedRole};

// ── Tests ─────────────────────────────────────────────────────────────────────
