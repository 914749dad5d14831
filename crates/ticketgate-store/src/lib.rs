//! # ticketgate-store
//!
//! `Store` implementations for the ticketgate directory.
//!
//! - [`MemoryStore`]: the directory in a shared mutex, nothing persisted
//! - [`JsonFileStore`]: one JSON document on disk, replaced atomically on
//!   every committed write
//!
//! Both run each write on a staged copy and commit it only when the closure
//! returns `Ok`.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
