//! Entity identifiers.
//!
//! Every persisted entity is keyed by a serial `u64`, the same way a
//! relational table hands out primary keys. Each table gets its own newtype
//! so a `TicketId` can never be passed where a `GroupId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Primary key of a `Permission`.
    PermissionId
);
entity_id!(
    /// Primary key of a `Role`.
    RoleId
);
entity_id!(
    /// Primary key of a `Principal`.
    PrincipalId
);
entity_id!(
    /// Primary key of a `Group`.
    GroupId
);
entity_id!(
    /// Primary key of a ticket `Status`.
    StatusId
);
entity_id!(
    /// Primary key of a `Ticket`.
    TicketId
);
entity_id!(
    /// Primary key of a `Comment`.
    CommentId
);
