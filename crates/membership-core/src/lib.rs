//! Membership Domain Rules
//!
//! Shared leaf crate for the membership-management API: team capacity
//! arithmetic and the field bounds enforced at the API boundary. No I/O
//! happens here; the services and handlers build on these primitives.

pub mod capacity;
pub mod limits;

pub use capacity::{TeamCapacity, DEFAULT_TEAM_CAPACITY};
pub use limits::{
    validate_age, validate_name, ValidationError, AGE_MAX, AGE_MIN, NAME_MAX_LEN, NAME_MIN_LEN,
};
