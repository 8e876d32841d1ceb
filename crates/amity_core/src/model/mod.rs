//! Domain model for rooms and the people allocated to them.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Hold the fixed capacity rules for each room kind.
//!
//! # Invariants
//! - Identifiers are assigned by storage and never reused.
//! - Rooms and people are never deleted by core code.

pub mod person;
pub mod room;
