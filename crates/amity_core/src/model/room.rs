//! Room domain model.
//!
//! # Responsibility
//! - Define the room record and the two room kinds the facility offers.
//! - Own the fixed per-kind capacity constants.
//!
//! # Invariants
//! - `name` is unique across all rooms regardless of kind.
//! - Capacity depends on kind only, never on the individual room.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned room identifier.
pub type RoomId = i64;

/// Maximum occupants of one living space.
pub const LIVING_SPACE_CAPACITY: u32 = 4;
/// Maximum occupants of one office space.
pub const OFFICE_SPACE_CAPACITY: u32 = 6;

/// Kind of room, which decides who may occupy it and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    /// Residential accommodation for fellows.
    LivingSpace,
    /// Work space for staff and fellows.
    OfficeSpace,
}

impl RoomKind {
    /// Both kinds, in report order.
    pub const ALL: [RoomKind; 2] = [RoomKind::LivingSpace, RoomKind::OfficeSpace];

    /// Returns the fixed occupant limit for this kind.
    pub fn capacity(self) -> u32 {
        match self {
            Self::LivingSpace => LIVING_SPACE_CAPACITY,
            Self::OfficeSpace => OFFICE_SPACE_CAPACITY,
        }
    }

    /// Short lowercase word used in messages (`living`, `office`).
    pub fn word(self) -> &'static str {
        match self {
            Self::LivingSpace => "living",
            Self::OfficeSpace => "office",
        }
    }

    /// Storage tag persisted in `rooms.kind`.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::LivingSpace => "living_space",
            Self::OfficeSpace => "office_space",
        }
    }

    /// Parses a storage tag written by [`RoomKind::as_db_str`].
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "living_space" => Some(Self::LivingSpace),
            "office_space" => Some(Self::OfficeSpace),
            _ => None,
        }
    }
}

impl Display for RoomKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} space", self.word())
    }
}

/// Persisted room record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoomKind,
}

impl Room {
    /// Shortcut for `self.kind.capacity()`.
    pub fn capacity(&self) -> u32 {
        self.kind.capacity()
    }
}

/// A room together with how many people currently occupy it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomVacancy {
    pub room: Room,
    pub occupants: u32,
}

impl RoomVacancy {
    /// Free places left; zero once the room is full.
    pub fn free_places(&self) -> u32 {
        self.room.capacity().saturating_sub(self.occupants)
    }

    /// Whether at least one more person fits.
    pub fn has_vacancy(&self) -> bool {
        self.occupants < self.room.capacity()
    }
}

/// Read model for one room and its occupants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOccupancy {
    pub room: Room,
    /// Occupant full names, in person creation order.
    pub occupants: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::{Room, RoomKind, RoomVacancy};

    #[test]
    fn capacities_are_fixed_per_kind() {
        assert_eq!(RoomKind::LivingSpace.capacity(), 4);
        assert_eq!(RoomKind::OfficeSpace.capacity(), 6);
    }

    #[test]
    fn db_tag_parses_back() {
        for kind in RoomKind::ALL {
            assert_eq!(RoomKind::from_db_str(kind.as_db_str()), Some(kind));
        }
        assert_eq!(RoomKind::from_db_str("L"), None);
    }

    #[test]
    fn vacancy_saturates_at_zero() {
        let vacancy = RoomVacancy {
            room: Room {
                id: 1,
                name: "woodwing".to_string(),
                kind: RoomKind::LivingSpace,
            },
            occupants: 5,
        };
        assert_eq!(vacancy.free_places(), 0);
        assert!(!vacancy.has_vacancy());
    }
}
