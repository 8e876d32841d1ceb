//! Person domain model.
//!
//! # Responsibility
//! - Define fellow/staff records and their room references.
//! - Compose and validate full names from first/last input.
//!
//! # Invariants
//! - `living_room_id` is only ever set for fellows and points to a living space.
//! - `office_room_id` always points to an office space.
//! - `wants_accommodation` is always `false` for staff.

use crate::model::room::{RoomId, RoomKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Store-assigned person identifier.
pub type PersonId = i64;

/// Person category, deciding which rooms a person may be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonCategory {
    Fellow,
    Staff,
}

impl PersonCategory {
    /// Room kind that counts as this category's primary allocation.
    pub fn primary_room_kind(self) -> RoomKind {
        match self {
            Self::Fellow => RoomKind::LivingSpace,
            Self::Staff => RoomKind::OfficeSpace,
        }
    }

    /// Whether this category may occupy rooms of `kind`.
    pub fn may_occupy(self, kind: RoomKind) -> bool {
        match self {
            Self::Fellow => true,
            Self::Staff => kind == RoomKind::OfficeSpace,
        }
    }

    /// Plural noun used in listings (`fellows`, `staff`).
    pub fn plural(self) -> &'static str {
        match self {
            Self::Fellow => "fellows",
            Self::Staff => "staff",
        }
    }

    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Fellow => "fellow",
            Self::Staff => "staff",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "fellow" => Some(Self::Fellow),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }
}

impl Display for PersonCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// Name validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// First name is blank after trim.
    BlankFirstName,
    /// Last name is blank after trim.
    BlankLastName,
}

impl Display for NameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFirstName => write!(f, "first name must not be blank"),
            Self::BlankLastName => write!(f, "last name must not be blank"),
        }
    }
}

impl Error for NameError {}

/// Joins first and last name into the stored full name.
///
/// Surrounding whitespace is trimmed and inner runs collapse to one space,
/// so `"  John "` + `"Kariuki"` becomes `"John Kariuki"`.
pub fn compose_full_name(first_name: &str, last_name: &str) -> Result<String, NameError> {
    let first = normalize_name_part(first_name).ok_or(NameError::BlankFirstName)?;
    let last = normalize_name_part(last_name).ok_or(NameError::BlankLastName)?;
    Ok(format!("{first} {last}"))
}

fn normalize_name_part(value: &str) -> Option<String> {
    let collapsed = WHITESPACE_RE.replace_all(value.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.into_owned())
    }
}

/// Insert model for a person not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub category: PersonCategory,
    pub wants_accommodation: bool,
}

impl NewPerson {
    pub fn fellow(name: impl Into<String>, wants_accommodation: bool) -> Self {
        Self {
            name: name.into(),
            category: PersonCategory::Fellow,
            wants_accommodation,
        }
    }

    /// Staff never request accommodation.
    pub fn staff(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: PersonCategory::Staff,
            wants_accommodation: false,
        }
    }
}

/// Persisted person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub category: PersonCategory,
    pub wants_accommodation: bool,
    pub living_room_id: Option<RoomId>,
    pub office_room_id: Option<RoomId>,
}

impl Person {
    /// Room reference held in the slot for `kind`.
    pub fn room_for(&self, kind: RoomKind) -> Option<RoomId> {
        match kind {
            RoomKind::LivingSpace => self.living_room_id,
            RoomKind::OfficeSpace => self.office_room_id,
        }
    }

    /// `true` when the category's primary slot is empty.
    pub fn is_unallocated(&self) -> bool {
        self.room_for(self.category.primary_room_kind()).is_none()
    }
}
