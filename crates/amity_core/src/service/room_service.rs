//! Room registry use-case service.
//!
//! # Responsibility
//! - Create living/office spaces in validated, atomic batches.
//! - Report capacity, vacancy and current occupants per room.
//!
//! # Invariants
//! - Room names are trimmed and must not be blank.
//! - A rejected batch leaves the room count unchanged.

use crate::model::room::{Room, RoomKind, RoomOccupancy, RoomVacancy};
use crate::repo::person_repo::PersonRepository;
use crate::repo::room_repo::RoomRepository;
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from room registry operations.
#[derive(Debug)]
pub enum RoomServiceError {
    /// Batch was empty or contained a blank name.
    InvalidRoomName(String),
    /// Name collides with an existing room or repeats within the batch.
    DuplicateRoomName(String),
    /// No room with this name exists.
    RoomNotFound(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for RoomServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoomName(name) => write!(f, "invalid room name: `{name}`"),
            Self::DuplicateRoomName(name) => write!(
                f,
                "duplicate entries: a room already exists with the name {name}"
            ),
            Self::RoomNotFound(name) => write!(f, "no room exists in amity with the name {name}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RoomServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RoomServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateRoomName(name) => Self::DuplicateRoomName(name),
            other => Self::Repo(other),
        }
    }
}

/// Room registry facade over room and person repositories.
pub struct RoomService<R: RoomRepository, P: PersonRepository> {
    rooms: R,
    people: P,
}

impl<R: RoomRepository, P: PersonRepository> RoomService<R, P> {
    pub fn new(rooms: R, people: P) -> Self {
        Self { rooms, people }
    }

    /// Creates one room of `kind` per name, all or nothing.
    ///
    /// Returns the created rooms in submission order.
    pub fn create_rooms<I, S>(&self, names: I, kind: RoomKind) -> Result<Vec<Room>, RoomServiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for name in names {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() {
                return Err(RoomServiceError::InvalidRoomName(name.as_ref().to_string()));
            }
            normalized.push(trimmed.to_string());
        }
        if normalized.is_empty() {
            return Err(RoomServiceError::InvalidRoomName(String::new()));
        }

        self.rooms.create_rooms(&normalized, kind).map_err(Into::into)
    }

    /// Returns the room named `room_name` with its occupants.
    pub fn occupancy(&self, room_name: &str) -> Result<RoomOccupancy, RoomServiceError> {
        let room = self
            .rooms
            .get_room_by_name(room_name.trim())?
            .ok_or_else(|| RoomServiceError::RoomNotFound(room_name.trim().to_string()))?;
        let occupants = self
            .people
            .list_people_by_room(room.id)?
            .into_iter()
            .map(|person| person.name)
            .collect();
        Ok(RoomOccupancy { room, occupants })
    }

    /// Fixed occupant limit for rooms of `kind`.
    pub fn capacity_for(&self, kind: RoomKind) -> u32 {
        kind.capacity()
    }

    /// Lists rooms in creation order, optionally filtered by kind.
    pub fn list_rooms(&self, kind: Option<RoomKind>) -> RepoResult<Vec<Room>> {
        self.rooms.list_rooms(kind)
    }

    /// Every room of `kind` with its current occupant count.
    pub fn vacancies(&self, kind: RoomKind) -> RepoResult<Vec<RoomVacancy>> {
        room_vacancies(&self.rooms, &self.people, kind)
    }
}

/// Counts occupants for every room of `kind`, in creation order.
pub(crate) fn room_vacancies<R, P>(
    rooms: &R,
    people: &P,
    kind: RoomKind,
) -> RepoResult<Vec<RoomVacancy>>
where
    R: RoomRepository + ?Sized,
    P: PersonRepository + ?Sized,
{
    rooms
        .list_rooms_by_type(kind)?
        .into_iter()
        .map(|room| {
            let occupants = people.count_occupants(room.id)?;
            Ok(RoomVacancy { room, occupants })
        })
        .collect()
}
