//! Reallocation use-case service.
//!
//! # Responsibility
//! - Move a fellow or staff member into a named room.
//! - List people still waiting for their primary room.
//!
//! # Invariants
//! - Validation order is person, room, no-op, capacity; the first failing
//!   check decides the error.
//! - Staff are only ever moved into office spaces.
//! - A move never pushes a room past its kind's capacity.

use crate::model::person::{Person, PersonCategory, PersonId};
use crate::model::room::RoomKind;
use crate::repo::person_repo::PersonRepository;
use crate::repo::room_repo::RoomRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::allocation_service::placement_message;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from reallocation operations.
#[derive(Debug)]
pub enum ReallocationError {
    /// No person with this id belongs to `category`.
    PersonNotFound { category: PersonCategory, id: PersonId },
    /// No room of `kind` carries this name.
    InvalidRoom { name: String, kind: RoomKind },
    /// The person already occupies the target room.
    AlreadyInRoom { person: String, room: String },
    /// The target room reached its capacity.
    RoomFull(String),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ReallocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound { category, id } => {
                write!(f, "no {category} by the provided id {id}")
            }
            Self::InvalidRoom { kind, .. } => write!(f, "no {kind} by that name"),
            Self::AlreadyInRoom { person, room } => write!(f, "{person} already belongs in {room}"),
            Self::RoomFull(room) => write!(f, "{room} is fully occupied"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReallocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReallocationError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Reallocation engine over room/person repositories.
pub struct ReallocationService<R: RoomRepository, P: PersonRepository> {
    rooms: R,
    people: P,
}

impl<R: RoomRepository, P: PersonRepository> ReallocationService<R, P> {
    pub fn new(rooms: R, people: P) -> Self {
        Self { rooms, people }
    }

    /// Moves a person into `new_room_name`.
    ///
    /// Fellows are moved between living spaces, staff between offices.
    /// Returns the confirmation message on success.
    pub fn reallocate(
        &self,
        category: PersonCategory,
        person_id: PersonId,
        new_room_name: &str,
    ) -> Result<String, ReallocationError> {
        self.move_person(
            category,
            person_id,
            new_room_name,
            category.primary_room_kind(),
        )
    }

    /// Moves a person into the office space `new_room_name`.
    ///
    /// This is the only path that changes a fellow's office.
    pub fn reallocate_office(
        &self,
        category: PersonCategory,
        person_id: PersonId,
        new_room_name: &str,
    ) -> Result<String, ReallocationError> {
        self.move_person(category, person_id, new_room_name, RoomKind::OfficeSpace)
    }

    /// People of `category` without a primary room, in creation order.
    ///
    /// Fellows who declined accommodation are included.
    pub fn unallocated_people(&self, category: PersonCategory) -> RepoResult<Vec<Person>> {
        self.people.list_unallocated(category)
    }

    fn move_person(
        &self,
        category: PersonCategory,
        person_id: PersonId,
        new_room_name: &str,
        kind: RoomKind,
    ) -> Result<String, ReallocationError> {
        let person = self
            .people
            .get_person(person_id)?
            .filter(|person| person.category == category)
            .ok_or(ReallocationError::PersonNotFound {
                category,
                id: person_id,
            })?;

        let target_name = new_room_name.trim();
        let room = self
            .rooms
            .get_room_by_name(target_name)?
            .filter(|room| room.kind == kind && category.may_occupy(room.kind))
            .ok_or_else(|| ReallocationError::InvalidRoom {
                name: target_name.to_string(),
                kind,
            })?;

        if person.room_for(kind) == Some(room.id) {
            return Err(ReallocationError::AlreadyInRoom {
                person: person.name,
                room: room.name,
            });
        }

        if self.people.count_occupants(room.id)? >= room.capacity() {
            warn!(
                "event=room_reallocate module=reallocation status=error person_id={} room_id={} error_code=room_full",
                person.id, room.id
            );
            return Err(ReallocationError::RoomFull(room.name));
        }

        self.people.assign_room(person.id, kind, Some(room.id))?;
        info!(
            "event=room_reallocate module=reallocation status=ok person_id={} from_room_id={} to_room_id={} kind={}",
            person.id,
            person
                .room_for(kind)
                .map_or_else(|| "none".to_string(), |id| id.to_string()),
            room.id,
            kind.as_db_str()
        );
        Ok(placement_message(&person.name, &room))
    }
}
