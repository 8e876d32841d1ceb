//! Allocation use-case service.
//!
//! # Responsibility
//! - Admit fellows and staff, then place them in a room with free capacity.
//! - Assign named or random office spaces to people already admitted.
//!
//! # Invariants
//! - A person record is persisted before any placement is attempted, so a
//!   failed placement still leaves the person queryable and unallocated.
//! - A room whose occupant count reached its kind's capacity is never chosen.
//! - Eligible rooms are chosen uniformly through the injected `RandomSource`.

use crate::model::person::{compose_full_name, NameError, NewPerson, Person, PersonCategory, PersonId};
use crate::model::room::{Room, RoomKind};
use crate::random::RandomSource;
use crate::repo::person_repo::PersonRepository;
use crate::repo::room_repo::RoomRepository;
use crate::repo::RepoError;
use crate::service::room_service::room_vacancies;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Successful result of an allocation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// The person now occupies `room`.
    Allocated { person: Person, room: Room },
    /// A fellow declined accommodation; the person exists without a room.
    AccommodationNotRequested { person: Person },
}

impl AllocationOutcome {
    /// The stored person after this call.
    pub fn person(&self) -> &Person {
        match self {
            Self::Allocated { person, .. } => person,
            Self::AccommodationNotRequested { person } => person,
        }
    }

    /// Room the person was placed in, if any.
    pub fn room(&self) -> Option<&Room> {
        match self {
            Self::Allocated { room, .. } => Some(room),
            Self::AccommodationNotRequested { .. } => None,
        }
    }
}

impl Display for AllocationOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocated { person, room } => f.write_str(&placement_message(&person.name, room)),
            Self::AccommodationNotRequested { person } => {
                write!(f, "accommodation not provided for fellow {}", person.name)
            }
        }
    }
}

/// Confirmation line shared by allocation and reallocation.
pub(crate) fn placement_message(name: &str, room: &Room) -> String {
    match room.kind {
        RoomKind::LivingSpace => format!("{name} is now residing in {}", room.name),
        RoomKind::OfficeSpace => format!("{name} is now working in {}", room.name),
    }
}

/// Errors from allocation operations.
#[derive(Debug)]
pub enum AllocationError {
    /// First or last name is blank.
    InvalidName(NameError),
    /// No person with this id exists.
    PersonNotFound(PersonId),
    /// No room of `kind` carries this name.
    RoomNotFound { name: String, kind: RoomKind },
    /// The person's category may not occupy rooms of `kind`.
    IncompatibleRoom {
        name: String,
        category: PersonCategory,
        kind: RoomKind,
    },
    /// Every room of `kind` is full; the person was stored unallocated.
    NoVacancy {
        person_id: PersonId,
        name: String,
        kind: RoomKind,
    },
    /// The named room reached its capacity.
    RoomFull(String),
    /// The person already holds a room of this kind.
    AlreadyAllocated { name: String, room: String },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for AllocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::PersonNotFound(id) => write!(f, "no person by the provided id {id}"),
            Self::RoomNotFound { kind, .. } => write!(f, "no {kind} by that name"),
            Self::IncompatibleRoom {
                name,
                category,
                kind,
            } => write!(f, "{name} is {category} and cannot be given a {kind}"),
            Self::NoVacancy { name, kind, .. } => write!(
                f,
                "no vacant {} spaces; check later to accommodate {name}",
                kind.word()
            ),
            Self::RoomFull(room) => write!(f, "{room} is fully occupied"),
            Self::AlreadyAllocated { name, room } => write!(f, "{name} already belongs in {room}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AllocationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AllocationError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::PersonNotFound(id) => Self::PersonNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<NameError> for AllocationError {
    fn from(value: NameError) -> Self {
        Self::InvalidName(value)
    }
}

/// Allocation engine over room/person repositories and a random source.
pub struct AllocationService<R: RoomRepository, P: PersonRepository, S: RandomSource> {
    rooms: R,
    people: P,
    random: S,
}

impl<R: RoomRepository, P: PersonRepository, S: RandomSource> AllocationService<R, P, S> {
    pub fn new(rooms: R, people: P, random: S) -> Self {
        Self {
            rooms,
            people,
            random,
        }
    }

    /// Admits a fellow and, when requested, places them in a living space.
    ///
    /// # Contract
    /// - The fellow is stored even when `NoVacancy` is returned.
    /// - `wants_accommodation = false` returns
    ///   [`AllocationOutcome::AccommodationNotRequested`] without touching rooms.
    pub fn add_fellow(
        &mut self,
        first_name: &str,
        last_name: &str,
        wants_accommodation: bool,
    ) -> Result<AllocationOutcome, AllocationError> {
        let name = compose_full_name(first_name, last_name)?;
        let person = self
            .people
            .create_person(&NewPerson::fellow(name, wants_accommodation))?;
        info!(
            "event=person_create module=allocation status=ok person_id={} category=fellow wants_accommodation={}",
            person.id, wants_accommodation
        );

        if !wants_accommodation {
            return Ok(AllocationOutcome::AccommodationNotRequested { person });
        }
        self.place_randomly(person, RoomKind::LivingSpace)
    }

    /// Admits a staff member and places them in an office space.
    ///
    /// The staff member is stored even when `NoVacancy` is returned.
    pub fn add_staff(
        &mut self,
        first_name: &str,
        last_name: &str,
    ) -> Result<AllocationOutcome, AllocationError> {
        let name = compose_full_name(first_name, last_name)?;
        let person = self.people.create_person(&NewPerson::staff(name))?;
        info!(
            "event=person_create module=allocation status=ok person_id={} category=staff",
            person.id
        );
        self.place_randomly(person, RoomKind::OfficeSpace)
    }

    /// Gives an existing person a randomly chosen office space.
    ///
    /// Used for fellows, whose office is independent of accommodation.
    pub fn allocate_office(&mut self, person_id: PersonId) -> Result<AllocationOutcome, AllocationError> {
        let person = self.load_person(person_id)?;
        if let Some(room_id) = person.office_room_id {
            let room = self
                .rooms
                .get_room(room_id)?
                .map_or_else(|| room_id.to_string(), |room| room.name);
            return Err(AllocationError::AlreadyAllocated {
                name: person.name,
                room,
            });
        }
        self.place_randomly(person, RoomKind::OfficeSpace)
    }

    /// Places an existing person in the room named `room_name` of `kind`.
    ///
    /// Updates the stored record instead of inserting a new one.
    pub fn allocate_existing(
        &mut self,
        person_id: PersonId,
        room_name: &str,
        kind: RoomKind,
    ) -> Result<AllocationOutcome, AllocationError> {
        let person = self.load_person(person_id)?;
        if !person.category.may_occupy(kind) {
            return Err(AllocationError::IncompatibleRoom {
                name: person.name,
                category: person.category,
                kind,
            });
        }

        let room = self
            .rooms
            .get_room_by_name(room_name.trim())?
            .filter(|room| room.kind == kind)
            .ok_or_else(|| AllocationError::RoomNotFound {
                name: room_name.trim().to_string(),
                kind,
            })?;

        if person.room_for(kind) == Some(room.id) {
            return Err(AllocationError::AlreadyAllocated {
                name: person.name,
                room: room.name,
            });
        }
        if self.people.count_occupants(room.id)? >= room.capacity() {
            warn!(
                "event=room_allocate module=allocation status=error person_id={} room_id={} error_code=room_full",
                person.id, room.id
            );
            return Err(AllocationError::RoomFull(room.name));
        }

        self.store_placement(person, room)
    }

    fn load_person(&self, person_id: PersonId) -> Result<Person, AllocationError> {
        self.people
            .get_person(person_id)?
            .ok_or(AllocationError::PersonNotFound(person_id))
    }

    fn place_randomly(
        &mut self,
        person: Person,
        kind: RoomKind,
    ) -> Result<AllocationOutcome, AllocationError> {
        let mut candidates: Vec<Room> = room_vacancies(&self.rooms, &self.people, kind)?
            .into_iter()
            .filter(|vacancy| vacancy.has_vacancy())
            .map(|vacancy| vacancy.room)
            .collect();

        if candidates.is_empty() {
            warn!(
                "event=room_allocate module=allocation status=error person_id={} kind={} error_code=no_vacancy",
                person.id,
                kind.as_db_str()
            );
            return Err(AllocationError::NoVacancy {
                person_id: person.id,
                name: person.name,
                kind,
            });
        }

        let last = candidates.len() - 1;
        let index = self.random.pick_index(candidates.len()).min(last);
        let room = candidates.swap_remove(index);
        self.store_placement(person, room)
    }

    fn store_placement(
        &self,
        mut person: Person,
        room: Room,
    ) -> Result<AllocationOutcome, AllocationError> {
        self.people.assign_room(person.id, room.kind, Some(room.id))?;
        match room.kind {
            RoomKind::LivingSpace => {
                person.living_room_id = Some(room.id);
                person.wants_accommodation = true;
            }
            RoomKind::OfficeSpace => person.office_room_id = Some(room.id),
        }
        info!(
            "event=room_allocate module=allocation status=ok person_id={} room_id={} kind={}",
            person.id,
            room.id,
            room.kind.as_db_str()
        );
        Ok(AllocationOutcome::Allocated { person, room })
    }
}
