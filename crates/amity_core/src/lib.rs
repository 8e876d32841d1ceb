//! Core room allocation logic for Amity.
//! This crate owns every capacity and room-type rule; callers only drive it.

pub mod db;
pub mod logging;
pub mod model;
pub mod random;
pub mod report;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, LogConfig, LoggingError};
pub use model::person::{compose_full_name, NameError, NewPerson, Person, PersonCategory, PersonId};
pub use model::room::{
    Room, RoomId, RoomKind, RoomOccupancy, RoomVacancy, LIVING_SPACE_CAPACITY,
    OFFICE_SPACE_CAPACITY,
};
pub use random::{RandomSource, RngSource};
pub use report::{
    render_room_allocation, render_room_allocations, render_unallocated, room_allocation,
    room_allocations, unallocated_report, ReportError, ReportResult,
};
pub use repo::person_repo::{PersonRepository, SqlitePersonRepository};
pub use repo::room_repo::{RoomRepository, SqliteRoomRepository};
pub use repo::{RepoError, RepoResult};
pub use service::allocation_service::{AllocationError, AllocationOutcome, AllocationService};
pub use service::reallocation_service::{ReallocationError, ReallocationService};
pub use service::room_service::{RoomService, RoomServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
