use amity_core::db::open_db_in_memory;
use amity_core::{
    AllocationError, AllocationOutcome, AllocationService, PersonCategory, PersonRepository,
    RandomSource, RngSource, RoomKind, RoomService, SqlitePersonRepository, SqliteRoomRepository,
};
use rusqlite::Connection;
use std::collections::HashMap;

/// Always picks the same position among eligible rooms.
struct FixedIndex(usize);

impl RandomSource for FixedIndex {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.min(len - 1)
    }
}

type Allocator<'conn, S> =
    AllocationService<SqliteRoomRepository<'conn>, SqlitePersonRepository<'conn>, S>;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn create_rooms(conn: &Connection, names: &[&str], kind: RoomKind) {
    RoomService::new(
        SqliteRoomRepository::try_new(conn).unwrap(),
        SqlitePersonRepository::try_new(conn).unwrap(),
    )
    .create_rooms(names, kind)
    .unwrap();
}

fn allocator<S: RandomSource>(conn: &Connection, random: S) -> Allocator<'_, S> {
    AllocationService::new(
        SqliteRoomRepository::try_new(conn).unwrap(),
        SqlitePersonRepository::try_new(conn).unwrap(),
        random,
    )
}

fn people(conn: &Connection) -> SqlitePersonRepository<'_> {
    SqlitePersonRepository::try_new(conn).unwrap()
}

#[test]
fn fellow_with_accommodation_gets_living_space() {
    let conn = setup();
    create_rooms(&conn, &["woodwing", "westwing", "eastwing"], RoomKind::LivingSpace);

    let outcome = allocator(&conn, RngSource::seeded(3))
        .add_fellow("John", "Kariuki", true)
        .unwrap();
    let room = outcome.room().unwrap();
    assert_eq!(room.kind, RoomKind::LivingSpace);
    assert_eq!(
        outcome.to_string(),
        format!("John Kariuki is now residing in {}", room.name)
    );

    let stored = people(&conn).get_person(outcome.person().id).unwrap().unwrap();
    assert_eq!(stored.living_room_id, Some(room.id));
    assert_eq!(stored.office_room_id, None);
    assert!(stored.wants_accommodation);
}

#[test]
fn fellow_declining_accommodation_is_stored_without_room() {
    let conn = setup();
    create_rooms(&conn, &["woodwing"], RoomKind::LivingSpace);

    let outcome = allocator(&conn, RngSource::seeded(3))
        .add_fellow("John", "Kariuki", false)
        .unwrap();
    assert!(matches!(
        outcome,
        AllocationOutcome::AccommodationNotRequested { .. }
    ));
    assert_eq!(
        outcome.to_string(),
        "accommodation not provided for fellow John Kariuki"
    );

    let stored = people(&conn).get_person(outcome.person().id).unwrap().unwrap();
    assert_eq!(stored.living_room_id, None);
    assert!(!stored.wants_accommodation);
    assert_eq!(people(&conn).count_occupants(1).unwrap(), 0);
}

#[test]
fn staff_get_office_space_only() {
    let conn = setup();
    create_rooms(&conn, &["woodwing"], RoomKind::LivingSpace);
    create_rooms(&conn, &["midgar"], RoomKind::OfficeSpace);

    let outcome = allocator(&conn, RngSource::seeded(9))
        .add_staff("June", "Bag")
        .unwrap();
    let room = outcome.room().unwrap();
    assert_eq!(room.name, "midgar");
    assert_eq!(outcome.to_string(), "June Bag is now working in midgar");

    let stored = people(&conn).get_person(outcome.person().id).unwrap().unwrap();
    assert_eq!(stored.category, PersonCategory::Staff);
    assert_eq!(stored.office_room_id, Some(room.id));
    assert_eq!(stored.living_room_id, None);
}

#[test]
fn no_vacancy_still_creates_unallocated_person() {
    let conn = setup();
    create_rooms(&conn, &["woodwing"], RoomKind::LivingSpace);
    let mut service = allocator(&conn, RngSource::seeded(5));

    for (first, last) in [
        ("John", "Kariuki"),
        ("Blue", "October"),
        ("Steph", "Curry"),
        ("Para", "More"),
    ] {
        let outcome = service.add_fellow(first, last, true).unwrap();
        assert_eq!(outcome.room().unwrap().name, "woodwing");
    }

    let err = service.add_fellow("Amos", "Oti", true).unwrap_err();
    let person_id = match &err {
        AllocationError::NoVacancy {
            person_id,
            name,
            kind,
        } => {
            assert_eq!(name, "Amos Oti");
            assert_eq!(*kind, RoomKind::LivingSpace);
            *person_id
        }
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(
        err.to_string(),
        "no vacant living spaces; check later to accommodate Amos Oti"
    );

    let stored = people(&conn).get_person(person_id).unwrap().unwrap();
    assert_eq!(stored.name, "Amos Oti");
    assert!(stored.is_unallocated());
    assert_eq!(
        people(&conn).list_people(Some(PersonCategory::Fellow)).unwrap().len(),
        5
    );
}

#[test]
fn staff_without_offices_get_no_vacancy() {
    let conn = setup();
    let err = allocator(&conn, RngSource::seeded(5))
        .add_staff("June", "Bag")
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::NoVacancy {
            kind: RoomKind::OfficeSpace,
            ..
        }
    ));
    assert_eq!(people(&conn).list_people(None).unwrap().len(), 1);
}

#[test]
fn full_rooms_are_never_selected() {
    for kind in RoomKind::ALL {
        let conn = setup();
        create_rooms(&conn, &["alpha", "beta"], kind);
        // Index 0 keeps choosing the first eligible room until it fills up.
        let mut service = allocator(&conn, FixedIndex(0));

        let total = kind.capacity() * 2;
        for n in 0..total {
            let outcome = match kind {
                RoomKind::LivingSpace => service.add_fellow("Fellow", &format!("No{n}"), true),
                RoomKind::OfficeSpace => service.add_staff("Staff", &format!("No{n}")),
            }
            .unwrap();
            let expected = if n < kind.capacity() { "alpha" } else { "beta" };
            assert_eq!(outcome.room().unwrap().name, expected);
        }

        let overflow = match kind {
            RoomKind::LivingSpace => service.add_fellow("One", "More", true),
            RoomKind::OfficeSpace => service.add_staff("One", "More"),
        };
        assert!(matches!(overflow, Err(AllocationError::NoVacancy { .. })));

        let repo = people(&conn);
        assert_eq!(repo.count_occupants(1).unwrap(), kind.capacity());
        assert_eq!(repo.count_occupants(2).unwrap(), kind.capacity());
    }
}

#[test]
fn random_selection_spreads_across_eligible_rooms() {
    let conn = setup();
    create_rooms(&conn, &["midgar", "krypton", "valhalla"], RoomKind::OfficeSpace);
    let mut service = allocator(&conn, RngSource::seeded(2024));

    let mut per_room: HashMap<String, u32> = HashMap::new();
    for n in 0..18 {
        let outcome = service.add_staff("Staff", &format!("No{n}")).unwrap();
        *per_room
            .entry(outcome.room().unwrap().name.clone())
            .or_default() += 1;
    }

    assert_eq!(per_room.len(), 3);
    assert!(per_room.values().all(|count| *count == 6));
}

#[test]
fn picked_index_decides_the_room() {
    let conn = setup();
    create_rooms(&conn, &["midgar", "krypton", "valhalla"], RoomKind::OfficeSpace);
    let mut service = allocator(&conn, FixedIndex(2));

    let outcome = service.add_staff("June", "Bag").unwrap();
    assert_eq!(outcome.room().unwrap().name, "valhalla");
    assert_eq!(people(&conn).count_occupants(1).unwrap(), 0);
    assert_eq!(people(&conn).count_occupants(2).unwrap(), 0);
}

#[test]
fn picked_index_counts_only_rooms_with_vacancy() {
    let conn = setup();
    create_rooms(&conn, &["midgar", "krypton", "valhalla"], RoomKind::OfficeSpace);
    let mut service = allocator(&conn, FixedIndex(1));

    for n in 0..RoomKind::OfficeSpace.capacity() {
        let outcome = service.add_staff("Staff", &format!("No{n}")).unwrap();
        assert_eq!(outcome.room().unwrap().name, "krypton");
    }

    // krypton is full, so index 1 now lands on valhalla.
    let outcome = service.add_staff("June", "Bag").unwrap();
    assert_eq!(outcome.room().unwrap().name, "valhalla");
}

#[test]
fn fellow_can_hold_living_and_office_rooms_together() {
    let conn = setup();
    create_rooms(&conn, &["woodwing"], RoomKind::LivingSpace);
    create_rooms(&conn, &["midgar"], RoomKind::OfficeSpace);
    let mut service = allocator(&conn, RngSource::seeded(1));

    let living = service.add_fellow("John", "Kariuki", true).unwrap();
    let person_id = living.person().id;
    let office = service.allocate_office(person_id).unwrap();
    assert_eq!(office.room().unwrap().name, "midgar");

    let stored = people(&conn).get_person(person_id).unwrap().unwrap();
    assert!(stored.living_room_id.is_some());
    assert!(stored.office_room_id.is_some());
    assert_ne!(stored.living_room_id, stored.office_room_id);

    let err = service.allocate_office(person_id).unwrap_err();
    assert_eq!(err.to_string(), "John Kariuki already belongs in midgar");
}

#[test]
fn allocate_office_for_unknown_person_fails() {
    let conn = setup();
    create_rooms(&conn, &["midgar"], RoomKind::OfficeSpace);
    let err = allocator(&conn, RngSource::seeded(1))
        .allocate_office(42)
        .unwrap_err();
    assert!(matches!(err, AllocationError::PersonNotFound(42)));
}

#[test]
fn allocate_existing_assigns_named_room() {
    let conn = setup();
    create_rooms(&conn, &["woodwing"], RoomKind::LivingSpace);
    let mut service = allocator(&conn, FixedIndex(0));
    service.add_fellow("John", "Kariuki", true).unwrap();
    let declined = service.add_fellow("Mary", "Atieno", false).unwrap();
    let person_id = declined.person().id;
    create_rooms(&conn, &["bluewing"], RoomKind::LivingSpace);

    let err = service
        .allocate_existing(person_id, "random3", RoomKind::LivingSpace)
        .unwrap_err();
    assert_eq!(err.to_string(), "no living space by that name");

    let outcome = service
        .allocate_existing(person_id, "bluewing", RoomKind::LivingSpace)
        .unwrap();
    assert_eq!(outcome.to_string(), "Mary Atieno is now residing in bluewing");
    assert!(outcome.person().wants_accommodation);
    let stored = people(&conn).get_person(person_id).unwrap().unwrap();
    assert!(stored.wants_accommodation);

    // No new row was inserted for the existing person.
    assert_eq!(people(&conn).list_people(None).unwrap().len(), 2);
}

#[test]
fn allocate_existing_rejects_full_room() {
    let conn = setup();
    create_rooms(&conn, &["bluewing"], RoomKind::LivingSpace);
    let mut service = allocator(&conn, FixedIndex(0));
    for n in 0..4 {
        service.add_fellow("Fellow", &format!("No{n}"), true).unwrap();
    }
    let waiting = service.add_fellow("John", "Kariuki", false).unwrap();

    let err = service
        .allocate_existing(waiting.person().id, "bluewing", RoomKind::LivingSpace)
        .unwrap_err();
    assert!(matches!(err, AllocationError::RoomFull(ref room) if room == "bluewing"));
    assert_eq!(err.to_string(), "bluewing is fully occupied");
}

#[test]
fn allocate_existing_rejects_living_space_for_staff() {
    let conn = setup();
    create_rooms(&conn, &["woodwing"], RoomKind::LivingSpace);
    create_rooms(&conn, &["midgar"], RoomKind::OfficeSpace);
    let mut service = allocator(&conn, FixedIndex(0));
    let staff = service.add_staff("June", "Bag").unwrap();

    let err = service
        .allocate_existing(staff.person().id, "woodwing", RoomKind::LivingSpace)
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::IncompatibleRoom {
            category: PersonCategory::Staff,
            kind: RoomKind::LivingSpace,
            ..
        }
    ));
}

#[test]
fn allocate_existing_requires_matching_room_kind() {
    let conn = setup();
    create_rooms(&conn, &["midgar"], RoomKind::OfficeSpace);
    let mut service = allocator(&conn, FixedIndex(0));
    let fellow = service.add_fellow("John", "Kariuki", false).unwrap();

    let err = service
        .allocate_existing(fellow.person().id, "midgar", RoomKind::LivingSpace)
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::RoomNotFound {
            kind: RoomKind::LivingSpace,
            ..
        }
    ));
}

#[test]
fn blank_names_are_rejected_before_persisting() {
    let conn = setup();
    let err = allocator(&conn, FixedIndex(0))
        .add_fellow("  ", "Kariuki", true)
        .unwrap_err();
    assert!(matches!(err, AllocationError::InvalidName(_)));
    assert!(people(&conn).list_people(None).unwrap().is_empty());
}
