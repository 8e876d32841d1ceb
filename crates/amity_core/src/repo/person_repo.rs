//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist fellows/staff and their living/office room references.
//! - Answer occupancy queries (`list_people_by_room`, `count_occupants`).
//!
//! # Invariants
//! - Listings are ordered by `id ASC` (creation order).
//! - The repository never checks capacity; services own that rule.

use super::{bool_to_int, ensure_connection_ready, int_to_bool, RepoError, RepoResult};
use crate::model::person::{NewPerson, Person, PersonCategory, PersonId};
use crate::model::room::{RoomId, RoomKind};
use rusqlite::{params, Connection, Row};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    name,
    category,
    wants_accommodation,
    living_room_id,
    office_room_id
FROM people";

/// Repository interface for person storage and occupancy reads.
pub trait PersonRepository {
    /// Inserts an unallocated person and returns the stored record.
    fn create_person(&self, person: &NewPerson) -> RepoResult<Person>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Sets (or clears) the room reference for the slot matching `kind`.
    fn assign_room(
        &self,
        person_id: PersonId,
        kind: RoomKind,
        room_id: Option<RoomId>,
    ) -> RepoResult<()>;
    /// Lists people in creation order, optionally restricted to one category.
    fn list_people(&self, category: Option<PersonCategory>) -> RepoResult<Vec<Person>>;
    /// Lists occupants of one room in creation order.
    fn list_people_by_room(&self, room_id: RoomId) -> RepoResult<Vec<Person>>;
    fn count_occupants(&self, room_id: RoomId) -> RepoResult<u32>;
    /// Lists people of `category` whose primary room slot is empty.
    fn list_unallocated(&self, category: PersonCategory) -> RepoResult<Vec<Person>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_people(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }
        Ok(people)
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &NewPerson) -> RepoResult<Person> {
        self.conn.execute(
            "INSERT INTO people (name, category, wants_accommodation)
             VALUES (?1, ?2, ?3);",
            params![
                person.name.as_str(),
                person.category.as_db_str(),
                bool_to_int(person.wants_accommodation),
            ],
        )?;

        Ok(Person {
            id: self.conn.last_insert_rowid(),
            name: person.name.clone(),
            category: person.category,
            wants_accommodation: person.wants_accommodation,
            living_room_id: None,
            office_room_id: None,
        })
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_person_row(row)?)),
            None => Ok(None),
        }
    }

    fn assign_room(
        &self,
        person_id: PersonId,
        kind: RoomKind,
        room_id: Option<RoomId>,
    ) -> RepoResult<()> {
        let sql = match kind {
            // Taking a living space counts as accepting accommodation.
            RoomKind::LivingSpace => {
                "UPDATE people
                 SET living_room_id = ?1,
                     wants_accommodation = CASE WHEN ?1 IS NULL THEN wants_accommodation ELSE 1 END
                 WHERE id = ?2;"
            }
            RoomKind::OfficeSpace => "UPDATE people SET office_room_id = ?1 WHERE id = ?2;",
        };
        let changed = self.conn.execute(sql, params![room_id, person_id])?;
        if changed == 0 {
            return Err(RepoError::PersonNotFound(person_id));
        }
        Ok(())
    }

    fn list_people(&self, category: Option<PersonCategory>) -> RepoResult<Vec<Person>> {
        self.query_people(
            &format!(
                "{PERSON_SELECT_SQL}
                 WHERE (?1 IS NULL OR category = ?1)
                 ORDER BY id ASC;"
            ),
            [category.map(PersonCategory::as_db_str)],
        )
    }

    fn list_people_by_room(&self, room_id: RoomId) -> RepoResult<Vec<Person>> {
        self.query_people(
            &format!(
                "{PERSON_SELECT_SQL}
                 WHERE living_room_id = ?1 OR office_room_id = ?1
                 ORDER BY id ASC;"
            ),
            [room_id],
        )
    }

    fn count_occupants(&self, room_id: RoomId) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*)
             FROM people
             WHERE living_room_id = ?1 OR office_room_id = ?1;",
            [room_id],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    fn list_unallocated(&self, category: PersonCategory) -> RepoResult<Vec<Person>> {
        let sql = match category.primary_room_kind() {
            RoomKind::LivingSpace => format!(
                "{PERSON_SELECT_SQL}
                 WHERE category = ?1 AND living_room_id IS NULL
                 ORDER BY id ASC;"
            ),
            RoomKind::OfficeSpace => format!(
                "{PERSON_SELECT_SQL}
                 WHERE category = ?1 AND office_room_id IS NULL
                 ORDER BY id ASC;"
            ),
        };
        self.query_people(&sql, [category.as_db_str()])
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let category_text: String = row.get("category")?;
    let category = PersonCategory::from_db_str(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid person category `{category_text}` in people.category"
        ))
    })?;
    let wants_accommodation = int_to_bool(
        row.get("wants_accommodation")?,
        "people.wants_accommodation",
    )?;

    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        category,
        wants_accommodation,
        living_room_id: row.get("living_room_id")?,
        office_room_id: row.get("office_room_id")?,
    })
}
