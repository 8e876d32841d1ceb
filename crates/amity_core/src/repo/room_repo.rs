//! Room repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create rooms in all-or-nothing batches.
//! - Look rooms up by id, name, or kind.
//!
//! # Invariants
//! - A batch containing any duplicate name persists nothing.
//! - Listings are ordered by `id ASC` (creation order).

use super::{ensure_connection_ready, RepoError, RepoResult};
use crate::model::room::{Room, RoomId, RoomKind};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ROOM_SELECT_SQL: &str = "SELECT id, name, kind FROM rooms";

/// Repository interface for room storage.
pub trait RoomRepository {
    /// Inserts one room per name inside a single transaction.
    fn create_rooms(&self, names: &[String], kind: RoomKind) -> RepoResult<Vec<Room>>;
    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>>;
    fn get_room_by_name(&self, name: &str) -> RepoResult<Option<Room>>;
    /// Lists rooms in creation order, optionally restricted to one kind.
    fn list_rooms(&self, kind: Option<RoomKind>) -> RepoResult<Vec<Room>>;

    fn list_rooms_by_type(&self, kind: RoomKind) -> RepoResult<Vec<Room>> {
        self.list_rooms(Some(kind))
    }
}

/// SQLite-backed room repository.
pub struct SqliteRoomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoomRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RoomRepository for SqliteRoomRepository<'_> {
    fn create_rooms(&self, names: &[String], kind: RoomKind) -> RepoResult<Vec<Room>> {
        // Dropping the transaction without commit rolls the batch back.
        let tx = self.conn.unchecked_transaction()?;
        let mut created = Vec::with_capacity(names.len());
        {
            let mut stmt = tx.prepare("INSERT INTO rooms (name, kind) VALUES (?1, ?2);")?;
            for name in names {
                if let Err(err) = stmt.execute(params![name.as_str(), kind.as_db_str()]) {
                    if is_unique_violation(&err) {
                        warn!(
                            "event=rooms_create module=repo status=error kind={} batch_size={} error_code=duplicate_room_name",
                            kind.as_db_str(),
                            names.len()
                        );
                        return Err(RepoError::DuplicateRoomName(name.clone()));
                    }
                    return Err(err.into());
                }
                created.push(Room {
                    id: tx.last_insert_rowid(),
                    name: name.clone(),
                    kind,
                });
            }
        }
        tx.commit()?;

        info!(
            "event=rooms_create module=repo status=ok kind={} count={}",
            kind.as_db_str(),
            created.len()
        );
        Ok(created)
    }

    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>> {
        let raw = self
            .conn
            .query_row(
                &format!("{ROOM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                read_raw_room,
            )
            .optional()?;
        raw.map(parse_raw_room).transpose()
    }

    fn get_room_by_name(&self, name: &str) -> RepoResult<Option<Room>> {
        let raw = self
            .conn
            .query_row(
                &format!("{ROOM_SELECT_SQL} WHERE name = ?1;"),
                [name],
                read_raw_room,
            )
            .optional()?;
        raw.map(parse_raw_room).transpose()
    }

    fn list_rooms(&self, kind: Option<RoomKind>) -> RepoResult<Vec<Room>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ROOM_SELECT_SQL}
             WHERE (?1 IS NULL OR kind = ?1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([kind.map(RoomKind::as_db_str)])?;
        let mut rooms = Vec::new();
        while let Some(row) = rows.next()? {
            rooms.push(parse_raw_room(read_raw_room(row)?)?);
        }
        Ok(rooms)
    }
}

struct RawRoom {
    id: RoomId,
    name: String,
    kind: String,
}

fn read_raw_room(row: &Row<'_>) -> rusqlite::Result<RawRoom> {
    Ok(RawRoom {
        id: row.get("id")?,
        name: row.get("name")?,
        kind: row.get("kind")?,
    })
}

fn parse_raw_room(raw: RawRoom) -> RepoResult<Room> {
    let kind = RoomKind::from_db_str(&raw.kind).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid room kind `{}` in rooms.kind", raw.kind))
    })?;
    Ok(Room {
        id: raw.id,
        name: raw.name,
        kind,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
