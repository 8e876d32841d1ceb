//! Occupancy reports rendered to plain text.
//!
//! # Responsibility
//! - Render facility-wide, per-room, and unallocated listings.
//! - Write rendered reports to caller-chosen files.
//!
//! # Invariants
//! - Every line, placeholders included, ends with `\n`.
//! - Names within a line are joined with `", "` in person creation order.
//! - A report for an unknown room fails before any file is touched.

use crate::model::person::PersonCategory;
use crate::model::room::{RoomKind, RoomOccupancy};
use crate::repo::person_repo::{PersonRepository, SqlitePersonRepository};
use crate::repo::room_repo::{RoomRepository, SqliteRoomRepository};
use crate::repo::RepoError;
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ReportResult<T> = Result<T, ReportError>;

/// Errors from report rendering and writing.
#[derive(Debug)]
pub enum ReportError {
    /// No room with this name exists.
    RoomNotFound(String),
    /// Report file could not be written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomNotFound(name) => {
                write!(f, "no room exists in amity with the name {name}")
            }
            Self::Io { path, source } => {
                write!(f, "failed to write report `{}`: {source}", path.display())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RoomNotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for ReportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Renders one occupant line per occupied room, living spaces first.
///
/// A kind with no occupied room renders its placeholder line instead.
pub fn render_room_allocations(conn: &Connection) -> ReportResult<String> {
    let rooms = SqliteRoomRepository::try_new(conn)?;
    let people = SqlitePersonRepository::try_new(conn)?;

    let mut groups = Vec::with_capacity(RoomKind::ALL.len());
    for kind in RoomKind::ALL {
        let mut lines = Vec::new();
        for room in rooms.list_rooms_by_type(kind)? {
            let occupants: Vec<String> = people
                .list_people_by_room(room.id)?
                .into_iter()
                .map(|person| person.name)
                .collect();
            if !occupants.is_empty() {
                lines.push(occupants);
            }
        }
        groups.push((kind, lines));
    }

    Ok(format_facility_report(&groups))
}

/// Renders and writes the facility-wide report to `output_path`.
pub fn room_allocations(conn: &Connection, output_path: impl AsRef<Path>) -> ReportResult<String> {
    let text = render_room_allocations(conn)?;
    write_report(output_path.as_ref(), &text, "room_allocations")?;
    Ok(text)
}

/// Renders the header and occupant listing for one room.
pub fn render_room_allocation(conn: &Connection, room_name: &str) -> ReportResult<String> {
    let rooms = SqliteRoomRepository::try_new(conn)?;
    let people = SqlitePersonRepository::try_new(conn)?;

    let name = room_name.trim();
    let room = rooms
        .get_room_by_name(name)?
        .ok_or_else(|| ReportError::RoomNotFound(name.to_string()))?;
    let occupants = people
        .list_people_by_room(room.id)?
        .into_iter()
        .map(|person| person.name)
        .collect();

    Ok(format_room_report(&RoomOccupancy { room, occupants }))
}

/// Renders and writes one room's report to `output_path`.
///
/// Unknown rooms return [`ReportError::RoomNotFound`] and no file is created.
pub fn room_allocation(
    conn: &Connection,
    room_name: &str,
    output_path: impl AsRef<Path>,
) -> ReportResult<String> {
    let text = render_room_allocation(conn, room_name)?;
    write_report(output_path.as_ref(), &text, "room_allocation")?;
    Ok(text)
}

/// Renders one name per line for people of `category` without a primary room.
pub fn render_unallocated(conn: &Connection, category: PersonCategory) -> ReportResult<String> {
    let people = SqlitePersonRepository::try_new(conn)?;
    let names: Vec<String> = people
        .list_unallocated(category)?
        .into_iter()
        .map(|person| person.name)
        .collect();
    Ok(format_unallocated_report(category, &names))
}

/// Renders and writes the unallocated listing to `output_path`.
pub fn unallocated_report(
    conn: &Connection,
    category: PersonCategory,
    output_path: impl AsRef<Path>,
) -> ReportResult<String> {
    let text = render_unallocated(conn, category)?;
    write_report(output_path.as_ref(), &text, "unallocated")?;
    Ok(text)
}

fn format_facility_report(groups: &[(RoomKind, Vec<Vec<String>>)]) -> String {
    let mut out = String::new();
    for (kind, rooms) in groups {
        if rooms.is_empty() {
            out.push_str(&format!("no {} spaces are occupied\n", kind.word()));
            continue;
        }
        for occupants in rooms {
            out.push_str(&occupants.join(", "));
            out.push('\n');
        }
    }
    out
}

fn format_room_report(occupancy: &RoomOccupancy) -> String {
    let room = &occupancy.room;
    let mut out = format!(
        "{} ({})\n",
        room.name.to_uppercase(),
        room.kind.to_string().to_uppercase()
    );
    if occupancy.occupants.is_empty() {
        out.push_str(&format!("{} has no occupants\n", room.name));
    } else {
        out.push_str(&occupancy.occupants.join(", "));
        out.push('\n');
    }
    out
}

fn format_unallocated_report(category: PersonCategory, names: &[String]) -> String {
    if names.is_empty() {
        return format!("no unallocated {}\n", category.plural());
    }
    let mut out = String::new();
    for name in names {
        out.push_str(name);
        out.push('\n');
    }
    out
}

fn write_report(path: &Path, text: &str, report: &'static str) -> ReportResult<()> {
    match std::fs::write(path, text) {
        Ok(()) => {
            info!(
                "event=report_write module=report status=ok report={report} bytes={}",
                text.len()
            );
            Ok(())
        }
        Err(source) => {
            error!(
                "event=report_write module=report status=error report={report} error_code=io_failed error={source}"
            );
            Err(ReportError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_facility_report, format_room_report, format_unallocated_report};
    use crate::model::person::PersonCategory;
    use crate::model::room::{Room, RoomKind, RoomOccupancy};

    fn room(name: &str, kind: RoomKind) -> Room {
        Room {
            id: 1,
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn facility_report_uses_placeholders_for_empty_kinds() {
        let text = format_facility_report(&[
            (RoomKind::LivingSpace, Vec::new()),
            (RoomKind::OfficeSpace, Vec::new()),
        ]);
        assert_eq!(
            text,
            "no living spaces are occupied\nno office spaces are occupied\n"
        );
    }

    #[test]
    fn facility_report_joins_names_per_room() {
        let text = format_facility_report(&[
            (
                RoomKind::LivingSpace,
                vec![vec!["John Kariuki".to_string(), "Penny Wanjiru".to_string()]],
            ),
            (RoomKind::OfficeSpace, Vec::new()),
        ]);
        assert_eq!(
            text,
            "John Kariuki, Penny Wanjiru\nno office spaces are occupied\n"
        );
    }

    #[test]
    fn room_report_has_uppercase_header() {
        let text = format_room_report(&RoomOccupancy {
            room: room("midgar", RoomKind::OfficeSpace),
            occupants: vec!["June Bag".to_string(), "Blue October".to_string()],
        });
        assert_eq!(text, "MIDGAR (OFFICE SPACE)\nJune Bag, Blue October\n");
    }

    #[test]
    fn empty_room_report_says_no_occupants() {
        let text = format_room_report(&RoomOccupancy {
            room: room("bluewing", RoomKind::LivingSpace),
            occupants: Vec::new(),
        });
        assert_eq!(text, "BLUEWING (LIVING SPACE)\nbluewing has no occupants\n");
    }

    #[test]
    fn unallocated_report_lists_one_name_per_line() {
        let names = vec!["Amos Oti".to_string(), "Penny Wanjiru".to_string()];
        assert_eq!(
            format_unallocated_report(PersonCategory::Fellow, &names),
            "Amos Oti\nPenny Wanjiru\n"
        );
        assert_eq!(
            format_unallocated_report(PersonCategory::Staff, &[]),
            "no unallocated staff\n"
        );
    }
}
