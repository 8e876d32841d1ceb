//! `amity` command-line front end.
//!
//! # Responsibility
//! - Parse operator commands and forward them to `amity_core` services.
//! - Print confirmation or failure messages; exit non-zero on failure.

use amity_core::db::open_db;
use amity_core::{
    init_logging, render_room_allocation, render_room_allocations, render_unallocated,
    room_allocation, room_allocations, unallocated_report, AllocationService, LogConfig,
    PersonCategory, ReallocationService, RngSource, RoomKind, RoomService,
    SqlitePersonRepository, SqliteRoomRepository,
};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rusqlite::Connection;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "amity", version, about = "Allocate fellows and staff to rooms")]
struct Cli {
    /// SQLite database file holding rooms and people.
    #[arg(long, env = "AMITY_DB", default_value = "amity.sqlite3", global = true)]
    db: PathBuf,

    /// trace|debug|info|warn|error; needs --log-dir
    #[arg(long, env = "AMITY_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "AMITY_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create one or more rooms of the same kind.
    CreateRoom {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Add a fellow, optionally allocating a living space.
    AddFellow {
        first_name: String,
        last_name: String,
        #[arg(long, value_enum, default_value_t = YesNo::N)]
        accommodation: YesNo,
    },
    /// Add a staff member and allocate an office space.
    AddStaff {
        first_name: String,
        last_name: String,
    },
    /// Give an existing person a random office space.
    AllocateOffice { person_id: i64 },
    /// Move a person to a named room.
    Reallocate {
        #[arg(value_enum)]
        category: CategoryArg,
        person_id: i64,
        room: String,
        /// Move the person's office instead of their primary room.
        #[arg(long)]
        office: bool,
    },
    /// List people without a room.
    Unallocated {
        #[arg(value_enum)]
        category: CategoryArg,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print occupants of every occupied room.
    Allocations {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print occupants of one room.
    Room {
        name: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Living,
    Office,
}

impl From<KindArg> for RoomKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Living => RoomKind::LivingSpace,
            KindArg::Office => RoomKind::OfficeSpace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryArg {
    Fellow,
    Staff,
}

impl From<CategoryArg> for PersonCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Fellow => PersonCategory::Fellow,
            CategoryArg::Staff => PersonCategory::Staff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum YesNo {
    #[value(alias = "yes")]
    Y,
    #[value(alias = "no")]
    N,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(message) => {
            print!("{message}");
            if !message.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let log_config = LogConfig::from_options(cli.log_level.as_deref(), cli.log_dir.as_deref())?;
    if let Some(config) = log_config {
        init_logging(&config)?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    info!("event=cli_command module=cli status=start");
    dispatch(&conn, cli.command)
}

fn dispatch(conn: &Connection, command: Command) -> anyhow::Result<String> {
    let rooms = SqliteRoomRepository::try_new(conn)?;
    let people = SqlitePersonRepository::try_new(conn)?;

    let message = match command {
        Command::CreateRoom { kind, names } => {
            let created = RoomService::new(rooms, people).create_rooms(&names, kind.into())?;
            format!("{} new rooms successfully created", created.len())
        }
        Command::AddFellow {
            first_name,
            last_name,
            accommodation,
        } => {
            let mut service = AllocationService::new(rooms, people, RngSource::thread());
            service
                .add_fellow(&first_name, &last_name, accommodation == YesNo::Y)?
                .to_string()
        }
        Command::AddStaff {
            first_name,
            last_name,
        } => {
            let mut service = AllocationService::new(rooms, people, RngSource::thread());
            service.add_staff(&first_name, &last_name)?.to_string()
        }
        Command::AllocateOffice { person_id } => {
            let mut service = AllocationService::new(rooms, people, RngSource::thread());
            service.allocate_office(person_id)?.to_string()
        }
        Command::Reallocate {
            category,
            person_id,
            room,
            office,
        } => {
            let service = ReallocationService::new(rooms, people);
            if office {
                service.reallocate_office(category.into(), person_id, &room)?
            } else {
                service.reallocate(category.into(), person_id, &room)?
            }
        }
        Command::Unallocated { category, output } => match output {
            Some(path) => unallocated_report(conn, category.into(), path)?,
            None => render_unallocated(conn, category.into())?,
        },
        Command::Allocations { output } => match output {
            Some(path) => room_allocations(conn, path)?,
            None => render_room_allocations(conn)?,
        },
        Command::Room { name, output } => match output {
            Some(path) => room_allocation(conn, &name, path)?,
            None => render_room_allocation(conn, &name)?,
        },
    };
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command, YesNo};
    use clap::Parser;

    #[test]
    fn add_fellow_defaults_to_no_accommodation() {
        let cli = Cli::try_parse_from(["amity", "add-fellow", "John", "Kariuki"]).unwrap();
        match cli.command {
            Command::AddFellow { accommodation, .. } => assert_eq!(accommodation, YesNo::N),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn create_room_requires_at_least_one_name() {
        assert!(Cli::try_parse_from(["amity", "create-room", "living"]).is_err());
    }

    #[test]
    fn reallocate_parses_office_flag() {
        let cli = Cli::try_parse_from([
            "amity",
            "reallocate",
            "fellow",
            "3",
            "midgar",
            "--office",
        ])
        .unwrap();
        match cli.command {
            Command::Reallocate {
                person_id, office, ..
            } => {
                assert_eq!(person_id, 3);
                assert!(office);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn log_level_without_log_dir_is_rejected() {
        let cli = Cli::try_parse_from([
            "amity",
            "--db",
            "unused.sqlite3",
            "--log-level",
            "debug",
            "allocations",
        ])
        .unwrap();
        let err = run(cli).unwrap_err();
        assert_eq!(
            err.to_string(),
            "a log level was given without a log directory"
        );
    }
}
