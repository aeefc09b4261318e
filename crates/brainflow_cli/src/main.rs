//! `brainflow` command-line entry point.
//!
//! # Responsibility
//! - Wire config, logging, and the SQLite store into the core services.
//! - Print every result as JSON on stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use brainflow_core::db::open_db;
use brainflow_core::{
    init_logging, CoreConfig, GraphService, NoteService, NoteStatus, SqliteGraphStore,
};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "brainflow", version, about = "BrainFlow - linked study notes")]
struct Cli {
    /// JSON config file.
    #[arg(long, env = "BRAINFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the configured database path.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Owner of every note read or written.
    #[arg(long, env = "BRAINFLOW_USER_ID")]
    user: Option<Uuid>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check core linkage.
    Ping,

    #[command(flatten)]
    Graph(GraphCommand),
}

/// Commands that read or write one user's note graph.
#[derive(Subcommand, Debug)]
enum GraphCommand {
    /// Write a Markdown file as a note and rebuild its links.
    Sync {
        file: PathBuf,
        /// Note title; defaults to the file name without extension.
        #[arg(long)]
        title: Option<String>,
        /// `in-progress` or `understood`.
        #[arg(long, value_parser = parse_write_status)]
        status: Option<NoteStatus>,
    },

    /// Show one note by title or slug.
    Show { note: String },

    /// List notes, most recently updated first.
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<NoteStatus>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Move a note's study status forward.
    Status {
        note: String,
        #[arg(value_parser = parse_status)]
        status: NoteStatus,
    },

    /// Delete a note together with its links.
    Delete { note: String },

    /// Notes linked from a note.
    Links { note: String },

    /// Notes linking to a note.
    Backlinks { note: String },

    /// Whole graph as nodes and links.
    Graph,

    /// Unwritten notes ranked by reference count.
    Recommend {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ping => {
            println!(
                "brainflow_core ping={} version={}",
                brainflow_core::ping(),
                brainflow_core::core_version()
            );
            Ok(())
        }
        Command::Graph(command) => run_graph_command(command, cli.config, cli.db_path, cli.user),
    }
}

fn run_graph_command(
    command: GraphCommand,
    config_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    user: Option<Uuid>,
) -> Result<()> {
    let mut config = CoreConfig::load(config_path.as_deref()).context("Failed to load config")?;
    if let Some(db_path) = db_path {
        config.database_path = db_path;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir).context("Failed to start logging")?;
    }

    let Some(user) = user else {
        bail!("--user (or BRAINFLOW_USER_ID) is required");
    };

    let conn = open_db(&config.database_path).with_context(|| {
        format!(
            "Failed to open graph database at {}",
            config.database_path.display()
        )
    })?;
    let store = SqliteGraphStore::try_new(&conn).context("Graph database is not ready")?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&command)
    );

    match command {
        GraphCommand::Sync {
            file,
            title,
            status,
        } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let title = title.unwrap_or_else(|| file.to_string_lossy().into_owned());
            let service = NoteService::with_options(store, config.sync_options());
            let report = match status {
                Some(status) => service.write_note_with_status(user, &title, &content, status)?,
                None => service.write_note(user, &title, &content)?,
            };
            print_json(&report)?;
        }
        GraphCommand::Show { note } => {
            let service = NoteService::new(store);
            match service.get_note(user, &note)? {
                Some(found) => print_json(&found)?,
                None => bail!("note not found: `{note}`"),
            }
        }
        GraphCommand::List {
            status,
            limit,
            offset,
        } => {
            let result = NoteService::new(store).list_notes(user, status, limit, offset)?;
            print_json(&result.items)?;
        }
        GraphCommand::Status { note, status } => {
            let updated = NoteService::new(store).update_status(user, &note, status)?;
            print_json(&updated)?;
        }
        GraphCommand::Delete { note } => {
            let deleted = NoteService::new(store).delete_note(user, &note)?;
            print_json(&deleted)?;
        }
        GraphCommand::Links { note } => {
            print_json(&GraphService::new(store).outgoing(user, &note)?)?;
        }
        GraphCommand::Backlinks { note } => {
            print_json(&GraphService::new(store).backlinks(user, &note)?)?;
        }
        GraphCommand::Graph => {
            print_json(&GraphService::new(store).graph_view(user)?)?;
        }
        GraphCommand::Recommend { limit } => {
            print_json(&GraphService::new(store).recommendations(user, limit)?)?;
        }
    }

    Ok(())
}

fn parse_status(value: &str) -> Result<NoteStatus, String> {
    NoteStatus::parse(value)
        .ok_or_else(|| format!("unknown status `{value}`; expected new|in-progress|understood"))
}

fn parse_write_status(value: &str) -> Result<NoteStatus, String> {
    let status = parse_status(value)?;
    if !status.allows_content() {
        return Err(format!(
            "status `{value}` is reserved for unwritten notes; expected in-progress|understood"
        ));
    }
    Ok(status)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn command_name(command: &GraphCommand) -> &'static str {
    match command {
        GraphCommand::Sync { .. } => "sync",
        GraphCommand::Show { .. } => "show",
        GraphCommand::List { .. } => "list",
        GraphCommand::Status { .. } => "status",
        GraphCommand::Delete { .. } => "delete",
        GraphCommand::Links { .. } => "links",
        GraphCommand::Backlinks { .. } => "backlinks",
        GraphCommand::Graph => "graph",
        GraphCommand::Recommend { .. } => "recommend",
    }
}
