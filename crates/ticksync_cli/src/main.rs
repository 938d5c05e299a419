//! ticksync CLI
//!
//! Command-line interface for a local ticksync data file.
//!
//! # Commands
//!
//! - `add` - Add a task
//! - `list` - List tasks
//! - `done` - Mark a task done (or not done again)
//! - `remove` - Remove a task
//! - `tags` - List tags
//! - `sync` - Run one sync cycle against a file remote
//! - `inspect` - Display data file statistics and sync state

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ticksync command-line task manager.
#[derive(Parser)]
#[command(name = "ticksync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the task data file
    #[arg(global = true, short, long, default_value = "ticksync.json")]
    path: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task title
        title: String,

        /// Attach a tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Mark the task important
        #[arg(short, long)]
        important: bool,

        /// Due date as milliseconds since the unix epoch
        #[arg(long)]
        due: Option<i64>,
    },

    /// List tasks
    List {
        /// Include completed tasks
        #[arg(short, long)]
        all: bool,

        /// Show only completed tasks
        #[arg(short, long)]
        done: bool,

        /// Show only tasks carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Mark a task done
    Done {
        /// Unique prefix of the task uuid
        uuid: String,

        /// Mark the task as not done instead
        #[arg(short, long)]
        undo: bool,
    },

    /// Remove a task
    Remove {
        /// Unique prefix of the task uuid
        uuid: String,
    },

    /// List tags
    Tags {
        /// Show only tags no task uses
        #[arg(short, long)]
        unused: bool,
    },

    /// Run one sync cycle against a file remote
    Sync {
        /// Path of the remote snapshot file
        #[arg(short, long)]
        remote: PathBuf,
    },

    /// Display data file statistics and sync state
    Inspect {
        /// Emit JSON instead of text
        #[arg(short, long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Add {
            title,
            tags,
            important,
            due,
        } => commands::add::run(&cli.path, &title, tags, important, due)?,
        Commands::List { all, done, tag } => {
            commands::list::run(&cli.path, all, done, tag.as_deref())?;
        }
        Commands::Done { uuid, undo } => commands::done::run(&cli.path, &uuid, undo)?,
        Commands::Remove { uuid } => commands::remove::run(&cli.path, &uuid)?,
        Commands::Tags { unused } => commands::tags::run(&cli.path, unused)?,
        Commands::Sync { remote } => commands::sync::run(&cli.path, &remote)?,
        Commands::Inspect { json } => commands::inspect::run(&cli.path, json)?,
    }

    Ok(())
}
