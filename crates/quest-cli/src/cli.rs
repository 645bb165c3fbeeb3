//! CLI argument definitions for the Quest workspace tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

#[derive(Parser)]
#[command(
    name = "quest",
    version,
    about = "Quest Authoring Studio - versioned editing of explorations",
    long_about = "Edit explorations stored in a workspace file: apply change lists,\n\
                  inspect and revert version history, manage rights, and export\n\
                  explorations as YAML, JSON or zip downloads."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the workspace file.
    #[arg(
        long = "workspace",
        value_name = "PATH",
        default_value = "workspace.json",
        global = true
    )]
    pub workspace: PathBuf,

    /// User the command acts on behalf of.
    #[arg(long = "user", value_name = "USERNAME", default_value = "editor", global = true)]
    pub user: String,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new exploration in the workspace.
    New(NewArgs),

    /// Apply a change list from a JSON file.
    Apply(ApplyArgs),

    /// Show the commit history of an exploration.
    History {
        /// Exploration id.
        exploration_id: String,
    },

    /// Revert an exploration to an earlier version.
    Revert {
        /// Exploration id.
        exploration_id: String,

        /// The version the editor is currently looking at.
        #[arg(long = "current-version")]
        current_version: u32,

        /// The version to revert to.
        #[arg(long = "to")]
        revert_to_version: i64,
    },

    /// Export an exploration as a download artifact.
    Export {
        /// Exploration id.
        exploration_id: String,

        /// Download format to render.
        #[arg(long = "format", value_enum, default_value = "zip")]
        format: ExportFormatArg,

        /// Output path (defaults to the artifact's file name).
        #[arg(long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show play statistics for an exploration.
    Stats {
        /// Exploration id.
        exploration_id: String,
    },

    /// Publish an exploration (one-way).
    Publish {
        /// Exploration id.
        exploration_id: String,
    },

    /// Grant an editor or viewer role on an exploration.
    AssignRole {
        /// Exploration id.
        exploration_id: String,

        /// User receiving the role.
        grantee: String,

        /// Role to grant (editor or viewer).
        role: String,
    },

    /// Delete an exploration and its history.
    Delete {
        /// Exploration id.
        exploration_id: String,
    },

    /// Ban a username platform-wide (removes edit access, keeps read).
    Ban {
        /// Username to ban.
        username: String,
    },

    /// Make a username a site administrator.
    AddAdmin {
        /// Username to promote.
        username: String,
    },
}

#[derive(Parser)]
pub struct NewArgs {
    /// Exploration id.
    pub exploration_id: String,

    /// Exploration title.
    #[arg(long = "title")]
    pub title: String,

    /// Exploration category.
    #[arg(long = "category")]
    pub category: String,

    /// Optional learning objective.
    #[arg(long = "objective")]
    pub objective: Option<String>,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Exploration id.
    pub exploration_id: String,

    /// The version the change list was built against.
    #[arg(long = "version")]
    pub version: Option<u32>,

    /// Path to a JSON file holding the change list.
    #[arg(value_name = "CHANGES_JSON")]
    pub changes: PathBuf,

    /// Commit message recorded in the history.
    #[arg(long = "message", default_value = "")]
    pub message: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Zip,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
