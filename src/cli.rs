use clap::{Parser, Subcommand};

/// LifeLink — notification sync client for the LifeLink platform
#[derive(Parser)]
#[command(name = "lifelink", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch for notifications, polling until interrupted
    Watch {
        /// Override the poll interval in seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// List notifications
    List {
        /// Only unread notifications
        #[arg(long)]
        unread_only: bool,
        /// Filter by category tag (e.g. "request", "system")
        #[arg(long)]
        kind: Option<String>,
        /// Limit the number of records fetched
        #[arg(long)]
        limit: Option<u32>,
        /// Sort key: created-at, kind, or read
        #[arg(long, default_value = "created-at")]
        sort: String,
        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },

    /// Mark a notification as read
    Read { id: String },

    /// Mark all notifications as read
    ReadAll,

    /// Delete a notification
    Delete { id: String },

    /// Delete all notifications
    Clear,

    /// Create a notification (administrative/testing path)
    Create {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
    },

    /// Show aggregate notification stats
    Stats,

    /// Get or replace notification settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the settings object as JSON
    Get,
    /// Replace the settings object with the given JSON
    Set {
        /// Settings object, e.g. '{"frequency":"daily"}'
        json: String,
    },
}
