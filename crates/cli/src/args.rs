//! Command-line surface.

use clap::{Parser, Subcommand};
use doorctl_client::DEFAULT_LOG_LIMIT;
use doorctl_core::models::LockMode;

#[derive(Debug, Parser)]
#[command(name = "doorctl")]
#[command(about = "Administration console for the RFID door-access backend", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides DOORCTL_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check the configured credentials and show who they belong to
    Login,
    /// End the backend session for the configured credentials
    Logout,
    /// Show the administrator behind the current session
    Whoami,
    /// Manage personnel
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
    /// Register a new person and bind their first card by scanning it
    Register {
        student_id: String,
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telegram_id: Option<String>,
        /// Label for the card being bound
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Manage RFID cards
    Cards {
        #[command(subcommand)]
        command: CardsCommand,
    },
    /// Manage administrator accounts
    Admins {
        #[command(subcommand)]
        command: AdminsCommand,
    },
    /// Show recent door access
    Logs {
        /// Number of entries to fetch
        #[arg(short, long, default_value_t = DEFAULT_LOG_LIMIT)]
        limit: u32,
        /// Only show entries matching this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Operate the door
    Door {
        #[command(subcommand)]
        command: DoorCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a user without binding a card
    Add {
        student_id: String,
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telegram_id: Option<String>,
    },
    /// Change a user's details
    Update {
        id: String,
        #[arg(long)]
        student_id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telegram_id: Option<String>,
    },
    /// Delete one or more users
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Enable one or more users
    Enable {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Disable one or more users
    Disable {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List the cards bound to a user
    Cards { id: String },
    /// Bind another card to an existing user by scanning it
    Bind {
        student_id: String,
        /// Label for the new card
        #[arg(long)]
        nickname: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CardsCommand {
    /// List cards
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register a card by UID without scanning it
    Add {
        user_id: String,
        rfid_uid: String,
        #[arg(long)]
        nickname: Option<String>,
    },
    /// Change a card's nickname
    Rename { id: String, nickname: String },
    /// Enable one or more cards
    Enable {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Disable one or more cards
    Disable {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete one or more cards
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminsCommand {
    /// List administrators
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add an administrator
    Add {
        username: String,
        name: String,
        /// Initial password
        #[arg(long, env = "DOORCTL_NEW_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete one or more administrators
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DoorCommand {
    /// Open the door once
    Unlock,
    /// Show lock state and mode
    Status,
    /// Set the lock mode (normal, unlocked, locked)
    Mode { mode: LockMode },
}
