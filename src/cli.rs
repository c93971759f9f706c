use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_ENV;
use crate::ui::OutputFormat;

/// Linux user and SSH key management utility
#[derive(Parser, Debug)]
#[command(name = "spinup-user", author, version, about, long_about = None)]
pub struct Cli {
    /// Show external commands and other debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Host config file (defaults to /etc/spinup-user.toml)
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add a new user and set SSH authorized keys
    Add {
        /// Username to create (prompted for when omitted)
        username: Option<String>,
        /// Login shell for the user (defaults to the configured default shell)
        #[arg(short, long)]
        shell: Option<String>,
        /// Make this an admin user with full sudo privileges
        #[arg(short, long)]
        admin: bool,
        /// Skip setting SSH authorized keys for the user
        #[arg(long = "no-ssh")]
        no_ssh: bool,
    },

    /// List existing users, or one user and their SSH keys
    List {
        /// Show details for this user only
        username: Option<String>,
    },

    /// Promote an existing user to admin status
    Promote { username: String },

    /// Revoke admin status from a user
    Demote { username: String },

    /// Replace a user's SSH authorized keys with keys read from stdin
    Keys { username: String },

    /// Remove an existing user and their home directory
    Remove {
        /// Username to remove (prompted for when omitted)
        username: Option<String>,
        /// Keep the user home directory
        #[arg(short, long)]
        keep_homedir: bool,
    },
}

impl Commands {
    /// Commands that change system state and therefore need root
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Commands::List { .. })
    }
}
