mod cli;
mod config;
mod error;
mod runner;
mod ui;
mod users;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;
use crate::config::HostConfig;
use crate::runner::SystemRunner;
use crate::ui::prelude::*;
use crate::users::LinuxUsers;
use crate::users::commands::{handle_command, require_root};

fn main() {
    let cli = Cli::parse();

    ui::init(cli.output, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if let Err(err) = run(cli) {
        emit(Level::Error, "error", &format!("{:#}", err), None);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = HostConfig::resolve_path(cli.config.as_deref());
    let config = HostConfig::load(&config_path)?;
    emit(
        Level::Debug,
        "config.loaded",
        &format!("using host config {}", config_path.display()),
        None,
    );

    if cli.command.is_mutating() {
        require_root()?;
    }

    let users = LinuxUsers::new(config, SystemRunner);
    let stdin = std::io::stdin();
    handle_command(&users, cli.command, &mut stdin.lock())
}
