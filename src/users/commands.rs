//! Command handlers behind the CLI

use std::io::BufRead;

use anyhow::{Context, Result, bail};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use dialoguer::Input;

use crate::cli::Commands;
use crate::runner::CommandRunner;
use crate::ui::prelude::*;

use super::{LinuxUsers, valid_authorized_key};

pub fn handle_command<R: CommandRunner>(
    users: &LinuxUsers<R>,
    command: Commands,
    input: &mut dyn BufRead,
) -> Result<()> {
    match command {
        Commands::Add {
            username,
            shell,
            admin,
            no_ssh,
        } => {
            let username = username_or_prompt(username, "Enter username to create")?;
            let shell = shell.unwrap_or_else(|| users.config().default_shell.clone());
            add_user(users, &username, &shell, admin, no_ssh, input)
        }
        Commands::List { username: None } => list_users(users),
        Commands::List {
            username: Some(username),
        } => show_user(users, &username),
        Commands::Promote { username } => promote_user(users, &username),
        Commands::Demote { username } => demote_user(users, &username),
        Commands::Keys { username } => set_keys(users, &username, input),
        Commands::Remove {
            username,
            keep_homedir,
        } => {
            let username = username_or_prompt(username, "Enter username to remove")?;
            remove_user(users, &username, keep_homedir)
        }
    }
}

/// Refuse to go on unless running as root
pub fn require_root() -> Result<()> {
    if !nix::unistd::geteuid().is_root() {
        bail!("this command must be run as root (try again with sudo)");
    }
    Ok(())
}

fn username_or_prompt(username: Option<String>, prompt: &str) -> Result<String> {
    if let Some(username) = username {
        return Ok(username);
    }

    let username: String = Input::new()
        .with_prompt(prompt)
        .interact_text()
        .context("reading username")?;
    Ok(username.trim().to_string())
}

/// Read public keys one per line until a blank line or EOF
pub fn read_public_keys(input: &mut dyn BufRead) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    for line in input.lines() {
        let line = line.context("reading public keys")?;
        let key = line.trim();
        if key.is_empty() {
            break;
        }
        if !valid_authorized_key(key) {
            bail!("invalid public key specified:\n{}", key);
        }
        keys.push(key.to_string());
    }

    if keys.is_empty() {
        bail!("no public key specified");
    }

    Ok(keys)
}

fn prompt_for_keys(input: &mut dyn BufRead) -> Result<Vec<String>> {
    emit(
        Level::Info,
        "users.keys.prompt",
        "Paste one or more SSH public keys for this user (hit Enter when done):",
        None,
    );
    read_public_keys(input)
}

fn add_user<R: CommandRunner>(
    users: &LinuxUsers<R>,
    username: &str,
    shell: &str,
    admin: bool,
    no_ssh: bool,
    input: &mut dyn BufRead,
) -> Result<()> {
    // keys are collected before anything touches the system
    let keys = if no_ssh {
        None
    } else {
        Some(prompt_for_keys(input)?)
    };

    users
        .create(username, shell)
        .context("failed to add new user")?;

    if let Some(keys) = keys {
        users
            .update_authorized_keys(username, &keys)
            .context("failed to set authorized_keys")?;
    }

    let data = Some(serde_json::json!({ "username": username, "admin": admin }));
    if admin {
        users
            .update_sudo(username, true)
            .context("failed to set sudo privileges")?;
        emit(
            Level::Success,
            "users.add.done",
            &format!("Added admin user {}", username),
            data,
        );
    } else {
        emit(
            Level::Success,
            "users.add.done",
            &format!("Added user {}", username),
            data,
        );
    }

    Ok(())
}

fn list_users<R: CommandRunner>(users: &LinuxUsers<R>) -> Result<()> {
    let accounts = users.list().context("error listing users")?;

    emit(
        Level::Debug,
        "users.list.count",
        &format!("{} human account(s)", accounts.len()),
        None,
    );

    if get_output_format() == OutputFormat::Json {
        let list: Vec<_> = accounts.values().collect();
        emit(
            Level::Info,
            "users.list",
            &format!("{} user(s)", list.len()),
            Some(serde_json::to_value(list)?),
        );
        return Ok(());
    }

    if accounts.is_empty() {
        emit(Level::Info, "users.list.empty", "No users found.", None);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Username", "Admin", "Name", "Shell", "Home", "UID"]);
    for account in accounts.values() {
        table.add_row(vec![
            account.username.clone(),
            (if account.admin { "yes" } else { "" }).to_string(),
            account.full_name.clone(),
            account.shell.clone(),
            account.home_dir.clone(),
            account.uid.to_string(),
        ]);
    }
    print_block(&table.to_string());

    Ok(())
}

fn show_user<R: CommandRunner>(users: &LinuxUsers<R>, username: &str) -> Result<()> {
    let account = users.get(username).context("failed to get user")?;
    let keys = users
        .authorized_keys(username)
        .context("failed to get authorized_keys")?;

    if get_output_format() == OutputFormat::Json {
        let mut data = serde_json::to_value(&account)?;
        data["authorized_keys"] = serde_json::to_value(&keys)?;
        emit(Level::Info, "users.show", &account.username, Some(data));
        return Ok(());
    }

    let keys = match keys {
        Some(keys) => keys.join("\n"),
        None => "NOT SET".to_string(),
    };
    print_block(&format!("{}\n\nAuthorized keys:\n{}", account, keys));

    Ok(())
}

fn promote_user<R: CommandRunner>(users: &LinuxUsers<R>, username: &str) -> Result<()> {
    users
        .get(username)
        .with_context(|| format!("user {} does not exist", username))?;

    if users
        .has_sudo(username)
        .context("error checking admin status")?
    {
        emit(
            Level::Info,
            "users.promote.noop",
            &format!("User {} is already an admin", username),
            None,
        );
        return Ok(());
    }

    users
        .update_sudo(username, true)
        .context("error promoting user")?;
    emit(
        Level::Success,
        "users.promote.done",
        &format!("Successfully promoted {} to admin status", username),
        None,
    );
    Ok(())
}

fn demote_user<R: CommandRunner>(users: &LinuxUsers<R>, username: &str) -> Result<()> {
    users
        .update_sudo(username, false)
        .context("error demoting user")?;
    emit(
        Level::Success,
        "users.demote.done",
        &format!("Removed admin status from {}", username),
        None,
    );
    Ok(())
}

fn set_keys<R: CommandRunner>(
    users: &LinuxUsers<R>,
    username: &str,
    input: &mut dyn BufRead,
) -> Result<()> {
    let keys = prompt_for_keys(input)?;
    users
        .update_authorized_keys(username, &keys)
        .context("failed to set authorized_keys")?;
    emit(
        Level::Success,
        "users.keys.done",
        &format!("Set {} authorized key(s) for {}", keys.len(), username),
        None,
    );
    Ok(())
}

fn remove_user<R: CommandRunner>(
    users: &LinuxUsers<R>,
    username: &str,
    keep_homedir: bool,
) -> Result<()> {
    users
        .delete(username, !keep_homedir)
        .context("failed to remove user")?;

    if let Err(err) = users.remove_sudo(username) {
        emit(
            Level::Warn,
            "users.remove.sudoers",
            &format!("failed to clean up sudoers: {}", err),
            None,
        );
    }

    emit(
        Level::Success,
        "users.remove.done",
        &format!("Removed user {}", username),
        None,
    );
    Ok(())
}
