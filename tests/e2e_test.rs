mod common;
mod utils;

use anyhow::Result;
use common::TestEnvironment;

const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIGLQ2iiojzhx0SpY84RRnZrz15FJH55+BMHnpOj62WOB alice@laptop";

fn passwd(env_root: &std::path::Path) -> String {
    format!(
        "root:x:0:0:root:/root:/bin/bash\n\
         alice:x:1001:1001:Alice Example:{root}/home/alice:/bin/bash\n\
         bob:x:1002:1002:Bob:{root}/home/bob:/bin/zsh\n",
        root = env_root.display()
    )
}

fn environment() -> Result<TestEnvironment> {
    let env = TestEnvironment::new("", "/bin/bash\n")?;
    std::fs::write(env.path().join("passwd"), passwd(env.path()))?;
    Ok(env)
}

#[test]
fn test_list_text_output() -> Result<()> {
    let env = environment()?;

    let output = utils::run_spinup_user(&env, &["list"], "")?;
    assert_eq!(output.exit_code, 0, "list failed: {}", output.stderr);
    assert!(output.stdout.contains("alice"));
    assert!(output.stdout.contains("Alice Example"));
    assert!(!output.stdout.contains("bob"));
    assert!(!output.stdout.contains("root:"));

    Ok(())
}

#[test]
fn test_list_json_output() -> Result<()> {
    let env = environment()?;

    let output = utils::run_spinup_user(&env, &["--output", "json", "list"], "")?;
    assert_eq!(output.exit_code, 0, "list failed: {}", output.stderr);

    let event: serde_json::Value = serde_json::from_str(output.stdout.trim())?;
    assert_eq!(event["code"], "users.list");
    let users = event["data"].as_array().expect("data is a list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(users[0]["uid"], 1001);

    Ok(())
}

#[test]
fn test_show_user_with_and_without_keys() -> Result<()> {
    let env = environment()?;

    let output = utils::run_spinup_user(&env, &["list", "alice"], "")?;
    assert_eq!(output.exit_code, 0, "show failed: {}", output.stderr);
    assert!(output.stdout.contains("Username: alice"));
    assert!(output.stdout.contains("NOT SET"));

    env.write_keys("alice", &[KEY])?;
    let output = utils::run_spinup_user(&env, &["list", "alice"], "")?;
    assert_eq!(output.exit_code, 0, "show failed: {}", output.stderr);
    assert!(output.stdout.contains(KEY));
    assert!(!output.stdout.contains("NOT SET"));

    Ok(())
}

#[test]
fn test_show_unknown_user_fails() -> Result<()> {
    let env = environment()?;

    let output = utils::run_spinup_user(&env, &["list", "bob"], "")?;
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("unable to find user bob"), "{}", output.stderr);

    Ok(())
}

#[test]
fn test_mutating_commands_require_root() -> Result<()> {
    if utils::is_root() {
        return Ok(());
    }
    let env = environment()?;

    for args in [
        &["promote", "alice"][..],
        &["demote", "alice"][..],
        &["remove", "alice"][..],
        &["add", "carol", "--no-ssh"][..],
    ] {
        let output = utils::run_spinup_user(&env, args, "")?;
        assert_eq!(output.exit_code, 1, "{args:?} should fail");
        assert!(output.stderr.contains("must be run as root"), "{}", output.stderr);
    }
    assert!(!env.path().join("sudoers.d/alice").exists());

    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let env = environment()?;
    std::fs::write(env.config_path(), "passwd_file = [")?;

    let output = utils::run_spinup_user(&env, &["list"], "")?;
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("parsing host config"), "{}", output.stderr);

    Ok(())
}
