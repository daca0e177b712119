use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("codepad-cli")?;
    cmd.env_remove("CODEPAD_CONFIG_DIR");
    Ok(cmd)
}

#[test]
fn show_prints_defaults_without_creating_the_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("preferences.json");

    cli()?
        .args(["--config", config.to_str().unwrap(), "preferences", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"style_scheme\": \"Adwaita-dark\""))
        .stdout(predicate::str::contains("\"maximized\": false"));
    assert!(!config.exists());
    Ok(())
}

#[test]
fn set_scheme_persists_known_ids_only() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("preferences.json");

    cli()?
        .args([
            "--config",
            config.to_str().unwrap(),
            "preferences",
            "set-scheme",
            "solarized-light",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Style scheme set to solarized-light"));
    let saved = fs::read_to_string(&config)?;
    assert!(saved.contains("\"style_scheme\": \"solarized-light\""));

    cli()?
        .args([
            "--config",
            config.to_str().unwrap(),
            "preferences",
            "set-scheme",
            "neon",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown style scheme 'neon'"));
    assert_eq!(fs::read_to_string(&config)?, saved);
    Ok(())
}

#[test]
fn preferences_import_and_export() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("preferences.json");
    let import_path = dir.path().join("prefs.json");
    fs::write(
        &import_path,
        r#"{
            "version": 1,
            "editor": {
                "style_scheme": "cobalt",
                "show_line_numbers": false
            },
            "window": { "width": 1024, "height": 700, "maximized": true }
        }"#,
    )?;

    cli()?
        .args([
            "--config",
            config.to_str().unwrap(),
            "preferences",
            "import",
            import_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let export_path = dir.path().join("out").join("prefs-export.json");
    cli()?
        .args([
            "--config",
            config.to_str().unwrap(),
            "preferences",
            "export",
            "--output",
            export_path.to_str().unwrap(),
        ])
        .assert()
        .success();

    let exported: serde_json::Value = serde_json::from_str(&fs::read_to_string(export_path)?)?;
    assert_eq!(exported["editor"]["style_scheme"], "cobalt");
    assert_eq!(exported["editor"]["show_line_numbers"], false);
    assert_eq!(exported["editor"]["highlight_current_line"], true);
    assert_eq!(exported["window"]["width"], 1024);
    assert_eq!(exported["window"]["maximized"], true);
    Ok(())
}

#[test]
fn config_dir_env_locates_the_preferences_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("codepad-cli")?
        .env("CODEPAD_CONFIG_DIR", dir.path())
        .args(["preferences", "set-scheme", "kate"])
        .assert()
        .success();
    assert!(dir.path().join("preferences.json").exists());

    Command::cargo_bin("codepad-cli")?
        .env("CODEPAD_CONFIG_DIR", dir.path())
        .args(["schemes", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* kate"))
        .stdout(predicate::str::contains("Adwaita-dark"));
    Ok(())
}

#[test]
fn schemes_list_marks_the_default_scheme() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let config = dir.path().join("preferences.json");

    let output = cli()?
        .args(["--config", config.to_str().unwrap(), "schemes", "list"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 9);
    assert!(stdout.lines().any(|line| line.starts_with("* Adwaita-dark")));
    assert_eq!(stdout.matches('*').count(), 1);
    Ok(())
}
