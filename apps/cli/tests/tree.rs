use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn cli() -> Result<Command, Box<dyn Error>> {
    Ok(Command::cargo_bin("codepad-cli")?)
}

/// 側邊欄樹狀輸出應略過隱藏檔並保留巢狀結構。 /
/// The tree listing skips dot entries and keeps nesting.
#[test]
fn tree_lists_visible_entries_with_nesting() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let root = dir.path().join("proj");
    fs::create_dir_all(root.join("sub"))?;
    fs::create_dir_all(root.join(".git"))?;
    fs::write(root.join("a.txt"), "a")?;
    fs::write(root.join(".hidden"), "h")?;
    fs::write(root.join("sub").join("b.txt"), "b")?;
    fs::write(root.join(".git").join("HEAD"), "ref")?;

    cli()?
        .args(["tree", root.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("proj/\n"))
        .stdout(predicate::str::contains("  a.txt\n"))
        .stdout(predicate::str::contains("  sub/\n    b.txt\n"))
        .stdout(predicate::str::contains("1 directories, 2 files"))
        .stdout(predicate::str::contains(".hidden").not())
        .stdout(predicate::str::contains("HEAD").not());
    Ok(())
}

#[test]
fn tree_json_mirrors_directory_entries() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("docs"))?;
    fs::write(dir.path().join("docs").join("guide.md"), "# guide")?;

    let output = cli()?
        .args(["tree", "--json", dir.path().to_str().unwrap()])
        .output()?;
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["is_directory"], true);
    let docs = &value["children"][0];
    assert_eq!(docs["name"], "docs");
    assert_eq!(docs["children"][0]["name"], "guide.md");
    assert_eq!(docs["children"][0]["is_directory"], false);
    Ok(())
}

#[test]
fn tree_rejects_files_and_missing_paths() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x")?;

    cli()?
        .args(["tree", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
    cli()?
        .args(["tree", dir.path().join("missing").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
    Ok(())
}

#[test]
fn inspect_reports_title_and_language() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("main.rs");
    fs::write(&file, "fn main() {}\n")?;

    cli()?
        .args(["inspect", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Title:    main.rs"))
        .stdout(predicate::str::contains("Language: Rust"))
        .stdout(predicate::str::contains("Lines:    1"));
    Ok(())
}

#[test]
fn inspect_refuses_binary_files() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("blob.bin");
    fs::write(&file, [0xFF, 0xFE, 0x00, 0xC3])?;

    cli()?
        .args(["inspect", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not valid UTF-8"));
    Ok(())
}
