use std::fs;
use std::time::Duration;

use codepad_core::{
    DocumentState, SaveOutcome, SaveRequest, Session, SessionEvent, SessionManager, ViewState,
};
use tempfile::tempdir;

fn seed_project(root: &std::path::Path) {
    fs::create_dir_all(root.join("sub")).expect("mkdir");
    fs::write(root.join("a.txt"), "original").expect("a.txt");
    fs::write(root.join(".hidden"), "secret").expect(".hidden");
    fs::write(root.join("sub").join("b.txt"), "b").expect("b.txt");
}

/// 開啟資料夾、從樹中開檔、編輯並儲存。 /
/// Folder open, tree selection, edit and save in one synchronous session.
#[test]
fn folder_edit_save_flow() {
    let temp = tempdir().expect("tempdir");
    let root = temp.path().join("proj");
    seed_project(&root);

    let mut session = Session::new();
    session.open(&root).expect("open folder");
    let tree = session.tree().expect("tree");
    let mut names: Vec<_> = tree.children.iter().map(|entry| entry.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["a.txt", "sub"]);
    assert_eq!(session.view_state(), ViewState::Greeter);

    let id = session
        .open_tree_entry(root.join("a.txt"))
        .expect("open a.txt");
    assert_eq!(session.view_state(), ViewState::Tabs);
    assert_eq!(session.document(id).expect("doc").title(), "a.txt");

    session.edit(id, "hello").expect("edit");
    assert_eq!(
        session.document(id).expect("doc").state(),
        DocumentState::Modified
    );
    let outcome = session.save(id).expect("save");
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            path: root.join("a.txt")
        }
    );
    assert_eq!(fs::read(root.join("a.txt")).expect("read"), b"hello");

    session.save(id).expect("save again");
    assert_eq!(fs::read(root.join("a.txt")).expect("read"), b"hello");
    assert_eq!(
        session.document(id).expect("doc").state(),
        DocumentState::Saved
    );

    session.close(id).expect("close");
    assert_eq!(session.view_state(), ViewState::Greeter);
}

/// 透過背景工作者完成新文件的另存新檔。 /
/// A new document saved through the background worker picks up the file name.
#[test]
fn untitled_document_saved_through_the_manager() {
    let temp = tempdir().expect("tempdir");
    let target = temp.path().join("notes.md");

    let mut manager = SessionManager::new().expect("manager");
    let id = manager.new_document();
    manager.edit(id, "# notes\n").expect("edit");
    assert_eq!(
        manager.request_save(id).expect("save"),
        SaveRequest::NeedsDestination
    );
    assert_eq!(
        manager.request_save_as(id, &target).expect("save as"),
        SaveRequest::Queued
    );

    let event = manager
        .wait_next(Duration::from_secs(5))
        .expect("completion")
        .expect("saved");
    assert!(matches!(event, SessionEvent::Saved { still_open: true, .. }));

    let doc = manager.session().document(id).expect("doc");
    assert_eq!(doc.title(), "notes.md");
    assert_eq!(doc.state(), DocumentState::Saved);
    assert_eq!(doc.language().map(|hint| hint.id), Some("markdown"));
    assert_eq!(fs::read_to_string(&target).expect("read"), "# notes\n");
}
