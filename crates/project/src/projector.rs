use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::tree::DirectoryEntry;

/// Errors produced while projecting a folder.
/// 投影資料夾時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Returns `true` for dot-prefixed names, which are never listed nor traversed.
/// 以 `.` 開頭的名稱視為隱藏項目。
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Walks `root` depth-first and returns it with every visible descendant attached.
///
/// Children keep the order in which the filesystem reports them. Symbolic links are
/// listed according to their target but never descended into. Any read failure
/// aborts the whole projection; a partially built tree is never returned.
///
/// 以深度優先方式走訪 `root` 並回傳完整的樹；任何讀取錯誤都會中止整個投影，
/// 不會回傳部分結果。
pub fn project(root: impl AsRef<Path>) -> Result<DirectoryEntry, ProjectError> {
    let root = root.as_ref();
    let metadata = fs::metadata(root).map_err(|source| ProjectError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ProjectError::NotADirectory(root.to_path_buf()));
    }

    // stack[d] holds the open directory at depth d; a directory is attached to its
    // parent only once all of its own children have been collected.
    let mut stack = vec![DirectoryEntry::directory(display_name(root), root)];

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(&entry.file_name().to_string_lossy()));

    for item in walker {
        let entry = item.map_err(walk_error)?;
        let depth = entry.depth();
        while stack.len() > depth {
            close_directory(&mut stack);
        }

        match classify(&entry) {
            Some(EntryKind::Directory) => {
                stack.push(DirectoryEntry::directory(
                    entry.file_name().to_string_lossy(),
                    entry.path(),
                ));
            }
            Some(EntryKind::LinkedDirectory) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(DirectoryEntry::directory(
                        entry.file_name().to_string_lossy(),
                        entry.path(),
                    ));
                }
            }
            Some(EntryKind::File) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(DirectoryEntry::file(
                        entry.file_name().to_string_lossy(),
                        entry.path(),
                    ));
                }
            }
            None => {
                tracing::trace!(path = %entry.path().display(), "skipping special entry");
            }
        }
    }

    while stack.len() > 1 {
        close_directory(&mut stack);
    }
    let tree = stack.pop().ok_or_else(|| ProjectError::Io {
        path: root.to_path_buf(),
        source: io::Error::new(io::ErrorKind::Other, "projection stack underflow"),
    })?;
    Ok(tree)
}

enum EntryKind {
    Directory,
    LinkedDirectory,
    File,
}

fn classify(entry: &DirEntry) -> Option<EntryKind> {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return Some(EntryKind::Directory);
    }
    if file_type.is_file() {
        return Some(EntryKind::File);
    }
    if file_type.is_symlink() {
        // 連結目標失效時直接略過。 / Dangling links are skipped.
        let target = fs::metadata(entry.path()).ok()?;
        if target.is_dir() {
            return Some(EntryKind::LinkedDirectory);
        }
        if target.is_file() {
            return Some(EntryKind::File);
        }
    }
    None
}

fn close_directory(stack: &mut Vec<DirectoryEntry>) {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(done);
        } else {
            stack.push(done);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn walk_error(err: walkdir::Error) -> ProjectError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    ProjectError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn names(entry: &DirectoryEntry) -> BTreeSet<String> {
        entry.children.iter().map(|child| child.name.clone()).collect()
    }

    #[test]
    fn project_skips_hidden_entries_and_keeps_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join(".hidden"), "secret").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("b.txt"), "b").unwrap();

        let tree = project(root).unwrap();
        assert!(tree.is_directory);
        assert_eq!(tree.full_path, root);
        assert_eq!(
            names(&tree),
            ["a.txt", "sub"].iter().map(|s| s.to_string()).collect()
        );

        let sub = tree.children.iter().find(|c| c.name == "sub").unwrap();
        assert!(sub.is_directory);
        assert_eq!(sub.children.len(), 1);
        assert_eq!(sub.children[0].name, "b.txt");
        assert_eq!(sub.children[0].full_path, root.join("sub").join("b.txt"));
        assert!(sub.children[0].is_file());
    }

    #[test]
    fn hidden_directories_are_not_traversed() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git").join("objects")).unwrap();
        fs::write(root.join(".git").join("HEAD"), "ref").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let tree = project(root).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "main.rs");
        assert!(tree
            .descendants()
            .all(|(entry, _)| !entry.full_path.components().any(|c| c.as_os_str() == ".git")));
    }

    #[test]
    fn project_accepts_hidden_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(".config");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("settings.toml"), "").unwrap();

        let tree = project(&root).unwrap();
        assert_eq!(tree.name, ".config");
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn project_rejects_files_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            project(&file),
            Err(ProjectError::NotADirectory(path)) if path == file
        ));
        assert!(matches!(
            project(dir.path().join("missing")),
            Err(ProjectError::Io { .. })
        ));
    }

    #[test]
    fn every_visible_entry_appears_once_at_its_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a").join("b").join("c")).unwrap();
        fs::write(root.join("a").join("one.txt"), "").unwrap();
        fs::write(root.join("a").join("b").join("two.txt"), "").unwrap();
        fs::write(root.join("a").join("b").join("c").join("three.txt"), "").unwrap();
        fs::write(root.join("a").join("b").join(".skip"), "").unwrap();

        let tree = project(root).unwrap();
        let listed: Vec<_> = tree
            .descendants()
            .map(|(entry, depth)| {
                let relative = entry.full_path.strip_prefix(root).unwrap().to_path_buf();
                (relative, depth)
            })
            .collect();
        for (relative, depth) in &listed {
            assert_eq!(relative.components().count(), *depth);
        }
        let unique: BTreeSet<_> = listed.iter().map(|(path, _)| path.clone()).collect();
        assert_eq!(unique.len(), listed.len());
        assert_eq!(listed.len(), 6);
        assert_eq!(
            tree.summary(),
            crate::ProjectionSummary {
                files: 3,
                directories: 3
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn linked_directories_are_listed_but_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("real")).unwrap();
        fs::write(root.join("real").join("inner.txt"), "").unwrap();
        std::os::unix::fs::symlink(root, root.join("real").join("loop")).unwrap();

        let tree = project(root).unwrap();
        let real = tree.children.iter().find(|c| c.name == "real").unwrap();
        let link = real.children.iter().find(|c| c.name == "loop").unwrap();
        assert!(link.is_directory);
        assert!(link.children.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_fails_with_its_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "a").unwrap();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("inner.txt"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Running with CAP_DAC_OVERRIDE; nothing to observe.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = project(root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        match result {
            Err(ProjectError::Io { path, source }) => {
                assert_eq!(path, locked);
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
