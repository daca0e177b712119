use std::path::{Path, PathBuf};

use serde::Serialize;

/// One visible entry of a projected folder.
/// 投影資料夾中的一個可見項目（檔案或子資料夾）。
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub full_path: PathBuf,
    pub is_directory: bool,
    /// Always empty for files.
    /// 檔案項目永遠沒有子節點。
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DirectoryEntry>,
}

impl DirectoryEntry {
    /// Creates a directory node with no children yet.
    /// 建立尚未填入子節點的資料夾節點。
    pub fn directory(name: impl Into<String>, full_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            is_directory: true,
            children: Vec::new(),
        }
    }

    /// Creates a file leaf.
    /// 建立檔案葉節點。
    pub fn file(name: impl Into<String>, full_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            is_directory: false,
            children: Vec::new(),
        }
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    /// Finds the entry (this one included) whose full path equals `path`.
    /// 依完整路徑尋找節點（包含自身）。
    pub fn find(&self, path: &Path) -> Option<&DirectoryEntry> {
        if self.full_path == path {
            return Some(self);
        }
        if !path.starts_with(&self.full_path) {
            return None;
        }
        self.children.iter().find_map(|child| child.find(path))
    }

    /// Iterates every descendant in pre-order together with its depth (children of
    /// this entry are depth 1). The entry itself is not yielded.
    /// 以先序走訪所有後代節點並附帶深度；不包含自身。
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().map(|child| (child, 1)).collect(),
        }
    }

    /// Counts the files and directories below this entry.
    /// 統計此節點底下的檔案與資料夾數量。
    pub fn summary(&self) -> ProjectionSummary {
        let mut summary = ProjectionSummary::default();
        for (entry, _) in self.descendants() {
            if entry.is_directory {
                summary.directories += 1;
            } else {
                summary.files += 1;
            }
        }
        summary
    }
}

/// Pre-order iterator returned by [`DirectoryEntry::descendants`].
pub struct Descendants<'a> {
    stack: Vec<(&'a DirectoryEntry, usize)>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (&'a DirectoryEntry, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, depth) = self.stack.pop()?;
        self.stack
            .extend(entry.children.iter().rev().map(|child| (child, depth + 1)));
        Some((entry, depth))
    }
}

/// File/directory totals of a projected tree.
/// 投影結果的檔案與資料夾總數。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionSummary {
    pub files: usize,
    pub directories: usize,
}
