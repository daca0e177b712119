use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::language::{detect_language, LanguageHint};

/// Title shown for documents that were never saved.
pub const UNTITLED: &str = "Untitled";

/// Stable identifier of an open document; survives tab reordering and closing of siblings.
/// 開啟中文件的穩定識別碼。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Lifecycle of a document with respect to its file.
/// 文件相對於磁碟檔案的狀態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Created by "new document" and never written anywhere.
    UnsavedNew,
    /// Buffer matches the last successful load or save.
    Saved,
    /// Buffer changed since the last load or save.
    Modified,
}

/// Errors raised while reading or writing document contents.
/// 讀寫文件內容時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid UTF-8 text")]
    Decode { path: PathBuf },
}

impl DocumentError {
    pub fn path(&self) -> &Path {
        match self {
            DocumentError::Io { path, .. } | DocumentError::Decode { path } => path,
        }
    }
}

/// In-memory state of one tab.
/// 單一分頁的記憶體內文件狀態。
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    file: Option<PathBuf>,
    text: String,
    title: String,
    state: DocumentState,
    language: Option<LanguageHint>,
    revision: u64,
}

impl Document {
    pub(crate) fn untitled(id: DocumentId) -> Self {
        Self {
            id,
            file: None,
            text: String::new(),
            title: UNTITLED.to_string(),
            state: DocumentState::UnsavedNew,
            language: None,
            revision: 0,
        }
    }

    pub(crate) fn from_file(id: DocumentId, path: PathBuf, text: String) -> Self {
        Self {
            id,
            title: file_title(&path),
            language: detect_language(&path),
            file: Some(path),
            text,
            state: DocumentState::Saved,
            revision: 0,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The file this document loads from and saves to, if any.
    /// 文件關聯的檔案；新文件為 `None`。
    pub fn associated_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full path for tab tooltips, `Untitled` for new documents.
    pub fn tooltip(&self) -> String {
        match &self.file {
            Some(path) => path.display().to_string(),
            None => UNTITLED.to_string(),
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    pub fn is_new(&self) -> bool {
        self.state == DocumentState::UnsavedNew
    }

    /// Whether closing this document now would lose text.
    /// 關閉時是否會遺失尚未儲存的內容。
    pub fn has_unsaved_changes(&self) -> bool {
        match self.state {
            DocumentState::Modified => true,
            DocumentState::UnsavedNew => !self.text.is_empty(),
            DocumentState::Saved => false,
        }
    }

    pub fn language(&self) -> Option<&LanguageHint> {
        self.language.as_ref()
    }

    /// Number of edits applied since the document was created or loaded.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the buffer. Returns `false` when the text is unchanged.
    pub(crate) fn set_text(&mut self, text: String) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text;
        self.revision = self.revision.wrapping_add(1);
        if self.state == DocumentState::Saved {
            self.state = DocumentState::Modified;
        }
        true
    }

    /// Records a completed write of the buffer as it was at `revision`.
    /// Later edits keep the document modified.
    /// 記錄某一版本內容已寫入 `path`；若之後仍有編輯則維持已修改狀態。
    pub(crate) fn mark_saved(&mut self, path: PathBuf, revision: u64) {
        self.title = file_title(&path);
        self.language = detect_language(&path);
        self.file = Some(path);
        self.state = if revision == self.revision {
            DocumentState::Saved
        } else {
            DocumentState::Modified
        };
    }
}

/// Reads the whole file and requires it to be UTF-8.
/// 讀取整個檔案並要求內容為合法 UTF-8。
pub fn read_text(path: &Path) -> Result<String, DocumentError> {
    let bytes = fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| DocumentError::Decode {
        path: path.to_path_buf(),
    })
}

/// Overwrites `path` with `text` through a sibling temporary file and a rename.
///
/// An existing `path` is resolved through symlinks first and its permissions are
/// carried over, so the link and the file mode survive the save.
/// 先寫入同目錄的暫存檔再重新命名；既有檔案會先解析符號連結並保留權限。
pub fn write_text(path: &Path, text: &str) -> Result<(), DocumentError> {
    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    let (target, permissions) = match fs::metadata(path) {
        Ok(metadata) => (fs::canonicalize(path).map_err(io_err)?, Some(metadata.permissions())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => (path.to_path_buf(), None),
        Err(err) => return Err(io_err(err)),
    };
    let tmp_path = temporary_sibling(&target);
    let written = (|| {
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(text.as_bytes())?;
        if let Some(permissions) = permissions {
            tmp_file.set_permissions(permissions)?;
        }
        tmp_file.sync_all()?;
        drop(tmp_file);
        fs::rename(&tmp_path, &target)
    })();
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(source));
    }
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.codepad-tmp"))
}

/// Tab title for a file: its base name.
pub fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
