use std::fs;
use std::path::{Path, PathBuf};

use codepad_project::{project, DirectoryEntry, ProjectError, ProjectionSummary};
use thiserror::Error;

use crate::document::{read_text, write_text, Document, DocumentError, DocumentId};

/// Which surface the window shows.
/// 視窗目前應顯示的畫面。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No documents open.
    Greeter,
    /// At least one document open.
    Tabs,
}

/// Errors surfaced by session operations. None of them leaves the session half-updated.
/// 工作階段操作錯誤；發生錯誤時狀態不會被部分修改。
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error("document {0} is not open")]
    UnknownDocument(DocumentId),
    #[error("{0} is not a file in the open folder")]
    NotInTree(PathBuf),
    #[error("background I/O worker is no longer running")]
    WorkerGone,
}

impl SessionError {
    /// `true` for the "file is not UTF-8 text" case.
    pub fn is_decode(&self) -> bool {
        matches!(self, SessionError::Document(DocumentError::Decode { .. }))
    }
}

/// Result of an `open` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opened {
    Document(DocumentId),
    Folder {
        root: PathBuf,
        summary: ProjectionSummary,
    },
}

/// What a save request resolved to before any I/O happens.
/// 儲存請求在實際寫入前的決策結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePlan {
    Write(SaveSnapshot),
    /// Empty buffer; nothing to write.
    Skip,
    /// No associated file; the caller has to pick a destination and use `save_as`.
    NeedsDestination,
}

/// Buffer contents captured at the moment a save was requested.
/// 請求儲存當下擷取的緩衝區快照。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSnapshot {
    pub id: DocumentId,
    pub path: PathBuf,
    pub text: String,
    pub revision: u64,
}

/// Result of a synchronous save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { path: PathBuf },
    Skipped,
    NeedsDestination,
}

/// Open documents, the active tab and the projected root folder.
///
/// All mutation goes through `&mut self`; the session is owned by one thread and
/// background work reports back through [`crate::SessionManager`].
///
/// 目前開啟的文件、作用中分頁與專案根資料夾；只由單一執行緒持有並修改。
#[derive(Debug, Default)]
pub struct Session {
    documents: Vec<Document>,
    active: Option<usize>,
    root_folder: Option<PathBuf>,
    tree: Option<DirectoryEntry>,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn view_state(&self) -> ViewState {
        if self.documents.is_empty() {
            ViewState::Greeter
        } else {
            ViewState::Tabs
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_document(&self) -> Option<&Document> {
        self.active.and_then(|index| self.documents.get(index))
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id() == id)
    }

    pub fn root_folder(&self) -> Option<&Path> {
        self.root_folder.as_deref()
    }

    /// Tree of the folder opened last, if any.
    pub fn tree(&self) -> Option<&DirectoryEntry> {
        self.tree.as_ref()
    }

    /// Appends an empty untitled document and activates it.
    /// 新增空白文件並設為作用中分頁。
    pub fn new_document(&mut self) -> DocumentId {
        let id = self.allocate_id();
        self.push(Document::untitled(id));
        tracing::debug!(%id, "new document");
        id
    }

    /// Opens `path` synchronously: folders are projected into the sidebar tree,
    /// files become a new active document.
    /// 同步開啟：資料夾會投影到側邊欄，檔案則新增為作用中文件。
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<Opened, SessionError> {
        let path = path.as_ref();
        let is_dir = fs::metadata(path)
            .map_err(|source| DocumentError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .is_dir();
        if is_dir {
            let tree = project(path)?;
            let summary = tree.summary();
            self.replace_tree(path.to_path_buf(), tree);
            return Ok(Opened::Folder {
                root: path.to_path_buf(),
                summary,
            });
        }
        let text = read_text(path)?;
        Ok(Opened::Document(
            self.insert_loaded(path.to_path_buf(), text),
        ))
    }

    /// Checks that `path` names a file of the projected tree.
    /// 確認路徑為目前資料夾樹中的檔案。
    pub fn tree_file(&self, path: &Path) -> Result<PathBuf, SessionError> {
        self.tree
            .as_ref()
            .and_then(|tree| tree.find(path))
            .filter(|entry| entry.is_file())
            .map(|entry| entry.full_path.clone())
            .ok_or_else(|| SessionError::NotInTree(path.to_path_buf()))
    }

    /// Opens a file selected in the sidebar tree.
    pub fn open_tree_entry(&mut self, path: impl AsRef<Path>) -> Result<DocumentId, SessionError> {
        let path = self.tree_file(path.as_ref())?;
        let text = read_text(&path)?;
        Ok(self.insert_loaded(path, text))
    }

    /// Adds a document whose contents were already read from `path`.
    pub fn insert_loaded(&mut self, path: PathBuf, text: String) -> DocumentId {
        let id = self.allocate_id();
        tracing::debug!(%id, path = %path.display(), "document loaded");
        self.push(Document::from_file(id, path, text));
        id
    }

    /// Replaces the root folder and its tree wholesale.
    /// 整批取代根資料夾與其樹狀結構。
    pub fn replace_tree(&mut self, root: PathBuf, tree: DirectoryEntry) {
        self.root_folder = Some(root);
        self.tree = Some(tree);
    }

    /// Replaces the buffer text of `id`.
    pub fn edit(&mut self, id: DocumentId, text: impl Into<String>) -> Result<bool, SessionError> {
        let doc = self.document_mut(id)?;
        Ok(doc.set_text(text.into()))
    }

    pub fn activate(&mut self, id: DocumentId) -> Result<(), SessionError> {
        let index = self.index_of(id)?;
        self.active = Some(index);
        Ok(())
    }

    /// Decides how a save of `id` proceeds. `destination` overrides the associated file
    /// (save-as); without either the caller must prompt for a path first.
    /// 決定儲存流程；`destination` 代表另存新檔。
    pub fn plan_save(
        &self,
        id: DocumentId,
        destination: Option<PathBuf>,
    ) -> Result<SavePlan, SessionError> {
        let doc = self
            .document(id)
            .ok_or(SessionError::UnknownDocument(id))?;
        if doc.text().is_empty() {
            return Ok(SavePlan::Skip);
        }
        let Some(path) = destination.or_else(|| doc.associated_file().map(Path::to_path_buf))
        else {
            return Ok(SavePlan::NeedsDestination);
        };
        Ok(SavePlan::Write(SaveSnapshot {
            id,
            path,
            text: doc.text().to_string(),
            revision: doc.revision(),
        }))
    }

    /// Applies a finished write. Returns `false` when the document was closed meanwhile.
    /// 套用已完成的寫入；若文件已關閉則回傳 `false`。
    pub fn finish_save(&mut self, id: DocumentId, path: PathBuf, revision: u64) -> bool {
        match self.documents.iter_mut().find(|doc| doc.id() == id) {
            Some(doc) => {
                doc.mark_saved(path, revision);
                true
            }
            None => false,
        }
    }

    /// Saves `id` to its associated file synchronously.
    pub fn save(&mut self, id: DocumentId) -> Result<SaveOutcome, SessionError> {
        self.save_with(id, None)
    }

    /// Saves `id` to `path` synchronously and associates the document with it.
    pub fn save_as(
        &mut self,
        id: DocumentId,
        path: impl Into<PathBuf>,
    ) -> Result<SaveOutcome, SessionError> {
        self.save_with(id, Some(path.into()))
    }

    fn save_with(
        &mut self,
        id: DocumentId,
        destination: Option<PathBuf>,
    ) -> Result<SaveOutcome, SessionError> {
        match self.plan_save(id, destination)? {
            SavePlan::Skip => Ok(SaveOutcome::Skipped),
            SavePlan::NeedsDestination => Ok(SaveOutcome::NeedsDestination),
            SavePlan::Write(snapshot) => {
                write_text(&snapshot.path, &snapshot.text)?;
                self.finish_save(snapshot.id, snapshot.path.clone(), snapshot.revision);
                Ok(SaveOutcome::Saved {
                    path: snapshot.path,
                })
            }
        }
    }

    /// Closes `id` without asking about unsaved changes and returns it.
    /// The neighbouring tab becomes active.
    /// 關閉文件（不會詢問未儲存變更），並啟用相鄰分頁。
    pub fn close(&mut self, id: DocumentId) -> Result<Document, SessionError> {
        let index = self.index_of(id)?;
        let removed = self.documents.remove(index);
        self.active = match self.active {
            _ if self.documents.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) if active == index => Some(index.min(self.documents.len() - 1)),
            other => other,
        };
        tracing::debug!(%id, remaining = self.documents.len(), "document closed");
        Ok(removed)
    }

    fn push(&mut self, document: Document) {
        self.documents.push(document);
        self.active = Some(self.documents.len() - 1);
    }

    fn allocate_id(&mut self) -> DocumentId {
        self.next_id += 1;
        DocumentId::new(self.next_id)
    }

    fn index_of(&self, id: DocumentId) -> Result<usize, SessionError> {
        self.documents
            .iter()
            .position(|doc| doc.id() == id)
            .ok_or(SessionError::UnknownDocument(id))
    }

    fn document_mut(&mut self, id: DocumentId) -> Result<&mut Document, SessionError> {
        self.documents
            .iter_mut()
            .find(|doc| doc.id() == id)
            .ok_or(SessionError::UnknownDocument(id))
    }
}
