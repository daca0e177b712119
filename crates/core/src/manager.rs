use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use codepad_project::ProjectionSummary;

use crate::document::{Document, DocumentId};
use crate::session::{SavePlan, Session, SessionError};
use crate::worker::{IoCompletion, IoRequest, IoWorker};

/// Something the user should hear about after a background operation finished.
/// 背景作業完成後需要通知使用者的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    DocumentOpened(DocumentId),
    FolderOpened {
        root: PathBuf,
        summary: ProjectionSummary,
    },
    /// `still_open` is `false` when the tab was closed before the write finished.
    Saved {
        id: DocumentId,
        path: PathBuf,
        still_open: bool,
    },
}

/// Immediate answer to a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRequest {
    Queued,
    /// Empty buffer: no write, no state change, no notice.
    Skipped,
    /// New document; prompt for a location and call `request_save_as`.
    NeedsDestination,
}

/// Owns the [`Session`] and routes its file I/O through an [`IoWorker`].
///
/// Requests return immediately. Their completions are applied by [`poll`] on the
/// thread that owns the manager, so the session is only ever mutated there.
/// Folder walks may finish out of order; a projection older than one already
/// applied is dropped, so the most recently requested folder wins.
///
/// [`poll`]: SessionManager::poll
pub struct SessionManager {
    session: Session,
    worker: IoWorker,
    in_flight: usize,
    last_ticket: u64,
    settled_projection: u64,
}

impl SessionManager {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            session: Session::new(),
            worker: IoWorker::spawn()?,
            in_flight: 0,
            last_ticket: 0,
            settled_projection: 0,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of requests whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn new_document(&mut self) -> DocumentId {
        self.session.new_document()
    }

    pub fn edit(&mut self, id: DocumentId, text: impl Into<String>) -> Result<bool, SessionError> {
        self.session.edit(id, text)
    }

    pub fn activate(&mut self, id: DocumentId) -> Result<(), SessionError> {
        self.session.activate(id)
    }

    pub fn close(&mut self, id: DocumentId) -> Result<Document, SessionError> {
        self.session.close(id)
    }

    /// Starts opening a file or folder.
    /// 開始非同步開啟檔案或資料夾。
    pub fn request_open(&mut self, path: impl Into<PathBuf>) -> Result<(), SessionError> {
        let path = path.into();
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        tracing::info!(path = %path.display(), ticket, "open requested");
        self.submit(IoRequest::Open { path, ticket })
    }

    /// Starts opening a file picked from the sidebar tree.
    pub fn request_open_tree_entry(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = self.session.tree_file(path.as_ref())?;
        self.request_open(path)
    }

    /// Starts saving `id` to its associated file, using the buffer as it is now.
    /// 以目前緩衝區內容開始儲存至關聯檔案。
    pub fn request_save(&mut self, id: DocumentId) -> Result<SaveRequest, SessionError> {
        self.request_save_to(id, None)
    }

    /// Starts saving `id` to `path`; on success the document is associated with it.
    pub fn request_save_as(
        &mut self,
        id: DocumentId,
        path: impl Into<PathBuf>,
    ) -> Result<SaveRequest, SessionError> {
        self.request_save_to(id, Some(path.into()))
    }

    fn request_save_to(
        &mut self,
        id: DocumentId,
        destination: Option<PathBuf>,
    ) -> Result<SaveRequest, SessionError> {
        match self.session.plan_save(id, destination)? {
            SavePlan::Skip => Ok(SaveRequest::Skipped),
            SavePlan::NeedsDestination => Ok(SaveRequest::NeedsDestination),
            SavePlan::Write(snapshot) => {
                tracing::info!(%id, path = %snapshot.path.display(), "save requested");
                self.submit(IoRequest::Save(snapshot))?;
                Ok(SaveRequest::Queued)
            }
        }
    }

    /// Applies every completion that is already available.
    /// 套用所有已完成的背景作業。
    pub fn poll(&mut self) -> Vec<Result<SessionEvent, SessionError>> {
        let mut events = Vec::new();
        while let Some(completion) = self.worker.try_next() {
            events.extend(self.apply(completion));
        }
        events
    }

    /// Blocks up to `timeout` for the next completion that produces an event.
    ///
    /// Returns `None` on timeout, or once nothing is left in flight after a
    /// superseded projection was dropped.
    pub fn wait_next(&mut self, timeout: Duration) -> Option<Result<SessionEvent, SessionError>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let completion = self.worker.recv_timeout(remaining)?;
            if let Some(event) = self.apply(completion) {
                return Some(event);
            }
            if self.in_flight == 0 {
                return None;
            }
        }
    }

    fn submit(&mut self, request: IoRequest) -> Result<(), SessionError> {
        self.worker
            .submit(request)
            .map_err(|_| SessionError::WorkerGone)?;
        self.in_flight += 1;
        Ok(())
    }

    fn apply(&mut self, completion: IoCompletion) -> Option<Result<SessionEvent, SessionError>> {
        self.in_flight = self.in_flight.saturating_sub(1);
        let applied = match completion {
            IoCompletion::Loaded { path, result } => match result {
                Ok(text) => Ok(SessionEvent::DocumentOpened(
                    self.session.insert_loaded(path, text),
                )),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "open failed");
                    Err(err.into())
                }
            },
            IoCompletion::Projected { root, ticket, .. } if ticket < self.settled_projection => {
                tracing::debug!(
                    root = %root.display(),
                    ticket,
                    newest = self.settled_projection,
                    "dropping superseded projection"
                );
                return None;
            }
            IoCompletion::Projected {
                root,
                ticket,
                result,
            } => {
                self.settled_projection = ticket;
                match result {
                    Ok(tree) => {
                        let summary = tree.summary();
                        tracing::info!(
                            root = %root.display(),
                            files = summary.files,
                            directories = summary.directories,
                            "folder projected"
                        );
                        self.session.replace_tree(root.clone(), tree);
                        Ok(SessionEvent::FolderOpened { root, summary })
                    }
                    Err(err) => {
                        tracing::warn!(
                            root = %root.display(),
                            error = %err,
                            "folder projection failed"
                        );
                        Err(err.into())
                    }
                }
            }
            IoCompletion::Written {
                id,
                path,
                revision,
                result,
            } => match result {
                Ok(()) => {
                    let still_open = self.session.finish_save(id, path.clone(), revision);
                    tracing::info!(%id, path = %path.display(), "saved");
                    Ok(SessionEvent::Saved {
                        id,
                        path,
                        still_open,
                    })
                }
                Err(err) => {
                    tracing::warn!(%id, path = %path.display(), error = %err, "save failed");
                    Err(err.into())
                }
            },
        };
        Some(applied)
    }
}
