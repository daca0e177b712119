use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use codepad_project::{project, DirectoryEntry, ProjectError};

use crate::document::{read_text, write_text, DocumentError, DocumentId};
use crate::session::SaveSnapshot;

/// Work handed to the background I/O thread.
/// 交給背景 I/O 執行緒的工作。
#[derive(Debug)]
pub enum IoRequest {
    /// Read a file, or project it when it turns out to be a folder.
    ///
    /// `ticket` increases with every open request and comes back on the
    /// projection so older walks can be told apart from newer ones.
    Open { path: PathBuf, ticket: u64 },
    Save(SaveSnapshot),
}

/// Finished work, delivered back to the thread that owns the session.
/// 完成的工作，會送回持有工作階段的執行緒。
#[derive(Debug)]
pub enum IoCompletion {
    Loaded {
        path: PathBuf,
        result: Result<String, DocumentError>,
    },
    Projected {
        root: PathBuf,
        ticket: u64,
        result: Result<DirectoryEntry, ProjectError>,
    },
    Written {
        id: DocumentId,
        path: PathBuf,
        revision: u64,
        result: Result<(), DocumentError>,
    },
}

/// Background thread executing [`IoRequest`]s in submission order.
///
/// Folder projections run on their own short-lived thread so a large walk never
/// delays a pending save.
///
/// 依提交順序執行 I/O 請求的背景執行緒；資料夾投影另開執行緒以免阻塞儲存。
pub struct IoWorker {
    requests: Option<Sender<IoRequest>>,
    completions: Receiver<IoCompletion>,
    handle: Option<JoinHandle<()>>,
}

impl IoWorker {
    pub fn spawn() -> io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<IoRequest>();
        let (completion_tx, completion_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("codepad-io".into())
            .spawn(move || {
                for request in request_rx {
                    if run(request, &completion_tx).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            requests: Some(request_tx),
            completions: completion_rx,
            handle: Some(handle),
        })
    }

    /// Queues `request`; fails only when the worker thread has exited.
    pub fn submit(&self, request: IoRequest) -> Result<(), IoRequest> {
        match &self.requests {
            Some(tx) => tx.send(request).map_err(|err| err.0),
            None => Err(request),
        }
    }

    /// Returns the next completion without blocking.
    /// 非阻塞地取得下一個完成事件。
    pub fn try_next(&self) -> Option<IoCompletion> {
        self.completions.try_recv().ok()
    }

    /// Waits up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<IoCompletion> {
        self.completions.recv_timeout(timeout).ok()
    }
}

impl Drop for IoWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(request: IoRequest, completions: &Sender<IoCompletion>) -> Result<(), ()> {
    let completion = match request {
        IoRequest::Open { path, ticket } => {
            if fs::metadata(&path).map(|meta| meta.is_dir()).unwrap_or(false) {
                let root = path.clone();
                let tx = completions.clone();
                let spawned = thread::Builder::new()
                    .name("codepad-project".into())
                    .spawn(move || {
                        let result = project(&path);
                        let _ = tx.send(IoCompletion::Projected {
                            root: path,
                            ticket,
                            result,
                        });
                    });
                match spawned {
                    Ok(_) => return Ok(()),
                    Err(source) => {
                        tracing::warn!(error = %source, "failed to spawn projection thread");
                        IoCompletion::Projected {
                            root: root.clone(),
                            ticket,
                            result: Err(ProjectError::Io { path: root, source }),
                        }
                    }
                }
            } else {
                let result = read_text(&path);
                IoCompletion::Loaded { path, result }
            }
        }
        IoRequest::Save(snapshot) => {
            let result = write_text(&snapshot.path, &snapshot.text);
            IoCompletion::Written {
                id: snapshot.id,
                path: snapshot.path,
                revision: snapshot.revision,
                result,
            }
        }
    };
    completions.send(completion).map_err(|_| ())
}
