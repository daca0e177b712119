use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

use crate::scheme::DEFAULT_SCHEME;

const PREFERENCES_VERSION: u32 = 1;

pub const DEFAULT_WINDOW_WIDTH: u32 = 960;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 640;
pub const MIN_WINDOW_WIDTH: u32 = 360;
pub const MIN_WINDOW_HEIGHT: u32 = 240;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize preferences {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub editor: EditorPreferences,
    #[serde(default)]
    pub window: WindowGeometry,
}

fn default_version() -> u32 {
    PREFERENCES_VERSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            editor: EditorPreferences::default(),
            window: WindowGeometry::default(),
        }
    }
}

impl Preferences {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        self.editor.sanitize();
        self.window.sanitize();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorPreferences {
    /// Identifier of the highlighting colour scheme.
    /// 語法配色方案的識別子。
    #[serde(default = "default_scheme")]
    pub style_scheme: String,
    #[serde(default = "default_true")]
    pub show_line_numbers: bool,
    #[serde(default = "default_true")]
    pub highlight_current_line: bool,
}

fn default_true() -> bool {
    true
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            style_scheme: default_scheme(),
            show_line_numbers: true,
            highlight_current_line: true,
        }
    }
}

impl EditorPreferences {
    fn sanitize(&mut self) {
        let trimmed = self.style_scheme.trim();
        if trimmed.is_empty() {
            self.style_scheme = default_scheme();
        } else if trimmed.len() != self.style_scheme.len() {
            self.style_scheme = trimmed.to_string();
        }
    }
}

/// Window size and maximized flag restored at startup.
/// 啟動時還原的視窗大小與最大化狀態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub maximized: bool,
}

fn default_width() -> u32 {
    DEFAULT_WINDOW_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_WINDOW_HEIGHT
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            maximized: false,
        }
    }
}

impl WindowGeometry {
    fn sanitize(&mut self) {
        self.width = self.width.max(MIN_WINDOW_WIDTH);
        self.height = self.height.max(MIN_WINDOW_HEIGHT);
    }
}

/// Receives the new style-scheme id every time the preference changes.
/// 每當配色偏好變更時接收新的方案識別子。
#[derive(Debug)]
pub struct SchemeSubscription {
    rx: Receiver<String>,
}

impl SchemeSubscription {
    /// Drains pending notifications and returns the most recent one.
    /// 取出所有待處理通知並回傳最新的一筆。
    pub fn latest(&self) -> Option<String> {
        self.rx.try_iter().last()
    }
}

#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
    subscribers: Vec<Sender<String>>,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, preferences: Preferences) -> Self {
        let mut data = preferences;
        data.sanitize();
        Self {
            path: path.into(),
            data,
            subscribers: Vec::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self::new(path, Preferences::default()));
        }

        let contents = fs::read_to_string(&path).map_err(|source| PreferencesError::Read {
            path: path.clone(),
            source,
        })?;
        let data: Preferences =
            serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(Self::new(path, data))
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data
    }

    pub fn style_scheme(&self) -> &str {
        &self.data.editor.style_scheme
    }

    /// Registers a listener for style-scheme changes.
    pub fn subscribe(&mut self) -> SchemeSubscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        SchemeSubscription { rx }
    }

    /// Mutates the preferences, persists them and notifies subscribers when the
    /// style scheme changed. Subscribers are notified even if persisting fails,
    /// since the in-memory value has changed either way.
    /// 修改並儲存偏好設定；配色變更時通知訂閱者。
    pub fn update<F>(&mut self, mut op: F) -> Result<(), PreferencesError>
    where
        F: FnMut(&mut Preferences),
    {
        let previous = self.data.editor.style_scheme.clone();
        op(&mut self.data);
        self.data.sanitize();
        let saved = self.save();
        self.notify_if_changed(&previous);
        saved
    }

    pub fn set_style_scheme(&mut self, id: impl Into<String>) -> Result<(), PreferencesError> {
        let id = id.into();
        self.update(|prefs| prefs.editor.style_scheme = id.clone())
    }

    pub fn set_window_geometry(&mut self, geometry: WindowGeometry) -> Result<(), PreferencesError> {
        if self.data.window == geometry {
            return Ok(());
        }
        self.update(|prefs| prefs.window = geometry)
    }

    pub fn overwrite(&mut self, preferences: Preferences) -> Result<(), PreferencesError> {
        let previous = self.data.editor.style_scheme.clone();
        self.data = preferences;
        self.data.sanitize();
        let saved = self.save();
        self.notify_if_changed(&previous);
        saved
    }

    pub fn save(&self) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(&self.data).map_err(|source| {
            PreferencesError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| PreferencesError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<(), PreferencesError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(&self.data).map_err(|source| {
            PreferencesError::Serialize {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, payload.as_bytes())
            .map_err(|source| PreferencesError::Write { path, source })
    }

    /// Replaces the current preferences with the file at `source`, keeping a `.bak`
    /// copy of the previous file.
    pub fn import_from(&mut self, source: impl AsRef<Path>) -> Result<(), PreferencesError> {
        let source = source.as_ref().to_path_buf();
        let contents = fs::read_to_string(&source).map_err(|err| PreferencesError::Read {
            path: source.clone(),
            source: err,
        })?;
        let data: Preferences =
            serde_json::from_str(&contents).map_err(|err| PreferencesError::Parse {
                path: source.clone(),
                source: err,
            })?;
        self.backup_existing()?;
        self.overwrite(data)
    }

    fn backup_existing(&self) -> Result<(), PreferencesError> {
        if self.path.exists() {
            let backup = self.path.with_extension("bak");
            fs::copy(&self.path, &backup).map_err(|source| PreferencesError::Write {
                path: backup,
                source,
            })?;
        }
        Ok(())
    }

    fn notify_if_changed(&mut self, previous: &str) {
        if self.data.editor.style_scheme == previous {
            return;
        }
        let current = self.data.editor.style_scheme.clone();
        self.subscribers
            .retain(|subscriber| subscriber.send(current.clone()).is_ok());
    }
}
