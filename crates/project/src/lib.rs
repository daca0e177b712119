//! Folder projection for the Codepad sidebar.
//! 將專案資料夾投影為側邊欄樹狀結構的核心模組。

pub mod projector;
pub mod tree;

pub use projector::{is_hidden, project, ProjectError};
pub use tree::{Descendants, DirectoryEntry, ProjectionSummary};
