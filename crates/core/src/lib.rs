pub mod document;
pub mod language;
pub mod manager;
pub mod session;
pub mod worker;

pub use document::{read_text, write_text, Document, DocumentError, DocumentId, DocumentState};
pub use language::{detect_language, LanguageHint};
pub use manager::{SaveRequest, SessionEvent, SessionManager};
pub use session::{Opened, SaveOutcome, SavePlan, SaveSnapshot, Session, SessionError, ViewState};
pub use worker::{IoCompletion, IoRequest, IoWorker};
