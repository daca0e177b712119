mod actions;
mod app;
mod style;
mod title;

use std::error::Error;
use std::path::PathBuf;

use eframe::{egui, NativeOptions};
use tracing_subscriber::EnvFilter;

use codepad_core::SessionManager;
use codepad_settings::{
    default_preferences_path, Preferences, PreferencesStore, SchemeCatalog, PREFERENCES_FILE,
};

use crate::app::CodepadApp;
use crate::title::APP_TITLE;

const DEFAULT_LOG_FILTER: &str = "codepad=info";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn load_preferences() -> PreferencesStore {
    let path = default_preferences_path().unwrap_or_else(|| PathBuf::from(PREFERENCES_FILE));
    match PreferencesStore::load(&path) {
        Ok(store) => store,
        Err(err) => {
            tracing::warn!(error = %err, "preferences unreadable, using defaults");
            PreferencesStore::new(path, Preferences::default())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();

    let preferences = load_preferences();
    let catalog = SchemeCatalog::builtin()?;
    let manager = SessionManager::new()?;
    let geometry = preferences.preferences().window;
    tracing::info!(
        path = %preferences.path().display(),
        scheme = preferences.style_scheme(),
        "starting"
    );

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_TITLE)
            .with_inner_size([geometry.width as f32, geometry.height as f32])
            .with_maximized(geometry.maximized),
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Box::new(CodepadApp::new(cc, manager, preferences, catalog))),
    )?;
    Ok(())
}
