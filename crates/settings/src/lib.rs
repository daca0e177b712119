pub mod paths;
pub mod preferences;
pub mod scheme;

pub use paths::{config_dir, default_preferences_path, CONFIG_DIR_ENV, PREFERENCES_FILE};
pub use preferences::{
    EditorPreferences, Preferences, PreferencesError, PreferencesStore, SchemeSubscription,
    WindowGeometry,
};
pub use scheme::{
    Color, ColorParseError, SchemeCatalog, SchemeKind, SchemePalette, StyleScheme, DEFAULT_SCHEME,
};
