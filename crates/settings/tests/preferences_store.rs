use codepad_settings::{
    Preferences, PreferencesError, PreferencesStore, SchemeCatalog, WindowGeometry, DEFAULT_SCHEME,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn load_missing_file_returns_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");

    let store = PreferencesStore::load(&path).expect("load defaults");
    assert_eq!(store.style_scheme(), DEFAULT_SCHEME);
    assert!(store.preferences().editor.show_line_numbers);
    assert!(store.preferences().editor.highlight_current_line);
    assert!(!store.preferences().window.maximized);
    assert!(!path.exists());
}

#[test]
fn save_and_reload_roundtrip() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("preferences.json");

    let mut store = PreferencesStore::new(path.clone(), Preferences::default());
    store
        .update(|prefs| {
            prefs.editor.style_scheme = "solarized-dark".to_string();
            prefs.editor.highlight_current_line = false;
        })
        .expect("save");
    store
        .set_window_geometry(WindowGeometry {
            width: 1280,
            height: 800,
            maximized: true,
        })
        .expect("geometry");

    let reloaded = PreferencesStore::load(&path).expect("reload");
    assert_eq!(reloaded.style_scheme(), "solarized-dark");
    assert!(!reloaded.preferences().editor.highlight_current_line);
    assert_eq!(reloaded.preferences().window.width, 1280);
    assert!(reloaded.preferences().window.maximized);
}

#[test]
fn partial_files_fill_in_defaults() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(&path, r#"{ "editor": { "style_scheme": "  cobalt " } }"#).expect("seed");

    let store = PreferencesStore::load(&path).expect("load");
    assert_eq!(store.style_scheme(), "cobalt");
    assert!(store.preferences().editor.show_line_numbers);
    assert_eq!(store.preferences().window, WindowGeometry::default());
}

#[test]
fn blank_scheme_falls_back_to_default() {
    let temp = tempdir().expect("tempdir");
    let mut store = PreferencesStore::load(temp.path().join("p.json")).expect("load");
    store.set_style_scheme("   ").expect("save");
    assert_eq!(store.style_scheme(), DEFAULT_SCHEME);
}

#[test]
fn unknown_scheme_is_kept_but_resolves_to_default() {
    let temp = tempdir().expect("tempdir");
    let mut store = PreferencesStore::load(temp.path().join("p.json")).expect("load");
    store.set_style_scheme("not-installed").expect("save");

    let catalog = SchemeCatalog::builtin().expect("catalog");
    assert_eq!(store.style_scheme(), "not-installed");
    assert_eq!(catalog.resolve(store.style_scheme()).id, DEFAULT_SCHEME);
}

#[test]
fn corrupt_file_reports_parse_error() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("preferences.json");
    fs::write(&path, "{ not json").expect("seed");

    match PreferencesStore::load(&path) {
        Err(PreferencesError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn export_and_import_preserve_values_and_backup() {
    let temp = tempdir().expect("tempdir");
    let main_path = temp.path().join("preferences.json");
    let export_path = temp.path().join("export").join("prefs.json");

    let mut store = PreferencesStore::load(&main_path).expect("load");
    store.set_style_scheme("kate").expect("save");
    store.export_to(&export_path).expect("export");

    let mut other = PreferencesStore::load(temp.path().join("other.json")).expect("other");
    other.set_style_scheme("tango").expect("save other");
    let subscription = other.subscribe();
    other.import_from(&export_path).expect("import");

    assert_eq!(other.style_scheme(), "kate");
    assert_eq!(subscription.latest().as_deref(), Some("kate"));
    assert!(temp.path().join("other.bak").exists());
}
