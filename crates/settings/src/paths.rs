use std::env;
use std::path::PathBuf;

/// Overrides the configuration directory when set.
pub const CONFIG_DIR_ENV: &str = "CODEPAD_CONFIG_DIR";

pub const PREFERENCES_FILE: &str = "preferences.json";

const APP_DIR: &str = "codepad";

/// Directory holding Codepad's configuration files.
///
/// `CODEPAD_CONFIG_DIR` wins; otherwise the platform configuration root is used
/// (`XDG_CONFIG_HOME`, `~/.config`, or `%APPDATA%` on Windows) with a `codepad`
/// subdirectory.
/// 設定檔所在目錄；可由 `CODEPAD_CONFIG_DIR` 覆寫。
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = non_empty_var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    platform_config_root().map(|root| root.join(APP_DIR))
}

/// Default location of the preferences file.
pub fn default_preferences_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(PREFERENCES_FILE))
}

#[cfg(windows)]
fn platform_config_root() -> Option<PathBuf> {
    non_empty_var("APPDATA").map(PathBuf::from)
}

#[cfg(not(windows))]
fn platform_config_root() -> Option<PathBuf> {
    non_empty_var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_var("HOME").map(|home| PathBuf::from(home).join(".config")))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
