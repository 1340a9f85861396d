use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::settings::GlobalSettings;

pub fn settings_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".timesplit.json");
    Some(path)
}

/// Global settings from the default location. A missing or unreadable file
/// yields the defaults.
pub fn read_settings() -> GlobalSettings {
    settings_path()
        .and_then(|path| read_settings_from(&path))
        .unwrap_or_default()
}

pub fn write_settings(settings: &GlobalSettings) -> Result<(), io::Error> {
    let path = settings_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Home directory not found"))?;
    write_settings_to(&path, settings)
}

pub fn read_settings_from(path: &Path) -> Option<GlobalSettings> {
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

pub fn write_settings_to(path: &Path, settings: &GlobalSettings) -> Result<(), io::Error> {
    let json = serde_json::to_string_pretty(settings).map_err(io::Error::other)?;
    fs::write(path, json)
}
