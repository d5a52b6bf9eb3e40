//! Persist user settings to disk (XDG config or ~/.config/ascii-tetris) as `key=value` lines.

use anyhow::Result;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const FILENAME: &str = "settings";

/// Key under which the selected theme id is stored.
pub const THEME_KEY: &str = "ascii-tetris-theme";

/// Returns the default settings path (config dir / ascii-tetris / settings).
fn config_path() -> PathBuf {
    let home_config = || {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    };
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => home_config(),
    };
    base.join("ascii-tetris").join(FILENAME)
}

/// Key-value settings file.
#[derive(Debug, Clone)]
pub struct Settings {
    path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self::at(config_path())
    }
}

impl Settings {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value for `key`; `None` when the file or the key is missing.
    pub fn get(&self, key: &str) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        parse_settings(&content)
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Store `value` under `key`, keeping every other entry. Creates the config directory if needed.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = fs::read_to_string(&self.path)
            .map(|c| parse_settings(&c))
            .unwrap_or_default();
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body: String = entries
            .iter()
            .map(|(k, v)| format!("{k}={v}\n"))
            .collect();
        fs::write(&self.path, body)?;
        debug!("saved {key}={value} to {}", self.path.display());
        Ok(())
    }

    pub fn theme_id(&self) -> Option<String> {
        self.get(THEME_KEY)
    }

    pub fn save_theme_id(&self, id: &str) -> Result<()> {
        self.set(THEME_KEY, id)
    }
}

/// Parse `key=value` lines; blank lines and `#` comments are skipped.
fn parse_settings(s: &str) -> Vec<(String, String)> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Settings in a fresh temp directory that is removed again when this drops.
#[cfg(test)]
pub struct ScratchSettings {
    pub settings: Settings,
    dir: PathBuf,
}

#[cfg(test)]
impl ScratchSettings {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "ascii-tetris-test-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&dir);
        let settings = Settings::at(dir.join("nested").join(FILENAME));
        Self { settings, dir }
    }
}

#[cfg(test)]
impl Drop for ScratchSettings {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let entries = parse_settings("# comment\n\nascii-tetris-theme = ocean\nbogus\n=x\n");
        assert_eq!(
            entries,
            vec![("ascii-tetris-theme".to_string(), "ocean".to_string())]
        );
    }

    #[test]
    fn test_missing_file_has_no_theme() {
        let scratch = ScratchSettings::new("missing");
        assert_eq!(scratch.settings.theme_id(), None);
    }

    #[test]
    fn test_theme_round_trip_keeps_other_keys() {
        let scratch = ScratchSettings::new("round-trip");
        let settings = &scratch.settings;
        settings.set("other", "1").unwrap();
        settings.save_theme_id("ocean").unwrap();
        settings.save_theme_id("electronika").unwrap();

        assert_eq!(settings.theme_id().as_deref(), Some("electronika"));
        assert_eq!(settings.get("other").as_deref(), Some("1"));
        let body = fs::read_to_string(settings.path()).unwrap();
        assert_eq!(body.lines().count(), 2);
    }

    #[test]
    fn test_scratch_directory_is_removed_on_drop() {
        let scratch = ScratchSettings::new("cleanup");
        scratch.settings.save_theme_id("ocean").unwrap();
        let dir = scratch.dir.clone();
        assert!(dir.exists());
        drop(scratch);
        assert!(!dir.exists());
    }
}
