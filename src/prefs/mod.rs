use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to read preferences: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse preferences: {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to write preferences: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode preferences: {source}")]
    Encode {
        #[source]
        source: serde_yaml::Error,
    },
}

/// Durable string key-value storage for UI preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Reads the saved theme; anything other than `dark` means light.
pub fn load_theme(store: &dyn PreferenceStore) -> Result<Theme, PreferenceError> {
    Ok(match store.get(THEME_KEY)?.as_deref() {
        Some("dark") => Theme::Dark,
        _ => Theme::Light,
    })
}

pub fn save_theme(store: &mut dyn PreferenceStore, theme: Theme) -> Result<(), PreferenceError> {
    store.set(THEME_KEY, theme.as_str())
}

#[derive(Clone, Debug, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// YAML-backed store; the whole file is rewritten on every `set`.
#[derive(Clone, Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let display = self.path.display().to_string();
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_yaml::from_str(&contents).map_err(|e| PreferenceError::Parse {
                path: display,
                source: e,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(PreferenceError::Read {
                path: display,
                source: e,
            }),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        let contents =
            serde_yaml::to_string(&values).map_err(|e| PreferenceError::Encode { source: e })?;

        let display = self.path.display().to_string();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PreferenceError::Write {
                path: display.clone(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, contents).map_err(|e| PreferenceError::Write {
            path: display,
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_defaults_to_light() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(load_theme(&store).unwrap(), Theme::Light);
    }

    #[test]
    fn unknown_theme_value_reads_as_light() {
        let mut store = MemoryPreferenceStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(load_theme(&store).unwrap(), Theme::Light);
    }

    #[test]
    fn file_store_round_trips_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.yml");

        let mut store = FilePreferenceStore::new(&path);
        assert_eq!(load_theme(&store).unwrap(), Theme::Light);
        save_theme(&mut store, Theme::Dark).unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(load_theme(&reopened).unwrap(), Theme::Dark);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("theme: dark"));
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.yml");
        std::fs::write(&path, "accent: teal\n").unwrap();

        let mut store = FilePreferenceStore::new(&path);
        save_theme(&mut store, Theme::Light).unwrap();
        assert_eq!(store.get("accent").unwrap().as_deref(), Some("teal"));
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.yml");
        std::fs::write(&path, "- just\n- a list\n").unwrap();
        let store = FilePreferenceStore::new(&path);
        assert!(matches!(
            store.get(THEME_KEY),
            Err(PreferenceError::Parse { .. })
        ));
    }
}
