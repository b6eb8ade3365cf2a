//! Theme preferences as an explicit context object.
//!
//! A [`ThemeContext`] is created from a [`PreferenceStore`], handed to
//! whatever renders, and writes every change straight back to the store.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ShareError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Orange,
    Red,
    Green,
    Blue,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 4] = [
        ColorScheme::Orange,
        ColorScheme::Red,
        ColorScheme::Green,
        ColorScheme::Blue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Orange => "orange",
            ColorScheme::Red => "red",
            ColorScheme::Green => "green",
            ColorScheme::Blue => "blue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorScheme::Orange => "Orange",
            ColorScheme::Red => "Red",
            ColorScheme::Green => "Green",
            ColorScheme::Blue => "Blue",
        }
    }

    /// Primary swatch colour, as a CSS `hsl()` value
    pub fn swatch(&self) -> &'static str {
        match self {
            ColorScheme::Orange => "hsl(16 75% 55%)",
            ColorScheme::Red => "hsl(0 72% 51%)",
            ColorScheme::Green => "hsl(142 71% 45%)",
            ColorScheme::Blue => "hsl(221 83% 53%)",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode: {}", other)),
        }
    }
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ColorScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == wanted)
            .ok_or_else(|| format!("unknown color scheme: {}", s.trim()))
    }
}

/// Persisted theme choice. Keys match the ones the web client keeps in
/// local storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ThemePreferences {
    #[serde(rename = "themeMode")]
    pub mode: ThemeMode,
    #[serde(rename = "colorScheme")]
    pub color_scheme: ColorScheme,
}

impl<'de> Deserialize<'de> for ThemePreferences {
    // Each key falls back to its default on its own, so one bad value does
    // not throw away the other.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let read = |key: &str| raw.get(key).and_then(|value| value.as_str());
        Ok(ThemePreferences {
            mode: read("themeMode")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            color_scheme: read("colorScheme")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        })
    }
}

impl ThemePreferences {
    /// Class to put on the document root (`light` or `dark`)
    pub fn root_class(&self) -> &'static str {
        self.mode.as_str()
    }

    /// Attributes to set on the document root
    pub fn root_attributes(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("class", self.mode.as_str()),
            ("data-color-scheme", self.color_scheme.as_str()),
        ]
    }
}

/// Backing storage for [`ThemePreferences`]
pub trait PreferenceStore {
    fn load(&self) -> Result<Option<ThemePreferences>, ShareError>;
    fn save(&mut self, preferences: &ThemePreferences) -> Result<(), ShareError>;
}

/// Preferences kept as a small JSON file
#[derive(Debug, Clone)]
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
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<ThemePreferences>, ShareError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&mut self, preferences: &ThemePreferences) -> Result<(), ShareError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(preferences)?)?;
        debug!("saved theme preferences to {}", self.path.display());
        Ok(())
    }
}

/// Preferences held in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    saved: Option<ThemePreferences>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<ThemePreferences>, ShareError> {
        Ok(self.saved)
    }

    fn save(&mut self, preferences: &ThemePreferences) -> Result<(), ShareError> {
        self.saved = Some(*preferences);
        Ok(())
    }
}

/// Current theme, initialised from and persisted to a [`PreferenceStore`]
#[derive(Debug)]
pub struct ThemeContext<S: PreferenceStore> {
    store: S,
    preferences: ThemePreferences,
}

impl<S: PreferenceStore> ThemeContext<S> {
    /// Load saved preferences. An unreadable store falls back to the defaults
    /// (light, orange) rather than failing.
    pub fn new(store: S) -> Self {
        let preferences = match store.load() {
            Ok(saved) => saved.unwrap_or_default(),
            Err(e) => {
                warn!("ignoring unreadable theme preferences: {}", e);
                ThemePreferences::default()
            }
        };
        ThemeContext { store, preferences }
    }

    pub fn preferences(&self) -> ThemePreferences {
        self.preferences
    }

    pub fn mode(&self) -> ThemeMode {
        self.preferences.mode
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.preferences.color_scheme
    }

    pub fn set_mode(&mut self, mode: ThemeMode) -> Result<(), ShareError> {
        self.preferences.mode = mode;
        self.store.save(&self.preferences)
    }

    pub fn set_color_scheme(&mut self, color_scheme: ColorScheme) -> Result<(), ShareError> {
        self.preferences.color_scheme = color_scheme;
        self.store.save(&self.preferences)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
