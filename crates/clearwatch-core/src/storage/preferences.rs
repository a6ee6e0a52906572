//! TOML-based user preferences.
//!
//! Stores:
//! - Timer mode and render cadence
//! - History filter selection and window style
//! - Overlay display toggles and theme colours
//!
//! Preferences are stored at `~/.config/clearwatch/preferences.toml`. Every
//! field has a default, so a partial or missing file is never fatal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::data_dir;
use crate::error::ConfigError;
use crate::history::{Category, FilterSelector, Timespan};
use crate::timer::{TimerConfig, TimerMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerPreferences {
    #[serde(default)]
    pub mode: TimerMode,
    #[serde(default = "default_true")]
    pub display_milliseconds: bool,
    /// Render cadence override in Hz.
    #[serde(default)]
    pub update_rate_hz: Option<u32>,
}

/// History view selection. Stored as strings so a bad value degrades to
/// the default instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPreferences {
    #[serde(default = "default_timespan")]
    pub timespan: String,
    #[serde(default = "default_activity_type")]
    pub activity_type: String,
    /// Literal rolling windows instead of reset-aligned ones.
    #[serde(default)]
    pub use_real_time: bool,
}

/// Toggles only the rendering layer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPreferences {
    #[serde(default)]
    pub enable_overlay: bool,
    #[serde(default = "default_true")]
    pub display_timer: bool,
    #[serde(default = "default_true")]
    pub display_daily_clears: bool,
    #[serde(default = "default_true")]
    pub display_average_clear_time: bool,
    #[serde(default = "default_true")]
    pub display_icons: bool,
    #[serde(default = "default_true")]
    pub display_clear_notifications: bool,
    #[serde(default)]
    pub show_timestamp_instead: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreferences {
    #[serde(default = "default_primary_background")]
    pub primary_background: String,
    #[serde(default = "default_secondary_background")]
    pub secondary_background: String,
    #[serde(default = "default_primary_highlight")]
    pub primary_highlight: String,
    #[serde(default = "default_clear_text_color")]
    pub clear_text_color: String,
}

/// User preferences.
///
/// Serialized to/from TOML at `~/.config/clearwatch/preferences.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub timer: TimerPreferences,
    #[serde(default)]
    pub filter: FilterPreferences,
    #[serde(default)]
    pub display: DisplayPreferences,
    #[serde(default)]
    pub theme: ThemePreferences,
}

fn default_true() -> bool {
    true
}
fn default_timespan() -> String {
    Timespan::default().to_string()
}
fn default_activity_type() -> String {
    Category::default().to_string()
}
fn default_primary_background() -> String {
    "#12171c".into()
}
fn default_secondary_background() -> String {
    "#180f1c".into()
}
fn default_primary_highlight() -> String {
    "#74259c".into()
}
fn default_clear_text_color() -> String {
    "#ffffff".into()
}

impl Default for TimerPreferences {
    fn default() -> Self {
        Self {
            mode: TimerMode::Default,
            display_milliseconds: true,
            update_rate_hz: None,
        }
    }
}

impl Default for FilterPreferences {
    fn default() -> Self {
        Self {
            timespan: default_timespan(),
            activity_type: default_activity_type(),
            use_real_time: false,
        }
    }
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            enable_overlay: false,
            display_timer: true,
            display_daily_clears: true,
            display_average_clear_time: true,
            display_icons: true,
            display_clear_notifications: true,
            show_timestamp_instead: false,
        }
    }
}

impl Default for ThemePreferences {
    fn default() -> Self {
        Self {
            primary_background: default_primary_background(),
            secondary_background: default_secondary_background(),
            primary_highlight: default_primary_highlight(),
            clear_text_color: default_clear_text_color(),
        }
    }
}

impl Preferences {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let clears = matches!(value, "" | "none" | "null");
            let new_value = match existing {
                // Optional numbers: "none" unsets them.
                serde_json::Value::Number(_) | serde_json::Value::Null if clears => {
                    serde_json::Value::Null
                }
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                serde_json::Value::Null => serde_json::from_str(value)
                    .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                serde_json::Value::String(_) => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the preferences file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("preferences.toml"))
    }

    /// Load from disk; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "using default preferences");
            Self::default()
        })
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get a value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "filter.timespan" => {
                value.parse::<Timespan>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
            }
            "filter.activity_type" => {
                value.parse::<Category>().map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
            }
            _ => {}
        }

        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the preferences cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// The stored filter, with unusable parts replaced by defaults.
    pub fn selector(&self) -> FilterSelector {
        let timespan = self.filter.timespan.parse().unwrap_or_else(|e| {
            warn!(error = %e, "bad filter.timespan; using default");
            Timespan::default()
        });
        let category = self.filter.activity_type.parse().unwrap_or_else(|e| {
            warn!(error = %e, "bad filter.activity_type; using default");
            Category::default()
        });
        FilterSelector::new(timespan, category)
    }

    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig {
            mode: self.timer.mode,
            display_milliseconds: self.timer.display_milliseconds,
            update_rate_hz: self.timer.update_rate_hz,
        }
    }
}
