use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::map::Entry;
use tracing::warn;

pub mod store;

pub use store::{MemorySettings, SettingsStore};

/// How the dock reacts to its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntellihideMode {
    /// Locked off-screen; hover is ignored.
    Hide,
    /// Always on screen.
    Show,
    /// Shown while the pointer hovers the screen edge.
    Autohide,
    /// Shown unless a window gets closer to the edge than the dock is wide.
    Intellihide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingsKey {
    AnimationTime,
    ShowDelay,
    HideDelay,
    OpaqueBackground,
    BackgroundOpacity,
    OpaqueBackgroundAlways,
    NormalMode,
    OverviewMode,
}

impl SettingsKey {
    pub const ALL: [SettingsKey; 8] = [
        SettingsKey::AnimationTime,
        SettingsKey::ShowDelay,
        SettingsKey::HideDelay,
        SettingsKey::OpaqueBackground,
        SettingsKey::BackgroundOpacity,
        SettingsKey::OpaqueBackgroundAlways,
        SettingsKey::NormalMode,
        SettingsKey::OverviewMode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingsKey::AnimationTime => "animation-time",
            SettingsKey::ShowDelay => "show-delay",
            SettingsKey::HideDelay => "hide-delay",
            SettingsKey::OpaqueBackground => "opaque-background",
            SettingsKey::BackgroundOpacity => "background-opacity",
            SettingsKey::OpaqueBackgroundAlways => "opaque-background-always",
            SettingsKey::NormalMode => "normal-mode",
            SettingsKey::OverviewMode => "overview-mode",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for SettingsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Double(f64),
    Mode(IntellihideMode),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} expects a {expected} value, got {got:?}")]
    WrongType {
        key: SettingsKey,
        expected: &'static str,
        got: SettingValue,
    },
    #[error("{key} must be between 0 and 3600 seconds, got {value}")]
    InvalidDuration { key: SettingsKey, value: f64 },
    #[error("background-opacity must be within 0..=1, got {0}")]
    InvalidOpacity(f64),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Dock settings. Every key has a compiled-in default, so a missing
/// configuration store is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DockSettings {
    /// Show/hide transition time, seconds.
    pub animation_time: f64,
    /// Wait before showing a hidden dock, seconds.
    pub show_delay: f64,
    /// Wait before hiding once the pointer leaves, seconds.
    pub hide_delay: f64,
    /// Draw an opaque backing behind the dock.
    pub opaque_background: bool,
    pub background_opacity: f64,
    /// Keep the backing even while the dock is pinned.
    pub opaque_background_always: bool,
    pub normal_mode: IntellihideMode,
    pub overview_mode: IntellihideMode,
}

impl Default for DockSettings {
    fn default() -> Self {
        Self {
            animation_time: 0.25,
            show_delay: 0.5,
            hide_delay: 0.25,
            opaque_background: true,
            background_opacity: 0.9,
            opaque_background_always: false,
            normal_mode: IntellihideMode::Intellihide,
            overview_mode: IntellihideMode::Show,
        }
    }
}

/// Longest accepted animation time or delay, seconds.
pub const MAX_DURATION_SECS: f64 = 3600.0;

/// Durations derived from [`DockSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationTiming {
    pub animation_time: Duration,
    pub show_delay: Duration,
    pub hide_delay: Duration,
}

impl AnimationTiming {
    /// Delay that lets a started animation finish before the opposite one
    /// begins: `hide_delay + 2 × animation_time + show_delay`.
    pub fn deferred_delay(&self) -> Duration {
        self.hide_delay
            .saturating_add(self.animation_time.saturating_mul(2))
            .saturating_add(self.show_delay)
    }
}

fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f64(value.min(MAX_DURATION_SECS)).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    }
}

impl DockSettings {
    pub fn timing(&self) -> AnimationTiming {
        AnimationTiming {
            animation_time: seconds(self.animation_time),
            show_delay: seconds(self.show_delay),
            hide_delay: seconds(self.hide_delay),
        }
    }

    pub fn get(&self, key: SettingsKey) -> SettingValue {
        match key {
            SettingsKey::AnimationTime => SettingValue::Double(self.animation_time),
            SettingsKey::ShowDelay => SettingValue::Double(self.show_delay),
            SettingsKey::HideDelay => SettingValue::Double(self.hide_delay),
            SettingsKey::OpaqueBackground => SettingValue::Bool(self.opaque_background),
            SettingsKey::BackgroundOpacity => SettingValue::Double(self.background_opacity),
            SettingsKey::OpaqueBackgroundAlways => {
                SettingValue::Bool(self.opaque_background_always)
            }
            SettingsKey::NormalMode => SettingValue::Mode(self.normal_mode),
            SettingsKey::OverviewMode => SettingValue::Mode(self.overview_mode),
        }
    }

    /// Update one key. Returns whether the stored value changed.
    pub fn set(&mut self, key: SettingsKey, value: SettingValue) -> Result<bool, ConfigError> {
        let changed = self.get(key) != value;
        match (key, value) {
            (
                SettingsKey::AnimationTime | SettingsKey::ShowDelay | SettingsKey::HideDelay,
                SettingValue::Double(secs),
            ) => {
                if !(0.0..=MAX_DURATION_SECS).contains(&secs) {
                    return Err(ConfigError::InvalidDuration { key, value: secs });
                }
                match key {
                    SettingsKey::AnimationTime => self.animation_time = secs,
                    SettingsKey::ShowDelay => self.show_delay = secs,
                    _ => self.hide_delay = secs,
                }
            }
            (SettingsKey::BackgroundOpacity, SettingValue::Double(opacity)) => {
                if !(0.0..=1.0).contains(&opacity) {
                    return Err(ConfigError::InvalidOpacity(opacity));
                }
                self.background_opacity = opacity;
            }
            (SettingsKey::OpaqueBackground, SettingValue::Bool(on)) => {
                self.opaque_background = on;
            }
            (SettingsKey::OpaqueBackgroundAlways, SettingValue::Bool(on)) => {
                self.opaque_background_always = on;
            }
            (SettingsKey::NormalMode, SettingValue::Mode(mode)) => self.normal_mode = mode,
            (SettingsKey::OverviewMode, SettingValue::Mode(mode)) => self.overview_mode = mode,
            (key, got) => {
                let expected = match key {
                    SettingsKey::OpaqueBackground | SettingsKey::OpaqueBackgroundAlways => {
                        "boolean"
                    }
                    SettingsKey::NormalMode | SettingsKey::OverviewMode => "mode",
                    _ => "double",
                };
                return Err(ConfigError::WrongType { key, expected, got });
            }
        }
        Ok(changed)
    }

    /// Check every key, as if each had been assigned through [`set`](Self::set).
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut scratch = Self::default();
        for key in SettingsKey::ALL {
            scratch.set(key, self.get(key))?;
        }
        Ok(())
    }

    /// Load settings from the standard locations, lowest priority first:
    /// system, user (XDG), then `./intellidock.toml`.
    pub fn load() -> Self {
        let mut layers = Vec::new();
        layers.extend(get_system_config_path());
        layers.extend(get_user_config_path());
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            layers.push(local);
        }
        Self::load_layers(&layers)
    }

    /// Merge `paths` over the defaults. Layers that cannot be read or parsed
    /// are skipped; an invalid merged result falls back to the defaults.
    pub fn load_layers(paths: &[PathBuf]) -> Self {
        let mut merged =
            toml::Value::try_from(Self::default()).expect("default settings are always valid toml");

        let mut found_any_config = false;
        for path in paths {
            match read_layer(path) {
                Ok(value) => {
                    merge_value(&mut merged, value);
                    found_any_config = true;
                    tracing::info!("Loaded dock settings from {}", path.display());
                }
                Err(err) => warn!("{err}"),
            }
        }

        if !found_any_config {
            warn!("No configuration file found, using default dock settings");
        }

        let settings: Self = merged.try_into().unwrap_or_else(|err| {
            warn!("Falling back to default dock settings due to invalid overrides: {err}");
            Self::default()
        });

        match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!("Falling back to default dock settings: {err}");
                Self::default()
            }
        }
    }
}

const LOCAL_CONFIG_FILE: &str = "intellidock.toml";

fn read_layer(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    content
        .parse::<toml::Value>()
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn merge_value(base: &mut toml::Value, overrides: toml::Value) {
    match (base, overrides) {
        (toml::Value::Table(base_map), toml::Value::Table(override_map)) => {
            for (key, override_value) in override_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut entry) => merge_value(entry.get_mut(), override_value),
                    Entry::Vacant(entry) => {
                        entry.insert(override_value);
                    }
                }
            }
        }
        (base_value, override_value) => {
            *base_value = override_value;
        }
    }
}

fn get_system_config_path() -> Option<PathBuf> {
    let path = PathBuf::from("/etc/intellidock/config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

fn get_user_config_path() -> Option<PathBuf> {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;

    let path = config_dir.join("intellidock").join("config.toml");
    if path.exists() {
        Some(path)
    } else {
        None
    }
}
