use crate::shell::{SignalId, SignalRegistry, Topic};

use super::{ConfigError, DockSettings, SettingValue, SettingsKey};

/// Typed key/value store with change notification.
///
/// Writers call [`set`](SettingsStore::set); the host then delivers a
/// `ShellEvent::SettingsChanged` for every key that changed.
pub trait SettingsStore {
    fn settings(&self) -> DockSettings;

    /// Returns whether the stored value changed.
    fn set(&mut self, key: SettingsKey, value: SettingValue) -> Result<bool, ConfigError>;

    fn connect_changed(&mut self, key: SettingsKey) -> SignalId;
    fn disconnect(&mut self, id: SignalId);
}

/// In-memory [`SettingsStore`], seeded from the config files or from an
/// explicit value.
#[derive(Debug, Default)]
pub struct MemorySettings {
    current: DockSettings,
    signals: SignalRegistry,
}

impl MemorySettings {
    pub fn new(settings: DockSettings) -> Self {
        Self {
            current: settings,
            signals: SignalRegistry::new(),
        }
    }

    /// Seed the store from the standard config file locations.
    pub fn load() -> Self {
        Self::new(DockSettings::load())
    }

    pub fn listeners(&self, key: SettingsKey) -> usize {
        self.signals.listeners(&Topic::Settings(key))
    }

    pub fn connections(&self) -> usize {
        self.signals.len()
    }
}

impl SettingsStore for MemorySettings {
    fn settings(&self) -> DockSettings {
        self.current.clone()
    }

    fn set(&mut self, key: SettingsKey, value: SettingValue) -> Result<bool, ConfigError> {
        let changed = self.current.set(key, value)?;
        if changed {
            tracing::debug!(%key, ?value, "dock setting changed");
        }
        Ok(changed)
    }

    fn connect_changed(&mut self, key: SettingsKey) -> SignalId {
        self.signals.connect(Topic::Settings(key))
    }

    fn disconnect(&mut self, id: SignalId) {
        self.signals.disconnect(id);
    }
}
