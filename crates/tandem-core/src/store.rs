//! Persisted mode setting.
//!
//! The only durable state is one named setting holding the string form of the
//! current [`Mode`]. Backends implement [`SettingsStore`]; [`ModeStore`] layers
//! the typed view and the startup default on top.

#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tandem_proto::Mode;

use crate::error::StoreError;

/// Key of the persisted mode setting.
pub const CURRENT_MODE_KEY: &str = "CurrentMode";

/// String-valued settings backend.
pub trait SettingsStore: Send + Sync {
    /// Read a setting. `Ok(None)` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a setting. Last write wins.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory settings backend for tests and previews.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the current mode.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct ModeStore {
    settings: Arc<dyn SettingsStore>,
}

impl ModeStore {
    /// Wrap a settings backend.
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Store backed by a fresh [`MemorySettings`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySettings::new()))
    }

    /// Write `undefined` if no mode was ever stored. Call once at startup.
    pub fn register_defaults(&self) -> Result<(), StoreError> {
        if self.settings.get(CURRENT_MODE_KEY)?.is_none() {
            self.settings.set(CURRENT_MODE_KEY, Mode::Undefined.as_str())?;
        }
        Ok(())
    }

    /// Current mode.
    ///
    /// Missing, unreadable or unparseable values read as [`Mode::Undefined`].
    pub fn current(&self) -> Mode {
        match self.settings.get(CURRENT_MODE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|error| {
                tracing::warn!(%error, %raw, "stored mode is invalid, treating as undefined");
                Mode::Undefined
            }),
            Ok(None) => Mode::Undefined,
            Err(error) => {
                tracing::warn!(%error, "failed to read stored mode");
                Mode::Undefined
            },
        }
    }

    /// Persist `mode`.
    pub fn set(&self, mode: Mode) -> Result<(), StoreError> {
        self.settings.set(CURRENT_MODE_KEY, mode.as_str())?;
        tracing::info!(%mode, "mode stored");
        Ok(())
    }
}
