//! Configuration storage adapters.
//!
//! | Adapter               | Format    | Used by                                  |
//! |-----------------------|-----------|------------------------------------------|
//! | [`JsonConfigFile`]    | JSON file | simulator binary (`homemesh CONFIG.json`) |
//! | [`MemoryConfigStore`] | postcard  | tests, embedded-style blob               |
//!
//! Both validate on save and on load.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// JSON file
// ───────────────────────────────────────────────────────────────

/// System configuration kept in a human-editable JSON file.
///
/// Missing fields fall back to their defaults, so a file may override
/// only the values it cares about.
pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::NotFound),
            Err(e) => {
                warn!("config: cannot read {}: {e}", self.path.display());
                return Err(ConfigError::IoError);
            }
        };
        let overrides: serde_json::Value =
            serde_json::from_str(&text).map_err(|_| ConfigError::Corrupted)?;
        let mut merged =
            serde_json::to_value(SystemConfig::default()).map_err(|_| ConfigError::IoError)?;
        merge(&mut merged, overrides);
        let cfg: SystemConfig =
            serde_json::from_value(merged).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        info!("config: loaded {}", self.path.display());
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::IoError)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("config: cannot write {}: {e}", self.path.display());
            ConfigError::IoError
        })?;
        info!("config: saved {}", self.path.display());
        Ok(())
    }
}

/// Overlay `patch` onto `base`, recursing into objects.
fn merge(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

// ───────────────────────────────────────────────────────────────
// postcard blob
// ───────────────────────────────────────────────────────────────

/// Configuration held as a postcard blob in memory.
#[derive(Default)]
pub struct MemoryConfigStore {
    blob: RefCell<Option<Vec<u8>>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored bytes directly (simulates flash corruption).
    pub fn write_raw(&self, bytes: Vec<u8>) {
        *self.blob.borrow_mut() = Some(bytes);
    }
}

impl ConfigPort for MemoryConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let blob = self.blob.borrow();
        let bytes = blob.as_deref().ok_or(ConfigError::NotFound)?;
        let cfg: SystemConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        *self.blob.borrow_mut() = Some(bytes);
        info!("config: saved to memory store");
        Ok(())
    }
}
