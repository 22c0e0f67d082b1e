//! Configuration management for capture-bridge
//!
//! Provides loading, saving and validation of controller settings: the
//! initial camera facing and the timeouts bounding switch and dispose.

use crate::errors::CameraError;
use crate::types::CameraFacing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub camera: CameraConfig,
    pub switch: SwitchConfig,
    pub dispose: DisposeConfig,
}

/// Camera-facing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Facing assumed when a controller is constructed
    pub default_facing: CameraFacing,
}

/// Causal switch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// How long a caller waits for the native switch, in milliseconds
    pub timeout_ms: u64,
}

/// Disposal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposeConfig {
    /// How long dispose waits for an in-flight switch before handing the
    /// release to the switch worker, in milliseconds
    pub wait_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                default_facing: CameraFacing::Front,
            },
            switch: SwitchConfig { timeout_ms: 3000 },
            dispose: DisposeConfig {
                wait_timeout_ms: 1000,
            },
        }
    }
}

impl BridgeConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CameraError::InitializationError(format!("Failed to read config file: {}", e))
        })?;

        let config: BridgeConfig = toml::from_str(&contents).map_err(|e| {
            CameraError::InitializationError(format!("Failed to parse config file: {}", e))
        })?;

        config
            .validate()
            .map_err(|e| CameraError::InitializationError(format!("Invalid config: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CameraError::InitializationError(format!(
                    "Failed to create config directory: {}",
                    e
                ))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            CameraError::InitializationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            CameraError::InitializationError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("capture-bridge.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.switch.timeout_ms == 0 || self.switch.timeout_ms > 60_000 {
            return Err("Switch timeout must be between 1 and 60000 ms".to_string());
        }
        if self.dispose.wait_timeout_ms > 60_000 {
            return Err("Dispose wait timeout must be at most 60000 ms".to_string());
        }
        Ok(())
    }

    pub fn switch_timeout(&self) -> Duration {
        Duration::from_millis(self.switch.timeout_ms)
    }

    pub fn dispose_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.dispose.wait_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.camera.default_facing, CameraFacing::Front);
        assert_eq!(config.switch.timeout_ms, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut bad_switch = BridgeConfig::default();
        bad_switch.switch.timeout_ms = 0;
        assert!(bad_switch.validate().is_err());

        let mut bad_dispose = BridgeConfig::default();
        bad_dispose.dispose.wait_timeout_ms = 120_000;
        assert!(bad_dispose.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("capture-bridge.toml");

        let mut config = BridgeConfig::default();
        config.camera.default_facing = CameraFacing::Back;
        config.switch.timeout_ms = 250;
        config.save_to_file(&config_path).unwrap();

        let loaded = BridgeConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&BridgeConfig::default()).unwrap();
        assert!(toml_string.contains("[camera]"));
        assert!(toml_string.contains("[switch]"));
        assert!(toml_string.contains("[dispose]"));
        assert!(toml_string.contains("default_facing = \"front\""));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bad.toml");
        fs::write(
            &config_path,
            "[camera]\ndefault_facing = \"back\"\n[switch]\ntimeout_ms = 0\n[dispose]\nwait_timeout_ms = 10\n",
        )
        .unwrap();

        let result = BridgeConfig::load_from_file(&config_path);
        assert!(matches!(result, Err(CameraError::InitializationError(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = BridgeConfig::load_from_file("nonexistent_capture_bridge.toml");
        assert_eq!(result.unwrap(), BridgeConfig::default());
    }
}
