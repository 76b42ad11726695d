//! Plant Configuration - operator-tunable TOML values
//!
//! Every tunable that drives the engine (tick period, PID gains, setpoint
//! limits, server address, progress-file path) is a field in this module.
//! Each struct implements `Default` with values matching the built-in
//! constants, ensuring zero-change behavior when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a plant deployment.
///
/// Load with `PlantConfig::load()` which searches:
/// 1. `$REFLOW_CONFIG` env var
/// 2. `./plant_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlantConfig {
    /// Plant identification
    #[serde(default)]
    pub plant: PlantInfo,

    /// Tick scheduling parameters
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// DO control loop parameters
    #[serde(default)]
    pub control: ControlConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Scenario progress persistence
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl PlantConfig {
    /// Load configuration using the standard search order:
    /// 1. `$REFLOW_CONFIG` environment variable
    /// 2. `./plant_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("REFLOW_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), plant = %config.plant.name, "Loaded plant config from REFLOW_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from REFLOW_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "REFLOW_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("plant_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(plant = %config.plant.name, "Loaded plant config from ./plant_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./plant_config.toml, using defaults");
                }
            }
        }

        info!("No plant_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would wedge the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "simulation.tick_ms must be greater than 0".to_string(),
            ));
        }
        if self.simulation.control_interval_ticks == 0 {
            return Err(ConfigError::Invalid(
                "simulation.control_interval_ticks must be greater than 0".to_string(),
            ));
        }
        if self.simulation.advisory_interval_ticks == 0 {
            return Err(ConfigError::Invalid(
                "simulation.advisory_interval_ticks must be greater than 0".to_string(),
            ));
        }
        if self.control.setpoint_min >= self.control.setpoint_max {
            return Err(ConfigError::Invalid(format!(
                "control.setpoint_min ({}) must be below control.setpoint_max ({})",
                self.control.setpoint_min, self.control.setpoint_max
            )));
        }
        Ok(())
    }
}

/// Config loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Sections
// ============================================================================

/// Plant identification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantInfo {
    /// Human-readable plant name
    #[serde(default = "default_plant_name")]
    pub name: String,
}

fn default_plant_name() -> String {
    "REFLOW-PLANT-001".to_string()
}

impl Default for PlantInfo {
    fn default() -> Self {
        Self {
            name: default_plant_name(),
        }
    }
}

/// Tick scheduling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Process/scenario tick period in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// PID control runs every Nth process tick
    #[serde(default = "default_control_interval")]
    pub control_interval_ticks: u64,

    /// Advisory forecast runs every Nth process tick
    #[serde(default = "default_advisory_interval")]
    pub advisory_interval_ticks: u64,

    /// Fixed RNG seed for reproducible runs (omit for entropy seeding)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_tick_ms() -> u64 {
    defaults::TICK_PERIOD_MS
}

fn default_control_interval() -> u64 {
    defaults::CONTROL_INTERVAL_TICKS
}

fn default_advisory_interval() -> u64 {
    defaults::ADVISORY_INTERVAL_TICKS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            control_interval_ticks: default_control_interval(),
            advisory_interval_ticks: default_advisory_interval(),
            seed: None,
        }
    }
}

/// DO control loop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// PID proportional gain
    #[serde(default = "default_kp")]
    pub kp: f64,

    /// PID integral gain
    #[serde(default = "default_ki")]
    pub ki: f64,

    /// PID derivative gain
    #[serde(default = "default_kd")]
    pub kd: f64,

    /// Lowest operator-settable DO setpoint (mg/L)
    #[serde(default = "default_setpoint_min")]
    pub setpoint_min: f64,

    /// Highest operator-settable DO setpoint (mg/L)
    #[serde(default = "default_setpoint_max")]
    pub setpoint_max: f64,

    /// Initial DO setpoint (mg/L)
    #[serde(default = "default_setpoint")]
    pub default_setpoint: f64,
}

fn default_kp() -> f64 {
    defaults::PID_KP
}

fn default_ki() -> f64 {
    defaults::PID_KI
}

fn default_kd() -> f64 {
    defaults::PID_KD
}

fn default_setpoint_min() -> f64 {
    defaults::DO_SETPOINT_MIN
}

fn default_setpoint_max() -> f64 {
    defaults::DO_SETPOINT_MAX
}

fn default_setpoint() -> f64 {
    defaults::DEFAULT_DO_SETPOINT
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            kp: default_kp(),
            ki: default_ki(),
            kd: default_kd(),
            setpoint_min: default_setpoint_min(),
            setpoint_max: default_setpoint_max(),
            default_setpoint: default_setpoint(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    defaults::DEFAULT_LISTEN_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Scenario progress persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Path to the JSON progress file
    #[serde(default = "default_progress_path")]
    pub path: String,
}

fn default_progress_path() -> String {
    defaults::DEFAULT_PROGRESS_PATH.to_string()
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            path: default_progress_path(),
        }
    }
}
