//! Startup configuration for the controller node
//!
//! Field names match the ROS parameter names so the same YAML file can feed
//! both the standalone simulation and the ROS 2 node.

use crate::control::differential_drive::{DEFAULT_WHEEL_BASE, DEFAULT_WHEEL_RADIUS};
use crate::control::DifferentialDriveModel;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Controller configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Frame a goal must be expressed in to be accepted
    pub base_link_frame_id: String,
    /// Forward mounting offset of both virtual light sensors (m)
    pub virtual_light_sensor_position_x_offset: f64,
    /// Lateral mounting offset of the virtual light sensors (m)
    pub virtual_light_sensor_position_y_offset: f64,
    pub wheel_radius: f64,
    pub wheel_base: f64,
    /// Control tick period in milliseconds
    pub tick_period_ms: u64,
    pub queue_depth: usize,
    pub cmd_vel_topic: String,
    pub scan_topic: String,
    pub goal_topic: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            base_link_frame_id: "base_link".to_string(),
            virtual_light_sensor_position_x_offset: 0.1,
            virtual_light_sensor_position_y_offset: 0.1,
            wheel_radius: DEFAULT_WHEEL_RADIUS,
            wheel_base: DEFAULT_WHEEL_BASE,
            tick_period_ms: 100,
            queue_depth: 1,
            cmd_vel_topic: "/cmd_vel".to_string(),
            scan_topic: "/scan".to_string(),
            goal_topic: "/goal_pose".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ControllerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&contents)?;
        log::info!("Loaded controller config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_link_frame_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "base_link_frame_id must not be empty".to_string(),
            ));
        }
        if !self.virtual_light_sensor_position_x_offset.is_finite()
            || !self.virtual_light_sensor_position_y_offset.is_finite()
        {
            return Err(ConfigError::Invalid(
                "virtual light sensor offsets must be finite".to_string(),
            ));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_period_ms must be greater than zero".to_string(),
            ));
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::Invalid(
                "queue_depth must be greater than zero".to_string(),
            ));
        }
        self.motion_model()?;
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn motion_model(&self) -> Result<DifferentialDriveModel, ConfigError> {
        Ok(DifferentialDriveModel::new(
            self.wheel_radius,
            self.wheel_base,
        )?)
    }
}
