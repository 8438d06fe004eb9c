//! Braitenberg vehicle controller
//!
//! A differential drive robot steers toward a goal pose using two virtual
//! light sensors whose readings fall off with distance to the goal.
pub mod common;
pub mod config;
pub mod control;
pub mod controller;
pub mod error;
pub mod runtime;
pub mod sim;
pub mod transport;

pub use crate::common::{LaserScan, Pose2D, PoseStamped, SensorOffset, VelocityCommand};
pub use crate::config::ControllerConfig;
pub use crate::control::{DifferentialDriveModel, MotionModel};
pub use crate::controller::{light_sensor_reading, GoalSeekingController, Mode};
pub use crate::error::{ConfigError, ModelError, TransportError};
pub use crate::runtime::{ControllerNode, NodeStats};
pub use crate::transport::{ChannelPublisher, Inbound, VelocityPublisher};
