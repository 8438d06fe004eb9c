//! Motion models turning per-wheel input signals into velocity commands
pub mod differential_drive;

use crate::common::VelocityCommand;

pub use self::differential_drive::DifferentialDriveModel;

/// Trait for vehicle kinematics driven by one input signal per wheel
#[cfg_attr(test, mockall::automock)]
pub trait MotionModel: Send + Sync {
    /// Compute the body velocity produced by the given left and right wheel inputs
    fn get_twist(&self, left: f64, right: f64) -> VelocityCommand;
}
