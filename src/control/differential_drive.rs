//! Differential drive kinematics

use super::MotionModel;
use crate::common::VelocityCommand;
use crate::error::ModelError;

/// Default wheel radius in meters (TurtleBot3 burger)
pub const DEFAULT_WHEEL_RADIUS: f64 = 0.033;

/// Default distance between the wheels in meters (TurtleBot3 burger)
pub const DEFAULT_WHEEL_BASE: f64 = 0.16;

/// A two-wheeled vehicle whose inputs are wheel rotational speeds in rad/s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialDriveModel {
    wheel_radius: f64,
    wheel_base: f64,
}

impl DifferentialDriveModel {
    /// Create a new model, rejecting non-positive or non-finite dimensions
    pub fn new(wheel_radius: f64, wheel_base: f64) -> Result<Self, ModelError> {
        if !wheel_radius.is_finite() || wheel_radius <= 0.0 {
            return Err(ModelError::InvalidWheelRadius(wheel_radius));
        }
        if !wheel_base.is_finite() || wheel_base <= 0.0 {
            return Err(ModelError::InvalidWheelBase(wheel_base));
        }
        Ok(DifferentialDriveModel {
            wheel_radius,
            wheel_base,
        })
    }

    pub fn wheel_radius(&self) -> f64 {
        self.wheel_radius
    }

    pub fn wheel_base(&self) -> f64 {
        self.wheel_base
    }
}

impl Default for DifferentialDriveModel {
    fn default() -> Self {
        DifferentialDriveModel {
            wheel_radius: DEFAULT_WHEEL_RADIUS,
            wheel_base: DEFAULT_WHEEL_BASE,
        }
    }
}

impl MotionModel for DifferentialDriveModel {
    fn get_twist(&self, left: f64, right: f64) -> VelocityCommand {
        let v_left = self.wheel_radius * left;
        let v_right = self.wheel_radius * right;

        // Positive angular velocity turns left (z up)
        VelocityCommand {
            linear: (v_left + v_right) / 2.0,
            angular: (v_right - v_left) / self.wheel_base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn equal_inputs_drive_straight() {
        let model = DifferentialDriveModel::default();
        let twist = model.get_twist(2.0, 2.0);
        assert!((twist.linear - 0.066).abs() < EPS);
        assert!(twist.angular.abs() < EPS);
    }

    #[test]
    fn faster_right_wheel_turns_left() {
        let model = DifferentialDriveModel::new(0.05, 0.2).unwrap();
        let twist = model.get_twist(1.0, 3.0);
        assert!((twist.linear - 0.1).abs() < EPS);
        assert!((twist.angular - 0.5).abs() < EPS);
    }

    #[test]
    fn zero_inputs_stop() {
        let model = DifferentialDriveModel::default();
        assert!(model.get_twist(0.0, 0.0).is_zero());
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert_eq!(
            DifferentialDriveModel::new(0.0, 0.16),
            Err(ModelError::InvalidWheelRadius(0.0))
        );
        assert_eq!(
            DifferentialDriveModel::new(0.033, -1.0),
            Err(ModelError::InvalidWheelBase(-1.0))
        );
        assert!(DifferentialDriveModel::new(f64::NAN, 0.16).is_err());
    }
}
