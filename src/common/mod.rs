//! Common message types shared across the controller, transport and simulation

use nalgebra::Point2;

/// A planar pose: position plus heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub position: Point2<f64>,
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Pose2D {
            position: Point2::new(x, y),
            theta,
        }
    }

    /// Build a pose from a position and a unit quaternion, keeping only the yaw
    pub fn from_quaternion(x: f64, y: f64, qx: f64, qy: f64, qz: f64, qw: f64) -> Self {
        let yaw = (2.0 * (qw * qz + qx * qy)).atan2(1.0 - 2.0 * (qy * qy + qz * qz));
        Pose2D::new(x, y, yaw)
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }
}

/// A pose tagged with the name of the frame it is expressed in
#[derive(Debug, Clone, PartialEq)]
pub struct PoseStamped {
    pub frame_id: String,
    pub pose: Pose2D,
}

impl PoseStamped {
    pub fn new(frame_id: impl Into<String>, pose: Pose2D) -> Self {
        PoseStamped {
            frame_id: frame_id.into(),
            pose,
        }
    }
}

/// A single planar range scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaserScan {
    pub angle_min: f32,
    pub angle_max: f32,
    pub angle_increment: f32,
    pub range_min: f32,
    pub range_max: f32,
    pub ranges: Vec<f32>,
}

/// Velocity command for the robot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}

impl VelocityCommand {
    pub fn new(linear: f64, angular: f64) -> Self {
        VelocityCommand { linear, angular }
    }

    /// Stop command
    pub fn zero() -> Self {
        VelocityCommand::default()
    }

    /// True only for the literal stop command; computed twists are not rounded
    pub fn is_zero(&self) -> bool {
        self.linear == 0.0 && self.angular == 0.0
    }
}

/// Mounting point of a virtual light sensor in the vehicle body frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorOffset {
    pub x: f64,
    pub y: f64,
}

impl SensorOffset {
    pub fn new(x: f64, y: f64) -> Self {
        SensorOffset { x, y }
    }

    /// Mirror-image sensor pair as `(right, left)`.
    ///
    /// Body frame follows x forward, y left, so the right sensor sits at `-y`.
    pub fn mirrored(x: f64, y: f64) -> (SensorOffset, SensorOffset) {
        (SensorOffset::new(x, -y), SensorOffset::new(x, y))
    }

    pub fn as_point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrored_offsets_flip_lateral_axis() {
        let (right, left) = SensorOffset::mirrored(0.1, 0.2);
        assert_eq!(right, SensorOffset::new(0.1, -0.2));
        assert_eq!(left, SensorOffset::new(0.1, 0.2));
    }

    fn yaw_quaternion(yaw: f64) -> (f64, f64, f64, f64) {
        (0.0, 0.0, (yaw / 2.0).sin(), (yaw / 2.0).cos())
    }

    #[test]
    fn quaternion_yaw_round_trips_through_pose() {
        for degrees in [0.0f64, 30.0, 90.0, -135.0, 179.0] {
            let yaw = degrees.to_radians();
            let (qx, qy, qz, qw) = yaw_quaternion(yaw);
            let pose = Pose2D::from_quaternion(1.5, -2.0, qx, qy, qz, qw);
            assert!((pose.theta - yaw).abs() < 1e-12, "{} deg gave {}", degrees, pose.theta.to_degrees());
            assert_eq!(pose.position, Point2::new(1.5, -2.0));
        }
    }

    #[test]
    fn identity_quaternion_has_zero_yaw() {
        assert_eq!(Pose2D::from_quaternion(0.0, 0.0, 0.0, 0.0, 0.0, 1.0).theta, 0.0);
    }

    #[test]
    fn default_command_is_stop() {
        assert!(VelocityCommand::default().is_zero());
        assert!(!VelocityCommand::new(0.1, 0.0).is_zero());
    }
}
