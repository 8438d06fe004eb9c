//! Kinematic simulation of the vehicle in a world frame

use crate::common::{Pose2D, VelocityCommand};
use nalgebra::{Isometry2, Point2, Vector2};

/// A unicycle-model vehicle integrating velocity commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedVehicle {
    pose: Isometry2<f64>,
}

impl SimulatedVehicle {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        SimulatedVehicle {
            pose: Isometry2::new(Vector2::new(x, y), theta),
        }
    }

    /// Current pose in the world frame
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(
            self.pose.translation.x,
            self.pose.translation.y,
            self.pose.rotation.angle(),
        )
    }

    /// Integrate `cmd` over `dt` seconds with a midpoint heading
    pub fn step(&mut self, cmd: VelocityCommand, dt: f64) {
        let theta = self.pose.rotation.angle();
        let mid_theta = theta + 0.5 * cmd.angular * dt;
        let dx = cmd.linear * mid_theta.cos() * dt;
        let dy = cmd.linear * mid_theta.sin() * dt;

        self.pose = Isometry2::new(
            Vector2::new(self.pose.translation.x + dx, self.pose.translation.y + dy),
            theta + cmd.angular * dt,
        );
    }

    /// Express a world-frame goal in the vehicle body frame
    pub fn goal_in_body_frame(&self, world_goal: Point2<f64>) -> Pose2D {
        let local = self.pose.inverse_transform_point(&world_goal);
        Pose2D::new(local.x, local.y, 0.0)
    }

    pub fn distance_to(&self, point: Point2<f64>) -> f64 {
        nalgebra::distance(&Point2::from(self.pose.translation.vector), &point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn straight_motion_follows_heading() {
        let mut vehicle = SimulatedVehicle::new(0.0, 0.0, FRAC_PI_2);
        vehicle.step(VelocityCommand::new(1.0, 0.0), 0.5);

        let pose = vehicle.pose();
        assert!(pose.x().abs() < EPS);
        assert!((pose.y() - 0.5).abs() < EPS);
        assert!((pose.theta - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn rotation_in_place() {
        let mut vehicle = SimulatedVehicle::new(1.0, 2.0, 0.0);
        vehicle.step(VelocityCommand::new(0.0, 1.0), 0.25);

        let pose = vehicle.pose();
        assert!((pose.x() - 1.0).abs() < EPS);
        assert!((pose.y() - 2.0).abs() < EPS);
        assert!((pose.theta - 0.25).abs() < EPS);
    }

    #[test]
    fn goal_to_the_left_has_positive_body_y() {
        let vehicle = SimulatedVehicle::new(1.0, 1.0, FRAC_PI_2);
        let goal = vehicle.goal_in_body_frame(Point2::new(0.0, 1.0));
        assert!(goal.x().abs() < EPS);
        assert!((goal.y() - 1.0).abs() < EPS);
    }

    #[test]
    fn distance_ignores_heading() {
        let vehicle = SimulatedVehicle::new(0.0, 0.0, 1.2);
        assert!((vehicle.distance_to(Point2::new(3.0, 4.0)) - 5.0).abs() < EPS);
    }
}
