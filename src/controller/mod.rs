//! Goal seeking controller for a Braitenberg vehicle
//!
//! Two virtual light sensors sit at mirror-image mounting points on the
//! vehicle body. Each one reads `1 / d`, where `d` is the distance from the
//! sensor to the goal. The readings are cross-wired into the motion model:
//! the right sensor drives the left wheel and the left sensor drives the right
//! wheel, which turns the vehicle toward the goal.

use crate::common::{LaserScan, Pose2D, PoseStamped, SensorOffset, VelocityCommand};
use crate::config::ControllerConfig;
use crate::control::MotionModel;
use crate::error::ConfigError;
use crate::transport::VelocityPublisher;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Operating mode derived from the held goal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A goal is held and commands follow the light sensor law
    Seeking,
    /// No goal is held and every tick commands a stop
    Idle,
}

impl Mode {
    fn of(goal: &Option<Pose2D>) -> Mode {
        if goal.is_some() {
            Mode::Seeking
        } else {
            Mode::Idle
        }
    }
}

/// Reading of a virtual light sensor mounted at `offset` for the given goal.
///
/// Returns 0 without a goal, 1 when the goal coincides with the sensor and
/// `1 / d` otherwise. The goal must already be expressed in the body frame.
pub fn light_sensor_reading(goal: Option<&Pose2D>, offset: SensorOffset) -> f64 {
    let Some(goal) = goal else {
        return 0.0;
    };

    let distance = nalgebra::distance(&goal.position, &offset.as_point());
    if distance.abs() <= f64::EPSILON {
        1.0
    } else {
        1.0 / distance
    }
}

/// Reactive controller steering toward the latest goal accepted in the base frame
pub struct GoalSeekingController {
    base_frame_id: String,
    sensor_offset_x: f64,
    sensor_offset_y: f64,
    goal: Mutex<Option<Pose2D>>,
    motion_model: Box<dyn MotionModel>,
    publisher: Box<dyn VelocityPublisher>,
}

impl GoalSeekingController {
    /// Create a new controller with no goal
    pub fn new(
        base_frame_id: impl Into<String>,
        sensor_offset_x: f64,
        sensor_offset_y: f64,
        motion_model: Box<dyn MotionModel>,
        publisher: Box<dyn VelocityPublisher>,
    ) -> Self {
        GoalSeekingController {
            base_frame_id: base_frame_id.into(),
            sensor_offset_x,
            sensor_offset_y,
            goal: Mutex::new(None),
            motion_model,
            publisher,
        }
    }

    /// Create a controller driving a differential drive model built from the config
    pub fn from_config(
        config: &ControllerConfig,
        publisher: Box<dyn VelocityPublisher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let motion_model = config.motion_model()?;
        log::info!(
            "Goal seeking controller: base frame '{}', sensor offset ({}, {}), wheel radius {}, wheel base {}",
            config.base_link_frame_id,
            config.virtual_light_sensor_position_x_offset,
            config.virtual_light_sensor_position_y_offset,
            motion_model.wheel_radius(),
            motion_model.wheel_base()
        );
        Ok(Self::new(
            config.base_link_frame_id.clone(),
            config.virtual_light_sensor_position_x_offset,
            config.virtual_light_sensor_position_y_offset,
            Box::new(motion_model),
            publisher,
        ))
    }

    /// Frame a goal must be expressed in to be accepted
    pub fn base_frame_id(&self) -> &str {
        &self.base_frame_id
    }

    /// Sensor mounting points as `(right, left)`
    pub fn sensor_offsets(&self) -> (SensorOffset, SensorOffset) {
        SensorOffset::mirrored(self.sensor_offset_x, self.sensor_offset_y)
    }

    /// Snapshot of the held goal
    pub fn goal(&self) -> Option<Pose2D> {
        *self.lock_goal()
    }

    /// Current operating mode, read under the goal lock
    pub fn mode(&self) -> Mode {
        Mode::of(&self.lock_goal())
    }

    /// Accept `candidate` as the new goal if it is expressed in the base frame.
    ///
    /// A goal in any other frame clears the held goal, which stops the vehicle.
    pub fn on_goal_update(&self, candidate: Pose2D, frame_id: &str) {
        let (previous, current) = {
            let mut goal = self.lock_goal();
            let previous = Mode::of(&goal);

            if frame_id == self.base_frame_id {
                *goal = Some(candidate);
                log::debug!(
                    "Accepted goal ({:.3}, {:.3}) in frame '{}'",
                    candidate.x(),
                    candidate.y(),
                    frame_id
                );
            } else {
                *goal = None;
                log::warn!(
                    "Discarding goal in frame '{}', expected '{}'",
                    frame_id,
                    self.base_frame_id
                );
            }

            (previous, Mode::of(&goal))
        };

        if previous != current {
            log::info!("Controller mode {:?} -> {:?}", previous, current);
        }
    }

    /// Convenience wrapper for stamped goal messages
    pub fn on_pose_stamped(&self, msg: &PoseStamped) {
        self.on_goal_update(msg.pose, &msg.frame_id);
    }

    /// Scan input does not influence the command yet.
    ///
    /// The goal lock is still taken so that obstacle-aware behaviour added
    /// here sees the same state as the tick.
    pub fn on_sensor_scan_update(&self, scan: &LaserScan) {
        let _goal = self.lock_goal();
        log::trace!("Received scan with {} ranges", scan.ranges.len());
    }

    /// Compute and publish one velocity command.
    ///
    /// Exactly one command is published per call: the sensor-law command while
    /// a goal is held, a stop command otherwise. Returns the command sent.
    pub fn on_control_tick(&self) -> VelocityCommand {
        let cmd = {
            let goal = self.lock_goal();
            match goal.as_ref() {
                Some(goal) => {
                    let (right_offset, left_offset) = self.sensor_offsets();
                    let right_reading = light_sensor_reading(Some(goal), right_offset);
                    let left_reading = light_sensor_reading(Some(goal), left_offset);
                    // Crossed wiring: right sensor feeds the left wheel and vice versa
                    self.motion_model.get_twist(right_reading, left_reading)
                }
                None => VelocityCommand::zero(),
            }
        };

        if let Err(e) = self.publisher.publish(cmd) {
            log::warn!("Failed to publish velocity command: {}", e);
        }
        cmd
    }

    /// Reading of a light sensor mounted at `(x_offset, y_offset)` for the held goal
    pub fn emulate_light_sensor(&self, x_offset: f64, y_offset: f64) -> f64 {
        let goal = self.lock_goal();
        light_sensor_reading(goal.as_ref(), SensorOffset::new(x_offset, y_offset))
    }

    // The goal is replaced whole, so a poisoned lock still guards a valid value.
    fn lock_goal(&self) -> MutexGuard<'_, Option<Pose2D>> {
        self.goal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{DifferentialDriveModel, MockMotionModel};
    use crate::error::TransportError;
    use crate::transport::MockVelocityPublisher;
    use mockall::predicate::{always, eq};

    fn publisher_expecting(times: usize) -> MockVelocityPublisher {
        let mut publisher = MockVelocityPublisher::new();
        publisher.expect_publish().times(times).returning(|_| Ok(()));
        publisher
    }

    #[test]
    fn crossed_wiring_feeds_right_reading_to_left_wheel() {
        let goal = Pose2D::new(1.1, 0.1, 0.0);
        let right_reading = light_sensor_reading(Some(&goal), SensorOffset::new(0.1, -0.1));
        let left_reading = light_sensor_reading(Some(&goal), SensorOffset::new(0.1, 0.1));

        let mut model = MockMotionModel::new();
        model
            .expect_get_twist()
            .with(eq(right_reading), eq(left_reading))
            .times(1)
            .returning(|l, r| VelocityCommand::new(l + r, r - l));

        let controller = GoalSeekingController::new(
            "base_link",
            0.1,
            0.1,
            Box::new(model),
            Box::new(publisher_expecting(1)),
        );
        controller.on_goal_update(goal, "base_link");

        let cmd = controller.on_control_tick();
        assert_eq!(cmd.linear, right_reading + left_reading);
        assert!(cmd.angular > 0.0);
    }

    #[test]
    fn idle_tick_skips_motion_model() {
        let mut model = MockMotionModel::new();
        model.expect_get_twist().never();

        let mut publisher = MockVelocityPublisher::new();
        publisher
            .expect_publish()
            .with(eq(VelocityCommand::zero()))
            .times(1)
            .returning(|_| Ok(()));

        let controller =
            GoalSeekingController::new("base_link", 0.1, 0.1, Box::new(model), Box::new(publisher));
        assert!(controller.on_control_tick().is_zero());
    }

    #[test]
    fn publish_failure_does_not_abort_tick() {
        let mut publisher = MockVelocityPublisher::new();
        publisher
            .expect_publish()
            .with(always())
            .times(1)
            .returning(|_| Err(TransportError::Closed));

        let controller = GoalSeekingController::new(
            "base_link",
            0.1,
            0.1,
            Box::new(DifferentialDriveModel::default()),
            Box::new(publisher),
        );
        controller.on_goal_update(Pose2D::new(1.0, 0.0, 0.0), "base_link");

        assert!(!controller.on_control_tick().is_zero());
        assert_eq!(controller.mode(), Mode::Seeking);
    }

    #[test]
    fn foreign_frame_returns_to_idle() {
        let controller = GoalSeekingController::new(
            "base_link",
            0.1,
            0.1,
            Box::new(DifferentialDriveModel::default()),
            Box::new(publisher_expecting(0)),
        );
        assert_eq!(controller.mode(), Mode::Idle);

        controller.on_goal_update(Pose2D::new(1.0, 0.0, 0.0), "base_link");
        assert_eq!(controller.mode(), Mode::Seeking);

        controller.on_goal_update(Pose2D::new(2.0, 0.0, 0.0), "map");
        assert_eq!(controller.mode(), Mode::Idle);
        assert_eq!(controller.goal(), None);
    }

    #[test]
    fn scan_update_leaves_goal_untouched() {
        let controller = GoalSeekingController::new(
            "base_link",
            0.1,
            0.1,
            Box::new(DifferentialDriveModel::default()),
            Box::new(publisher_expecting(0)),
        );
        let goal = Pose2D::new(0.5, -0.5, 1.0);
        controller.on_goal_update(goal, "base_link");

        controller.on_sensor_scan_update(&LaserScan {
            ranges: vec![1.0; 360],
            ..LaserScan::default()
        });
        assert_eq!(controller.goal(), Some(goal));
    }

    #[test]
    fn reading_without_goal_is_zero() {
        assert_eq!(light_sensor_reading(None, SensorOffset::new(0.1, 0.1)), 0.0);
    }
}
