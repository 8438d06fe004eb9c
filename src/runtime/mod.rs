//! Tokio runtime driving a [`GoalSeekingController`]
//!
//! One task ticks the controller at a fixed rate, another dispatches inbound
//! goal and scan messages. Both run on the multi-threaded executor and may
//! touch the controller at the same time; the controller's goal lock keeps
//! them consistent.

use crate::controller::GoalSeekingController;
use crate::error::ConfigError;
use crate::transport::Inbound;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Running controller node
pub struct ControllerNode {
    controller: Arc<GoalSeekingController>,
    running: watch::Sender<bool>,
    tick_task: JoinHandle<u64>,
    dispatch_task: JoinHandle<u64>,
}

/// Counters reported when a node shuts down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStats {
    pub ticks: u64,
    pub messages: u64,
}

impl ControllerNode {
    /// Start the tick and dispatch tasks on the current tokio runtime.
    ///
    /// A zero tick period is rejected; the node would otherwise never tick.
    pub fn spawn(
        controller: Arc<GoalSeekingController>,
        inbound: mpsc::Receiver<Inbound>,
        tick_period: Duration,
    ) -> Result<Self, ConfigError> {
        if tick_period.is_zero() {
            return Err(ConfigError::Invalid(
                "tick period must be greater than zero".to_string(),
            ));
        }

        let (running, running_rx) = watch::channel(true);

        let tick_task = tokio::spawn(tick_loop(
            Arc::clone(&controller),
            tick_period,
            running_rx.clone(),
        ));
        let dispatch_task = tokio::spawn(dispatch_loop(Arc::clone(&controller), inbound, running_rx));

        log::info!(
            "Controller node started, ticking every {} ms",
            tick_period.as_millis()
        );

        Ok(ControllerNode {
            controller,
            running,
            tick_task,
            dispatch_task,
        })
    }

    /// Controller shared with the tick and dispatch tasks
    pub fn controller(&self) -> &Arc<GoalSeekingController> {
        &self.controller
    }

    /// Stop both tasks and wait for them to finish
    pub async fn shutdown(self) -> NodeStats {
        // Receivers may already be gone if both loops ended on their own
        let _ = self.running.send(false);

        let ticks = self.tick_task.await.unwrap_or_else(|e| {
            log::error!("Tick task failed: {}", e);
            0
        });
        let messages = self.dispatch_task.await.unwrap_or_else(|e| {
            log::error!("Dispatch task failed: {}", e);
            0
        });

        log::info!(
            "Controller node stopped after {} ticks and {} messages",
            ticks,
            messages
        );
        NodeStats { ticks, messages }
    }
}

async fn tick_loop(
    controller: Arc<GoalSeekingController>,
    period: Duration,
    mut running: watch::Receiver<bool>,
) -> u64 {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = 0;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let cmd = controller.on_control_tick();
                ticks += 1;
                log::trace!("Tick {}: linear={:.4}, angular={:.4}", ticks, cmd.linear, cmd.angular);
            }
            changed = running.changed() => {
                if changed.is_err() || !*running.borrow() {
                    break;
                }
            }
        }
    }

    ticks
}

async fn dispatch_loop(
    controller: Arc<GoalSeekingController>,
    mut inbound: mpsc::Receiver<Inbound>,
    mut running: watch::Receiver<bool>,
) -> u64 {
    let mut messages = 0;

    loop {
        tokio::select! {
            msg = inbound.recv() => {
                match msg {
                    Some(Inbound::Goal(goal)) => controller.on_pose_stamped(&goal),
                    Some(Inbound::Scan(scan)) => controller.on_sensor_scan_update(&scan),
                    None => {
                        log::debug!("Inbound channel closed");
                        break;
                    }
                }
                messages += 1;
            }
            changed = running.changed() => {
                if changed.is_err() || !*running.borrow() {
                    break;
                }
            }
        }
    }

    messages
}
