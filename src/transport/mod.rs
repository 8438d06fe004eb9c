//! Message transport seam between the controller and the outside world
//!
//! The controller only needs to send velocity commands; goal and scan
//! messages reach it as [`Inbound`] events dispatched by the runtime.

use crate::common::{LaserScan, PoseStamped, VelocityCommand};
use crate::error::TransportError;
use tokio::sync::mpsc;

/// Outbound side of the transport
#[cfg_attr(test, mockall::automock)]
pub trait VelocityPublisher: Send + Sync {
    fn publish(&self, cmd: VelocityCommand) -> Result<(), TransportError>;
}

/// Messages arriving at the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Goal(PoseStamped),
    Scan(LaserScan),
}

/// Publishes velocity commands into an in-process channel
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::UnboundedSender<VelocityCommand>,
}

/// Create a publisher together with the receiving end of its channel
pub fn velocity_channel() -> (ChannelPublisher, mpsc::UnboundedReceiver<VelocityCommand>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChannelPublisher { sender }, receiver)
}

impl VelocityPublisher for ChannelPublisher {
    fn publish(&self, cmd: VelocityCommand) -> Result<(), TransportError> {
        self.sender.send(cmd).map_err(|_| TransportError::Closed)
    }
}

/// Bounded channel for inbound goal and scan messages
pub fn inbound_channel(depth: usize) -> (mpsc::Sender<Inbound>, mpsc::Receiver<Inbound>) {
    mpsc::channel(depth.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_publisher_delivers_in_order() {
        let (publisher, mut receiver) = velocity_channel();
        publisher.publish(VelocityCommand::new(0.1, 0.0)).unwrap();
        publisher.publish(VelocityCommand::zero()).unwrap();

        assert_eq!(receiver.try_recv().unwrap(), VelocityCommand::new(0.1, 0.0));
        assert_eq!(receiver.try_recv().unwrap(), VelocityCommand::zero());
    }

    #[test]
    fn publishing_after_receiver_dropped_fails() {
        let (publisher, receiver) = velocity_channel();
        drop(receiver);
        assert_eq!(
            publisher.publish(VelocityCommand::zero()),
            Err(TransportError::Closed)
        );
    }
}
