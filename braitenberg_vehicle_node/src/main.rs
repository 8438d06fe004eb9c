use anyhow::{anyhow, Context as _, Error, Result};
use braitenberg_vehicle::transport::inbound_channel;
use braitenberg_vehicle::{
    ControllerConfig, ControllerNode, GoalSeekingController, Inbound, LaserScan, Pose2D,
    PoseStamped, TransportError, VelocityCommand, VelocityPublisher,
};
use rclrs::{Context, CreateBasicExecutor, Node, RclrsErrorFilter, SpinOptions, QOS_PROFILE_DEFAULT};
use std::sync::Arc;
use tokio::sync::mpsc;

use geometry_msgs::msg::{PoseStamped as PoseStampedMsg, Twist};
use sensor_msgs::msg::LaserScan as LaserScanMsg;

const NODE_NAME: &str = "braitenberg_vehicle_controller";

/// Publishes controller commands as `geometry_msgs/Twist`
struct TwistPublisher {
    inner: Arc<rclrs::Publisher<Twist>>,
}

impl VelocityPublisher for TwistPublisher {
    fn publish(&self, cmd: VelocityCommand) -> Result<(), TransportError> {
        let mut twist = Twist::default();
        twist.linear.x = cmd.linear;
        twist.angular.z = cmd.angular;
        self.inner
            .publish(&twist)
            .map_err(|e| TransportError::Publish(e.to_string()))
    }
}

fn goal_from_msg(msg: &PoseStampedMsg) -> PoseStamped {
    let p = &msg.pose.position;
    let q = &msg.pose.orientation;
    PoseStamped::new(
        msg.header.frame_id.clone(),
        Pose2D::from_quaternion(p.x, p.y, q.x, q.y, q.z, q.w),
    )
}

fn scan_from_msg(msg: &LaserScanMsg) -> LaserScan {
    LaserScan {
        angle_min: msg.angle_min,
        angle_max: msg.angle_max,
        angle_increment: msg.angle_increment,
        range_min: msg.range_min,
        range_max: msg.range_max,
        ranges: msg.ranges.clone(),
    }
}

fn declare_config(node: &Node) -> Result<ControllerConfig> {
    let defaults = ControllerConfig::default();

    let base_link_frame_id = node
        .declare_parameter::<Arc<str>>("base_link_frame_id")
        .default(defaults.base_link_frame_id.as_str().into())
        .mandatory()
        .map_err(|e| anyhow!("base_link_frame_id: {:?}", e))?
        .get();
    let x_offset = node
        .declare_parameter("virtual_light_sensor_position_x_offset")
        .default(defaults.virtual_light_sensor_position_x_offset)
        .mandatory()
        .map_err(|e| anyhow!("virtual_light_sensor_position_x_offset: {:?}", e))?
        .get();
    let y_offset = node
        .declare_parameter("virtual_light_sensor_position_y_offset")
        .default(defaults.virtual_light_sensor_position_y_offset)
        .mandatory()
        .map_err(|e| anyhow!("virtual_light_sensor_position_y_offset: {:?}", e))?
        .get();
    let wheel_radius = node
        .declare_parameter("wheel_radius")
        .default(defaults.wheel_radius)
        .mandatory()
        .map_err(|e| anyhow!("wheel_radius: {:?}", e))?
        .get();
    let wheel_base = node
        .declare_parameter("wheel_base")
        .default(defaults.wheel_base)
        .mandatory()
        .map_err(|e| anyhow!("wheel_base: {:?}", e))?
        .get();
    let tick_period_ms: i64 = node
        .declare_parameter("tick_period_ms")
        .default(defaults.tick_period_ms as i64)
        .mandatory()
        .map_err(|e| anyhow!("tick_period_ms: {:?}", e))?
        .get();

    let config = ControllerConfig {
        base_link_frame_id: base_link_frame_id.to_string(),
        virtual_light_sensor_position_x_offset: x_offset,
        virtual_light_sensor_position_y_offset: y_offset,
        wheel_radius,
        wheel_base,
        tick_period_ms: u64::try_from(tick_period_ms)
            .context("tick_period_ms must not be negative")?,
        ..defaults
    };
    config.validate()?;
    Ok(config)
}

fn forward(inbound: &mpsc::Sender<Inbound>, msg: Inbound) {
    // Called from the rclrs executor thread, outside the tokio runtime
    if inbound.blocking_send(msg).is_err() {
        log::warn!("Controller node is no longer accepting messages");
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Initializing {}...", NODE_NAME);

    let mut executor = Context::default_from_env()?.create_basic_executor();
    let node = executor.create_node(NODE_NAME)?;
    let config = declare_config(&node)?;

    let qos = QOS_PROFILE_DEFAULT.keep_last(u32::try_from(config.queue_depth).unwrap_or(1));
    let cmd_vel_publisher = node.create_publisher::<Twist>(&config.cmd_vel_topic, qos)?;
    let controller = Arc::new(GoalSeekingController::from_config(
        &config,
        Box::new(TwistPublisher {
            inner: cmd_vel_publisher,
        }),
    )?);

    let runtime = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    let (inbound_tx, inbound_rx) = inbound_channel(config.queue_depth);
    let controller_node = runtime
        .block_on(async { ControllerNode::spawn(controller, inbound_rx, config.tick_period()) })
        .context("starting controller node")?;

    let goal_tx = inbound_tx.clone();
    let _goal_subscription = node.create_subscription::<PoseStampedMsg, _>(
        &config.goal_topic,
        qos,
        move |msg: PoseStampedMsg| forward(&goal_tx, Inbound::Goal(goal_from_msg(&msg))),
    )?;

    let scan_tx = inbound_tx;
    let _scan_subscription = node.create_subscription::<LaserScanMsg, _>(
        &config.scan_topic,
        qos,
        move |msg: LaserScanMsg| forward(&scan_tx, Inbound::Scan(scan_from_msg(&msg))),
    )?;

    log::info!(
        "Publishing {} and listening on {} / {}",
        config.cmd_vel_topic,
        config.goal_topic,
        config.scan_topic
    );

    let spin_result = executor
        .spin(SpinOptions::default())
        .first_error()
        .map_err(Error::from);

    runtime.block_on(controller_node.shutdown());
    spin_result
}
