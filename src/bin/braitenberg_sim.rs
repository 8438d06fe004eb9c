use anyhow::{bail, Context, Result};
use braitenberg_vehicle::sim::SimulatedVehicle;
use braitenberg_vehicle::transport::{inbound_channel, velocity_channel};
use braitenberg_vehicle::{
    ControllerConfig, ControllerNode, GoalSeekingController, Inbound, PoseStamped,
};
use nalgebra::Point2;
use std::sync::Arc;

const MAX_STEPS: usize = 600;
const GOAL_TOLERANCE: f64 = 0.05;

struct Args {
    config: ControllerConfig,
    goal: Point2<f64>,
}

// braitenberg_sim [config.yaml] [goal_x goal_y]
fn parse_args() -> Result<Args> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let (config, rest) = match args.first() {
        Some(path) if path.ends_with(".yaml") || path.ends_with(".yml") => (
            ControllerConfig::load(path).with_context(|| format!("loading {}", path))?,
            &args[1..],
        ),
        _ => (ControllerConfig::default(), &args[..]),
    };

    let goal = match rest {
        [] => Point2::new(1.0, 0.5),
        [x, y] => Point2::new(
            x.parse().with_context(|| format!("invalid goal x '{}'", x))?,
            y.parse().with_context(|| format!("invalid goal y '{}'", y))?,
        ),
        _ => bail!("usage: braitenberg_sim [config.yaml] [goal_x goal_y]"),
    };

    Ok(Args { config, goal })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Args { config, goal } = parse_args()?;
    log::info!("Simulating vehicle seeking world goal ({:.2}, {:.2})", goal.x, goal.y);

    let (publisher, mut commands) = velocity_channel();
    let controller = Arc::new(
        GoalSeekingController::from_config(&config, Box::new(publisher))
            .context("building controller")?,
    );
    let (inbound_tx, inbound_rx) = inbound_channel(config.queue_depth);
    let node = ControllerNode::spawn(controller, inbound_rx, config.tick_period())
        .context("starting controller node")?;

    let dt = config.tick_period().as_secs_f64();
    let mut vehicle = SimulatedVehicle::new(0.0, 0.0, 0.0);
    let mut reached = false;

    for step in 0..MAX_STEPS {
        // The controller only trusts goals in the body frame, so re-express it every step
        let local_goal = vehicle.goal_in_body_frame(goal);
        inbound_tx
            .send(Inbound::Goal(PoseStamped::new(
                config.base_link_frame_id.clone(),
                local_goal,
            )))
            .await
            .context("controller stopped accepting goals")?;

        let cmd = commands
            .recv()
            .await
            .context("velocity channel closed")?;
        vehicle.step(cmd, dt);

        let distance = vehicle.distance_to(goal);
        if step % 10 == 0 {
            let pose = vehicle.pose();
            log::info!(
                "step {:>3}: pose=({:.3}, {:.3}, {:.3}) cmd=({:.4}, {:.4}) distance={:.3}",
                step,
                pose.x(),
                pose.y(),
                pose.theta,
                cmd.linear,
                cmd.angular,
                distance
            );
        }
        if distance < GOAL_TOLERANCE {
            log::info!("Goal reached after {} steps", step + 1);
            reached = true;
            break;
        }
    }

    if !reached {
        log::warn!(
            "Goal not reached within {} steps, final distance {:.3}",
            MAX_STEPS,
            vehicle.distance_to(goal)
        );
    }

    drop(inbound_tx);
    let stats = node.shutdown().await;
    log::info!("Ticks: {}, inbound messages: {}", stats.ticks, stats.messages);
    Ok(())
}
