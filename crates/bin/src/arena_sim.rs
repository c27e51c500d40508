//! Arena sim - headless tick driver for the visibility engine.
//!
//! Populates a world from `config.toml`, then every tick: drifts entities,
//! churns some food, rebuilds the partition index once and resolves one
//! visible set per player.

use arena::{Config, ViewTracker, VisibilityResolver, World};
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const FOOD_SIZE: f32 = 10.0;
const VIRUS_SIZE: f32 = 100.0;
const EJECT_SIZE: f32 = 36.056;
const PLAYER_CELL_SIZE: f32 = 32.0;
/// Food pellets eaten per tick by the churn stand-in.
const FOOD_CHURN: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Arena sim v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  World: {}x{}", config.world.width, config.world.height);
    info!("  Cell size: {}", config.grid.cell_size);
    info!(
        "  View: {}x{} + {} margin",
        config.view.screen_width, config.view.screen_height, config.view.margin
    );

    let mut world = World::new(&config)?;
    populate(&mut world, &config);
    info!(
        "Partition grid: {} cols x {} rows",
        world.partition().cols(),
        world.partition().rows()
    );

    tokio::select! {
        _ = run_tick_loop(world, &config) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
    }

    Ok(())
}

fn populate(world: &mut World, config: &Config) {
    let sim = &config.sim;
    world.spawn_food(sim.food, FOOD_SIZE);
    world.spawn_viruses(sim.viruses, VIRUS_SIZE);
    world.spawn_ejected(sim.ejected, EJECT_SIZE);
    for i in 0..sim.players {
        world.spawn_player(&format!("bot {i}"), sim.player_cells, PLAYER_CELL_SIZE);
    }

    let counts = world.cell_counts();
    info!(
        "World initialized: {} food, {} viruses, {} ejected, {} players ({} cells)",
        counts.food, counts.viruses, counts.ejected, counts.players, counts.player_cells
    );
}

/// Running totals between reports.
#[derive(Debug, Default)]
struct Report {
    ticks: u64,
    visible: usize,
    resolves: usize,
    entered: usize,
    left: usize,
    busy: Duration,
}

async fn run_tick_loop(mut world: World, config: &Config) {
    let tick_interval = Duration::from_millis(config.sim.tick_interval_ms.max(1));
    let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut resolver = VisibilityResolver::new(config.view.clone());
    let mut trackers: HashMap<u32, ViewTracker> = HashMap::new();
    let mut report = Report::default();
    let report_every = config.sim.report_every.max(1);

    loop {
        ticker.tick().await;
        let started = Instant::now();

        // Stand-ins for the external simulation step.
        world.drift(config.sim.drift as f32);
        churn_food(&mut world, config.sim.food);

        let stats = world.rebuild();
        if stats.clamped > 0 {
            warn!("Tick {}: {} positions clamped to the world border", world.tick(), stats.clamped);
        }

        let mut resolved = Vec::with_capacity(trackers.len());
        for (player_id, visible) in world.visible_sets(&mut resolver) {
            resolved.push(player_id);
            let delta = trackers.entry(player_id).or_default().update(&visible);
            report.visible += visible.len();
            report.resolves += 1;
            report.entered += delta.entered.len();
            report.left += delta.left.len();
        }
        prune_trackers(&mut trackers, &resolved);

        let busy = started.elapsed();
        report.busy += busy;
        report.ticks += 1;
        if busy > tick_interval {
            warn!("Tick {} took {:?}, over the {:?} budget", world.tick(), busy, tick_interval);
        }

        if world.tick() % report_every == 0 {
            log_report(&world, &report);
            report = Report::default();
        }

        if config.sim.max_ticks > 0 && world.tick() >= config.sim.max_ticks {
            info!("Reached {} ticks, stopping", world.tick());
            break;
        }
    }
}

/// Eat a few random pellets and respawn back to the target.
fn churn_food(world: &mut World, target: usize) {
    let mut rng = rand::rng();
    for _ in 0..FOOD_CHURN {
        if world.food.is_empty() {
            break;
        }
        let index = rng.random_range(0..world.food.len());
        if world.remove_food(index).is_none() {
            break;
        }
    }
    world.spawn_food(target, FOOD_SIZE);
}

/// Drop trackers of players that were not resolved this tick (dead or gone).
fn prune_trackers(trackers: &mut HashMap<u32, ViewTracker>, resolved: &[u32]) {
    if trackers.len() > resolved.len() {
        trackers.retain(|id, _| resolved.contains(id));
    }
}

fn log_report(world: &World, report: &Report) {
    let resolves = report.resolves.max(1);
    let ticks = report.ticks.max(1);
    info!(
        "Tick {}: avg {} visible/player, {} entered, {} left, avg tick {:?}",
        world.tick(),
        report.visible / resolves,
        report.entered,
        report.left,
        report.busy / ticks as u32
    );
    debug!("Partition stats: {:?}", world.partition().stats());
}
