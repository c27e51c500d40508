//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from `path`, writing a default file there if none exists.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

/// World size. Fixed for the process lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_size")]
    pub width: f64,
    #[serde(default = "default_world_size")]
    pub height: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_size(),
            height: default_world_size(),
        }
    }
}

fn default_world_size() -> f64 {
    14142.0
}

/// Partition grid tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridConfig {
    /// Side of one grid cell in world units. Keep `cols * rows` small
    /// relative to the entity count.
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
        }
    }
}

fn default_cell_size() -> f64 {
    250.0
}

/// Client viewport used to size each player's visibility window.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    #[serde(default = "default_screen_width")]
    pub screen_width: f64,
    #[serde(default = "default_screen_height")]
    pub screen_height: f64,
    /// Padding added around the window to hide pop-in at the edge.
    #[serde(default = "default_view_margin")]
    pub margin: f64,
    /// Widen the window as the player grows, using the client zoom curve.
    #[serde(default)]
    pub scale_with_size: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            margin: default_view_margin(),
            scale_with_size: false,
        }
    }
}

fn default_screen_width() -> f64 {
    1920.0
}
fn default_screen_height() -> f64 {
    1080.0
}
fn default_view_margin() -> f64 {
    100.0
}

/// Headless simulation settings for `arena-sim`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    /// Tick interval in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Stop after this many ticks (0 = run until interrupted).
    #[serde(default)]
    pub max_ticks: u64,
    /// Number of simulated players.
    #[serde(default = "default_sim_players")]
    pub players: usize,
    /// Cells per simulated player.
    #[serde(default = "default_player_cells")]
    pub player_cells: usize,
    /// Food pellets kept on the map.
    #[serde(default = "default_sim_food")]
    pub food: usize,
    /// Viruses kept on the map.
    #[serde(default = "default_sim_viruses")]
    pub viruses: usize,
    /// Ejected mass fragments kept on the map.
    #[serde(default = "default_sim_ejected")]
    pub ejected: usize,
    /// Maximum distance a player cell drifts per tick.
    #[serde(default = "default_drift")]
    pub drift: f64,
    /// Log a visibility summary every N ticks.
    #[serde(default = "default_report_every")]
    pub report_every: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            max_ticks: 0,
            players: default_sim_players(),
            player_cells: default_player_cells(),
            food: default_sim_food(),
            viruses: default_sim_viruses(),
            ejected: default_sim_ejected(),
            drift: default_drift(),
            report_every: default_report_every(),
        }
    }
}

fn default_tick_interval() -> u64 {
    40
}
fn default_sim_players() -> usize {
    16
}
fn default_player_cells() -> usize {
    4
}
fn default_sim_food() -> usize {
    2000
}
fn default_sim_viruses() -> usize {
    50
}
fn default_sim_ejected() -> usize {
    100
}
fn default_drift() -> f64 {
    12.0
}
fn default_report_every() -> u64 {
    25
}
