//! Configuration system for the foraging simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub population: PopulationConfig,
    pub food: FoodConfig,
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width in pixels
    pub width: u32,
    /// World height in pixels
    pub height: u32,
}

/// Initial population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of generation-0 agents, one lineage each
    pub nr_of_species: usize,
}

/// Food supply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodConfig {
    /// Food budget target; the actual count is resampled every generation
    pub nr_of_foods: usize,
    /// Drift speed of food items (pixels per second)
    pub speed: f64,
    /// Contact radius of a food item
    pub radius: f64,
    /// Shrink factor applied twice to derive the per-generation food range
    pub deviation: f64,
}

/// Reproduction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Multiplicative mutation bound, as a fraction in [0, 1]
    pub mutation_rate: f64,
}

/// Simulated-time parameters. All durations are in simulated milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Simulated time advanced by one tick
    pub tick_millis: u64,
    /// Delay between feeding and removal
    pub feed_delay_millis: u64,
    /// Length of the death animation before decay starts
    pub death_animation_millis: u64,
    /// Length of the fade-out during decay
    pub fade_millis: u64,
    /// Shortest random-walk heading interval
    pub wander_min_millis: u64,
    /// Longest random-walk heading interval
    pub wander_max_millis: u64,
    /// Upward drift of decaying agents (pixels per second)
    pub ghost_float_speed: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Generations between history records
    pub history_interval: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            population: PopulationConfig::default(),
            food: FoodConfig::default(),
            evolution: EvolutionConfig::default(),
            timing: TimingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self { nr_of_species: 20 }
    }
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            nr_of_foods: 40,
            speed: 25.0,
            radius: 8.0,
            deviation: 0.8,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self { mutation_rate: 0.1 }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_millis: 16,
            feed_delay_millis: 1000,
            death_animation_millis: 750,
            fade_millis: 1800,
            wander_min_millis: 1000,
            wander_max_millis: 4000,
            ghost_float_speed: 10.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            history_interval: 1,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.world.width == 0 || self.world.height == 0 {
            return invalid("world width and height must be > 0");
        }
        if self.population.nr_of_species == 0 {
            return invalid("nr_of_species must be > 0");
        }
        let edge_points = 2 * (self.world.width as usize + self.world.height as usize);
        if self.population.nr_of_species > edge_points {
            return invalid("nr_of_species cannot exceed the number of world edge points");
        }
        if self.food.nr_of_foods == 0 {
            return invalid("nr_of_foods must be > 0");
        }
        if !(self.food.deviation > 0.0 && self.food.deviation <= 1.0) {
            return invalid("food deviation must be in (0, 1]");
        }
        if self.food.radius < 0.0 || self.food.speed < 0.0 {
            return invalid("food radius and speed must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.evolution.mutation_rate) {
            return invalid("mutation_rate must be between 0 and 1");
        }
        if self.timing.tick_millis == 0 {
            return invalid("tick_millis must be > 0");
        }
        if self.timing.wander_min_millis > self.timing.wander_max_millis {
            return invalid("wander_min_millis cannot exceed wander_max_millis");
        }
        Ok(())
    }

    /// Lower and upper bound of the per-generation food count
    pub fn food_range(&self) -> (f64, f64) {
        let max = self.food.nr_of_foods as f64 * self.food.deviation;
        let min = max * self.food.deviation;
        (min, max)
    }
}
