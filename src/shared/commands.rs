//! Commands for controlling the simulation from a front-end.

use crate::config::Config;
use serde::{Deserialize, Serialize};

/// Commands sent from a front-end to the simulation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimCommand {
    /// Pause the simulation
    Pause,
    /// Resume the simulation
    Resume,
    /// Execute a single tick
    Step,
    /// Set simulation speed multiplier (0.1 - 10.0)
    SetSpeed(f32),
    /// Restart from generation 1 with current config
    Reset,
    /// Restart from generation 1 with new settings
    ResetWithSettings(SimSettings),
    /// Shutdown the simulation thread
    Shutdown,
}

/// The settings form: the values a user picks before a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSettings {
    /// Generation-1 population, one lineage each
    pub nr_of_species: usize,
    /// Food budget target
    pub nr_of_foods: usize,
    /// Mutation rate as a percentage (0 - 100)
    pub mutation_percent: f64,
    pub world_width: u32,
    pub world_height: u32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SimSettings {
    /// Create settings from a Config
    pub fn from_config(config: &Config) -> Self {
        Self {
            nr_of_species: config.population.nr_of_species,
            nr_of_foods: config.food.nr_of_foods,
            mutation_percent: config.evolution.mutation_rate * 100.0,
            world_width: config.world.width,
            world_height: config.world.height,
        }
    }

    /// Apply settings to a Config; the percentage becomes a fraction
    pub fn apply_to_config(&self, config: &mut Config) {
        config.population.nr_of_species = self.nr_of_species;
        config.food.nr_of_foods = self.nr_of_foods;
        config.evolution.mutation_rate = (self.mutation_percent / 100.0).clamp(0.0, 1.0);
        config.world.width = self.world_width;
        config.world.height = self.world_height;
    }
}

/// Current simulation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimState {
    /// Simulation is running
    Running,
    /// Simulation is paused
    Paused,
    /// Simulation has stopped (extinct, failed or shut down)
    Stopped,
}

impl Default for SimState {
    fn default() -> Self {
        Self::Paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roundtrip_through_config() {
        let mut config = Config::default();
        let settings = SimSettings {
            nr_of_species: 2,
            nr_of_foods: 10,
            mutation_percent: 25.0,
            world_width: 400,
            world_height: 300,
        };
        settings.apply_to_config(&mut config);

        assert_eq!(config.population.nr_of_species, 2);
        assert_eq!(config.food.nr_of_foods, 10);
        assert!((config.evolution.mutation_rate - 0.25).abs() < 1e-12);
        assert_eq!((config.world.width, config.world.height), (400, 300));
        assert_eq!(SimSettings::from_config(&config), settings);
    }

    #[test]
    fn test_mutation_percent_clamped() {
        let mut config = Config::default();
        let settings = SimSettings {
            mutation_percent: 250.0,
            ..SimSettings::default()
        };
        settings.apply_to_config(&mut config);
        assert_eq!(config.evolution.mutation_rate, 1.0);
    }
}
