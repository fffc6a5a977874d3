//! # forage
//!
//! Generational foraging-selection simulator.
//!
//! A population of agents competes for a shrinking food supply. Agents that
//! eat survive into the next generation as an unchanged clone plus a handful
//! of mutated children; agents that starve leave nothing behind. Over the
//! generations the four heritable traits (speed, size, vision, stamina)
//! drift under that pressure.
//!
//! ## Features
//!
//! - **Tick-driven**: simulated time advances in fixed ticks, so pausing
//!   freezes ages and deadlines exactly
//! - **Lineages**: every generation-1 agent founds a named, coloured family
//! - **Configurable**: YAML configuration files
//! - **Seedable**: optional seeded random number generation for debugging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forage::{Config, World};
//!
//! let mut world = World::new(Config::default()).unwrap();
//!
//! // Run ten generations, or until the population dies out
//! world
//!     .run_generations(10, None, |s| println!("{}", s.summary()))
//!     .unwrap();
//!
//! for entry in world.generation().rankings() {
//!     println!("#{} {} ({})", entry.rank, entry.lineage.name, entry.population);
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use forage::Config;
//!
//! let mut config = Config::default();
//! config.population.nr_of_species = 2;
//! config.food.nr_of_foods = 10;
//! config.evolution.mutation_rate = 0.1;
//! assert!(config.validate().is_ok());
//! ```

pub mod agent;
pub mod analysis;
pub mod config;
pub mod error;
pub mod evolution;
pub mod food;
pub mod generation;
pub mod geometry;
pub mod naming;
pub mod random;
pub mod ranking;
pub mod shared;
pub mod stats;
pub mod traits;
pub mod world;

// Re-export main types
pub use agent::{Agent, AgentId, AnimationCue, LifecycleState, Outcome};
pub use config::Config;
pub use error::{ConfigError, SimError};
pub use evolution::ReproductionEngine;
pub use food::{FoodItem, FoodPool};
pub use generation::Generation;
pub use naming::LineageKey;
pub use ranking::{rank_families, FamilyRankEntry};
pub use stats::{GenerationSummary, StatsHistory};
pub use traits::{TraitAllocator, TraitPoints};
pub use world::{RunState, World};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick headless benchmark
pub fn benchmark(generations: u32, population: usize) -> error::Result<BenchmarkResult> {
    use std::time::Instant;

    let mut config = Config::default();
    config.population.nr_of_species = population;
    config.food.nr_of_foods = population * 2;

    let mut world = World::new(config)?;

    let start = Instant::now();
    let completed = world.run_generations(generations, None, |_| {})?;
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        generations: completed,
        ticks: world.total_ticks,
        initial_population: population,
        final_population: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: world.total_ticks as f64 / elapsed.as_secs_f64(),
        extinct: world.is_extinct(),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: u32,
    pub ticks: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub extinct: bool,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        if self.extinct {
            writeln!(f, "Population went extinct")?;
        }
        Ok(())
    }
}
