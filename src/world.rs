//! World simulation engine - main simulation loop.
//!
//! The world owns the running generation and drives it tick by tick. When a
//! generation ends its survivors are reproduced into the next one; a
//! generation without survivors ends the run.

use crate::agent::AgentId;
use crate::config::Config;
use crate::error::Result;
use crate::evolution::ReproductionEngine;
use crate::generation::Generation;
use crate::stats::{GenerationSummary, LineageTracker, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Whether the run can continue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Running,
    /// A generation ended without survivors
    Extinct,
}

/// The simulation world
pub struct World {
    // Configuration
    pub config: Config,

    // Current generation
    generation: Generation,

    // State
    /// Simulated milliseconds since the run started, excluding pauses
    pub time: u64,
    pub total_ticks: u64,
    state: RunState,
    paused: bool,

    // Statistics
    pub stats_history: StatsHistory,
    pub lineage_tracker: LineageTracker,

    // Evolution
    pub evolution_engine: ReproductionEngine,

    // ID generation
    next_agent_id: AgentId,

    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new world with a random seed
    pub fn new(config: Config) -> Result<Self> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed. The configuration is
    /// validated first.
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut next_agent_id = 0;
        let generation = Generation::initial(&config, &mut next_agent_id, &mut rng)?;

        log::info!(
            "world created: seed {}, {} species, {} food target, mutation {:.2}",
            seed,
            config.population.nr_of_species,
            config.food.nr_of_foods,
            config.evolution.mutation_rate
        );

        Ok(Self {
            stats_history: StatsHistory::new(config.logging.history_interval),
            lineage_tracker: LineageTracker::new(),
            evolution_engine: ReproductionEngine::from_config(&config),
            config,
            generation,
            time: 0,
            total_ticks: 0,
            state: RunState::Running,
            paused: false,
            next_agent_id,
            rng,
            seed,
        })
    }

    /// Start over from generation 1 with the current configuration.
    /// Pause state is kept.
    pub fn reset(&mut self) -> Result<()> {
        let mut next_agent_id = 0;
        self.generation = Generation::initial(&self.config, &mut next_agent_id, &mut self.rng)?;
        self.next_agent_id = next_agent_id;
        self.time = 0;
        self.total_ticks = 0;
        self.state = RunState::Running;
        self.stats_history = StatsHistory::new(self.config.logging.history_interval);
        self.lineage_tracker = LineageTracker::new();
        self.evolution_engine = ReproductionEngine::from_config(&self.config);
        log::info!("world reset");
        Ok(())
    }

    /// Replace the configuration and start over. An invalid configuration
    /// is rejected and the world is left untouched.
    pub fn reset_with_config(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        self.config = config;
        self.reset()
    }

    /// Perform one simulation tick.
    ///
    /// Returns the summary of the generation that ended on this tick, if any.
    /// Does nothing while paused or after extinction.
    pub fn step(&mut self) -> Result<Option<GenerationSummary>> {
        if self.paused || self.state == RunState::Extinct {
            return Ok(None);
        }

        let ended = self.generation.tick(&mut self.rng)?;
        self.time += self.config.timing.tick_millis;
        self.total_ticks += 1;

        if !ended {
            return Ok(None);
        }
        Ok(Some(self.advance_generation()))
    }

    fn advance_generation(&mut self) -> GenerationSummary {
        let summary = self.generation.summary();
        self.lineage_tracker
            .update(self.generation.number, self.generation.agents());
        if self.stats_history.wants(summary.generation) {
            self.stats_history.record(summary.clone());
        }
        log::info!(
            "generation {} ended: population {}, food {}, survivors {}, ticks {}",
            summary.generation,
            summary.population,
            summary.food_spawned,
            summary.survivors,
            summary.ticks
        );

        let survivors: Vec<_> = self.generation.survivors().cloned().collect();
        if survivors.is_empty() {
            self.state = RunState::Extinct;
            log::info!(
                "extinction after generation {} ({} s simulated)",
                summary.generation,
                self.time / 1000
            );
            return summary;
        }

        let next = self.evolution_engine.reproduce(
            &survivors,
            &self.generation.bounds,
            &mut self.next_agent_id,
            &mut self.rng,
        );
        self.generation =
            Generation::from_agents(self.generation.number + 1, next, &self.config, &mut self.rng);
        summary
    }

    /// Run simulation for specified number of ticks
    pub fn run(&mut self, steps: u64) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Run until `generations` generations have ended, the population dies
    /// out, or `max_ticks` ticks have passed. The callback sees every
    /// generation summary as it is produced. Returns the number of
    /// generations completed.
    pub fn run_generations<F>(
        &mut self,
        generations: u32,
        max_ticks: Option<u64>,
        mut callback: F,
    ) -> Result<u32>
    where
        F: FnMut(&GenerationSummary),
    {
        let mut completed = 0;
        let start = self.total_ticks;

        while completed < generations && !self.is_extinct() && !self.paused {
            if max_ticks.map_or(false, |max| self.total_ticks - start >= max) {
                log::info!("tick limit reached after {} generations", completed);
                break;
            }
            if let Some(summary) = self.step()? {
                completed += 1;
                callback(&summary);
            }
        }

        Ok(completed)
    }

    /// Suspend tick advancement; ages and deadlines freeze with it
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Check if population is extinct
    pub fn is_extinct(&self) -> bool {
        self.state == RunState::Extinct
    }

    /// The running generation, or the last one after extinction
    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub fn generation_number(&self) -> u32 {
        self.generation.number
    }

    /// Get current population count
    pub fn population(&self) -> usize {
        self.generation.agents().len()
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
