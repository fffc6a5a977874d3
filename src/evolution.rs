//! Reproduction: turning a generation's survivors into the next population.

use crate::agent::{Agent, AgentId};
use crate::config::Config;
use crate::geometry::{Bounds, Vec2};
use crate::random::normal_in_range;
use crate::traits::{TraitPoints, TRAIT_BUDGET};
use rand::Rng;
use std::f64::consts::PI;

/// Fewest offspring per survivor, besides its clone
pub const MIN_CHILDREN: f64 = 1.0;
/// Most offspring per survivor
pub const MAX_CHILDREN: f64 = 4.0;
/// Placement attempts before a child is clamped into the world
pub const PLACEMENT_ATTEMPTS: usize = 64;

/// Reproduction engine
#[derive(Debug, Clone)]
pub struct ReproductionEngine {
    /// Multiplicative mutation bound in [0, 1]
    pub mutation_rate: f64,
    pub placement_attempts: usize,
}

impl ReproductionEngine {
    pub fn new(mutation_rate: f64) -> Self {
        Self {
            mutation_rate: mutation_rate.clamp(0.0, 1.0),
            placement_attempts: PLACEMENT_ATTEMPTS,
        }
    }

    /// Create reproduction engine from config
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.evolution.mutation_rate)
    }

    /// Build the next population. Every survivor comes back as an unchanged
    /// clone at its original spawn point, followed by its mutated children.
    /// Ids are drawn from `next_id`.
    pub fn reproduce<R: Rng + ?Sized>(
        &self,
        survivors: &[Agent],
        bounds: &Bounds,
        next_id: &mut AgentId,
        rng: &mut R,
    ) -> Vec<Agent> {
        let mut population = Vec::with_capacity(survivors.len() * 5);

        for parent in survivors {
            population.push(parent.reborn(take_id(next_id)));

            let count = self.child_count(rng);
            log::debug!(
                "survivor {} ({}) has {} children",
                parent.id,
                parent.lineage.name,
                count
            );
            for _ in 0..count {
                let traits = self.mutate(&parent.traits, rng);
                let position = self.place_child(parent, bounds, rng);
                let mut child = Agent::new(
                    take_id(next_id),
                    parent.lineage.clone(),
                    traits,
                    position,
                    parent.generation + 1,
                );
                child.parent_id = Some(parent.id);
                population.push(child);
            }
        }

        population
    }

    /// Offspring count, an integer in [1, 4] clustered around the middle
    pub fn child_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        normal_in_range(rng, MIN_CHILDREN, MAX_CHILDREN).floor() as usize
    }

    /// Scale every trait independently by a factor near 1
    pub fn mutate<R: Rng + ?Sized>(&self, traits: &TraitPoints, rng: &mut R) -> TraitPoints {
        let m = self.mutation_rate;
        traits.map(|_, v| (v * normal_in_range(rng, 1.0 - m, 1.0 + m)).clamp(0.0, TRAIT_BUDGET))
    }

    /// Random point within two sprite widths of the parent's spawn point,
    /// resampled while it falls outside the world
    pub fn place_child<R: Rng + ?Sized>(&self, parent: &Agent, bounds: &Bounds, rng: &mut R) -> Vec2 {
        let radius = parent.visual_width() * 2.0;
        let origin = parent.spawn_position;
        let mut candidate = origin;

        for _ in 0..self.placement_attempts {
            let angle = rng.gen_range(0.0..(2.0 * PI));
            let distance = rng.gen::<f64>() * radius;
            candidate = origin + Vec2::new(angle.cos(), angle.sin()) * distance;
            if bounds.contains(candidate) {
                return candidate;
            }
        }

        log::warn!(
            "no in-bounds spot for a child of agent {} after {} attempts, clamping",
            parent.id,
            self.placement_attempts
        );
        bounds.clamp(candidate)
    }
}

fn take_id(next_id: &mut AgentId) -> AgentId {
    let id = *next_id;
    *next_id += 1;
    id
}
