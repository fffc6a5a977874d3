//! Snapshot structures for front-end communication.
//!
//! These are lightweight copies of simulation state, cheap to send between
//! the simulation thread and whatever renders it.

use crate::agent::{AgentId, AnimationCue, LifecycleState};
use crate::food::FoodId;
use crate::ranking::FamilyRankEntry;
use crate::world::{RunState, World};
use serde::{Deserialize, Serialize};

/// Lightweight view of an agent for rendering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub name: String,
    /// 24-bit RGB lineage colour
    pub color: u32,
    pub x: f64,
    pub y: f64,
    pub state: LifecycleState,
    pub animation: Option<AnimationCue>,
    /// Sprite scale factor
    pub scale: f64,
    /// 1.0 except while fading out
    pub opacity: f64,
}

/// Lightweight view of a food item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodView {
    pub id: FoodId,
    pub x: f64,
    pub y: f64,
}

/// Complete world snapshot for rendering
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Current generation number, starting at 1
    pub generation: u32,
    /// Simulated milliseconds into the current generation
    pub generation_time: u64,
    /// Simulated milliseconds since the run started
    pub time: u64,
    pub total_ticks: u64,
    pub width: u32,
    pub height: u32,
    pub paused: bool,
    pub run_state: RunState,
    /// Every agent not yet removed
    pub agents: Vec<AgentView>,
    pub food: Vec<FoodView>,
    /// Top families of the current generation
    pub rankings: Vec<FamilyRankEntry>,
}

impl WorldSnapshot {
    /// Create a snapshot from the current world state
    pub fn from_world(world: &World) -> Self {
        let generation = world.generation();
        let now = generation.clock_millis();
        let timing = generation.timing();

        let agents = generation
            .agents()
            .iter()
            .filter(|a| !a.state().is_removed())
            .map(|a| AgentView {
                id: a.id,
                name: a.lineage.name.clone(),
                color: a.lineage.color,
                x: a.position.x,
                y: a.position.y,
                state: a.state(),
                animation: a.state().animation_cue(),
                scale: a.visual_scale(),
                opacity: a.opacity(now, timing),
            })
            .collect();

        let food = generation
            .food()
            .items()
            .iter()
            .map(|f| FoodView {
                id: f.id,
                x: f.position.x,
                y: f.position.y,
            })
            .collect();

        Self {
            generation: generation.number,
            generation_time: now,
            time: world.time,
            total_ticks: world.total_ticks,
            width: world.config.world.width,
            height: world.config.world.height,
            paused: world.is_paused(),
            run_state: world.run_state(),
            agents,
            food,
            rankings: generation.rankings().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_snapshot_of_fresh_world() {
        let mut config = Config::default();
        config.population.nr_of_species = 5;
        let world = World::new_with_seed(config, 9).unwrap();
        let snapshot = WorldSnapshot::from_world(&world);

        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.agents.len(), 5);
        assert_eq!(snapshot.food.len(), world.generation().food().len());
        assert!(snapshot.rankings.len() <= 5);
        for view in &snapshot.agents {
            assert_eq!(view.animation, Some(AnimationCue::Move));
            assert_eq!(view.opacity, 1.0);
            assert!(view.color <= 0xFF_FFFF);
        }
    }

    #[test]
    fn test_snapshot_serializes() {
        let world = World::new_with_seed(Config::default(), 10).unwrap();
        let json = serde_json::to_string(&WorldSnapshot::from_world(&world)).unwrap();
        assert!(json.contains("\"generation\":1"));
    }
}
