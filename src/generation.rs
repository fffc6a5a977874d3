//! One generation: its agents, its food, its clock and its end.

use crate::agent::{Agent, AgentEvent, AgentId, LifecycleState, Outcome, TickContext};
use crate::config::{Config, TimingConfig};
use crate::error::{Result, SimError};
use crate::food::FoodPool;
use crate::geometry::{Bounds, Vec2};
use crate::naming::LineageKey;
use crate::ranking::{self, FamilyRankEntry};
use crate::stats::GenerationSummary;
use crate::traits::{TraitAllocator, TraitPoints};
use rand::Rng;
use std::collections::HashSet;

/// Random edge picks before falling back to a scan of edge points
const EDGE_SPAWN_ATTEMPTS: usize = 1_000;

/// Owns one generation's agents and food pool
#[derive(Debug, Clone)]
pub struct Generation {
    /// 1-based generation number
    pub number: u32,
    pub bounds: Bounds,
    pub mutation_rate: f64,
    agents: Vec<Agent>,
    food: FoodPool,
    timing: TimingConfig,
    food_radius: f64,
    rankings: Vec<FamilyRankEntry>,
    clock: u64,
    ticks: u64,
    ended: bool,
}

impl Generation {
    /// Assemble a generation from an explicit population and food pool
    pub fn from_parts(number: u32, agents: Vec<Agent>, food: FoodPool, config: &Config) -> Self {
        let rankings = ranking::rank_families(&agents);
        Self {
            number,
            bounds: world_bounds(config),
            mutation_rate: config.evolution.mutation_rate,
            agents,
            food,
            timing: config.timing.clone(),
            food_radius: config.food.radius,
            rankings,
            clock: 0,
            ticks: 0,
            ended: false,
        }
    }

    /// Generation `number` with the given population and freshly sampled food
    pub fn from_agents<R: Rng + ?Sized>(
        number: u32,
        agents: Vec<Agent>,
        config: &Config,
        rng: &mut R,
    ) -> Self {
        let bounds = world_bounds(config);
        let count = sample_food_count(config, rng);
        log::debug!("generation {}: spawning {} food items", number, count);
        let food = FoodPool::spawn(count, config.food.speed, &bounds, rng);
        Self::from_parts(number, agents, food, config)
    }

    /// Generation 1: one agent per lineage, each on a distinct edge point
    pub fn initial<R: Rng + ?Sized>(
        config: &Config,
        next_id: &mut AgentId,
        rng: &mut R,
    ) -> Result<Self> {
        let bounds = world_bounds(config);
        let allocator = TraitAllocator::default();
        let mut occupied = HashSet::new();
        let mut agents = Vec::with_capacity(config.population.nr_of_species);

        for _ in 0..config.population.nr_of_species {
            let id = *next_id;
            *next_id += 1;

            let traits = allocator.allocate(rng);
            check_budget(id, &traits, allocator.budget())?;
            let position = spawn_on_edge(config, &mut occupied, rng);
            agents.push(Agent::new(id, LineageKey::random(rng), traits, position, 1));
        }

        log::info!(
            "generation 1: {} agents in a {}x{} world",
            agents.len(),
            bounds.width,
            bounds.height
        );
        Ok(Self::from_agents(1, agents, config, rng))
    }

    /// Advance every agent by one tick and check for the end of the
    /// generation. Returns `true` on the tick that ends it; once ended,
    /// further calls do nothing.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<bool> {
        if self.ended {
            return Ok(false);
        }

        self.ticks += 1;
        self.clock += self.timing.tick_millis;
        let ctx = TickContext {
            now: self.clock,
            dt_millis: self.timing.tick_millis,
            bounds: &self.bounds,
            timing: &self.timing,
            food_radius: self.food_radius,
        };

        self.food.step(ctx.dt_millis as f64 / 1000.0, &self.bounds);

        for agent in &mut self.agents {
            if let Some(AgentEvent::Fed(food)) = agent.tick(&ctx, &mut self.food, rng)? {
                log::trace!("generation {}: food {} taken by {}", self.number, food, agent.id);
            }
        }

        if self.food.is_empty() || self.searching_count() == 0 {
            self.ended = true;
            log::debug!(
                "generation {} ended after {} ticks: {} survivors, {} food left",
                self.number,
                self.ticks,
                self.survivor_count(),
                self.food.len()
            );
            return Ok(true);
        }

        Ok(false)
    }

    #[inline]
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn food(&self) -> &FoodPool {
        &self.food
    }

    /// Top families of this generation's population
    pub fn rankings(&self) -> &[FamilyRankEntry] {
        &self.rankings
    }

    /// Simulated milliseconds since the generation started
    pub fn clock_millis(&self) -> u64 {
        self.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn searching_count(&self) -> usize {
        self.count_state(LifecycleState::Searching)
    }

    fn count_state(&self, state: LifecycleState) -> usize {
        self.agents.iter().filter(|a| a.state() == state).count()
    }

    fn count_outcome(&self, outcome: Outcome) -> usize {
        self.agents
            .iter()
            .filter(|a| a.outcome() == Some(outcome))
            .count()
    }

    /// Agents that fed this generation
    pub fn survivors(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.is_survivor())
    }

    pub fn survivor_count(&self) -> usize {
        self.count_outcome(Outcome::Fed)
    }

    /// Consume the generation, keeping only its survivors
    pub fn into_survivors(self) -> Vec<Agent> {
        self.agents.into_iter().filter(|a| a.is_survivor()).collect()
    }

    /// Statistics for the generation as it stands
    pub fn summary(&self) -> GenerationSummary {
        let population = self.agents.len();
        let mut mean = TraitPoints::default();
        if population > 0 {
            let n = population as f64;
            for a in &self.agents {
                mean.speed += a.traits.speed / n;
                mean.size += a.traits.size / n;
                mean.vision += a.traits.vision / n;
                mean.stamina += a.traits.stamina / n;
            }
        }

        GenerationSummary {
            generation: self.number,
            population,
            food_spawned: self.food.spawned(),
            fed: self.count_outcome(Outcome::Fed),
            starved_immediate: self.count_outcome(Outcome::StarvedImmediate),
            starved_timed_out: self.count_outcome(Outcome::StarvedTimedOut),
            survivors: self.survivor_count(),
            ticks: self.ticks,
            sim_millis: self.clock,
            lineages: ranking::partition_families(&self.agents).len(),
            mean_traits: mean,
            rankings: self.rankings.clone(),
        }
    }
}

/// World bounds from configuration
pub fn world_bounds(config: &Config) -> Bounds {
    Bounds::new(config.world.width as f64, config.world.height as f64)
}

/// Food for one generation: an integer drawn from `floor(min)..=floor(max)`
/// of the configured range
pub fn sample_food_count<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> usize {
    let (min, max) = config.food_range();
    let drawn = (min + rng.gen::<f64>() * (max - min + 1.0)).floor();
    drawn.min(max.floor()) as usize
}

fn check_budget(agent: AgentId, traits: &TraitPoints, expected: f64) -> Result<()> {
    let sum = traits.sum();
    if sum != expected {
        return Err(SimError::TraitBudgetMismatch {
            agent,
            sum,
            expected,
        });
    }
    Ok(())
}

/// Uniform point on a uniformly chosen edge, not already taken by another
/// generation-1 agent
fn spawn_on_edge<R: Rng + ?Sized>(
    config: &Config,
    occupied: &mut HashSet<(u32, u32)>,
    rng: &mut R,
) -> Vec2 {
    let (w, h) = (config.world.width, config.world.height);

    for _ in 0..EDGE_SPAWN_ATTEMPTS {
        let point = match rng.gen_range(0..4) {
            0 => (rng.gen_range(0..=w), 0),
            1 => (w, rng.gen_range(0..=h)),
            2 => (rng.gen_range(0..=w), h),
            _ => (0, rng.gen_range(0..=h)),
        };
        if occupied.insert(point) {
            return Vec2::new(point.0 as f64, point.1 as f64);
        }
    }

    log::warn!("random edge spawning exhausted, scanning edge points");
    let perimeter = (0..=w)
        .flat_map(|x| [(x, 0), (x, h)])
        .chain((0..=h).flat_map(|y| [(0, y), (w, y)]));
    for point in perimeter {
        if occupied.insert(point) {
            return Vec2::new(point.0 as f64, point.1 as f64);
        }
    }

    // Only reachable when validation was skipped
    Vec2::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::FoodItem;
    use crate::traits::TRAIT_BUDGET;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.world.width = 400;
        config.world.height = 400;
        config.population.nr_of_species = 2;
        config.food.nr_of_foods = 10;
        config.evolution.mutation_rate = 0.1;
        config
    }

    fn agent(id: AgentId, x: f64, y: f64, traits: TraitPoints) -> Agent {
        Agent::new(id, LineageKey::new("The Lions", 1), traits, Vec2::new(x, y), 1)
    }

    #[test]
    fn test_initial_generation() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut next_id = 0;
        let gen = Generation::initial(&config, &mut next_id, &mut rng).unwrap();

        assert_eq!(gen.number, 1);
        assert_eq!(gen.agents().len(), 2);
        assert_eq!(next_id, 2);
        for a in gen.agents() {
            assert_eq!(a.traits.sum(), TRAIT_BUDGET);
            let p = a.position;
            let on_edge = p.x == 0.0 || p.y == 0.0 || p.x == 400.0 || p.y == 400.0;
            assert!(on_edge, "{:?} not on an edge", p);
        }
        assert!((6..=8).contains(&gen.food().len()));
        assert!(!gen.has_ended());
    }

    #[test]
    fn test_edge_spawns_are_distinct() {
        let mut config = small_config();
        config.world.width = 3;
        config.world.height = 2;
        config.population.nr_of_species = 2 * (3 + 2);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut occupied = HashSet::new();

        let points: Vec<Vec2> = (0..config.population.nr_of_species)
            .map(|_| spawn_on_edge(&config, &mut occupied, &mut rng))
            .collect();

        assert_eq!(occupied.len(), points.len());
        for p in &points {
            assert!(p.x == 0.0 || p.y == 0.0 || p.x == 3.0 || p.y == 2.0);
        }
    }

    #[test]
    fn test_food_count_range() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1_000 {
            let n = sample_food_count(&config, &mut rng);
            assert!((6..=8).contains(&n), "food count {n}");
        }
    }

    #[test]
    fn test_food_count_reaches_both_ends() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let mut seen = std::collections::BTreeMap::new();
        for _ in 0..10_000 {
            *seen.entry(sample_food_count(&config, &mut rng)).or_insert(0u32) += 1;
        }
        assert_eq!(seen.keys().copied().collect::<Vec<_>>(), vec![6, 7, 8]);
    }

    #[test]
    fn test_food_count_for_single_target() {
        let mut config = small_config();
        config.food.nr_of_foods = 1;
        let mut rng = ChaCha8Rng::seed_from_u64(32);
        for _ in 0..100 {
            assert_eq!(sample_food_count(&config, &mut rng), 0);
        }
    }

    #[test]
    fn test_budget_check() {
        let bad = TraitPoints::new(30.0, 30.0, 30.0, 30.0);
        assert!(matches!(
            check_budget(4, &bad, TRAIT_BUDGET),
            Err(SimError::TraitBudgetMismatch { agent: 4, .. })
        ));
        assert!(check_budget(4, &TraitPoints::new(25.0, 25.0, 25.0, 25.0), TRAIT_BUDGET).is_ok());
    }

    #[test]
    fn test_ends_when_food_is_gone() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let traits = TraitPoints::new(25.0, 25.0, 25.0, 25.0);
        // The far agent moves first and is still searching when the food goes
        let agents = vec![agent(2, 300.0, 300.0, traits), agent(1, 100.0, 100.0, traits)];
        let food = FoodPool::from_items(vec![FoodItem::new(0, Vec2::new(100.0, 100.0), Vec2::ZERO)]);
        let mut gen = Generation::from_parts(1, agents, food, &config);

        assert!(gen.tick(&mut rng).unwrap());
        assert!(gen.has_ended());
        assert_eq!(gen.searching_count(), 1);
        assert_eq!(gen.survivor_count(), 1);
        assert!(!gen.tick(&mut rng).unwrap());
        assert_eq!(gen.ticks(), 1);
    }

    #[test]
    fn test_ends_when_nobody_searches() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        // No stamina: both starve on the first tick while food remains
        let traits = TraitPoints::new(50.0, 50.0, 0.0, 0.0);
        let agents = vec![agent(1, 10.0, 10.0, traits), agent(2, 20.0, 20.0, traits)];
        let food = FoodPool::from_items(vec![FoodItem::new(0, Vec2::new(390.0, 390.0), Vec2::ZERO)]);
        let mut gen = Generation::from_parts(1, agents, food, &config);

        assert!(gen.tick(&mut rng).unwrap());
        assert_eq!(gen.food().len(), 1);
        assert_eq!(gen.searching_count(), 0);
        assert_eq!(gen.survivor_count(), 0);
        assert!(gen.into_survivors().is_empty());
    }

    #[test]
    fn test_runs_until_condition() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let traits = TraitPoints::new(25.0, 25.0, 25.0, 25.0);
        let agents = vec![agent(1, 10.0, 10.0, traits)];
        let food = FoodPool::from_items(vec![
            FoodItem::new(0, Vec2::new(390.0, 390.0), Vec2::ZERO),
            FoodItem::new(1, Vec2::new(380.0, 390.0), Vec2::ZERO),
        ]);
        let mut gen = Generation::from_parts(1, agents, food, &config);

        // Stamina runs out after 5000 ms without reaching the far corner
        let mut ended = false;
        for _ in 0..1_000 {
            if gen.tick(&mut rng).unwrap() {
                ended = true;
                break;
            }
            assert!(!gen.food().is_empty());
            assert!(gen.searching_count() > 0);
        }
        assert!(ended);
    }

    #[test]
    fn test_single_food_two_contenders() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let traits = TraitPoints::new(25.0, 25.0, 25.0, 25.0);
        let agents = vec![agent(1, 195.0, 200.0, traits), agent(2, 205.0, 200.0, traits)];
        let food = FoodPool::from_items(vec![FoodItem::new(0, Vec2::new(200.0, 200.0), Vec2::ZERO)]);
        let mut gen = Generation::from_parts(1, agents, food, &config);

        gen.tick(&mut rng).unwrap();

        let states: Vec<_> = gen.agents().iter().map(|a| a.state()).collect();
        assert_eq!(states.iter().filter(|s| **s == LifecycleState::Fed).count(), 1);
        assert_eq!(states[0], LifecycleState::Fed);
        // The pool emptied under the second agent within the same tick
        assert_eq!(states[1], LifecycleState::StarvedImmediate);
        assert_eq!(gen.food().consumed(), &[0]);
    }

    #[test]
    fn test_summary_counts() {
        let config = small_config();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let traits = TraitPoints::new(25.0, 25.0, 25.0, 25.0);
        let agents = vec![agent(1, 195.0, 200.0, traits), agent(2, 205.0, 200.0, traits)];
        let food = FoodPool::from_items(vec![FoodItem::new(0, Vec2::new(200.0, 200.0), Vec2::ZERO)]);
        let mut gen = Generation::from_parts(3, agents, food, &config);
        gen.tick(&mut rng).unwrap();

        let s = gen.summary();
        assert_eq!(s.generation, 3);
        assert_eq!(s.population, 2);
        assert_eq!(s.food_spawned, 1);
        assert_eq!(s.fed, 1);
        assert_eq!(s.starved_immediate, 1);
        assert_eq!(s.starved_timed_out, 0);
        assert_eq!(s.lineages, 1);
        assert_eq!(s.rankings[0].population, 2);
        assert!((s.mean_traits.speed - 25.0).abs() < 1e-9);
    }
}
