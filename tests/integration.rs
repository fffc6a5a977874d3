//! Integration tests for forage

use forage::agent::TickContext;
use forage::analysis::ExportSystem;
use forage::generation::sample_food_count;
use forage::geometry::{Bounds, Vec2};
use forage::shared::WorldSnapshot;
use forage::traits::TRAIT_BUDGET;
use forage::{
    Agent, Config, FoodItem, FoodPool, Generation, LifecycleState, LineageKey, ReproductionEngine,
    StatsHistory, TraitPoints, World,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

fn small_config() -> Config {
    let mut config = Config::default();
    config.population.nr_of_species = 2;
    config.food.nr_of_foods = 10;
    config.evolution.mutation_rate = 0.1;
    config.world.width = 400;
    config.world.height = 400;
    config
}

fn agent(id: u64, x: f64, y: f64, traits: TraitPoints) -> Agent {
    Agent::new(id, LineageKey::new("TheFamily", 0x123456), traits, Vec2::new(x, y), 1)
}

#[test]
fn test_two_species_generation() {
    let config = small_config();
    let mut world = World::new_with_seed(config.clone(), 12345).unwrap();

    assert_eq!(world.population(), 2);
    for a in world.generation().agents() {
        assert_eq!(a.traits.sum(), TRAIT_BUDGET);
    }
    let food = world.generation().food().spawned();
    assert!((6..=8).contains(&food), "food count {food}");

    let done = world.run_generations(1, Some(100_000), |_| {}).unwrap();
    assert_eq!(done, 1);
    let first = &world.stats_history.summaries[0];
    assert_eq!(first.generation, 1);
    assert_eq!(first.population, 2);
    assert!(first.fed <= food);
}

#[test]
fn test_food_sampling_bounds() {
    let config = small_config();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    for _ in 0..2_000 {
        let n = sample_food_count(&config, &mut rng);
        assert!((6..=8).contains(&n));
    }
}

#[test]
fn test_food_consumed_at_most_once() {
    let mut config = small_config();
    config.population.nr_of_species = 30;
    config.food.nr_of_foods = 20;

    for seed in 0..5 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut next_id = 0;
        let mut generation = Generation::initial(&config, &mut next_id, &mut rng).unwrap();
        while !generation.tick(&mut rng).unwrap() {}

        let eaten: Vec<_> = generation.agents().iter().filter_map(|a| a.eaten()).collect();
        let unique: HashSet<_> = eaten.iter().collect();
        assert_eq!(eaten.len(), unique.len());
        assert_eq!(eaten.len(), generation.food().consumed().len());
        assert_eq!(
            generation.food().len() + eaten.len(),
            generation.food().spawned()
        );
    }
}

#[test]
fn test_survivors_are_exactly_the_fed() {
    let mut config = small_config();
    config.population.nr_of_species = 20;
    config.food.nr_of_foods = 15;
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut next_id = 0;
    let mut generation = Generation::initial(&config, &mut next_id, &mut rng).unwrap();

    while !generation.tick(&mut rng).unwrap() {}

    for a in generation.agents() {
        let fed = a.state() == LifecycleState::Fed || a.eaten().is_some();
        assert_eq!(a.is_survivor(), fed, "agent {} in {:?}", a.id, a.state());
    }
    let survivors = generation.clone().into_survivors();
    assert_eq!(survivors.len(), generation.survivor_count());
    assert!(survivors.iter().all(|a| a.eaten().is_some()));
}

#[test]
fn test_timed_out_agent_never_feeds() {
    let config = small_config();
    let traits = TraitPoints::new(25.0, 25.0, 25.0, 25.0);
    let mut hungry = agent(1, 200.0, 200.0, traits);
    hungry.age = hungry.stamina_threshold() as u64 + 1;
    let food = FoodPool::from_items(vec![FoodItem::new(0, Vec2::new(200.0, 200.0), Vec2::ZERO)]);
    let mut generation = Generation::from_parts(1, vec![hungry], food, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    assert!(generation.tick(&mut rng).unwrap());

    let a = &generation.agents()[0];
    assert_eq!(a.state(), LifecycleState::StarvedTimedOut);
    assert!(!a.is_survivor());
    assert_eq!(generation.food().len(), 1);
}

#[test]
fn test_empty_pool_starves_without_decay() {
    let config = small_config();
    let bounds = Bounds::new(400.0, 400.0);
    let mut a = agent(1, 50.0, 50.0, TraitPoints::new(25.0, 25.0, 25.0, 25.0));
    let mut pool = FoodPool::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut seen = Vec::new();
    for i in 1..=10u64 {
        let ctx = TickContext {
            now: i * config.timing.tick_millis,
            dt_millis: config.timing.tick_millis,
            bounds: &bounds,
            timing: &config.timing,
            food_radius: config.food.radius,
        };
        a.tick(&ctx, &mut pool, &mut rng).unwrap();
        seen.push(a.state());
    }

    assert_eq!(seen[0], LifecycleState::StarvedImmediate);
    assert_eq!(seen[1], LifecycleState::Removed);
    assert!(!seen.contains(&LifecycleState::Decaying));
}

#[test]
fn test_single_food_single_winner() {
    let config = small_config();
    let traits = TraitPoints::new(25.0, 25.0, 25.0, 25.0);
    let agents = vec![agent(1, 190.0, 200.0, traits), agent(2, 210.0, 200.0, traits)];
    let food = FoodPool::from_items(vec![
        FoodItem::new(0, Vec2::new(200.0, 200.0), Vec2::ZERO),
    ]);
    let mut generation = Generation::from_parts(1, agents, food, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    generation.tick(&mut rng).unwrap();

    let fed: Vec<_> = generation
        .agents()
        .iter()
        .filter(|a| a.state() == LifecycleState::Fed)
        .collect();
    assert_eq!(fed.len(), 1);
    let other = generation.agents().iter().find(|a| a.state() != LifecycleState::Fed).unwrap();
    assert!(matches!(
        other.state(),
        LifecycleState::Searching | LifecycleState::StarvedImmediate
    ));
    assert!(generation.food().is_empty());
}

#[test]
fn test_reproduction_keeps_lineages() {
    let mut config = small_config();
    config.population.nr_of_species = 10;
    let mut world = World::new_with_seed(config, 2024).unwrap();
    let founders: HashSet<LineageKey> = world
        .generation()
        .agents()
        .iter()
        .map(|a| a.lineage.clone())
        .collect();

    world.run_generations(3, Some(200_000), |_| {}).unwrap();

    for a in world.generation().agents() {
        assert!(founders.contains(&a.lineage));
        assert!(a.traits.speed >= 0.0 && a.traits.speed <= TRAIT_BUDGET);
    }
}

#[test]
fn test_child_count_statistics() {
    let engine = ReproductionEngine::new(0.1);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let counts: Vec<usize> = (0..5_000).map(|_| engine.child_count(&mut rng)).collect();
    assert!(counts.iter().all(|c| (1..=4).contains(c)));
    let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
    assert!(mean > 1.5 && mean < 2.5, "mean child count {mean}");
}

#[test]
fn test_rankings_cover_population() {
    let mut config = small_config();
    config.population.nr_of_species = 25;
    let world = World::new_with_seed(config, 8).unwrap();
    let rankings = world.generation().rankings();

    assert_eq!(rankings.len(), 10);
    assert_eq!(rankings[0].rank, 1);
    let max = rankings.iter().map(|r| r.population).max().unwrap();
    assert_eq!(rankings[0].population, max);
    let total: usize = rankings.iter().map(|r| r.population).sum();
    assert!(total <= world.population());
}

#[test]
fn test_pause_freezes_ages() {
    let mut world = World::new_with_seed(small_config(), 9).unwrap();
    world.run(10).unwrap();
    let ages: Vec<u64> = world.generation().agents().iter().map(|a| a.age).collect();

    world.pause();
    world.run(50).unwrap();
    let after: Vec<u64> = world.generation().agents().iter().map(|a| a.age).collect();
    assert_eq!(ages, after);

    let snapshot = WorldSnapshot::from_world(&world);
    assert!(snapshot.paused);
}

#[test]
fn test_run_and_export() {
    let mut config = small_config();
    config.population.nr_of_species = 8;
    let mut world = World::new_with_seed(config, 10).unwrap();
    world.run_generations(3, Some(100_000), |_| {}).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let history_path = dir.path().join("stats_history.json");
    world.stats_history.save(&history_path).unwrap();
    let rankings_path = dir.path().join("rankings_final.csv");
    ExportSystem::export_rankings_csv(world.generation().rankings(), &rankings_path).unwrap();

    let loaded = StatsHistory::load(&history_path).unwrap();
    assert_eq!(loaded.len(), world.stats_history.len());
    let csv = std::fs::read_to_string(&rankings_path).unwrap();
    assert!(csv.starts_with("rank,name,color,population"));
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    small_config().save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.population.nr_of_species, 2);
    assert_eq!(loaded.world.width, 400);
    assert!(World::new(loaded).is_ok());
}
