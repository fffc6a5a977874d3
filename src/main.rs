//! forage - CLI Entry Point
//!
//! Generational foraging-selection simulator.

use clap::{Parser, Subcommand};
use forage::analysis::ExportSystem;
use forage::{benchmark, Config, StatsHistory, World};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "forage")]
#[command(version)]
#[command(about = "Generational foraging-selection simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Maximum number of generations
        #[arg(short, long, default_value = "100")]
        generations: u32,

        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Output directory for history and rankings
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of generations
        #[arg(short, long, default_value = "20")]
        generations: u32,

        /// Generation-1 population size
        #[arg(short, long, default_value = "50")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Analyze a saved stats history
    Analyze {
        /// History file (stats_history.json)
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            max_ticks,
            output,
            seed,
            quiet,
        } => run_simulation(config, generations, max_ticks, output, seed, quiet),

        Commands::Benchmark {
            generations,
            population,
        } => run_benchmark(generations, population),

        Commands::Init { output } => generate_config(output),

        Commands::Analyze { file } => analyze_history(file),
    }
}

fn run_simulation(
    config_path: PathBuf,
    generations: u32,
    max_ticks: Option<u64>,
    output: PathBuf,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    // Create output directory
    std::fs::create_dir_all(&output)?;

    // Create world
    let mut world = if let Some(s) = seed {
        println!("Using seed: {}", s);
        World::new_with_seed(config.clone(), s)?
    } else {
        World::new(config.clone())?
    };

    println!("Starting simulation");
    println!("  Species: {}", config.population.nr_of_species);
    println!("  Food target: {}", config.food.nr_of_foods);
    println!("  Mutation rate: {:.0}%", config.evolution.mutation_rate * 100.0);
    println!("  World: {}x{}", config.world.width, config.world.height);
    println!("  Generations: {}", generations);
    println!();

    let start = Instant::now();

    let completed = world.run_generations(generations, max_ticks, |summary| {
        if !quiet {
            println!("{}", summary.summary());
        }
    })?;

    if world.is_extinct() {
        println!("\nPopulation extinct after generation {}", world.generation_number());
    }

    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations completed: {}", completed);
    println!("Ticks: {}", world.total_ticks);
    println!("Simulated time: {:.1}s", world.time as f64 / 1000.0);
    println!("Final population: {}", world.population());
    println!("Lineages: {}", world.lineage_tracker.surviving_count());

    println!();
    println!("=== Rankings (generation {}) ===", world.generation_number());
    for entry in world.generation().rankings() {
        println!(
            "{:2}. {:<24} {} pop:{:4}  spd:{:3} size:{:3} vis:{:3} sta:{:3}",
            entry.rank,
            entry.lineage.name,
            entry.lineage.color_hex(),
            entry.population,
            entry.average.speed,
            entry.average.size,
            entry.average.vision,
            entry.average.stamina,
        );
    }

    // Save stats history
    let stats_path = output.join("stats_history.json");
    world.stats_history.save(&stats_path)?;
    println!();
    println!("Stats history: {:?}", stats_path);

    let rankings_path = output.join("rankings_final.csv");
    ExportSystem::export_rankings_csv(world.generation().rankings(), &rankings_path)?;
    println!("Final rankings: {:?}", rankings_path);

    Ok(())
}

fn run_benchmark(generations: u32, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== forage Benchmark ===");
    println!("Generations: {}", generations);
    println!("Population: {}", population);
    println!();

    let result = benchmark(generations, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn analyze_history(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== History Analysis ===");
    println!("File: {:?}", path);
    println!();

    let history = StatsHistory::load(&path)?;
    println!("Generations recorded: {}", history.len());
    if history.is_empty() {
        return Ok(());
    }
    println!();

    println!("  Gen   Pop  Surv  Lineages    Spd   Size    Vis    Sta");
    let lineages = history.lineage_series();
    let survivors = history.survivor_series();
    for (i, (generation, traits)) in history.trait_series().into_iter().enumerate() {
        let population = history.summaries[i].population;
        println!(
            "{:5} {:5} {:5} {:9} {:6.1} {:6.1} {:6.1} {:6.1}",
            generation,
            population,
            survivors[i].1,
            lineages[i].1,
            traits.speed,
            traits.size,
            traits.vision,
            traits.stamina
        );
    }

    // Lineages that made the rankings most often, then by best rank
    let mut appearances: HashMap<String, (usize, usize, usize)> = HashMap::new();
    for summary in &history.summaries {
        for entry in &summary.rankings {
            let key = format!("{}", entry.lineage);
            let record = appearances.entry(key).or_insert((0, usize::MAX, 0));
            record.0 += 1;
            record.1 = record.1.min(entry.rank);
            record.2 = record.2.max(entry.population);
        }
    }
    let mut ranked: Vec<_> = appearances.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    println!();
    println!("Most successful lineages:");
    for (lineage, (generations, best_rank, peak)) in ranked.into_iter().take(10) {
        println!(
            "  {:<34} ranked in {:4} generations, best #{}, peak population {}",
            lineage, generations, best_rank, peak
        );
    }

    if let Some(last) = history.latest() {
        println!();
        println!("Last recorded: {}", last.summary());
    }

    Ok(())
}
