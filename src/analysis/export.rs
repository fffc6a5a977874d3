//! Data export system for analysis in external tools.

use crate::agent::{Agent, Outcome};
use crate::ranking::FamilyRankEntry;
use crate::shared::WorldSnapshot;
use crate::stats::StatsHistory;
use crate::world::World;
use std::fs::File;
use std::io::{Result, Write};
use std::path::Path;

/// Export system for saving simulation data
pub struct ExportSystem;

impl ExportSystem {
    /// Export family rankings to CSV
    pub fn export_rankings_csv<P: AsRef<Path>>(rankings: &[FamilyRankEntry], path: P) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "rank,name,color,population,speed,size,vision,stamina")?;

        for entry in rankings {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{}",
                entry.rank,
                entry.lineage.name,
                entry.lineage.color_hex(),
                entry.population,
                entry.average.speed,
                entry.average.size,
                entry.average.vision,
                entry.average.stamina,
            )?;
        }

        Ok(())
    }

    /// Export a generation's agents to CSV
    pub fn export_agents_csv<P: AsRef<Path>>(agents: &[Agent], path: P) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(
            file,
            "id,parent_id,generation,lineage,color,speed,size,vision,stamina,spawn_x,spawn_y,outcome"
        )?;

        for agent in agents {
            let parent = agent.parent_id.map_or(String::new(), |id| id.to_string());
            let outcome = match agent.outcome() {
                Some(Outcome::Fed) => "fed",
                Some(Outcome::StarvedImmediate) => "starved_immediate",
                Some(Outcome::StarvedTimedOut) => "starved_timed_out",
                None => "searching",
            };
            writeln!(
                file,
                "{},{},{},{},{},{:.2},{:.2},{:.2},{:.2},{:.1},{:.1},{}",
                agent.id,
                parent,
                agent.generation,
                agent.lineage.name,
                agent.lineage.color_hex(),
                agent.traits.speed,
                agent.traits.size,
                agent.traits.vision,
                agent.traits.stamina,
                agent.spawn_position.x,
                agent.spawn_position.y,
                outcome,
            )?;
        }

        Ok(())
    }

    /// Export per-generation history to CSV
    pub fn export_history_csv<P: AsRef<Path>>(history: &StatsHistory, path: P) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(
            file,
            "generation,population,food,fed,starved_immediate,starved_timed_out,lineages,ticks,speed,size,vision,stamina"
        )?;

        for s in &history.summaries {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{:.2},{:.2},{:.2},{:.2}",
                s.generation,
                s.population,
                s.food_spawned,
                s.fed,
                s.starved_immediate,
                s.starved_timed_out,
                s.lineages,
                s.ticks,
                s.mean_traits.speed,
                s.mean_traits.size,
                s.mean_traits.vision,
                s.mean_traits.stamina,
            )?;
        }

        Ok(())
    }

    /// Export world snapshot to JSON
    pub fn export_world_json<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
        let snapshot = WorldSnapshot::from_world(world);
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Export everything useful about a run into `base_path`
    pub fn export_full_state<P: AsRef<Path>>(world: &World, base_path: P) -> Result<ExportManifest> {
        let base = base_path.as_ref();
        std::fs::create_dir_all(base)?;

        let rankings_path = base.join("rankings_final.csv");
        let agents_path = base.join("agents.csv");
        let history_csv_path = base.join("history.csv");
        let history_json_path = base.join("stats_history.json");
        let snapshot_path = base.join("snapshot.json");

        Self::export_rankings_csv(world.generation().rankings(), &rankings_path)?;
        Self::export_agents_csv(world.generation().agents(), &agents_path)?;
        Self::export_history_csv(&world.stats_history, &history_csv_path)?;
        world.stats_history.save(&history_json_path)?;
        Self::export_world_json(world, &snapshot_path)?;

        log::info!("exported run state to {}", base.display());

        Ok(ExportManifest {
            generation: world.generation_number(),
            rankings_file: rankings_path.to_string_lossy().to_string(),
            agents_file: agents_path.to_string_lossy().to_string(),
            history_csv_file: history_csv_path.to_string_lossy().to_string(),
            history_json_file: history_json_path.to_string_lossy().to_string(),
            snapshot_file: snapshot_path.to_string_lossy().to_string(),
        })
    }

    /// Export summary statistics
    pub fn export_summary<P: AsRef<Path>>(world: &World, path: P) -> Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "=== Forage Run Summary ===")?;
        writeln!(file, "Seed: {}", world.seed())?;
        writeln!(file, "Generation: {}", world.generation_number())?;
        writeln!(file, "Population: {}", world.population())?;
        writeln!(file, "Simulated Time: {:.1}s", world.time as f64 / 1000.0)?;
        writeln!(file, "Extinct: {}", world.is_extinct())?;
        writeln!(file)?;

        writeln!(file, "=== Lineages ===")?;
        writeln!(file, "Tracked: {}", world.lineage_tracker.records.len())?;
        writeln!(file, "Surviving: {}", world.lineage_tracker.surviving_count())?;
        if let Some(dominant) = world.lineage_tracker.dominant_lineage() {
            writeln!(
                file,
                "Dominant: {} ({} members, peak {})",
                dominant.lineage, dominant.current_population, dominant.peak_population
            )?;
        }

        Ok(())
    }
}

/// Manifest of exported files
#[derive(Debug)]
pub struct ExportManifest {
    pub generation: u32,
    pub rankings_file: String,
    pub agents_file: String,
    pub history_csv_file: String,
    pub history_json_file: String,
    pub snapshot_file: String,
}
