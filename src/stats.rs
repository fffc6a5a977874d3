//! Statistics collection and analysis.

use crate::agent::Agent;
use crate::naming::LineageKey;
use crate::ranking::{self, FamilyRankEntry};
use crate::traits::TraitPoints;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistics for one finished (or running) generation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: u32,
    /// Agents spawned into the generation
    pub population: usize,
    pub food_spawned: usize,
    pub fed: usize,
    pub starved_immediate: usize,
    pub starved_timed_out: usize,
    /// Agents carried into reproduction
    pub survivors: usize,
    pub ticks: u64,
    /// Simulated milliseconds elapsed
    pub sim_millis: u64,
    /// Distinct lineages present
    pub lineages: usize,
    /// Mean raw trait points
    pub mean_traits: TraitPoints,
    pub rankings: Vec<FamilyRankEntry>,
}

impl GenerationSummary {
    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "Gen:{:4} | Pop:{:4} | Food:{:3} | Fed:{:4} | Starved:{:4}+{:<4} | Lineages:{:3} | T:{:6.1}s | Spd:{:.1} Sz:{:.1} Vis:{:.1} Sta:{:.1}",
            self.generation,
            self.population,
            self.food_spawned,
            self.fed,
            self.starved_timed_out,
            self.starved_immediate,
            self.lineages,
            self.sim_millis as f64 / 1000.0,
            self.mean_traits.speed,
            self.mean_traits.size,
            self.mean_traits.vision,
            self.mean_traits.stamina,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// Recorded generation summaries, oldest first
    pub summaries: Vec<GenerationSummary>,
    /// Generations between records
    pub interval: u32,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u32) -> Self {
        Self {
            summaries: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Whether `generation` falls on the recording interval
    pub fn wants(&self, generation: u32) -> bool {
        let interval = self.interval.max(1);
        generation.saturating_sub(1) % interval == 0
    }

    /// Record a summary
    pub fn record(&mut self, summary: GenerationSummary) {
        self.summaries.push(summary);
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn latest(&self) -> Option<&GenerationSummary> {
        self.summaries.last()
    }

    /// Summary for a specific generation
    pub fn get(&self, generation: u32) -> Option<&GenerationSummary> {
        self.summaries.iter().find(|s| s.generation == generation)
    }

    /// Get population over generations
    pub fn population_series(&self) -> Vec<(u32, usize)> {
        self.summaries
            .iter()
            .map(|s| (s.generation, s.population))
            .collect()
    }

    /// Get survivor counts over generations
    pub fn survivor_series(&self) -> Vec<(u32, usize)> {
        self.summaries
            .iter()
            .map(|s| (s.generation, s.survivors))
            .collect()
    }

    /// Get distinct lineage counts over generations
    pub fn lineage_series(&self) -> Vec<(u32, usize)> {
        self.summaries
            .iter()
            .map(|s| (s.generation, s.lineages))
            .collect()
    }

    /// Get mean traits over generations
    pub fn trait_series(&self) -> Vec<(u32, TraitPoints)> {
        self.summaries
            .iter()
            .map(|s| (s.generation, s.mean_traits))
            .collect()
    }

    /// Save history to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Per-lineage history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineageRecord {
    pub lineage: LineageKey,
    pub first_generation: u32,
    pub current_population: usize,
    pub peak_population: usize,
    /// Generations in which the lineage had at least one member
    pub generations_present: u32,
    pub extinct: bool,
}

/// Lineage tracker for evolutionary analysis
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LineageTracker {
    /// Records in order of first appearance
    pub records: Vec<LineageRecord>,
}

impl LineageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update lineage statistics with a generation's population
    pub fn update(&mut self, generation: u32, agents: &[Agent]) {
        for record in &mut self.records {
            record.current_population = 0;
        }

        for (lineage, members) in ranking::partition_families(agents) {
            let idx = match self.records.iter().position(|r| r.lineage == lineage) {
                Some(idx) => idx,
                None => {
                    self.records.push(LineageRecord {
                        lineage,
                        first_generation: generation,
                        current_population: 0,
                        peak_population: 0,
                        generations_present: 0,
                        extinct: false,
                    });
                    self.records.len() - 1
                }
            };
            let record = &mut self.records[idx];
            record.current_population = members.len();
            record.peak_population = record.peak_population.max(members.len());
            record.generations_present += 1;
        }

        // Mark extinct lineages
        for record in &mut self.records {
            if record.current_population == 0 {
                record.extinct = true;
            }
        }
    }

    pub fn get(&self, lineage: &LineageKey) -> Option<&LineageRecord> {
        self.records.iter().find(|r| &r.lineage == lineage)
    }

    /// Get surviving lineages count
    pub fn surviving_count(&self) -> usize {
        self.records.iter().filter(|r| !r.extinct).count()
    }

    /// Get dominant lineage (highest current population, earliest on ties)
    pub fn dominant_lineage(&self) -> Option<&LineageRecord> {
        self.records
            .iter()
            .filter(|r| !r.extinct)
            .fold(None, |best: Option<&LineageRecord>, r| match best {
                Some(b) if b.current_population >= r.current_population => Some(b),
                _ => Some(r),
            })
    }

    /// Longest-lived lineages, most generations first
    pub fn most_persistent(&self, n: usize) -> Vec<&LineageRecord> {
        let mut records: Vec<&LineageRecord> = self.records.iter().collect();
        records.sort_by(|a, b| {
            b.generations_present
                .cmp(&a.generations_present)
                .then(b.peak_population.cmp(&a.peak_population))
        });
        records.truncate(n);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::geometry::Vec2;

    fn agent(id: AgentId, name: &str) -> Agent {
        Agent::new(
            id,
            LineageKey::new(name, 7),
            TraitPoints::new(25.0, 25.0, 25.0, 25.0),
            Vec2::ZERO,
            1,
        )
    }

    fn summary(generation: u32, population: usize) -> GenerationSummary {
        GenerationSummary {
            generation,
            population,
            survivors: population / 2,
            lineages: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new(1);
        for g in 1..=5 {
            history.record(summary(g, g as usize * 10));
        }

        let series = history.population_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (1, 10));
        assert_eq!(series[4], (5, 50));
        assert_eq!(history.survivor_series()[4], (5, 25));
        assert_eq!(history.get(3).map(|s| s.population), Some(30));
        assert_eq!(history.latest().map(|s| s.generation), Some(5));
    }

    #[test]
    fn test_history_interval() {
        let history = StatsHistory::new(3);
        assert!(history.wants(1));
        assert!(!history.wants(2));
        assert!(!history.wants(3));
        assert!(history.wants(4));
    }

    #[test]
    fn test_history_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut history = StatsHistory::new(1);
        history.record(summary(1, 20));
        history.record(summary(2, 31));
        history.save(&path).unwrap();

        let loaded = StatsHistory::load(&path).unwrap();
        assert_eq!(loaded.population_series(), history.population_series());
    }

    #[test]
    fn test_summary_line() {
        let line = summary(12, 40).summary();
        assert!(line.contains("Gen:  12"));
        assert!(line.contains("Pop:  40"));
    }

    #[test]
    fn test_lineage_tracker() {
        let mut tracker = LineageTracker::new();
        tracker.update(1, &[agent(1, "A"), agent(2, "B")]);
        assert_eq!(tracker.surviving_count(), 2);

        tracker.update(2, &[agent(3, "A"), agent(4, "A"), agent(5, "A")]);
        assert_eq!(tracker.surviving_count(), 1);

        let a = tracker.get(&LineageKey::new("A", 7)).unwrap();
        assert_eq!(a.first_generation, 1);
        assert_eq!(a.current_population, 3);
        assert_eq!(a.peak_population, 3);
        assert_eq!(a.generations_present, 2);
        assert!(tracker.get(&LineageKey::new("B", 7)).unwrap().extinct);

        assert_eq!(tracker.dominant_lineage().map(|r| r.lineage.name.as_str()), Some("A"));
        assert_eq!(tracker.most_persistent(1)[0].lineage.name, "A");
    }
}
