//! Statistics tracking for the simulation.

use crate::organism::Organism;
use serde::{Deserialize, Serialize};

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Current simulation tick
    pub tick: u64,
    /// Living organisms
    pub population: usize,
    /// Mean cumulative fitness
    pub avg_fitness: f32,
    /// Best cumulative fitness
    pub max_fitness: f32,
    /// Mean energy
    pub avg_energy: f32,
    /// Mean genome length in codons
    pub avg_genome_length: f32,
    /// Mean count of expressed non-regulatory genes
    pub avg_active_genes: f32,
    /// Highest generation alive
    pub max_generation: u16,
    /// Births during the last tick
    pub births: usize,
    /// Deaths during the last tick
    pub deaths: usize,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute population aggregates; all zero for an empty population
    pub fn update(&mut self, organisms: &[Organism]) {
        let alive: Vec<&Organism> = organisms.iter().filter(|o| o.is_alive()).collect();
        self.population = alive.len();

        if alive.is_empty() {
            self.avg_fitness = 0.0;
            self.max_fitness = 0.0;
            self.avg_energy = 0.0;
            self.avg_genome_length = 0.0;
            self.avg_active_genes = 0.0;
            self.max_generation = 0;
            return;
        }

        let n = alive.len() as f32;
        self.avg_fitness = alive.iter().map(|o| o.fitness).sum::<f32>() / n;
        self.avg_energy = alive.iter().map(|o| o.energy).sum::<f32>() / n;
        self.avg_genome_length = alive.iter().map(|o| o.genome.len() as f32).sum::<f32>() / n;
        self.avg_active_genes = alive.iter().map(|o| o.active_gene_count as f32).sum::<f32>() / n;
        self.max_fitness = alive.iter().map(|o| o.fitness).fold(0.0, f32::max);
        self.max_generation = alive.iter().map(|o| o.generation).max().unwrap_or(0);
    }

    /// Save stats to JSON file
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:5} | Pop:{:4} | Gen:{:3} | Fit:{:.2}/{:.2} | Energy:{:.2} | Genome:{:.1} | Genes:{:.2}",
            self.tick,
            self.population,
            self.max_generation,
            self.avg_fitness,
            self.max_fitness,
            self.avg_energy,
            self.avg_genome_length,
            self.avg_active_genes,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.tick, s.population))
            .collect()
    }

    /// Get mean fitness over time
    pub fn fitness_series(&self) -> Vec<(u64, f32)> {
        self.snapshots
            .iter()
            .map(|s| (s.tick, s.avg_fitness))
            .collect()
    }

    /// Get mean genome length over time
    pub fn genome_length_series(&self) -> Vec<(u64, f32)> {
        self.snapshots
            .iter()
            .map(|s| (s.tick, s.avg_genome_length))
            .collect()
    }

    /// Save history to file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::genetics::Genome;

    #[test]
    fn test_stats_update() {
        let config = Config::default();
        let mut organisms = vec![
            Organism::new(1, Genome::starter(), 10.0, 10.0, &config),
            Organism::new(2, Genome::starter(), 20.0, 20.0, &config),
            Organism::new(3, Genome::new(vec![0.5; 45]), 30.0, 30.0, &config),
        ];
        organisms[0].fitness = 2.0;
        organisms[1].fitness = 4.0;
        organisms[1].energy = 30.0;

        let mut stats = Stats::new();
        stats.update(&organisms);

        assert_eq!(stats.population, 3);
        assert!((stats.avg_fitness - 2.0).abs() < 1e-6);
        assert_eq!(stats.max_fitness, 4.0);
        assert!((stats.avg_energy - 20.0).abs() < 1e-5);
        assert!((stats.avg_genome_length - 85.0).abs() < 1e-5);
        assert!((stats.avg_active_genes - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_population() {
        let mut stats = Stats::new();
        stats.avg_fitness = 3.0;
        stats.update(&[]);

        assert_eq!(stats.population, 0);
        assert_eq!(stats.avg_fitness, 0.0);
        assert_eq!(stats.max_fitness, 0.0);
        assert_eq!(stats.avg_energy, 0.0);
        assert_eq!(stats.avg_genome_length, 0.0);
        assert_eq!(stats.avg_active_genes, 0.0);
    }

    #[test]
    fn test_history_series() {
        let mut history = StatsHistory::new(50);

        for tick in [50u64, 100, 150] {
            history.record(Stats {
                tick,
                population: tick as usize / 10,
                avg_fitness: tick as f32 / 100.0,
                avg_genome_length: 105.0 + tick as f32,
                ..Stats::default()
            });
        }

        assert_eq!(history.population_series(), vec![(50, 5), (100, 10), (150, 15)]);
        assert_eq!(history.fitness_series()[2], (150, 1.5));
        assert_eq!(history.genome_length_series()[0], (50, 155.0));
    }

    #[test]
    fn test_summary_mentions_population() {
        let mut stats = Stats::new();
        stats.population = 42;
        assert!(stats.summary().contains("Pop:  42"));
    }
}
