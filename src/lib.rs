//! # CodonSoup
//!
//! Artificial-life simulator where bacteria carry circular, real-valued
//! genomes. Genes are read between START and STOP codons, a regulatory pass
//! decides which of them are expressed, and the expressed proteins set each
//! organism's speed, turning, phototaxis and metabolic efficiency.
//!
//! ## Features
//!
//! - **Emergent genetics**: gene structure is not fixed, mutation can create
//!   and destroy genes and regulators
//! - **Toroidal dish**: static light gradient, regenerating nutrients
//! - **Parallel**: founder phenotypes expressed via Rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codonsoup::{Config, Genome, World};
//!
//! let config = Config::default();
//! let mut world = World::new(config);
//! world.populate(&Genome::starter(), 30);
//!
//! world.run(300);
//!
//! println!("Population: {}", world.population());
//! if let Some(best) = world.fittest() {
//!     println!("Best fitness: {:.2}", best.fitness);
//! }
//! ```
//!
//! ## Generations
//!
//! ```rust,no_run
//! use codonsoup::evolution::{Evolution, GenePool};
//! use codonsoup::Config;
//!
//! let mut pool = GenePool::new(100);
//! let mut evolution = Evolution::new(Config::default());
//! for report in evolution.run(&mut pool, 5) {
//!     println!("gen {}: {}", report.generation, report.stats.summary());
//! }
//! ```

pub mod config;
pub mod environment;
pub mod evolution;
pub mod genetics;
pub mod grid;
pub mod organism;
pub mod stats;
pub mod world;

// Re-export main types
pub use config::Config;
pub use genetics::Genome;
pub use organism::Organism;
pub use stats::Stats;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time `ticks` ticks of a world seeded with `population` starter genomes
pub fn benchmark(ticks: u64, population: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.run.initial_population = population;

    let mut world = World::new(config);
    world.populate(&Genome::starter(), population);

    let start = Instant::now();
    world.run(ticks);
    let elapsed = start.elapsed();

    BenchmarkResult {
        ticks,
        initial_population: population,
        final_population: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        max_generation: world.statistics().max_generation,
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub max_generation: u16,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        writeln!(f, "Max generation: {}", self.max_generation)?;
        Ok(())
    }
}
