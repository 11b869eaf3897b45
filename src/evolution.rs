//! Generation loop and the shared gene pool.
//!
//! Each generation seeds a fresh world from an immigrant genome (or the
//! starter genome when none is available), runs it for a fixed number of
//! ticks and hands the fittest survivor back to the pool.

use crate::config::Config;
use crate::genetics::genes::START_THRESHOLD;
use crate::genetics::{extract_genes, Genome, GenomeError};
use crate::stats::Stats;
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Ticks between progress lines while a generation runs
const PROGRESS_INTERVAL: u64 = 100;

/// A genome offered back to the pool with the fitness it reached
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub genome: Genome,
    pub fitness: f32,
}

impl Submission {
    /// Write the submission as JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), GenomeError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a submission from JSON
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, GenomeError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Reasons a pool refuses a submission
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("genome is empty")]
    EmptyGenome,

    #[error("fitness must be finite, got {0}")]
    InvalidFitness(f32),

    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Supplier of immigrant genomes
pub trait GenomeSource {
    /// Next genome to seed a population with, if any
    fn fetch(&mut self) -> Option<Genome>;
}

/// Receiver of the fittest genome of each generation
pub trait GenomeSink {
    fn submit(&mut self, submission: Submission) -> Result<(), SubmitError>;
}

/// No immigrants, and submissions go nowhere
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

impl GenomeSource for Offline {
    fn fetch(&mut self) -> Option<Genome> {
        None
    }
}

impl GenomeSink for Offline {
    fn submit(&mut self, _submission: Submission) -> Result<(), SubmitError> {
        Ok(())
    }
}

/// Aggregate view of the pool contents
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolStatus {
    pub total_genomes: usize,
    pub avg_fitness: f32,
    pub avg_length: f32,
    pub top_fitness: f32,
}

/// Fitness of pooled genomes carrying genes of one length
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneLengthStats {
    pub count: usize,
    pub avg_fitness: f32,
}

/// In-memory pool keeping the best submissions, fittest first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenePool {
    capacity: usize,
    entries: Vec<Submission>,
}

impl GenePool {
    /// Create an empty pool holding at most `capacity` genomes
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Highest-fitness submission
    pub fn best(&self) -> Option<&Submission> {
        self.entries.first()
    }

    /// Pooled submissions, fittest first
    pub fn entries(&self) -> &[Submission] {
        &self.entries
    }

    /// Totals and averages over the pool
    pub fn status(&self) -> PoolStatus {
        if self.entries.is_empty() {
            return PoolStatus::default();
        }

        let n = self.entries.len() as f32;
        PoolStatus {
            total_genomes: self.entries.len(),
            avg_fitness: self.entries.iter().map(|s| s.fitness).sum::<f32>() / n,
            avg_length: self.entries.iter().map(|s| s.genome.len() as f32).sum::<f32>() / n,
            top_fitness: self.entries[0].fitness,
        }
    }

    /// Gene count and mean genome fitness per gene length
    pub fn gene_length_stats(&self) -> BTreeMap<usize, GeneLengthStats> {
        let mut fitness_by_length: BTreeMap<usize, Vec<f32>> = BTreeMap::new();

        for entry in &self.entries {
            for gene in extract_genes(entry.genome.codons(), START_THRESHOLD) {
                fitness_by_length
                    .entry(gene.len())
                    .or_default()
                    .push(entry.fitness);
            }
        }

        fitness_by_length
            .into_iter()
            .map(|(length, values)| {
                let avg_fitness = values.iter().sum::<f32>() / values.len() as f32;
                (
                    length,
                    GeneLengthStats {
                        count: values.len(),
                        avg_fitness,
                    },
                )
            })
            .collect()
    }

    /// Write the pool as JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), GenomeError> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a pool from JSON
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, GenomeError> {
        let json = std::fs::read_to_string(path)?;
        let mut pool: Self = serde_json::from_str(&json)?;
        pool.capacity = pool.capacity.max(1);
        pool.entries.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        pool.entries.truncate(pool.capacity);
        Ok(pool)
    }
}

impl GenomeSource for GenePool {
    fn fetch(&mut self) -> Option<Genome> {
        self.best().map(|s| s.genome.clone())
    }
}

impl GenomeSink for GenePool {
    fn submit(&mut self, submission: Submission) -> Result<(), SubmitError> {
        if submission.genome.is_empty() {
            return Err(SubmitError::EmptyGenome);
        }
        if !submission.fitness.is_finite() {
            return Err(SubmitError::InvalidFitness(submission.fitness));
        }

        // Equal fitness keeps the earlier submission first
        let at = self
            .entries
            .partition_point(|s| s.fitness >= submission.fitness);
        self.entries.insert(at, submission);
        self.entries.truncate(self.capacity);
        Ok(())
    }
}

/// Where a generation's founders came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedOrigin {
    /// Genome handed to [`Evolution::with_seed_genome`]
    Supplied,
    Immigrant,
    Starter,
}

/// Outcome of one generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub seeded_from: SeedOrigin,
    /// Statistics after the last tick
    pub stats: Stats,
    /// Fittest survivor, `None` when the population collapsed
    pub fittest: Option<Submission>,
    /// Whether the sink accepted the fittest genome
    pub submitted: bool,
}

/// Runs generations against a gene pool
pub struct Evolution {
    config: Config,
    generation: u32,
    seed_genome: Option<Genome>,
}

impl Evolution {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            generation: 0,
            seed_genome: None,
        }
    }

    /// Found the next generation from `genome` instead of asking the source.
    /// Later generations fetch as usual.
    pub fn with_seed_genome(mut self, genome: Genome) -> Self {
        self.seed_genome = Some(genome);
        self
    }

    /// Generations completed so far
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// World for the next generation, seeded deterministically when the
    /// configuration carries a seed
    fn fresh_world(&self) -> World {
        match self.config.run.seed {
            Some(seed) => {
                World::new_with_seed(self.config.clone(), seed.wrapping_add(self.generation as u64))
            }
            None => World::new(self.config.clone()),
        }
    }

    /// Seed, run and report a single generation
    pub fn run_generation<P>(&mut self, pool: &mut P) -> GenerationReport
    where
        P: GenomeSource + GenomeSink + ?Sized,
    {
        let generation = self.generation;
        let (genome, seeded_from) = match self.seed_genome.take() {
            Some(genome) => {
                log::info!("Using supplied genome (length: {})", genome.len());
                (genome, SeedOrigin::Supplied)
            }
            None => match pool.fetch() {
                // An empty genome is a legal, if gene-less, founder
                Some(genome) => {
                    log::info!("Fetched immigrant genome (length: {})", genome.len());
                    (genome, SeedOrigin::Immigrant)
                }
                None => {
                    log::info!("Using starter genome (no immigrants available)");
                    (Genome::starter(), SeedOrigin::Starter)
                }
            },
        };

        let mut world = self.fresh_world();
        world.populate(&genome, self.config.run.initial_population);
        log::info!(
            "Generation {}: starting population {} (seed {})",
            generation,
            world.population(),
            world.seed()
        );

        world.run_with_callback(self.config.run.ticks_per_generation, |w, tick| {
            if tick > 0 && tick % PROGRESS_INTERVAL == 0 {
                let stats = w.statistics();
                log::debug!(
                    "  tick {:3}: pop={:3}, avg_energy={:.2}, avg_fitness={:.2}",
                    tick,
                    stats.population,
                    stats.avg_energy,
                    stats.avg_fitness
                );
            }
        });

        let stats = world.statistics();
        log::info!(
            "  final: pop={}, avg_fitness={:.2}",
            stats.population,
            stats.avg_fitness
        );

        let fittest = world.fittest().map(|org| {
            log::info!(
                "  fittest: fitness={:.2}, energy={:.2}, genome_len={}",
                org.fitness,
                org.energy,
                org.genome.len()
            );
            log::debug!(
                "  phenotype: speed={:.2}, turn={:.2}, photo={:.2}, eff={:.2}",
                org.phenotype.speed,
                org.phenotype.turn_rate,
                org.phenotype.phototaxis,
                org.phenotype.efficiency
            );
            Submission {
                genome: org.genome.clone(),
                fitness: org.fitness,
            }
        });

        let submitted = match &fittest {
            Some(submission) => match pool.submit(submission.clone()) {
                Ok(()) => {
                    log::debug!("Submitted fittest genome to the pool");
                    true
                }
                Err(e) => {
                    log::warn!("Submission of fittest genome failed: {}", e);
                    false
                }
            },
            None => {
                log::warn!("Population collapsed; no fittest organism available");
                false
            }
        };

        self.generation += 1;

        GenerationReport {
            generation,
            seeded_from,
            stats,
            fittest,
            submitted,
        }
    }

    /// Run `generations` generations in sequence
    pub fn run<P>(&mut self, pool: &mut P, generations: u32) -> Vec<GenerationReport>
    where
        P: GenomeSource + GenomeSink + ?Sized,
    {
        (0..generations).map(|_| self.run_generation(pool)).collect()
    }
}
