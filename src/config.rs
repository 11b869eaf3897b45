//! Configuration system for CodonSoup simulations.
//!
//! Supports YAML configuration files with sensible defaults. Every section
//! falls back to its defaults, so a file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub organisms: OrganismConfig,
    pub mutation: MutationConfig,
    pub run: RunConfig,
    pub logging: LoggingConfig,
}

/// Environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side of the square toroidal grid
    pub grid_size: usize,
    /// Nutrient added to every cell per tick
    pub nutrient_regen: f32,
    /// Averaging passes applied to the initial nutrient field
    pub smoothing_passes: usize,
    /// Probability per tick of a light flicker
    pub flicker_probability: f64,
    /// Standard deviation of flicker noise
    pub flicker_sigma: f32,
    /// Nutrient removed from a cell when an organism reproduces there
    pub birth_depletion: f32,
}

/// Organism energetics and behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganismConfig {
    /// Starting energy for seeded organisms and offspring
    pub initial_energy: f32,
    /// Minimum energy to reproduce
    pub reproduction_threshold: f32,
    /// Energy spent per tick just staying alive
    pub basal_cost: f32,
    /// Energy spent per tick per unit of speed
    pub movement_cost: f32,
    /// Scale of light * efficiency * nutrient harvested per tick
    pub harvest_rate: f32,
    /// Distance of the light probe used for phototaxis
    pub sense_distance: f32,
    /// Minimum phototaxis magnitude before gradients are followed
    pub phototaxis_cutoff: f32,
    /// Standard deviation of offspring placement around the parent
    pub offspring_spread: f32,
}

/// Genome mutation operators applied on reproduction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Per-codon probability of replacement with a fresh value
    pub point_rate: f64,
    /// Per-position probability of inserting a fresh codon
    pub insertion_rate: f64,
    /// Per-codon probability of removal
    pub deletion_rate: f64,
    /// Per-reproduction probability of a segment duplication
    pub duplication_rate: f64,
    /// Deletions only happen while the genome is longer than this
    pub min_length: usize,
    /// Duplications only happen while the genome is shorter than this
    pub duplication_ceiling: usize,
    /// Hard cap on genome length
    pub max_length: usize,
}

/// Generation loop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Organisms seeded at the start of each generation
    pub initial_population: usize,
    /// Ticks simulated per generation
    pub ticks_per_generation: u64,
    /// Number of generations
    pub generations: u32,
    /// Master seed (random when absent)
    pub seed: Option<u64>,
}

/// Logging and statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Ticks between recorded stats snapshots
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 120,
            nutrient_regen: 0.002,
            smoothing_passes: 5,
            flicker_probability: 0.05,
            flicker_sigma: 0.02,
            birth_depletion: 0.15,
        }
    }
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            initial_energy: 15.0,
            reproduction_threshold: 25.0,
            basal_cost: 0.02,
            movement_cost: 0.05,
            harvest_rate: 0.5,
            sense_distance: 3.0,
            phototaxis_cutoff: 0.2,
            offspring_spread: 5.0,
        }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            point_rate: 0.02,
            insertion_rate: 0.005,
            deletion_rate: 0.003,
            duplication_rate: 0.01,
            min_length: 30,
            duplication_ceiling: 300,
            max_length: 400,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_population: 30,
            ticks_per_generation: 300,
            generations: 10,
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 50,
            log_level: "info".to_string(),
        }
    }
}

/// Errors raised while loading, saving or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.world.grid_size == 0 {
            return invalid("grid_size must be > 0");
        }
        if self.run.initial_population == 0 {
            return invalid("initial_population must be > 0");
        }
        if self.organisms.reproduction_threshold <= 0.0 {
            return invalid("reproduction_threshold must be > 0");
        }
        let rates = [
            self.world.flicker_probability,
            self.mutation.point_rate,
            self.mutation.insertion_rate,
            self.mutation.deletion_rate,
            self.mutation.duplication_rate,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return invalid("probabilities must lie in [0, 1]");
        }
        let sigmas = [
            ("world.flicker_sigma", self.world.flicker_sigma),
            ("organisms.offspring_spread", self.organisms.offspring_spread),
        ];
        for (name, sigma) in sigmas {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a finite value >= 0",
                    name
                )));
            }
        }
        if self.mutation.min_length > self.mutation.max_length {
            return invalid("mutation.min_length cannot exceed mutation.max_length");
        }
        if self.logging.stats_interval == 0 {
            return invalid("stats_interval must be > 0");
        }
        Ok(())
    }
}
