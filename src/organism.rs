//! Organism structure and behavior.

use crate::config::Config;
use crate::genetics::{express, mutate, Genome, Phenotype};
use crate::grid::{self, Field};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Unique organism identifier
pub type OrganismId = u64;

/// Margin kept below the grid edge when clamping a moving organism
const EDGE_MARGIN: f32 = 0.1;

/// A simulated bacterium driven by its genome
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Organism {
    // Identity
    pub id: OrganismId,
    pub generation: u16,

    // Genetics
    pub genome: Genome,
    pub phenotype: Phenotype,
    /// Threshold used by the last expression pass
    pub expression_threshold: f64,
    /// Non-regulatory genes expressed in the phenotype
    pub active_gene_count: usize,

    // Physical state
    pub x: f32,
    pub y: f32,
    pub energy: f32,
    pub age: u32,
    pub alive: bool,

    // Statistics
    /// Total energy harvested over the lifetime; never decreases
    pub fitness: f32,
    pub offspring_count: u32,
}

impl Organism {
    /// Create a new organism and express its genome
    pub fn new(id: OrganismId, genome: Genome, x: f32, y: f32, config: &Config) -> Self {
        let mut organism = Self {
            id,
            generation: 0,
            genome,
            phenotype: Phenotype::default(),
            expression_threshold: 0.0,
            active_gene_count: 0,
            x,
            y,
            energy: config.organisms.initial_energy,
            age: 0,
            alive: true,
            fitness: 0.0,
            offspring_count: 0,
        };
        organism.express();
        organism
    }

    /// Recompute phenotype and diagnostics from the genome
    pub fn express(&mut self) {
        let expression = express(self.genome.codons());
        self.phenotype = expression.phenotype;
        self.expression_threshold = expression.threshold;
        self.active_gene_count = expression.active_genes;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Grid cell under the organism
    #[inline]
    pub fn cell(&self, size: usize) -> (usize, usize) {
        (grid::cell(self.x, size), grid::cell(self.y, size))
    }

    /// Move one step on the light field.
    ///
    /// The organism probes the light a few units away in a random direction.
    /// If its phototaxis is strong enough and the probe agrees with its sign,
    /// it heads that way; otherwise it takes a random-walk step whose spread
    /// scales with its turn rate. Positions wrap around the torus.
    pub fn move_in<R: Rng + ?Sized>(&mut self, light: &Field, rng: &mut R, config: &Config) {
        if !self.alive {
            return;
        }

        let size = light.size();
        let limit = size as f32 - EDGE_MARGIN;
        self.x = self.x.clamp(0.0, limit);
        self.y = self.y.clamp(0.0, limit);

        let (cx, cy) = (self.x as i64, self.y as i64);
        let light_here = light.get_wrapped(cx, cy);

        let probe = rng.gen::<f32>() * TAU;
        let reach = config.organisms.sense_distance;
        let light_ahead = light.get_wrapped(
            cx + (probe.cos() * reach) as i64,
            cy + (probe.sin() * reach) as i64,
        );

        let Phenotype {
            speed,
            turn_rate,
            phototaxis,
            ..
        } = self.phenotype;
        let cutoff = config.organisms.phototaxis_cutoff;

        let toward_light = phototaxis > cutoff && light_ahead > light_here;
        let away_from_light = phototaxis < -cutoff && light_ahead < light_here;

        let heading = if toward_light || away_from_light {
            probe
        } else {
            (rng.gen::<f32>() - 0.5) * TAU * turn_rate
        };

        self.x = grid::wrap(self.x + heading.cos() * speed, size);
        self.y = grid::wrap(self.y + heading.sin() * speed, size);
    }

    /// Pay basal and movement costs, harvest light and nutrients.
    ///
    /// Fitness accumulates the harvest only. The organism dies once its
    /// energy reaches zero.
    pub fn metabolize(&mut self, light: f32, nutrient: f32, config: &Config) {
        if !self.alive {
            return;
        }

        let cost = config.organisms.basal_cost + self.phenotype.speed * config.organisms.movement_cost;
        let gain = light * self.phenotype.efficiency * nutrient * config.organisms.harvest_rate;

        self.energy += gain - cost;
        self.fitness += gain;
        self.age += 1;

        if self.energy <= 0.0 {
            self.alive = false;
        }
    }

    /// Check if organism has the energy to reproduce
    #[inline]
    pub fn can_reproduce(&self, config: &Config) -> bool {
        self.alive && self.energy >= config.organisms.reproduction_threshold
    }

    /// Create a mutated offspring next to this organism.
    ///
    /// Halves the parent's energy. Returns `None` when the parent is below the
    /// reproduction threshold.
    pub fn reproduce<R: Rng + ?Sized>(
        &mut self,
        child_id: OrganismId,
        rng: &mut R,
        config: &Config,
    ) -> Option<Organism> {
        if !self.can_reproduce(config) {
            return None;
        }

        self.energy /= 2.0;
        self.offspring_count += 1;

        let genome = mutate(&self.genome, rng, &config.mutation);

        let limit = config.world.grid_size.saturating_sub(1) as f32;
        let (dx, dy) = match Normal::new(0.0f32, config.organisms.offspring_spread) {
            Ok(jitter) => (jitter.sample(rng), jitter.sample(rng)),
            Err(_) => (0.0, 0.0),
        };
        let x = (self.x + dx).clamp(0.0, limit);
        let y = (self.y + dy).clamp(0.0, limit);

        let mut child = Organism::new(child_id, genome, x, y, config);
        child.generation = self.generation.saturating_add(1);
        Some(child)
    }
}
