//! Light and nutrient fields over the toroidal dish.

use crate::config::WorldConfig;
use crate::grid::Field;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Blend weight of each smoothing pass over the initial nutrient field
const SMOOTHING_WEIGHT: f32 = 0.2;

/// Environmental state shared by every organism
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Environment {
    /// Light intensity, brightest at row 0
    pub light: Field,
    /// Nutrient availability, depleted locally by reproduction
    pub nutrient: Field,
    /// Ticks elapsed
    pub tick: u64,
}

impl Environment {
    /// Create the static light gradient and a smoothed random nutrient field
    pub fn new<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Self {
        let size = config.grid_size;

        let light = Self::light_gradient(size);

        let mut nutrient = Field::from_fn(size, |_, _| rng.gen::<f32>() * 0.5 + 0.5);
        for _ in 0..config.smoothing_passes {
            nutrient.smooth(SMOOTHING_WEIGHT);
        }

        Self {
            light,
            nutrient,
            tick: 0,
        }
    }

    /// Vertical gradient from 1.0 at row 0 down towards 0.1
    pub fn light_gradient(size: usize) -> Field {
        Field::from_fn(size, |_, y| (1.0 - y as f32 / size as f32) * 0.9 + 0.1)
    }

    /// Advance the fields by one tick: nutrient regeneration, then an
    /// occasional light flicker.
    pub fn update<R: Rng + ?Sized>(&mut self, config: &WorldConfig, rng: &mut R) {
        self.tick += 1;

        self.nutrient.add_uniform(config.nutrient_regen);

        if rng.gen_bool(config.flicker_probability) {
            self.flicker(config.flicker_sigma, rng);
        }
    }

    /// Add Gaussian noise to every light cell
    pub fn flicker<R: Rng + ?Sized>(&mut self, sigma: f32, rng: &mut R) {
        // An invalid sigma disables flicker
        let Ok(noise) = Normal::new(0.0f32, sigma) else {
            return;
        };
        self.light.map_in_place(|v| v + noise.sample(rng));
    }

    /// Light and nutrient at a continuous position
    #[inline]
    pub fn sense(&self, x: f32, y: f32) -> (f32, f32) {
        (self.light.sample(x, y), self.nutrient.sample(x, y))
    }

    /// Grid side length
    #[inline]
    pub fn size(&self) -> usize {
        self.light.size()
    }
}
