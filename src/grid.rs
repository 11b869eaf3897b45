//! Toroidal scalar fields and coordinate wrapping.

use serde::{Deserialize, Serialize};

/// Wrap a continuous coordinate into `[0, size)`.
#[inline]
pub fn wrap(value: f32, size: usize) -> f32 {
    let size = size as f32;
    let wrapped = value.rem_euclid(size);
    // rem_euclid can round up to `size` for tiny negative inputs
    if wrapped >= size {
        0.0
    } else {
        wrapped
    }
}

/// Grid cell containing a continuous coordinate (truncated, then wrapped).
#[inline]
pub fn cell(value: f32, size: usize) -> usize {
    (value.trunc() as i64).rem_euclid(size as i64) as usize
}

/// Dense square field of values in [0, 1] with wrapped edges
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    size: usize,
    /// cells[y][x]
    cells: Vec<Vec<f32>>,
}

impl Field {
    /// Create a field filled with `value`
    pub fn new(size: usize, value: f32) -> Self {
        Self {
            size,
            cells: vec![vec![value.clamp(0.0, 1.0); size]; size],
        }
    }

    /// Create a field from a per-cell function of (x, y)
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let cells = (0..size)
            .map(|y| (0..size).map(|x| f(x, y).clamp(0.0, 1.0)).collect())
            .collect();
        Self { size, cells }
    }

    /// Value at a cell, coordinates wrapped
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.cells[y % self.size][x % self.size]
    }

    /// Value at signed coordinates, wrapped onto the torus
    #[inline]
    pub fn get_wrapped(&self, x: i64, y: i64) -> f32 {
        let size = self.size as i64;
        self.cells[y.rem_euclid(size) as usize][x.rem_euclid(size) as usize]
    }

    /// Value under a continuous position
    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        self.cells[cell(y, self.size)][cell(x, self.size)]
    }

    /// Set a cell, clamped into [0, 1]
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let size = self.size;
        self.cells[y % size][x % size] = value.clamp(0.0, 1.0);
    }

    /// Remove up to `amount` from a cell, never going below zero
    #[inline]
    pub fn deplete(&mut self, x: usize, y: usize, amount: f32) {
        let current = self.get(x, y);
        self.set(x, y, (current - amount).max(0.0));
    }

    /// Add `amount` to every cell, clamped into [0, 1]
    pub fn add_uniform(&mut self, amount: f32) {
        self.map_in_place(|v| v + amount);
    }

    /// Apply `f` to every cell and clamp the result into [0, 1]
    pub fn map_in_place<F>(&mut self, mut f: F)
    where
        F: FnMut(f32) -> f32,
    {
        for row in &mut self.cells {
            for cell in row {
                *cell = f(*cell).clamp(0.0, 1.0);
            }
        }
    }

    /// Blend every cell with its wrapped predecessor along y, then along x:
    /// `v = (1 - w) * v + w * prev`
    pub fn smooth(&mut self, weight: f32) {
        let size = self.size;

        let rows = self.cells.clone();
        for y in 0..size {
            let prev = (y + size - 1) % size;
            for x in 0..size {
                self.cells[y][x] = (1.0 - weight) * rows[y][x] + weight * rows[prev][x];
            }
        }

        for row in &mut self.cells {
            let original = row.clone();
            for x in 0..size {
                let prev = (x + size - 1) % size;
                row[x] = (1.0 - weight) * original[x] + weight * original[prev];
            }
        }
    }

    /// Sum of all cells
    pub fn total(&self) -> f32 {
        self.cells.iter().flatten().sum()
    }

    /// Side length
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major iterator over all values
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.cells.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(5.0, 120), 5.0);
        assert_eq!(wrap(121.5, 120), 1.5);
        assert_eq!(wrap(-1.0, 120), 119.0);
        assert!(wrap(-1e-9, 120) < 120.0);
    }

    #[test]
    fn test_cell() {
        assert_eq!(cell(10.9, 120), 10);
        assert_eq!(cell(120.0, 120), 0);
        assert_eq!(cell(-0.5, 120), 0);
        assert_eq!(cell(-1.5, 120), 119);
    }

    #[test]
    fn test_field_basic() {
        let mut field = Field::new(10, 0.5);
        field.set(3, 4, 0.8);

        assert_eq!(field.get(3, 4), 0.8);
        assert_eq!(field.get(13, 14), 0.8);
        assert_eq!(field.get_wrapped(-7, -6), 0.8);
        assert_eq!(field.sample(3.7, 4.2), 0.8);
    }

    #[test]
    fn test_field_clamps() {
        let mut field = Field::new(4, 0.5);
        field.set(0, 0, 3.0);
        assert_eq!(field.get(0, 0), 1.0);

        field.deplete(1, 1, 0.9);
        assert_eq!(field.get(1, 1), 0.0);

        field.add_uniform(0.7);
        assert!(field.values().all(|v| v <= 1.0));
    }

    #[test]
    fn test_smooth_preserves_total() {
        let mut field = Field::from_fn(8, |x, y| ((x * 7 + y * 3) % 10) as f32 / 10.0);
        let before = field.total();
        field.smooth(0.2);
        assert!((field.total() - before).abs() < 1e-3);
    }

    #[test]
    fn test_smooth_uniform_is_fixed_point() {
        let mut field = Field::new(6, 0.4);
        field.smooth(0.2);
        assert!(field.values().all(|v| (v - 0.4).abs() < 1e-6));
    }
}
