//! Two-pass regulatory gene expression.
//!
//! Pass one reads the genome at the base threshold and lets regulatory
//! efficiency genes shift the START threshold. Pass two re-reads the genome at
//! the shifted threshold and sums the non-regulatory proteins per trait.

use super::genes::{extract_genes, START_THRESHOLD};
use super::protein::{interpret_gene, Trait};
use serde::{Deserialize, Serialize};

/// Lowest expression threshold regulators can reach
pub const MIN_THRESHOLD: f64 = 0.7;
/// Highest expression threshold regulators can reach
pub const MAX_THRESHOLD: f64 = 0.99;
/// Threshold shift per unit of regulator magnitude
const REGULATORY_STEP: f64 = 0.1;
/// Raw trait sums are clamped to +/- this before scaling
const RAW_LIMIT: f64 = 2.0;

/// Expressed traits of an organism
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phenotype {
    /// Distance per tick, in [0, 3]
    pub speed: f32,
    /// Random-walk angular spread, in [0, 0.5] radians
    pub turn_rate: f32,
    /// Attraction (+) or aversion (-) to light, in (-1, 1)
    pub phototaxis: f32,
    /// Resource conversion rate, in [0, 1]
    pub efficiency: f32,
}

impl Phenotype {
    /// Scale raw per-trait sums into biological ranges
    pub fn from_raw(raw: [f64; 4]) -> Self {
        let [speed, turn_rate, phototaxis, efficiency] =
            raw.map(|v| v.clamp(-RAW_LIMIT, RAW_LIMIT));

        Self {
            speed: ((speed + 2.0) / 4.0 * 3.0) as f32,
            turn_rate: ((turn_rate + 2.0) / 4.0 * 0.5) as f32,
            phototaxis: phototaxis.tanh() as f32,
            efficiency: ((efficiency + 2.0) / 4.0) as f32,
        }
    }
}

impl Default for Phenotype {
    /// Phenotype of a genome without any expressed gene
    fn default() -> Self {
        Self::from_raw([0.0; 4])
    }
}

/// Result of expressing a genome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub phenotype: Phenotype,
    /// Threshold used for the second pass
    pub threshold: f64,
    /// Non-regulatory genes that contributed to the phenotype
    pub active_genes: usize,
}

/// First pass: fold every regulatory efficiency gene into the threshold.
///
/// Regulators compound in scan order and the threshold is clamped after
/// each step.
pub fn regulated_threshold(genome: &[f64], base: f64) -> f64 {
    extract_genes(genome, base)
        .iter()
        .filter_map(|gene| interpret_gene(&gene.codons))
        .filter(|protein| protein.regulatory && protein.target == Trait::Efficiency)
        .fold(base, |threshold, protein| {
            (threshold - protein.magnitude * REGULATORY_STEP).clamp(MIN_THRESHOLD, MAX_THRESHOLD)
        })
}

/// Express a genome into a phenotype. Pure in the genome.
pub fn express(genome: &[f64]) -> Expression {
    let threshold = regulated_threshold(genome, START_THRESHOLD);

    let mut raw = [0.0f64; 4];
    let mut active_genes = 0;

    for protein in extract_genes(genome, threshold)
        .iter()
        .filter_map(|gene| interpret_gene(&gene.codons))
        .filter(|protein| !protein.regulatory)
    {
        raw[protein.target.index()] += protein.magnitude;
        active_genes += 1;
    }

    Expression {
        phenotype: Phenotype::from_raw(raw),
        threshold,
        active_genes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::Genome;
    use proptest::prelude::*;

    fn padded(parts: &[&[f64]]) -> Vec<f64> {
        let mut genome = Vec::new();
        for part in parts {
            genome.extend_from_slice(part);
            genome.extend(std::iter::repeat(0.5).take(5));
        }
        genome.extend(std::iter::repeat(0.5).take(10));
        genome
    }

    #[test]
    fn test_empty_genome_is_neutral() {
        let expression = express(&[]);
        assert_eq!(expression.active_genes, 0);
        assert_eq!(expression.threshold, START_THRESHOLD);
        assert_eq!(expression.phenotype, Phenotype::default());
        assert!((expression.phenotype.speed - 1.5).abs() < 1e-6);
        assert!((expression.phenotype.turn_rate - 0.25).abs() < 1e-6);
        assert_eq!(expression.phenotype.phototaxis, 0.0);
        assert!((expression.phenotype.efficiency - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_starter_genome_expresses_one_gene() {
        let expression = express(Genome::starter().codons());
        assert_eq!(expression.active_genes, 1);
        assert_eq!(expression.threshold, START_THRESHOLD);
    }

    #[test]
    fn test_positive_regulator_unlocks_gene() {
        // Regulator targets efficiency (sum 2.7555 -> 2755 mod 4 == 3) with a
        // positive magnitude, lowering the threshold below 0.9.
        let regulator: &[f64] = &[0.96, 0.95, 0.9, 0.9055, 0.04];
        let hidden: &[f64] = &[0.9, 0.6, 0.6, 0.6005, 0.04];
        let genome = padded(&[regulator, hidden]);

        let unregulated = express(&padded(&[hidden]));
        assert_eq!(unregulated.active_genes, 0);

        let expression = express(&genome);
        assert!(expression.threshold < 0.9);
        assert!(expression.threshold >= MIN_THRESHOLD);
        assert_eq!(expression.active_genes, 1);
        assert!(expression.phenotype.speed > 1.5);
    }

    #[test]
    fn test_negative_regulator_suppresses_genes() {
        // Regulator (sum 0.4555 -> 455 mod 4 == 3) with negative magnitude
        // pushes the threshold to its ceiling, hiding every 0.96 START.
        let regulator: &[f64] = &[0.96, 0.06, 0.2, 0.1955, 0.04];
        let gene: &[f64] = &[0.96, 0.6, 0.6, 0.6005, 0.04];
        let genome = padded(&[regulator, gene]);

        let expression = express(&genome);
        assert_eq!(expression.threshold, MAX_THRESHOLD);
        assert_eq!(expression.active_genes, 0);
    }

    #[test]
    fn test_regulatory_genes_do_not_touch_phenotype() {
        let regulator: &[f64] = &[0.96, 0.06, 0.2, 0.1955, 0.04];
        let expression = express(&padded(&[regulator]));
        assert_eq!(expression.phenotype, Phenotype::default());
    }

    #[test]
    fn test_raw_values_are_clamped() {
        let phenotype = Phenotype::from_raw([10.0, -10.0, 10.0, -10.0]);
        assert_eq!(phenotype.speed, 3.0);
        assert_eq!(phenotype.turn_rate, 0.0);
        assert!(phenotype.phototaxis < 1.0);
        assert_eq!(phenotype.efficiency, 0.0);
    }

    #[test]
    fn test_expression_is_pure() {
        let genome = Genome::starter();
        assert_eq!(express(genome.codons()), express(genome.codons()));
    }

    /// Codons drawn mostly from the middle, with START, STOP and regulatory
    /// extremes mixed in so genes and regulators actually occur.
    fn codon() -> impl Strategy<Value = f64> {
        prop_oneof![
            4 => 0.1f64..=0.9,
            1 => 0.9f64..=1.0,
            1 => 0.0f64..0.1,
        ]
    }

    proptest! {
        #[test]
        fn prop_phenotype_in_range(genome in prop::collection::vec(codon(), 0..300)) {
            let expression = express(&genome);
            let p = expression.phenotype;

            prop_assert!((0.0..=3.0).contains(&p.speed));
            prop_assert!((0.0..=0.5).contains(&p.turn_rate));
            prop_assert!(p.phototaxis > -1.0 && p.phototaxis < 1.0);
            prop_assert!((0.0..=1.0).contains(&p.efficiency));
            prop_assert!(expression.threshold >= MIN_THRESHOLD);
            prop_assert!(expression.threshold <= MAX_THRESHOLD);
        }
    }
}
