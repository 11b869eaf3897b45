//! Genetics module - circular genomes, gene extraction, expression and mutation.
//!
//! A genome is a ring of real-valued codons in [0, 1]. Genes are read off the
//! ring between START and STOP markers, each gene is interpreted as a protein
//! acting on one phenotype trait, and a two-pass regulatory network decides
//! which genes are expressed at all.

pub mod expression;
pub mod genes;
pub mod mutation;
pub mod protein;

pub use expression::{express, Expression, Phenotype};
pub use genes::{extract_genes, Gene};
pub use mutation::mutate;
pub use protein::{interpret_gene, Protein, Trait};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised when a genome arrives from outside the simulation
#[derive(Debug, Error)]
pub enum GenomeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("codon {index} is not a finite number")]
    NonFinite { index: usize },
}

/// Variable-length circular genome.
///
/// Codons are kept in [0, 1] as `f64`; the trait hash in [`interpret_gene`]
/// reads decimal boundaries that `f32` would round across. The sequence has
/// no fixed origin, gene extraction wraps around the end.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    codons: Vec<f64>,
}

impl Genome {
    /// Build a genome from trusted codons.
    ///
    /// Values are clamped into [0, 1]; use [`Genome::from_external`] for input
    /// that may contain non-finite values.
    pub fn new(codons: Vec<f64>) -> Self {
        let codons = codons.into_iter().map(|c| c.clamp(0.0, 1.0)).collect();
        Self { codons }
    }

    /// Accept a genome from an external collaborator (gene pool, file).
    pub fn from_external(codons: Vec<f64>) -> Result<Self, GenomeError> {
        if let Some(index) = codons.iter().position(|c| !c.is_finite()) {
            return Err(GenomeError::NonFinite { index });
        }
        Ok(Self::new(codons))
    }

    /// Minimal viable genome: neutral filler around one 3-codon gene.
    pub fn starter() -> Self {
        let mut codons = vec![0.5; 60];
        codons.extend_from_slice(&[0.96, 0.4, 0.4, 0.4, 0.04]);
        codons.extend(std::iter::repeat(0.5).take(40));
        Self { codons }
    }

    #[inline]
    pub fn codons(&self) -> &[f64] {
        &self.codons
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }

    /// Load a genome stored as a JSON array of numbers
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, GenomeError> {
        let json = std::fs::read_to_string(path)?;
        let codons: Vec<f64> = serde_json::from_str(&json)?;
        Self::from_external(codons)
    }

    /// Save the genome as a JSON array of numbers
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), GenomeError> {
        let json = serde_json::to_string(&self.codons)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// A gene found at the base threshold together with its interpretation.
#[derive(Clone, Debug)]
pub struct GeneReport {
    pub gene: Gene,
    pub protein: Protein,
}

/// List every gene visible at the base START threshold with its protein.
pub fn gene_report(genome: &Genome) -> Vec<GeneReport> {
    extract_genes(genome.codons(), genes::START_THRESHOLD)
        .into_iter()
        .filter_map(|gene| {
            interpret_gene(&gene.codons).map(|protein| GeneReport { gene, protein })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_genome_layout() {
        let genome = Genome::starter();
        assert_eq!(genome.len(), 105);
        assert_eq!(genome.codons()[60], 0.96);
        assert_eq!(genome.codons()[64], 0.04);
    }

    #[test]
    fn test_starter_genome_has_one_gene() {
        let report = gene_report(&Genome::starter());
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].gene.start, 60);
        assert_eq!(report[0].protein.length, 3);
    }

    #[test]
    fn test_new_clamps_codons() {
        let genome = Genome::new(vec![-0.5, 0.5, 1.5]);
        assert_eq!(genome.codons(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_external_rejects_nan() {
        let result = Genome::from_external(vec![0.5, f64::NAN]);
        assert!(matches!(result, Err(GenomeError::NonFinite { index: 1 })));
    }

    #[test]
    fn test_json_roundtrip() {
        let genome = Genome::starter();
        let path = std::env::temp_dir().join("codonsoup_genome_roundtrip.json");

        genome.save_json(&path).unwrap();
        let loaded = Genome::load_json(&path).unwrap();
        assert_eq!(loaded, genome);

        std::fs::remove_file(path).ok();
    }
}
