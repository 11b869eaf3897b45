//! Gene interpretation: mapping a gene body to the protein it encodes.

use serde::{Deserialize, Serialize};

/// Codons below this mark a gene as regulatory
pub const REGULATORY_LOW: f64 = 0.1;
/// Codons above this mark a gene as regulatory
pub const REGULATORY_HIGH: f64 = 0.9;

/// Phenotype dimension a protein acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    Speed,
    TurnRate,
    Phototaxis,
    Efficiency,
}

impl Trait {
    pub const ALL: [Trait; 4] = [
        Trait::Speed,
        Trait::TurnRate,
        Trait::Phototaxis,
        Trait::Efficiency,
    ];

    /// Position of this trait in the phenotype vector
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 4]
    }
}

/// Effect encoded by one gene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Protein {
    /// Trait the protein acts on
    pub target: Trait,
    /// Signed strength in [-1, 1]
    pub magnitude: f64,
    /// Regulatory proteins tune the expression threshold instead of a trait
    pub regulatory: bool,
    /// Number of codons in the gene body
    pub length: usize,
}

/// Interpret a gene body.
///
/// The target trait is a cheap content hash (`floor(sum * 1000) mod 4`), the
/// magnitude remaps the mean codon onto [-1, 1], and any extreme codon makes
/// the gene regulatory. An empty body encodes nothing.
pub fn interpret_gene(body: &[f64]) -> Option<Protein> {
    if body.is_empty() {
        return None;
    }

    let sum: f64 = body.iter().sum();
    let hash = (sum * 1000.0).floor() as i64;
    let target = Trait::from_index(hash.rem_euclid(4) as usize);

    let mean = sum / body.len() as f64;
    let magnitude = mean * 2.0 - 1.0;

    let regulatory = body
        .iter()
        .any(|&c| c < REGULATORY_LOW || c > REGULATORY_HIGH);

    Some(Protein {
        target,
        magnitude,
        regulatory,
        length: body.len(),
    })
}
