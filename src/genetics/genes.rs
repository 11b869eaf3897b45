//! Gene extraction from circular genomes.

use std::collections::HashSet;

/// Default START threshold: a codon strictly above it opens a gene
pub const START_THRESHOLD: f64 = 0.95;
/// A codon strictly below this closes an open gene
pub const STOP_THRESHOLD: f64 = 0.05;
/// Shortest accepted gene body
pub const MIN_GENE_LEN: usize = 3;
/// Longest accepted gene body
pub const MAX_GENE_LEN: usize = 20;
/// Genomes shorter than this carry no genes
pub const MIN_GENOME_LEN: usize = 5;

/// Codons appended from the front of the genome to read across the origin
const WRAP_EXTENSION: usize = 25;
/// How far past the logical end the scan may go
const WRAP_SCAN: usize = 20;

/// A gene body read from the genome, markers excluded
#[derive(Clone, Debug, PartialEq)]
pub struct Gene {
    /// Position of the START marker, modulo genome length
    pub start: usize,
    /// Codons strictly between START and STOP
    pub codons: Vec<f64>,
}

impl Gene {
    #[inline]
    pub fn len(&self) -> usize {
        self.codons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }
}

/// Extract all START/STOP delimited genes from a circular genome.
///
/// The scan runs once from index 0 up to `len + 20`, reading through a virtual
/// copy of the first 25 codons so genes spanning the origin are found. Genes
/// never nest: a START seen while a gene is open is ignored. A gene whose
/// normalized start was already emitted is skipped. Genes come back in the
/// order their START markers were met.
pub fn extract_genes(genome: &[f64], threshold: f64) -> Vec<Gene> {
    let len = genome.len();
    if len < MIN_GENOME_LEN {
        return Vec::new();
    }

    let extended_len = len + WRAP_EXTENSION.min(len);
    let scan_end = (len + WRAP_SCAN).min(extended_len);

    let mut genes = Vec::new();
    let mut seen_starts = HashSet::new();
    let mut open: Option<usize> = None;

    for i in 0..scan_end {
        let codon = genome[i % len];

        match open {
            None if codon > threshold => open = Some(i),
            Some(start) if codon < STOP_THRESHOLD => {
                let body_len = i - start - 1;
                if (MIN_GENE_LEN..=MAX_GENE_LEN).contains(&body_len) {
                    let normalized = start % len;
                    if seen_starts.insert(normalized) {
                        let codons = (start + 1..i).map(|j| genome[j % len]).collect();
                        genes.push(Gene {
                            start: normalized,
                            codons,
                        });
                    }
                }
                open = None;
            }
            _ => {}
        }
    }

    genes
}
