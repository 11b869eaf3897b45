//! Genome mutation operators.
//!
//! Each per-codon operator builds a fresh sequence left to right, so an
//! inserted or shifted codon is never reconsidered by the same pass.

use super::Genome;
use crate::config::MutationConfig;
use rand::Rng;

/// Shortest duplicated segment
const MIN_SEGMENT: usize = 5;
/// Exclusive upper bound on duplicated segment length
const MAX_SEGMENT: usize = 16;
/// Genomes shorter than this are never duplicated
const MIN_DUPLICATION_LEN: usize = 10;

/// Copy a parent genome and apply point mutations, insertions, deletions,
/// one possible segment duplication and the length cap, in that order.
pub fn mutate<R: Rng + ?Sized>(parent: &Genome, rng: &mut R, config: &MutationConfig) -> Genome {
    let codons = point_mutations(&parent.codons, rng, config.point_rate);
    let codons = insertions(&codons, rng, config.insertion_rate);
    let mut codons = deletions(&codons, rng, config.deletion_rate, config.min_length);

    if rng.gen_bool(config.duplication_rate) && codons.len() < config.duplication_ceiling {
        duplicate_segment(&mut codons, rng);
    }

    codons.truncate(config.max_length);
    Genome { codons }
}

/// Replace each codon with a fresh uniform value with probability `rate`
pub fn point_mutations<R: Rng + ?Sized>(codons: &[f64], rng: &mut R, rate: f64) -> Vec<f64> {
    codons
        .iter()
        .map(|&codon| if rng.gen_bool(rate) { rng.gen() } else { codon })
        .collect()
}

/// Insert a fresh codon in front of each position with probability `rate`
pub fn insertions<R: Rng + ?Sized>(codons: &[f64], rng: &mut R, rate: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(codons.len() + codons.len() / 64 + 1);
    for &codon in codons {
        if rng.gen_bool(rate) {
            out.push(rng.gen());
        }
        out.push(codon);
    }
    out
}

/// Drop each codon with probability `rate` while the genome stays longer
/// than `min_length`
pub fn deletions<R: Rng + ?Sized>(
    codons: &[f64],
    rng: &mut R,
    rate: f64,
    min_length: usize,
) -> Vec<f64> {
    let mut remaining = codons.len();
    let mut out = Vec::with_capacity(codons.len());
    for &codon in codons {
        if rng.gen_bool(rate) && remaining > min_length {
            remaining -= 1;
            continue;
        }
        out.push(codon);
    }
    out
}

/// Copy a random segment of 5..min(16, len / 2) codons to a random position.
///
/// Returns false when the genome is too short to hold a segment.
pub fn duplicate_segment<R: Rng + ?Sized>(codons: &mut Vec<f64>, rng: &mut R) -> bool {
    let len = codons.len();
    if len < MIN_DUPLICATION_LEN {
        return false;
    }
    let upper = MAX_SEGMENT.min(len / 2);
    if upper <= MIN_SEGMENT {
        return false;
    }

    let seg_len = rng.gen_range(MIN_SEGMENT..upper);
    let start = rng.gen_range(0..len - seg_len);
    let segment: Vec<f64> = codons[start..start + seg_len].to_vec();
    let insert_at = rng.gen_range(0..len);
    codons.splice(insert_at..insert_at, segment);
    true
}
