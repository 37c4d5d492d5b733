//! Chromosome sampler: a length-weighted discrete sampler drawn once per
//! iteration per call.
//!
//! Uses a fixed table of 2^16 bins, each pointing at a chromosome, built so
//! a chromosome of length `l` occupies roughly `l/total * 2^16` bins. One
//! integer draw plus one table lookup per placement.
//!
//! A naive `round(l/total*2^16)` allocation can starve a chromosome shorter
//! than `total/2^16` of every bin, making it unreachable. This
//! implementation guarantees at least one bin per chromosome and reconciles
//! the total back to exactly `2^16` bins by adjusting the largest
//! chromosome's share (see DESIGN.md for the rationale).

use crate::rng::EngineRng;

pub const NBIN2CHR: usize = 1 << 16;

pub struct ChromSampler {
    bins: Vec<u32>,
}

impl ChromSampler {
    /// Build the sampler over `lens` (one entry per chromosome, in catalog
    /// order). Returns the sampler and the maximum per-chromosome
    /// discretization error, as a percentage, for the `MSG` diagnostic line.
    pub fn build(lens: &[u32]) -> (ChromSampler, f64) {
        assert!(!lens.is_empty(), "sampler needs at least one chromosome");

        let tot: f64 = lens.iter().map(|&l| l as f64).sum();
        let mut counts: Vec<i64> = lens
            .iter()
            .map(|&l| (((l as f64 / tot) * NBIN2CHR as f64).round() as i64).max(1))
            .collect();

        let assigned: i64 = counts.iter().sum();
        let diff = assigned - NBIN2CHR as i64;
        if diff != 0 {
            let (big_i, _) = lens
                .iter()
                .enumerate()
                .max_by_key(|&(_, &l)| l)
                .expect("non-empty");
            counts[big_i] = (counts[big_i] - diff).max(1);
        }

        let mut bins = Vec::with_capacity(NBIN2CHR);
        for (i, &c) in counts.iter().enumerate() {
            bins.extend(std::iter::repeat(i as u32).take(c as usize));
        }
        // defensive: rounding at the floor of 1-per-chromosome can still
        // leave us short when there are more chromosomes than bins headroom
        while bins.len() < NBIN2CHR {
            bins.push((lens.len() - 1) as u32);
        }
        bins.truncate(NBIN2CHR);

        let bin_len = tot / NBIN2CHR as f64;
        let mut max_diff_pct = 0.0f64;
        for (i, &l) in lens.iter().enumerate() {
            if l == 0 {
                continue;
            }
            let diff = ((counts[i] as f64 * bin_len) - l as f64).abs() * 100.0 / l as f64;
            if diff > max_diff_pct {
                max_diff_pct = diff;
            }
        }

        (ChromSampler { bins }, max_diff_pct)
    }

    pub fn sample(&self, rng: &mut EngineRng) -> u32 {
        let bin = rng.below(self.bins.len() as u32);
        self.bins[bin as usize]
    }
}
