//! Logarithmic-bin distribution accumulator.
//!
//! Summarizes non-negative integer samples with bounded memory even across
//! very long tails: values below `10^n_precise` get their own exact bin of
//! width 1; beyond that, bins tile `[10^n_precise, inf)` geometrically with
//! base 10, the bin width doubling by 10x at every decade crossing.

use fxhash::FxHashMap;

pub struct LogBinDist {
    n_precise: u32,
    precise_threshold: u64,
    precise_counts: Vec<u64>,
    geo_counts: FxHashMap<u64, u64>,
}

impl LogBinDist {
    pub fn new(n_precise: u32) -> Self {
        assert!(n_precise >= 1, "nprecise-dist must be at least 1");
        let precise_threshold = 10u64.pow(n_precise);
        LogBinDist {
            n_precise,
            precise_threshold,
            precise_counts: vec![0; precise_threshold as usize],
            geo_counts: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, v: u64) {
        if v < self.precise_threshold {
            self.precise_counts[v as usize] += 1;
        } else {
            let beg = Self::bin_start(v, self.n_precise);
            *self.geo_counts.entry(beg).or_insert(0) += 1;
        }
    }

    /// Non-empty bins as `(beg, end_exclusive, count)`, sorted ascending by
    /// `beg`. `end - beg` is the bin width; `count / (end - beg)` is the
    /// reported density.
    pub fn bins(&self) -> Vec<(u64, u64, u64)> {
        let mut out: Vec<(u64, u64, u64)> = Vec::new();
        for (v, &count) in self.precise_counts.iter().enumerate() {
            if count > 0 {
                out.push((v as u64, v as u64 + 1, count));
            }
        }
        for (&beg, &count) in self.geo_counts.iter() {
            let width = bin_width(beg, self.n_precise);
            out.push((beg, beg + width, count));
        }
        out.sort_by_key(|(beg, _, _)| *beg);
        out
    }

    pub fn len(&self) -> usize {
        self.bins().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<(u64, u64, u64)> {
        self.bins().into_iter().nth(i)
    }

    fn bin_start(v: u64, n_precise: u32) -> u64 {
        let width = bin_width(v, n_precise);
        (v / width) * width
    }
}

/// Integer `log10` (avoids float-precision misrounding exactly at powers of
/// ten, e.g. `(1000.0f64).log10()` landing fractionally below `3.0`).
fn ilog10(mut v: u64) -> u32 {
    let mut d = 0;
    while v >= 10 {
        v /= 10;
        d += 1;
    }
    d
}

fn bin_width(v: u64, n_precise: u32) -> u64 {
    if v < 10u64.pow(n_precise) {
        1
    } else {
        let decade = ilog10(v);
        10u64.pow(decade + 1 - n_precise)
    }
}
