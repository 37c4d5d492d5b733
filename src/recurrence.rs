//! Recurrence driver: per-label (per-gene) variant of the permutation test.
//! Unlike the enrichment driver, each call is placed independently in real
//! coordinates every iteration and retried until it lands in an accessible
//! region, rather than reusing an artificial chromosome.

use std::io::{self, Write};
use std::path::Path;

use fxhash::FxHashMap;
use rust_lapper::Lapper;

use crate::error::{EngineError, Result};
use crate::genome::Genome;
use crate::interval_index::{all_overlaps, has_overlap_unit, lapper_from_raw, lapper_with_payload, overlapping};
use crate::reg::{self, RawReg};
use crate::region_io;
use crate::rng::EngineRng;
use crate::sampler::ChromSampler;

struct RecChrom {
    name: String,
    len: u32,
    accessible_idx: Lapper<u32, ()>,
    target_idx: Lapper<u32, u32>,
}

pub struct RecurrenceDriver {
    chroms: Vec<RecChrom>,
    sampler: ChromSampler,
    pub sampler_err_pct: f64,
    pub labels: Vec<String>,
    calls: Vec<u32>,
    pub n_obs: Vec<u32>,
    pub n_try: u32,
    pub n_skipped: u32,
}

pub struct RecurrenceOutcome {
    pub n_total: u64,
    pub n_eq: Vec<u32>,
    pub n_exc: Vec<u32>,
    pub n_few: Vec<u32>,
    /// `dist[label][k]` = number of iterations in which `label` was hit
    /// exactly `k` times, `k` in `0..=n_calls`.
    pub dist: Vec<Vec<u32>>,
}

impl RecurrenceDriver {
    pub fn load(
        accessible_regs: Option<&Path>,
        labeled_regs: &Path,
        calls_path: &Path,
        ref_fai: &Path,
        max_call_len: u32,
    ) -> Result<RecurrenceDriver> {
        let labeled = region_io::read_regions(labeled_regs)?;
        let has_accessible_file = accessible_regs.is_some();
        let accessible_regions = match accessible_regs {
            Some(p) => region_io::read_regions(p)?,
            None => Vec::new(),
        };

        let names = accessible_regions
            .iter()
            .chain(labeled.iter())
            .map(|r| r.chrom.clone());
        let mut genome = Genome::from_names(names);
        genome.load_lengths(ref_fai)?;

        let mut acc_by_chrom: FxHashMap<String, Vec<RawReg>> = FxHashMap::default();
        for r in &accessible_regions {
            if genome.len_of(&r.chrom).is_some() {
                acc_by_chrom.entry(r.chrom.clone()).or_default().push(r.raw);
            }
        }

        let mut labels: Vec<String> = Vec::new();
        let mut label_idx: FxHashMap<String, usize> = FxHashMap::default();
        let mut tgt_by_chrom: FxHashMap<String, Vec<(RawReg, u32)>> = FxHashMap::default();
        for r in &labeled {
            if genome.len_of(&r.chrom).is_none() {
                continue;
            }
            let label = r.label.clone().ok_or_else(|| EngineError::Parse {
                path: labeled_regs.to_path_buf(),
                line: 0,
                message: "labeled region file requires a fourth label column".to_string(),
            })?;
            let li = *label_idx.entry(label.clone()).or_insert_with(|| {
                labels.push(label.clone());
                labels.len() - 1
            });
            tgt_by_chrom
                .entry(r.chrom.clone())
                .or_default()
                .push((r.raw, li as u32));
        }

        // trim to chromosomes that actually carry an accessible region:
        // accessible := background (--accessible-regs) union target, so a
        // chromosome with only labeled target regions still counts.
        let included: Vec<String> = genome
            .names()
            .iter()
            .filter(|n| {
                let has_acc = has_accessible_file && acc_by_chrom.get(*n).is_some_and(|v| !v.is_empty());
                let has_tgt = tgt_by_chrom.get(*n).is_some_and(|v| !v.is_empty());
                has_acc || has_tgt
            })
            .cloned()
            .collect();

        let mut chroms = Vec::with_capacity(included.len());
        let mut chrom_idx: FxHashMap<String, usize> = FxHashMap::default();
        let mut genome_len: u64 = 0;
        let mut accessible_len: u64 = 0;

        for name in &included {
            let len = genome.len_of(name).expect("filtered to known chromosomes");
            let tgt_raw = tgt_by_chrom.get(name).cloned().unwrap_or_default();
            // accessible := background (--accessible-regs, if given) union target,
            // matching the accessibility gate used everywhere else (a call or a
            // placement that only hits a target region must still count as
            // accessible, not be treated as landing outside the genome).
            let mut acc_raw: Vec<RawReg> = if has_accessible_file {
                acc_by_chrom.get(name).cloned().unwrap_or_default()
            } else {
                Vec::new()
            };
            acc_raw.extend(tgt_raw.iter().map(|(r, _)| *r));

            genome_len += len as u64;
            accessible_len += reg::merged_length(&acc_raw);

            let target_idx = lapper_with_payload(tgt_raw.into_iter().map(|(r, li)| (r.beg, r.end, li)).collect());
            let accessible_idx = lapper_from_raw(&acc_raw);

            chrom_idx.insert(name.clone(), chroms.len());
            chroms.push(RecChrom {
                name: name.clone(),
                len,
                accessible_idx,
                target_idx,
            });
        }

        if accessible_len == 0 {
            return Err(EngineError::EmptyWorkload);
        }
        let n_try = ((10 * genome_len) / accessible_len).max(1) as u32;

        let lens: Vec<u32> = chroms.iter().map(|c| c.len).collect();
        let (sampler, sampler_err_pct) = ChromSampler::build(&lens);

        let mut n_obs = vec![0u32; labels.len()];
        let mut calls = Vec::new();
        let mut n_skipped = 0u32;

        for call in region_io::read_regions(calls_path)? {
            let len = call.raw.end - call.raw.beg + 1;
            let chrom = chrom_idx.get(&call.chrom).map(|&i| &chroms[i]);
            let accessible = chrom
                .map(|c| has_overlap_unit(&c.accessible_idx, call.raw.beg, call.raw.end))
                .unwrap_or(false);

            if !accessible || len > max_call_len {
                n_skipped += 1;
                log::debug!("SKIP\t{}\t{}\t{}", call.chrom, call.raw.beg + 1, call.raw.end + 1);
                continue;
            }
            log::debug!("CALL\t{}\t{}\t{}", call.chrom, call.raw.beg + 1, call.raw.end + 1);

            if let Some(chrom) = chrom {
                let mut hit_labels: Vec<u32> = all_overlaps(&chrom.target_idx, call.raw.beg, call.raw.end)
                    .into_iter()
                    .map(|(_, _, label)| label)
                    .collect();
                hit_labels.sort_unstable();
                hit_labels.dedup();
                for li in hit_labels {
                    n_obs[li as usize] += 1;
                }
            }
            calls.push(len);
        }

        if calls.is_empty() {
            return Err(EngineError::EmptyWorkload);
        }

        Ok(RecurrenceDriver {
            chroms,
            sampler,
            sampler_err_pct,
            labels,
            calls,
            n_obs,
            n_try,
            n_skipped,
        })
    }

    pub fn n_used(&self) -> u32 {
        self.calls.len() as u32
    }

    /// `--debug-regions`: print the accessible and labeled-target regions per
    /// chromosome as `BG`/`TGT` lines and stop before any simulation.
    pub fn debug_dump_regions<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for chrom in &self.chroms {
            for (beg, end) in overlapping(&chrom.accessible_idx, 0, chrom.len as i64 - 1) {
                writeln!(w, "BG\t{}\t{}\t{}", chrom.name, beg + 1, end + 1)?;
            }
            for (beg, end, li) in all_overlaps(&chrom.target_idx, 0, chrom.len - 1) {
                writeln!(w, "TGT\t{}\t{}\t{}\t{}", chrom.name, beg + 1, end + 1, self.labels[li as usize])?;
            }
        }
        Ok(())
    }

    pub fn run(&self, n_total: u64, rng: &mut EngineRng) -> Result<RecurrenceOutcome> {
        let n_labels = self.labels.len();
        let n_calls = self.calls.len();
        let mut n_eq = vec![0u32; n_labels];
        let mut n_exc = vec![0u32; n_labels];
        let mut n_few = vec![0u32; n_labels];
        let mut dist = vec![vec![0u32; n_calls + 1]; n_labels];

        let mut nhit = vec![0u32; n_labels];

        for _iter in 0..n_total {
            nhit.iter_mut().for_each(|h| *h = 0);

            for &call_len in &self.calls {
                let mut hit_labels: Vec<u32> = Vec::new();
                let mut placed = false;

                for _try in 0..self.n_try {
                    let chrom_i = self.sampler.sample(rng) as usize;
                    let chrom = &self.chroms[chrom_i];
                    if chrom.len < call_len {
                        continue;
                    }
                    let bound = (chrom.len - call_len + 1) as u64;
                    let p = rng.below_u64(bound) as u32;
                    let end = p + call_len - 1;

                    let tgt_hits = all_overlaps(&chrom.target_idx, p, end);
                    if !tgt_hits.is_empty() {
                        hit_labels = tgt_hits.into_iter().map(|(_, _, l)| l).collect();
                        placed = true;
                        break;
                    }
                    if has_overlap_unit(&chrom.accessible_idx, p, end) {
                        placed = true;
                        break;
                    }
                }

                if !placed {
                    return Err(EngineError::RetriesExhausted {
                        tries: self.n_try,
                        call_len,
                    });
                }

                hit_labels.sort_unstable();
                hit_labels.dedup();
                for li in hit_labels {
                    nhit[li as usize] += 1;
                }
            }

            for li in 0..n_labels {
                let h = nhit[li];
                let obs = self.n_obs[li];
                if h == obs {
                    n_eq[li] += 1;
                } else if h > obs {
                    n_exc[li] += 1;
                } else {
                    n_few[li] += 1;
                }
                dist[li][h as usize] += 1;
            }
        }

        Ok(RecurrenceOutcome {
            n_total,
            n_eq,
            n_exc,
            n_few,
            dist,
        })
    }
}
