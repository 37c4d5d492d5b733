//! Permutation driver for the enrichment test.
//!
//! Loads background/target/calls region files plus a chromosome-length
//! catalog, classifies each call against the accessible genome once up
//! front, then runs batched Monte-Carlo rounds reusing the artificial
//! chromosome across calls of identical length.

use std::io::{self, Write};
use std::path::Path;

use fxhash::FxHashMap;

use crate::chrom::Chromosome;
use crate::cli::NIter;
use crate::error::{EngineError, Result};
use crate::genome::Genome;
use crate::interval_index::{first_overlap, has_overlap};
use crate::logbin::LogBinDist;
use crate::output;
use crate::reg::{self, RawReg};
use crate::region_io;
use crate::rng::EngineRng;
use crate::sampler::ChromSampler;

pub struct EnrichmentDriver {
    chroms: Vec<Chromosome>,
    sampler: ChromSampler,
    pub sampler_err_pct: f64,
    calls: Vec<u32>,
    pub n_obs_hits: u32,
    pub n_skipped: u32,
}

pub struct EnrichmentOutcome {
    pub n_total: u64,
    pub n_exc: u64,
    pub n_few: u64,
    pub mean_sim: f64,
    pub stddev_sim: f64,
    pub dist: LogBinDist,
}

impl EnrichmentDriver {
    pub fn load(
        background_regs: &Path,
        target_regs: &Path,
        calls_path: &Path,
        ref_fai: &Path,
        max_call_len: u32,
        hit_no_bg: bool,
    ) -> Result<EnrichmentDriver> {
        let bg_regions = region_io::read_regions(background_regs)?;
        let tgt_regions = region_io::read_regions(target_regs)?;

        let names = bg_regions
            .iter()
            .chain(tgt_regions.iter())
            .map(|r| r.chrom.clone());
        let mut genome = Genome::from_names(names);
        genome.load_lengths(ref_fai)?;

        let mut bg_by_chrom: FxHashMap<String, Vec<RawReg>> = FxHashMap::default();
        for r in bg_regions {
            if genome.len_of(&r.chrom).is_some() {
                bg_by_chrom.entry(r.chrom).or_default().push(r.raw);
            }
        }
        let mut tgt_by_chrom: FxHashMap<String, Vec<RawReg>> = FxHashMap::default();
        for r in tgt_regions {
            if genome.len_of(&r.chrom).is_some() {
                tgt_by_chrom.entry(r.chrom).or_default().push(r.raw);
            }
        }

        let mut chroms = Vec::with_capacity(genome.names().len());
        let mut chrom_idx: FxHashMap<String, usize> = FxHashMap::default();
        for name in genome.names() {
            let bg = bg_by_chrom.remove(name).unwrap_or_default();
            let tgt = tgt_by_chrom.remove(name).unwrap_or_default();
            let spliced = reg::splice(bg, tgt);
            let len = genome.len_of(name).expect("filtered to known chromosomes");
            chrom_idx.insert(name.clone(), chroms.len());
            chroms.push(Chromosome::new(name.clone(), len, spliced));
        }

        let lens: Vec<u32> = chroms.iter().map(|c| c.len).collect();
        let (sampler, sampler_err_pct) = ChromSampler::build(&lens);

        let parsed_calls = region_io::read_regions(calls_path)?;
        let mut calls = Vec::new();
        let mut n_obs_hits = 0u32;
        let mut n_skipped = 0u32;

        for call in parsed_calls {
            let len = call.raw.end - call.raw.beg + 1;
            let chrom = chrom_idx.get(&call.chrom).map(|&i| &chroms[i]);
            let (is_tgt, is_bg) = match chrom {
                Some(c) => (
                    c.real_target_hit(call.raw.beg, call.raw.end).is_some(),
                    c.real_background_overlap(call.raw.beg, call.raw.end),
                ),
                None => (false, false),
            };

            if (!is_tgt && !is_bg) || len > max_call_len {
                n_skipped += 1;
                log::debug!(
                    "CALL\tSKIP\t{}\t{}\t{}",
                    call.chrom,
                    call.raw.beg + 1,
                    call.raw.end + 1
                );
                continue;
            }
            if is_tgt && (!hit_no_bg || !is_bg) {
                n_obs_hits += 1;
            }
            log::debug!(
                "CALL\t{}\t{}\t{}\t{}",
                if is_tgt && is_bg {
                    "TGT_BG"
                } else if is_tgt {
                    "TGT"
                } else {
                    "BG"
                },
                call.chrom,
                call.raw.beg + 1,
                call.raw.end + 1
            );
            calls.push(len);
        }

        if calls.is_empty() {
            return Err(EngineError::EmptyWorkload);
        }
        calls.sort_unstable();

        Ok(EnrichmentDriver {
            chroms,
            sampler,
            sampler_err_pct,
            calls,
            n_obs_hits,
            n_skipped,
        })
    }

    pub fn n_used(&self) -> u32 {
        self.calls.len() as u32
    }

    /// `--debug-regions`: print the spliced region list per chromosome and
    /// stop before any simulation.
    pub fn debug_dump_spliced<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for chrom in &self.chroms {
            for r in &chrom.spliced {
                output::write_spliced_debug(w, &chrom.name, r.beg + 1, r.end() + 1, r.is_target)?;
            }
        }
        Ok(())
    }

    pub fn run<W: Write>(
        &mut self,
        niter: NIter,
        rng: &mut EngineRng,
        nprecise_dist: u32,
        hit_no_bg: bool,
        print_placements: bool,
        out: &mut W,
    ) -> Result<EnrichmentOutcome> {
        let n_batch = niter.batch as usize;
        let n_rounds = niter.n_rounds();
        let mut hits_buf = vec![0u32; n_batch];
        let mut dist = LogBinDist::new(nprecise_dist);

        let mut sum_hits: f64 = 0.0;
        let mut dev: f64 = 0.0;
        let mut ntot: u64 = 0;
        let mut nexc: u64 = 0;
        let mut nfew: u64 = 0;

        for _round in 0..n_rounds {
            hits_buf.iter_mut().for_each(|h| *h = 0);

            for &call_len in &self.calls {
                for slot in hits_buf.iter_mut() {
                    let chrom_i = self.sampler.sample(rng) as usize;
                    let chrom = &mut self.chroms[chrom_i];
                    let hit = place_one(chrom, call_len, rng, hit_no_bg, print_placements, out)
                        .map_err(io_err)?;
                    if hit {
                        *slot += 1;
                    }
                }
            }

            for &h in hits_buf.iter() {
                if h >= self.n_obs_hits {
                    nexc += 1;
                }
                if h <= self.n_obs_hits {
                    nfew += 1;
                }
                sum_hits += h as f64;
            }
            ntot += n_batch as u64;

            let avg = sum_hits / ntot as f64;
            for &h in hits_buf.iter() {
                dev += (h as f64 - avg).powi(2);
            }
            for &h in hits_buf.iter() {
                dist.insert(h as u64);
            }
        }

        let mean_sim = sum_hits / ntot as f64;
        let stddev_sim = (dev / ntot as f64).sqrt();

        Ok(EnrichmentOutcome {
            n_total: ntot,
            n_exc: nexc,
            n_few: nfew,
            mean_sim,
            stddev_sim,
            dist,
        })
    }
}

fn io_err(e: io::Error) -> EngineError {
    EngineError::Io {
        path: std::path::PathBuf::from("<output>"),
        source: e,
    }
}

/// One simulated placement of a single call on a sampled chromosome.
/// Returns whether it counted as a hit (respecting `hit_no_bg`).
fn place_one<W: Write>(
    chrom: &mut Chromosome,
    call_len: u32,
    rng: &mut EngineRng,
    hit_no_bg: bool,
    print_placements: bool,
    out: &mut W,
) -> io::Result<bool> {
    if chrom.len <= call_len {
        let is_tgt = chrom.real_target_hit(0, chrom.len - 1).is_some();
        let hit = is_tgt && (!hit_no_bg || !chrom.real_background_overlap(0, chrom.len - 1));
        if print_placements {
            output::write_placement(out, &chrom.name, 1, chrom.len, hit)?;
        }
        return Ok(hit);
    }

    let need_bg_idx = hit_no_bg || print_placements;
    let ac = chrom.ensure_achrom(call_len, need_bg_idx);
    let p = rng.below_u64(ac.amax as u64 + 1) as u32;
    let a_end = p + call_len - 1;

    match first_overlap(&ac.tgt_idx, p, a_end) {
        Some((a_beg, _, real_beg)) => {
            let hit = !hit_no_bg
                || ac
                    .bg_idx
                    .as_ref()
                    .map(|idx| !has_overlap(idx, p, a_end))
                    .unwrap_or(true);
            if print_placements {
                let ori_pos0 = real_beg - a_beg + p;
                output::write_placement(out, &chrom.name, ori_pos0 + 1, ori_pos0 + call_len, hit)?;
            }
            Ok(hit)
        }
        None => {
            if print_placements {
                if let Some((a_beg, _, real_beg)) =
                    ac.bg_idx.as_ref().and_then(|idx| first_overlap(idx, p, a_end))
                {
                    let ori_pos0 = real_beg - a_beg + p;
                    output::write_placement(out, &chrom.name, ori_pos0 + 1, ori_pos0 + call_len, false)?;
                }
            }
            Ok(false)
        }
    }
}
