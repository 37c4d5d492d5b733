//! Artificial chromosome construction.
//!
//! For a fixed call length `L`, condenses a real chromosome's spliced,
//! accessible intervals into a contiguous coordinate space `[0, alen)` in
//! which every position in `[0, amax]` is a legal start for an L-bp call
//! that overlaps at least one background or target region.

use rust_lapper::Lapper;

use crate::interval_index::lapper_with_payload;
use crate::reg::Reg;

pub struct AChrom {
    pub call_len: u32,
    pub alen: u32,
    pub amax: u32,
    /// payload: the real 0-based `beg` of the spliced region this artificial
    /// span was appended from, used to translate artificial hits back to
    /// real coordinates for `--print-placements`.
    pub tgt_idx: Lapper<u32, u32>,
    pub bg_idx: Option<Lapper<u32, u32>>,
}

impl AChrom {
    /// Build the artificial chromosome for `call_len` over `spliced`.
    /// Callers must first check `chrom_len > call_len`; when the call is at
    /// least as long as the chromosome the artificial path is bypassed
    /// entirely.
    pub fn build(chrom_len: u32, spliced: &[Reg], call_len: u32, need_bg_idx: bool) -> AChrom {
        assert!(call_len > 0, "call length must be positive");
        assert!(chrom_len > call_len, "artificial chromosome requires chrom_len > call_len");

        let mut alen: u32 = 0;
        let mut amax: Option<u32> = None;
        let mut tgt_entries: Vec<(u32, u32, u32)> = Vec::new();
        let mut bg_entries: Vec<(u32, u32, u32)> = Vec::new();

        let clen1 = call_len - 1;

        if clen1 == 0 {
            for r in spliced {
                let a_beg = alen;
                let a_end = alen + r.len - 1;
                if r.is_target {
                    tgt_entries.push((a_beg, a_end, r.beg));
                } else if need_bg_idx {
                    bg_entries.push((a_beg, a_end, r.beg));
                }
                alen += r.len;
            }
            amax = Some(alen - 1);
        } else {
            let mut rep_end1: u32 = 0;
            for r in spliced {
                // left overhang: the gap before `r` that a call could reach into
                let mut pbeg = if r.beg >= clen1 { r.beg - clen1 } else { 0 };
                if pbeg < rep_end1 {
                    pbeg = rep_end1;
                }
                if pbeg < r.beg {
                    update_alen_amax(chrom_len, call_len, &mut alen, &mut amax, r.beg - pbeg, pbeg);
                }

                let a_beg = alen;
                let a_end = alen + r.len - 1;
                if r.is_target {
                    tgt_entries.push((a_beg, a_end, r.beg));
                } else if need_bg_idx {
                    bg_entries.push((a_beg, a_end, r.beg));
                }

                update_alen_amax(chrom_len, call_len, &mut alen, &mut amax, r.len, r.beg);
                rep_end1 = r.beg + r.len;
            }
            if amax.is_none() {
                amax = Some(alen.saturating_sub(1));
            }
        }

        let tgt_idx = lapper_with_payload(tgt_entries);
        let bg_idx = if need_bg_idx {
            Some(lapper_with_payload(bg_entries))
        } else {
            None
        };

        AChrom {
            call_len,
            alen,
            amax: amax.unwrap_or(0),
            tgt_idx,
            bg_idx,
        }
    }
}

/// Track `alen`/`amax` as a new real-coordinate span of length `reg_len`
/// starting at `reg_beg0` is appended to the artificial space. `amax` is
/// sticky: once a call placed at `reg_beg0` would run past the real
/// chromosome end, it is fixed forever.
///
/// `Option<u32>` rather than a `0`-means-unset sentinel, so a legitimately-
/// zero `amax` on a tiny chromosome is never mistaken for "not yet computed".
fn update_alen_amax(
    chrom_len: u32,
    call_len: u32,
    alen: &mut u32,
    amax: &mut Option<u32>,
    reg_len: u32,
    reg_beg0: u32,
) {
    if amax.is_none() {
        let needed = reg_beg0 as u64 + reg_len as u64 + call_len as u64 - 1;
        if (chrom_len as u64) < needed {
            *amax = Some(if chrom_len as u64 >= reg_beg0 as u64 + call_len as u64 {
                (*alen as u64 + chrom_len as u64 - call_len as u64 - reg_beg0 as u64) as u32
            } else {
                alen.saturating_sub(1)
            });
        }
    }
    *alen += reg_len;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval_index::{first_overlap, has_overlap};

    fn reg(beg: u32, len: u32, is_target: bool) -> Reg {
        Reg { beg, len, is_target }
    }

    #[test]
    fn whole_chromosome_single_background() {
        // .fai: chr1 1000; background chr1 1-1000 (0-based [0,999]); target
        // chr1 101-200 (0-based [100,199]); call length 11.
        let spliced = vec![reg(0, 100, false), reg(100, 100, true), reg(200, 800, false)];
        let ac = AChrom::build(1000, &spliced, 11, false);
        assert_eq!(ac.alen, 1000);
        assert_eq!(ac.amax, 989);
        assert!(has_overlap(&ac.tgt_idx, 100, 199));
        assert!(!has_overlap(&ac.tgt_idx, 0, 99));
    }

    #[test]
    fn every_legal_position_overlaps_some_spliced_interval() {
        let spliced = vec![reg(50, 20, true), reg(200, 30, false)];
        let call_len = 10;
        let chrom_len = 5000;
        let ac = AChrom::build(chrom_len, &spliced, call_len, true);
        for p in 0..=ac.amax {
            let a_end = p + call_len - 1;
            let hits_tgt = first_overlap(&ac.tgt_idx, p, a_end).is_some();
            let hits_bg = ac
                .bg_idx
                .as_ref()
                .map(|idx| has_overlap(idx, p, a_end))
                .unwrap_or(false);
            assert!(hits_tgt || hits_bg, "position {p} hits nothing");
        }
    }

    #[test]
    fn translation_preserves_real_beg() {
        let spliced = vec![reg(1000, 5, true)];
        let ac = AChrom::build(10_000, &spliced, 3, false);
        let (a_beg, _a_end, real_beg) = first_overlap(&ac.tgt_idx, 0, ac.amax).unwrap();
        // the artificial span for this region starts right after its
        // left overhang; translating back must recover the real beg
        assert_eq!(real_beg, 1000);
        assert!(a_beg <= ac.amax);
    }
}
