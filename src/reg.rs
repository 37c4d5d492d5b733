//! Interval model and the background/target splicer.

use crate::interval_index::{lapper_from_raw, overlapping};

/// A raw, possibly-overlapping input interval, 0-based inclusive `[beg, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawReg {
    pub beg: u32,
    pub end: u32,
}

/// A spliced, disjoint, tagged interval on a chromosome's coordinate space,
/// 0-based inclusive `[beg, beg+len-1]`.
///
/// A packed 32-bit layout (`beg, len:31, is_tgt:1`) would save memory, but
/// that's purely a presentation detail, not a contract; two plain fields
/// keep the code simpler and are used here instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg {
    pub beg: u32,
    pub len: u32,
    pub is_target: bool,
}

impl Reg {
    /// Inclusive end coordinate.
    pub fn end(&self) -> u32 {
        self.beg + self.len - 1
    }
}

/// Merge and splice one chromosome's background and target intervals into a
/// single canonical, disjoint, ordered sequence.
///
/// Target regions take precedence over background where they intersect;
/// adjacent same-tag intervals that touch or overlap are merged at the end.
pub fn splice(mut bg: Vec<RawReg>, mut tgt: Vec<RawReg>) -> Vec<Reg> {
    bg.sort_by_key(|r| r.beg);
    tgt.sort_by_key(|r| r.beg);
    let tgt_lapper = lapper_from_raw(&tgt);

    let mut out: Vec<Reg> = Vec::new();
    let mut rep_end1: u32 = 0;

    for bg_r in &bg {
        let mut bgb = bg_r.beg as i64;
        let bge = bg_r.end as i64;

        if rep_end1 > 0 && rep_end1 as i64 - 1 >= bgb {
            bgb = rep_end1 as i64;
        }

        // targets hiding in the gap between the last reported region and this one
        if (rep_end1 as i64) < bgb {
            for (tb, te) in overlapping(&tgt_lapper, rep_end1, bgb - 1) {
                push_region(&mut out, &mut rep_end1, tb, te, true);
            }
            if rep_end1 > 0 && rep_end1 as i64 - 1 >= bgb {
                bgb = rep_end1 as i64;
            }
        }
        if bgb > bge {
            continue; // this bg region was entirely swallowed by targets
        }

        // targets overlapping what's left of this bg region
        let overlaps_here = overlapping(&tgt_lapper, bgb as u32, bge);
        if !overlaps_here.is_empty() {
            let mut cursor = bgb;
            for (tb, te) in overlaps_here {
                if cursor > bge {
                    break;
                }
                push_region(&mut out, &mut rep_end1, cursor, tb - 1, false);
                push_region(&mut out, &mut rep_end1, tb, te, true);
                cursor = rep_end1 as i64;
            }
            bgb = cursor;
        }

        push_region(&mut out, &mut rep_end1, bgb, bge, false);
    }

    // flush targets starting beyond every background region
    for (tb, te) in overlapping(&tgt_lapper, rep_end1, u32::MAX as i64) {
        push_region(&mut out, &mut rep_end1, tb, te, true);
    }

    merge_adjacent(&mut out);
    out
}

fn push_region(out: &mut Vec<Reg>, rep_end1: &mut u32, mut beg: i64, end: i64, is_target: bool) {
    if *rep_end1 > 0 && beg < *rep_end1 as i64 {
        beg = *rep_end1 as i64;
    }
    if beg > end {
        return;
    }
    let len = (end - beg + 1) as u32;
    out.push(Reg {
        beg: beg as u32,
        len,
        is_target,
    });
    let end1 = (end + 1) as u32;
    if *rep_end1 < end1 {
        *rep_end1 = end1;
    }
}

/// Total length covered by the union of `regs`, which may overlap
/// internally (used for the recurrence driver's accessible-length
/// bookkeeping, where regions aren't tagged so the full splicer is
/// unnecessary).
pub fn merged_length(regs: &[RawReg]) -> u64 {
    let mut sorted: Vec<RawReg> = regs.to_vec();
    sorted.sort_by_key(|r| r.beg);
    let mut total = 0u64;
    let mut cur: Option<(u32, u32)> = None;
    for r in sorted {
        match cur {
            None => cur = Some((r.beg, r.end)),
            Some((cb, ce)) => {
                if r.beg as i64 <= ce as i64 + 1 {
                    cur = Some((cb, ce.max(r.end)));
                } else {
                    total += ce as u64 - cb as u64 + 1;
                    cur = Some((r.beg, r.end));
                }
            }
        }
    }
    if let Some((cb, ce)) = cur {
        total += ce as u64 - cb as u64 + 1;
    }
    total
}

fn merge_adjacent(regs: &mut Vec<Reg>) {
    let mut i = 1;
    while i < regs.len() {
        if regs[i - 1].is_target != regs[i].is_target {
            i += 1;
            continue;
        }
        let prev_end_excl = regs[i - 1].beg + regs[i - 1].len;
        if prev_end_excl < regs[i].beg {
            i += 1;
            continue;
        }
        let cur_end_excl = regs[i].beg + regs[i].len;
        if cur_end_excl > prev_end_excl {
            regs[i - 1].len = cur_end_excl - regs[i - 1].beg;
        }
        regs.remove(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(beg: u32, end: u32) -> RawReg {
        RawReg { beg, end }
    }

    #[test]
    fn splice_precedence_target_over_background() {
        // background chr1:1-100 (1-based) -> 0-based [0,99]
        // target     chr1:50-60           -> 0-based [49,59]
        let bg = vec![r(0, 99)];
        let tgt = vec![r(49, 59)];
        let spliced = splice(bg, tgt);
        assert_eq!(spliced.len(), 3);
        assert_eq!(spliced[0].beg, 0);
        assert_eq!(spliced[0].end(), 48);
        assert!(!spliced[0].is_target);
        assert_eq!(spliced[1].beg, 49);
        assert_eq!(spliced[1].end(), 59);
        assert!(spliced[1].is_target);
        assert_eq!(spliced[2].beg, 60);
        assert_eq!(spliced[2].end(), 99);
        assert!(!spliced[2].is_target);
    }

    #[test]
    fn target_entirely_inside_background() {
        let bg = vec![r(0, 999)];
        let tgt = vec![r(100, 199)];
        let spliced = splice(bg, tgt);
        assert_eq!(spliced.len(), 3);
        assert!(!spliced[0].is_target);
        assert!(spliced[1].is_target);
        assert!(!spliced[2].is_target);
        let total: u32 = spliced.iter().map(|r| r.len).sum();
        assert_eq!(total, 1000);
    }

    #[test]
    fn target_straddles_two_backgrounds() {
        let bg = vec![r(0, 49), r(60, 99)];
        let tgt = vec![r(40, 70)];
        let spliced = splice(bg, tgt);
        // bg[0,39], tgt[40,70], bg[71,99]
        assert_eq!(spliced.len(), 3);
        assert_eq!(spliced[0].beg, 0);
        assert_eq!(spliced[0].end(), 39);
        assert_eq!(spliced[1].beg, 40);
        assert_eq!(spliced[1].end(), 70);
        assert!(spliced[1].is_target);
        assert_eq!(spliced[2].beg, 71);
        assert_eq!(spliced[2].end(), 99);
    }

    #[test]
    fn duplicate_inputs_are_absorbed() {
        let bg = vec![r(0, 99), r(0, 99), r(50, 60)];
        let tgt = vec![];
        let spliced = splice(bg, tgt);
        assert_eq!(spliced.len(), 1);
        assert_eq!(spliced[0].beg, 0);
        assert_eq!(spliced[0].end(), 99);
    }

    #[test]
    fn disjoint_and_covers_union() {
        let bg = vec![r(0, 9), r(20, 29)];
        let tgt = vec![r(5, 24)];
        let spliced = splice(bg, tgt);
        for w in spliced.windows(2) {
            assert!(w[0].end() < w[1].beg);
        }
        let total: u32 = spliced.iter().map(|r| r.len).sum();
        // union of [0,9],[20,29],[5,24] = [0,29] = 30 bp
        assert_eq!(total, 30);
    }

    #[test]
    fn merged_length_counts_overlap_once() {
        let regs = vec![r(0, 9), r(5, 14), r(100, 109)];
        assert_eq!(merged_length(&regs), 15 + 10);
    }
}
