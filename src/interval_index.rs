//! Thin adapter over `rust_lapper`, the interval index the engine consumes
//! for ordered overlap lookups. We never implement the interval tree itself.
//!
//! `rust_lapper::Interval` is half-open `[start, stop)`; every type in this
//! crate stores 0-based *inclusive* `[beg, end]` coordinates, so every
//! boundary crossing into/out of a `Lapper` happens in this module.

use rust_lapper::{Interval, Lapper};

use crate::reg::RawReg;

pub type Iv<T> = Interval<u32, T>;

/// Build a `Lapper` over raw (possibly-overlapping) intervals with no payload.
pub fn lapper_from_raw(regs: &[RawReg]) -> Lapper<u32, ()> {
    let ivs = regs
        .iter()
        .map(|r| Iv {
            start: r.beg,
            stop: r.end + 1,
            val: (),
        })
        .collect();
    Lapper::new(ivs)
}

/// Query `lapper` for intervals overlapping inclusive `[beg, end]`, returned
/// as inclusive `(beg, end)` tuples sorted ascending by start.
///
/// `end` may be `u32::MAX as i64` to mean "open-ended"; the query is clamped
/// to the widest representable half-open upper bound.
pub fn overlapping(lapper: &Lapper<u32, ()>, beg: u32, end: i64) -> Vec<(i64, i64)> {
    if end < beg as i64 {
        return Vec::new();
    }
    let stop = if end >= u32::MAX as i64 {
        u32::MAX
    } else {
        (end + 1) as u32
    };
    let mut found: Vec<(i64, i64)> = lapper
        .find(beg, stop)
        .map(|iv| (iv.start as i64, iv.stop as i64 - 1))
        .collect();
    found.sort_by_key(|(b, _)| *b);
    found
}

/// Build a `Lapper` carrying a `u32` payload (used by the artificial
/// chromosome to remember the real-coordinate origin of each appended span,
/// and left at `()` wherever translation back to real coordinates is never
/// needed).
pub fn lapper_with_payload(entries: Vec<(u32, u32, u32)>) -> Lapper<u32, u32> {
    let ivs = entries
        .into_iter()
        .map(|(beg, end, payload)| Iv {
            start: beg,
            stop: end + 1,
            val: payload,
        })
        .collect();
    Lapper::new(ivs)
}

/// First match (if any) of an inclusive-range query, payload included.
pub fn first_overlap(lapper: &Lapper<u32, u32>, beg: u32, end: u32) -> Option<(u32, u32, u32)> {
    lapper
        .find(beg, end + 1)
        .next()
        .map(|iv| (iv.start, iv.stop - 1, iv.val))
}

pub fn has_overlap(lapper: &Lapper<u32, u32>, beg: u32, end: u32) -> bool {
    lapper.find(beg, end + 1).next().is_some()
}

/// Every match (not just the first) of an inclusive-range query, payload
/// included — used where a single placement can hit more than one labeled
/// target interval at once.
pub fn all_overlaps(lapper: &Lapper<u32, u32>, beg: u32, end: u32) -> Vec<(u32, u32, u32)> {
    lapper
        .find(beg, end + 1)
        .map(|iv| (iv.start, iv.stop - 1, iv.val))
        .collect()
}

pub fn has_overlap_unit(lapper: &Lapper<u32, ()>, beg: u32, end: u32) -> bool {
    lapper.find(beg, end + 1).next().is_some()
}
