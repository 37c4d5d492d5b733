//! The per-chromosome data model: a named real chromosome, its spliced
//! interval sequence, a real-coordinate index for the small-chromosome
//! bypass (if the chromosome is no longer than the call, test the real
//! target index directly), and a lazily rebuilt artificial chromosome
//! cached per call length.

use rust_lapper::Lapper;

use crate::achrom::AChrom;
use crate::interval_index::{first_overlap, has_overlap, lapper_with_payload};
use crate::reg::Reg;

pub struct Chromosome {
    pub name: String,
    pub len: u32,
    pub spliced: Vec<Reg>,
    real_tgt_idx: Lapper<u32, u32>,
    real_bg_idx: Lapper<u32, u32>,
    achrom: Option<AChrom>,
}

impl Chromosome {
    pub fn new(name: String, len: u32, spliced: Vec<Reg>) -> Self {
        let tgt_entries: Vec<(u32, u32, u32)> = spliced
            .iter()
            .filter(|r| r.is_target)
            .map(|r| (r.beg, r.end(), r.beg))
            .collect();
        let bg_entries: Vec<(u32, u32, u32)> = spliced
            .iter()
            .filter(|r| !r.is_target)
            .map(|r| (r.beg, r.end(), r.beg))
            .collect();
        Chromosome {
            name,
            len,
            real_tgt_idx: lapper_with_payload(tgt_entries),
            real_bg_idx: lapper_with_payload(bg_entries),
            spliced,
            achrom: None,
        }
    }

    pub fn real_target_hit(&self, beg: u32, end: u32) -> Option<(u32, u32, u32)> {
        first_overlap(&self.real_tgt_idx, beg, end)
    }

    pub fn real_background_overlap(&self, beg: u32, end: u32) -> bool {
        has_overlap(&self.real_bg_idx, beg, end)
    }

    /// Rebuild the artificial chromosome only when the call length changes,
    /// or when background translation is newly required.
    pub fn ensure_achrom(&mut self, call_len: u32, need_bg_idx: bool) -> &AChrom {
        let stale = match &self.achrom {
            Some(ac) => ac.call_len != call_len || (need_bg_idx && ac.bg_idx.is_none()),
            None => true,
        };
        if stale {
            self.achrom = Some(AChrom::build(self.len, &self.spliced, call_len, need_bg_idx));
        }
        self.achrom.as_ref().expect("just rebuilt")
    }
}
