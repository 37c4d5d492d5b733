//! Command-line argument definitions for both binaries, built with `clap`'s
//! derive API.

use std::path::PathBuf;

use clap::Parser;

/// `--niter N[,BATCH]`: total iteration count, optionally followed by a
/// comma and a batch size used to bound peak memory.
#[derive(Debug, Clone, Copy)]
pub struct NIter {
    pub total: u64,
    pub batch: u64,
}

impl std::str::FromStr for NIter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let total: f64 = parts
            .next()
            .ok_or("empty --niter value")?
            .parse()
            .map_err(|_| format!("invalid iteration count: {s}"))?;
        let total = total.round() as u64;
        if total == 0 {
            return Err("--niter must be positive".to_string());
        }
        let batch = match parts.next() {
            Some(b) => {
                let b: f64 = b.parse().map_err(|_| format!("invalid batch size: {s}"))?;
                (b.round() as u64).min(total).max(1)
            }
            None => total,
        };
        if parts.next().is_some() {
            return Err(format!("unexpected extra field in --niter: {s}"));
        }
        Ok(NIter { total, batch })
    }
}

impl NIter {
    pub fn n_rounds(&self) -> u32 {
        ((self.total + self.batch - 1) / self.batch) as u32
    }
}

#[derive(Parser, Debug)]
#[command(name = "perm-test", about = "Permutation test for enrichment of calls in target regions")]
pub struct EnrichmentArgs {
    #[arg(short = 'b', long = "background-regs")]
    pub background_regs: PathBuf,

    #[arg(short = 'c', long = "calls")]
    pub calls: PathBuf,

    #[arg(short = 't', long = "target-regs")]
    pub target_regs: PathBuf,

    #[arg(short = 'f', long = "ref-fai")]
    pub ref_fai: PathBuf,

    #[arg(short = 'n', long = "niter", default_value = "1000000")]
    pub niter: NIter,

    #[arg(short = 'm', long = "max-call-length", default_value_t = u32::MAX)]
    pub max_call_length: u32,

    #[arg(short = 's', long = "random-seed")]
    pub random_seed: Option<u64>,

    #[arg(long = "no-bg-overlap")]
    pub no_bg_overlap: bool,

    #[arg(long = "print-placements")]
    pub print_placements: bool,

    #[arg(long = "nprecise-dist", default_value_t = 5)]
    pub nprecise_dist: u32,

    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(long = "debug-regions")]
    pub debug_regions: bool,
}

#[derive(Parser, Debug)]
#[command(name = "recurrence-test", about = "Per-label recurrence test of calls against labeled target regions")]
pub struct RecurrenceArgs {
    #[arg(short = 'a', long = "accessible-regs")]
    pub accessible_regs: Option<PathBuf>,

    #[arg(short = 'c', long = "calls")]
    pub calls: PathBuf,

    #[arg(short = 'l', long = "labeled-regs")]
    pub labeled_regs: PathBuf,

    #[arg(short = 'f', long = "ref-fai")]
    pub ref_fai: PathBuf,

    #[arg(short = 'm', long = "max-call-length", default_value_t = u32::MAX)]
    pub max_call_length: u32,

    /// Unlike the enrichment driver, recurrence placements aren't batched
    /// into rounds (no artificial chromosome to amortize), so this is a
    /// plain iteration count.
    #[arg(short = 'n', long = "niter", default_value_t = 1_000_000)]
    pub niter: u64,

    #[arg(short = 's', long = "random-seed")]
    pub random_seed: Option<u64>,

    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(long = "debug-regions")]
    pub debug_regions: bool,
}

impl RecurrenceArgs {
    /// The file used as the accessibility gate: `--accessible-regs` if given,
    /// else the labeled/target file itself.
    pub fn accessible_file(&self) -> &PathBuf {
        self.accessible_regs.as_ref().unwrap_or(&self.labeled_regs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn niter_parses_total_only() {
        let n: NIter = "1000000".parse().unwrap();
        assert_eq!(n.total, 1_000_000);
        assert_eq!(n.batch, 1_000_000);
        assert_eq!(n.n_rounds(), 1);
    }

    #[test]
    fn niter_parses_total_and_batch() {
        let n: NIter = "1e9,1e8".parse().unwrap();
        assert_eq!(n.total, 1_000_000_000);
        assert_eq!(n.batch, 100_000_000);
        assert_eq!(n.n_rounds(), 10);
    }

    #[test]
    fn niter_rejects_trailing_garbage() {
        assert!("100,10,5".parse::<NIter>().is_err());
    }

    #[test]
    fn recurrence_accessible_file_falls_back_to_labeled() {
        let args = RecurrenceArgs {
            accessible_regs: None,
            calls: PathBuf::from("calls.txt"),
            labeled_regs: PathBuf::from("labeled.txt"),
            ref_fai: PathBuf::from("ref.fai"),
            max_call_length: u32::MAX,
            niter: 100,
            random_seed: None,
            output: None,
            debug_regions: false,
        };
        assert_eq!(args.accessible_file(), &PathBuf::from("labeled.txt"));
    }
}
