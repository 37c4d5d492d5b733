//! TSV record writers for both binaries.
//!
//! Both formats are line-oriented, tab-separated, written straight to
//! whatever `Write` the caller opened (stdout or `--output`). Kept as plain
//! functions rather than a builder: the original emits these records
//! incrementally as the run progresses, and so do we.

use std::io::{self, Write};

use crate::logbin::LogBinDist;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn write_version_cmd_seed<W: Write>(w: &mut W, argv: &[String], seed: u64) -> io::Result<()> {
    writeln!(w, "VERSION\t{VERSION}")?;
    writeln!(w, "CMD\t{}", argv.join(" "))?;
    writeln!(w, "SEED\t{seed}")
}

pub fn write_msg<W: Write>(w: &mut W, max_discretization_err_pct: f64) -> io::Result<()> {
    writeln!(
        w,
        "MSG\tMaximum chromosome randomization error due to length discretization: {:.1e}%",
        max_discretization_err_pct
    )
}

pub fn write_niter_rounds<W: Write>(w: &mut W, n_per_round: u64, n_rounds: u32) -> io::Result<()> {
    writeln!(w, "NITER_ROUNDS\t{n_per_round:e}\t{n_rounds}")
}

pub fn write_ncalls<W: Write>(w: &mut W, used: u32, skipped: u32) -> io::Result<()> {
    writeln!(w, "NCALLS\t{used}\t{skipped}")
}

pub fn write_spliced_debug<W: Write>(w: &mut W, chrom: &str, beg1: u32, end1: u32, is_target: bool) -> io::Result<()> {
    writeln!(w, "{}\t{chrom}\t{beg1}\t{end1}", if is_target { "TGT" } else { "BG" })
}

/// `--print-placements` diagnostic: one line per simulated placement,
/// 1-based real coordinates, `hit` is `1` on target overlap else `0`.
pub fn write_placement<W: Write>(w: &mut W, chrom: &str, beg1: u32, end1: u32, hit: bool) -> io::Result<()> {
    writeln!(w, "POS\t{chrom}\t{beg1}\t{end1}\t{}", hit as u8)
}

/// `n_exc`/`n_few` both include ties; a zero count is reported as `<1/n_total`.
pub fn write_enrichment_tests<W: Write>(
    w: &mut W,
    n_total: u64,
    n_exc: u64,
    n_few: u64,
    n_obs_hits: u32,
    mean_sim: f64,
    stddev_sim: f64,
) -> io::Result<()> {
    let pval_enr = if n_exc == 0 {
        1.0 / n_total as f64
    } else {
        n_exc as f64 / n_total as f64
    };
    let pval_dpl = if n_few == 0 {
        1.0 / n_total as f64
    } else {
        n_few as f64 / n_total as f64
    };
    writeln!(
        w,
        "TEST_ENR\t{n_total}\t{n_exc}\t{}{:e}",
        if n_exc == 0 { "<" } else { "" },
        pval_enr
    )?;
    writeln!(
        w,
        "TEST_DPL\t{n_total}\t{n_few}\t{}{:e}",
        if n_few == 0 { "<" } else { "" },
        pval_dpl
    )?;
    writeln!(w, "TEST_FOLD\t{n_obs_hits}\t{mean_sim}\t{stddev_sim}")
}

pub fn write_distribution<W: Write>(w: &mut W, dist: &LogBinDist) -> io::Result<()> {
    for (beg, end, count) in dist.bins() {
        let density = count as f64 / (end - beg) as f64;
        writeln!(w, "DIST\t{beg}\t{end}\t{count}\t{density:e}")?;
    }
    Ok(())
}

pub fn write_niter<W: Write>(w: &mut W, n_total: u64) -> io::Result<()> {
    writeln!(w, "NITER\t{n_total:e}")
}

pub fn write_recurrence_test<W: Write>(
    w: &mut W,
    label: &str,
    n_obs: u32,
    n_few: u32,
    n_eq: u32,
    n_exc: u32,
) -> io::Result<()> {
    writeln!(w, "TEST\t{label}\t{n_obs}\t{n_few}\t{n_eq}\t{n_exc}")
}

pub fn write_recurrence_dist<W: Write>(w: &mut W, label: &str, counts: &[u32]) -> io::Result<()> {
    write!(w, "DIST\t{label}")?;
    for c in counts {
        write!(w, "\t{c}")?;
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exc_gets_upper_bound_marker() {
        let mut buf = Vec::new();
        write_enrichment_tests(&mut buf, 100, 0, 5, 3, 1.2, 0.5).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains("TEST_ENR\t100\t0\t<"));
        assert!(s.contains("TEST_DPL\t100\t5\t"));
        assert!(!s.contains("TEST_DPL\t100\t5\t<"));
    }

    #[test]
    fn recurrence_dist_line_has_one_column_per_count() {
        let mut buf = Vec::new();
        write_recurrence_dist(&mut buf, "geneA", &[1, 2, 3]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "DIST\tgeneA\t1\t2\t3\n");
    }
}
