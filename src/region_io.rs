//! Region-file reader: background, target, labeled, and calls files share
//! one whitespace-separated format, `chr beg end [label]`.
//!
//! Coordinates are 1-based inclusive by default; a `.bed`/`.bed.gz`/
//! `.bed.bgz` filename (case-insensitive) switches to 0-based half-open.
//! Every parsed coordinate is normalized to this crate's 0-based inclusive
//! `[beg, end]` convention before it leaves this module.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{EngineError, Result};
use crate::reg::RawReg;

static SWAP_WARNED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
pub struct ParsedRegion {
    pub chrom: String,
    pub raw: RawReg,
    pub label: Option<String>,
}

pub fn is_bed_file(path: &Path) -> bool {
    let name = path.to_string_lossy().to_ascii_lowercase();
    name.ends_with(".bed") || name.ends_with(".bed.gz") || name.ends_with(".bed.bgz")
}

/// Read a region file, normalizing to 0-based inclusive coordinates. A
/// fourth whitespace-separated field, if present, is kept as `label`.
pub fn read_regions(path: &Path) -> Result<Vec<ParsedRegion>> {
    let file = File::open(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let bed = is_bed_file(path);
    let mut out = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let chrom = fields
            .next()
            .ok_or_else(|| parse_err(path, line_no, "missing chromosome column"))?
            .to_string();
        let beg_field = fields
            .next()
            .ok_or_else(|| parse_err(path, line_no, "missing begin column"))?;
        let end_field = fields
            .next()
            .ok_or_else(|| parse_err(path, line_no, "missing end column"))?;
        let label = fields.next().map(|s| s.to_string());

        let beg_raw: i64 = beg_field
            .parse()
            .map_err(|_| parse_err(path, line_no, &format!("invalid begin coordinate: {beg_field}")))?;
        let end_raw: i64 = end_field
            .parse()
            .map_err(|_| parse_err(path, line_no, &format!("invalid end coordinate: {end_field}")))?;

        let (mut beg0, mut end0) = if bed {
            (beg_raw, end_raw - 1)
        } else {
            (beg_raw - 1, end_raw - 1)
        };

        if beg0 > end0 {
            std::mem::swap(&mut beg0, &mut end0);
            if !SWAP_WARNED.swap(true, Ordering::Relaxed) {
                log::warn!(
                    "start coordinate greater than end coordinate in {}, swapping (reported once per run)",
                    path.display()
                );
            }
        }

        if beg0 < 0 || end0 < 0 {
            return Err(parse_err(path, line_no, "negative coordinate after conversion"));
        }
        const COORD_MAX: i64 = (1i64 << 31) - 2;
        if end0 > COORD_MAX {
            return Err(EngineError::CoordinateOverflow {
                path: path.to_path_buf(),
                coord: end0 as u64,
            });
        }

        out.push(ParsedRegion {
            chrom,
            raw: RawReg {
                beg: beg0 as u32,
                end: end0 as u32,
            },
            label,
        });
    }

    Ok(out)
}

fn parse_err(path: &Path, line_no: usize, message: &str) -> EngineError {
    EngineError::Parse {
        path: path.to_path_buf(),
        line: line_no + 1,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn one_based_inclusive_by_default() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "chr1\t50\t60").unwrap();
        let regs = read_regions(file.path()).unwrap();
        assert_eq!(regs.len(), 1);
        assert_eq!(regs[0].raw, RawReg { beg: 49, end: 59 });
    }

    #[test]
    fn bed_suffix_is_half_open_zero_based() {
        let mut file = Builder::new().suffix(".bed").tempfile().unwrap();
        writeln!(file, "chr1\t49\t60").unwrap();
        let regs = read_regions(file.path()).unwrap();
        assert_eq!(regs[0].raw, RawReg { beg: 49, end: 59 });
    }

    #[test]
    fn bed_gz_suffix_is_case_insensitive() {
        assert!(is_bed_file(Path::new("foo.BED.GZ")));
        assert!(is_bed_file(Path::new("foo.Bed.Bgz")));
        assert!(!is_bed_file(Path::new("foo.txt")));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "# header").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "chr1\t1\t10").unwrap();
        let regs = read_regions(file.path()).unwrap();
        assert_eq!(regs.len(), 1);
    }

    #[test]
    fn fourth_column_is_kept_as_label() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "chr1\t100\t200\tgeneA").unwrap();
        let regs = read_regions(file.path()).unwrap();
        assert_eq!(regs[0].label.as_deref(), Some("geneA"));
    }

    #[test]
    fn inverted_coordinates_are_swapped() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "chr1\t100\t50").unwrap();
        let regs = read_regions(file.path()).unwrap();
        assert_eq!(regs[0].raw, RawReg { beg: 49, end: 99 });
    }
}
