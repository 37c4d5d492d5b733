//! Chromosome length catalog, read from a `.fai`-style reference file:
//! whitespace-separated, two leading fields `name length` per line,
//! additional fields ignored.
//!
//! Unlike a plain lookup table, callers build this in two phases: first
//! gather every chromosome name mentioned by the background/target region
//! files (order preserved), then fill in lengths from the reference file,
//! dropping (with a warning) any name the reference file never mentions.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use fxhash::FxHashMap;

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Default)]
pub struct Genome {
    names: Vec<String>,
    lens: FxHashMap<String, u32>,
}

impl Genome {
    /// Start a catalog from the chromosome names seen in region inputs, in
    /// first-seen order, lengths unknown.
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        let mut seen = FxHashMap::default();
        let mut order = Vec::new();
        for n in names {
            if seen.insert(n.clone(), ()).is_none() {
                order.push(n);
            }
        }
        Genome {
            names: order,
            lens: FxHashMap::default(),
        }
    }

    /// Fill in lengths from a `.fai`-style file, then drop (with a warning)
    /// any catalog entry the file never mentions. Names present in the file
    /// but not in the catalog are ignored.
    pub fn load_lengths(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let wanted: FxHashMap<&str, ()> = self.names.iter().map(|n| (n.as_str(), ())).collect();
        let mut found: FxHashMap<String, u32> = FxHashMap::default();

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
            let name = fields.next().ok_or_else(|| EngineError::Parse {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: "expected at least two columns".to_string(),
            })?;
            if !wanted.contains_key(name) {
                continue;
            }
            let len_field = fields.next().ok_or_else(|| EngineError::Parse {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: format!("missing length column for {name}"),
            })?;
            let len: u64 = len_field.parse().map_err(|_| EngineError::Parse {
                path: path.to_path_buf(),
                line: line_no + 1,
                message: format!("invalid chromosome length: {len_field}"),
            })?;
            if len >= (1u64 << 31) - 1 {
                return Err(EngineError::CoordinateOverflow {
                    path: path.to_path_buf(),
                    coord: len,
                });
            }
            found.insert(name.to_string(), len as u32);
        }

        let mut kept = Vec::with_capacity(self.names.len());
        for name in self.names.drain(..) {
            match found.get(&name) {
                Some(&len) => {
                    self.lens.insert(name.clone(), len);
                    kept.push(name);
                }
                None => {
                    log::warn!(
                        "skipping the sequence \"{name}\" because it is not listed in {}",
                        path.display()
                    );
                }
            }
        }
        self.names = kept;
        Ok(())
    }

    pub fn len_of(&self, name: &str) -> Option<u32> {
        self.lens.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn total_len(&self) -> u64 {
        self.names.iter().map(|n| self.lens[n] as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
