//! Error taxonomy for the engine.
//!
//! The two programs are batch tools: every error here is fatal and is
//! expected to be reported to stderr and turned into a non-zero exit code by
//! the binary's `main`. The only non-fatal conditions (missing-reference
//! skip, start>end coordinate swap) are logged as warnings, not represented
//! here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(
        "none of the calls intersects the target or background regions \
         (calls larger than --max-call-length were excluded)"
    )]
    EmptyWorkload,

    #[error(
        "recurrence placement exhausted {tries} retries for a call of length {call_len}; \
         accessible_len is near zero or the input is malformed"
    )]
    RetriesExhausted { tries: u32, call_len: u32 },

    #[error("coordinate {coord} in {path} exceeds the 32-bit limit (2^31 - 2)")]
    CoordinateOverflow { path: PathBuf, coord: u64 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
