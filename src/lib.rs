//! Shared kernel for the permutation-test engine: the region model and
//! splicer, the artificial-chromosome builder, the chromosome sampler, the
//! log-bin distribution accumulator, and the region I/O / CLI / error
//! plumbing both drivers (enrichment and recurrence) are built on top of.

pub mod achrom;
pub mod chrom;
pub mod cli;
pub mod enrichment;
pub mod error;
pub mod genome;
pub mod interval_index;
pub mod logbin;
pub mod output;
pub mod recurrence;
pub mod reg;
pub mod region_io;
pub mod rng;
pub mod sampler;

pub use error::{EngineError, Result};
