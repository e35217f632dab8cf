#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation, // newline counts as u32 line numbers — we target 64-bit
    clippy::module_name_repetitions,  // Rust naming conventions
    clippy::missing_errors_doc,       // error variants are documented on SiftError
    clippy::missing_panics_doc,       // the one expect() carries its own justification
)]

pub mod error;
pub(crate) mod format;
pub mod matcher;
pub mod pattern;
pub mod sink;
pub mod source;

use std::io::Read;
use std::path::Path;

use serde::Serialize;

pub use error::SiftError;
pub use format::summary;
pub use matcher::{Match, StreamMatcher, StreamState};
pub use pattern::{Pattern, parse_pattern};
pub use sink::{JsonPrinter, MatchSink, Printer};
pub use source::ChunkReader;

/// Totals for one complete stream run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub matches: u64,
    pub chunks: u64,
    pub bytes: u64,
}

/// Wire source → matcher → sink: read `reader` in `chunk_size` chunks,
/// feed them through a matcher for `pattern`, forward every safe match to
/// `sink` as it is found, then finalize and drain.
///
/// `origin` labels I/O errors (the file path, or `<stdin>`). On a chunk
/// read failure the matcher aborts — buffered state is discarded with no
/// partial flush — and the error is surfaced.
pub fn run<R: Read, S: MatchSink>(
    pattern: &str,
    reader: R,
    origin: &Path,
    chunk_size: usize,
    sink: &mut S,
) -> Result<RunStats, SiftError> {
    let mut matcher = StreamMatcher::compile(pattern)?;
    let mut stats = RunStats::default();
    let io_err = |source| SiftError::Io {
        path: origin.to_path_buf(),
        source,
    };

    for chunk in ChunkReader::new(reader, chunk_size) {
        let chunk = match chunk {
            Ok(c) => c,
            Err(source) => {
                matcher.abort();
                return Err(io_err(source));
            }
        };
        stats.chunks += 1;
        stats.bytes += chunk.len() as u64;
        for m in matcher.consume(&chunk)? {
            stats.matches += 1;
            sink.matched(&m).map_err(io_err)?;
        }
    }
    for m in matcher.finalize()? {
        stats.matches += 1;
        sink.matched(&m).map_err(io_err)?;
    }
    Ok(stats)
}
