//! The streaming transform core.
//!
//! A [`StreamMatcher`] consumes text chunks in arrival order and emits every
//! pattern occurrence exactly once, in stream order, without ever reporting
//! a match that a later chunk could have extended. The rule is two-speed:
//! a match with at least one confirmed character after it can never grow,
//! so it is emitted immediately; a match touching the live edge of the
//! buffered text is deferred and re-evaluated once more input arrives.
//! `finalize` turns the edge into a hard end of input and drains the rest.
//!
//! Retained text is the price of correctness: a pattern that can always be
//! extended (or an input that never resolves a deferred match) grows the
//! internal buffer until `finalize`. That is inherent to unbounded-lookback
//! streaming matching and is not mitigated here.
//!
//! Anchors (`^`, `$`, `\b`) are evaluated against the retained buffer, not
//! the whole logical input, so their behavior near chunk boundaries is
//! undefined. Known limitation.

use memchr::memchr_iter;
use serde::Serialize;

use crate::error::SiftError;
use crate::pattern::Pattern;

/// Lifecycle of a matcher. Constructed `Open`; `finalize` passes through
/// `Finalizing` to `Closed`; `abort` ends in `Aborted` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Finalizing,
    Closed,
    Aborted,
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Closed => write!(f, "closed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// One emitted occurrence. Positions are byte offsets into the logical
/// concatenation of all input, independent of how it was chunked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub text: String,
    pub start: u64,
    pub end: u64,
    /// 1-based line of the match start.
    pub line: u32,
}

/// Incremental matcher over a chunked text stream.
pub struct StreamMatcher {
    pattern: Pattern,
    /// The unresolved suffix of all input seen so far. Shrinks only by
    /// dropping a confirmed-consumed prefix, never from the back.
    buffer: String,
    /// Absolute byte offset of `buffer[0]` in the logical stream.
    offset: u64,
    /// 1-based line number at `buffer[0]`.
    line: u32,
    state: StreamState,
}

impl StreamMatcher {
    #[must_use]
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            buffer: String::new(),
            offset: 0,
            line: 1,
            state: StreamState::Open,
        }
    }

    /// Compile `source` and construct a matcher in one step.
    pub fn compile(source: &str) -> Result<Self, SiftError> {
        Ok(Self::new(Pattern::compile(source)?))
    }

    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Bytes currently retained for cross-chunk resolution.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Process one chunk; returns the matches that became safe, in order.
    pub fn consume(&mut self, chunk: &str) -> Result<Vec<Match>, SiftError> {
        if self.state != StreamState::Open {
            return Err(SiftError::State {
                op: "consume",
                state: self.state,
            });
        }
        self.buffer.push_str(chunk);
        Ok(self.scan(false))
    }

    /// Signal end of input: every remaining match is now safe. Drains the
    /// buffer and closes the matcher. Not idempotent — a second call fails.
    pub fn finalize(&mut self) -> Result<Vec<Match>, SiftError> {
        if self.state != StreamState::Open {
            return Err(SiftError::State {
                op: "finalize",
                state: self.state,
            });
        }
        self.state = StreamState::Finalizing;
        let matches = self.scan(true);
        self.state = StreamState::Closed;
        Ok(matches)
    }

    /// Discard all retained state. No partial flush: a partial buffer may
    /// hold unresolved matches whose correctness cannot be guaranteed.
    pub fn abort(&mut self) {
        self.buffer.clear();
        self.state = StreamState::Aborted;
    }

    /// One scan pass over the retained buffer, cursor starting at 0.
    ///
    /// In streaming mode (`drain == false`) a match that ends exactly at the
    /// buffer end is deferred: its start becomes the consumed boundary and
    /// the pass stops, since everything from there must be re-evaluated with
    /// more input. In drain mode the edge rule is off and every match is
    /// emitted.
    fn scan(&mut self, drain: bool) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut cursor = 0;
        let mut boundary = None;

        while let Some((start, end)) = self.pattern.find_at(&self.buffer, cursor) {
            if !drain && end == self.buffer.len() {
                boundary = Some(start);
                break;
            }
            matches.push(self.make_match(start, end));
            boundary = Some(end);
            cursor = end;
            if end == start {
                // Zero-width match: step one character or the pass never ends.
                match self.buffer[cursor..].chars().next() {
                    Some(c) => cursor += c.len_utf8(),
                    None => break,
                }
            }
        }

        if drain {
            self.trim_to(self.buffer.len());
        } else if let Some(at) = boundary {
            self.trim_to(at);
        } else {
            // No occurrence anywhere in the buffer. Keep only the suffix
            // that could still begin a match once more input arrives.
            let keep = self.pattern.retention_start(&self.buffer);
            self.trim_to(keep);
        }
        matches
    }

    fn make_match(&self, start: usize, end: usize) -> Match {
        let newlines = memchr_iter(b'\n', &self.buffer.as_bytes()[..start]).count();
        Match {
            text: self.buffer[start..end].to_string(),
            start: self.offset + start as u64,
            end: self.offset + end as u64,
            line: self.line + newlines as u32,
        }
    }

    /// Drop the confirmed-consumed prefix, advancing the stream position.
    fn trim_to(&mut self, at: usize) {
        if at == 0 {
            return;
        }
        let newlines = memchr_iter(b'\n', &self.buffer.as_bytes()[..at]).count();
        self.line += newlines as u32;
        self.offset += at as u64;
        self.buffer.drain(..at);
    }
}
