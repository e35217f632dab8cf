//! Pattern normalization.
//!
//! Whatever the caller hands us — raw source text or an already-compiled
//! [`regex::Regex`] — becomes a fresh [`Pattern`] instance owned by exactly
//! one matcher. Scanning state never lives here: the matcher drives
//! [`Pattern::find_at`] with its own cursor, so two matchers built from the
//! same source share nothing mutable.

use regex::Regex;
use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input};

use crate::error::SiftError;

/// A compiled matching rule, plus the analysis needed to decide how much
/// trailing text must be retained when a scan pass comes up empty.
#[derive(Debug)]
pub struct Pattern {
    re: Regex,
    /// Anchored DFA for "could a match begin here and run past the end of
    /// the buffer" queries. `None` when the DFA exceeds build limits — the
    /// matcher then retains conservatively instead of trimming.
    lookahead: Option<dense::DFA<Vec<u32>>>,
    /// `maximum_len - 1`: a match that crosses the buffer edge must begin
    /// within this many bytes of it. `None` for unbounded patterns.
    lookback: Option<usize>,
}

impl Pattern {
    /// Compile pattern source into an independent instance.
    pub fn compile(source: &str) -> Result<Self, SiftError> {
        let re = Regex::new(source).map_err(|e| SiftError::Pattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;

        let lookahead = dense::Builder::new()
            .configure(dense::Config::new().start_kind(StartKind::Anchored))
            .build(source)
            .ok();

        let lookback = regex_syntax::Parser::new()
            .parse(source)
            .ok()
            .and_then(|hir| hir.properties().maximum_len())
            .map(|max| max.saturating_sub(1));

        Ok(Self {
            re,
            lookahead,
            lookback,
        })
    }

    /// Re-derive an independent instance from a caller-compiled regex.
    /// The caller's object is never shared or mutated.
    #[must_use]
    pub fn from_regex(re: &Regex) -> Self {
        Self::compile(re.as_str()).expect("source of a compiled regex recompiles")
    }

    /// The pattern source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }

    /// Find the next occurrence starting at or after `cursor`.
    pub(crate) fn find_at(&self, haystack: &str, cursor: usize) -> Option<(usize, usize)> {
        self.re
            .find_at(haystack, cursor)
            .map(|m| (m.start(), m.end()))
    }

    /// Earliest offset in `tail` at which a match could still begin and run
    /// past the end of it. Returns `tail.len()` when nothing in `tail` can
    /// participate in a future match — the caller may drop it all.
    ///
    /// `tail` must already be known to contain no complete match.
    pub(crate) fn retention_start(&self, tail: &str) -> usize {
        let len = tail.len();
        if len == 0 {
            return 0;
        }
        // A crossing match spans at least (len - start + 1) bytes, so with a
        // bounded pattern only the final maximum_len - 1 bytes are candidates.
        let window = match self.lookback {
            Some(k) if k < len => len - k,
            _ => 0,
        };
        let Some(dfa) = &self.lookahead else {
            // No DFA to consult; keep the whole candidate window.
            return window;
        };
        let bytes = tail.as_bytes();
        for start in window..len {
            if !tail.is_char_boundary(start) {
                continue;
            }
            if dfa_alive(dfa, &bytes[start..]) {
                return start;
            }
        }
        len
    }
}

/// Run the anchored DFA over `bytes`; alive at the end means some future
/// input could complete a match that begins at `bytes[0]`.
fn dfa_alive(dfa: &dense::DFA<Vec<u32>>, bytes: &[u8]) -> bool {
    let input = Input::new(bytes).anchored(Anchored::Yes);
    let Ok(mut sid) = dfa.start_state_forward(&input) else {
        return true;
    };
    for &b in bytes {
        sid = dfa.next_state(sid, b);
        if dfa.is_dead_state(sid) {
            return false;
        }
        if dfa.is_quit_state(sid) {
            // The DFA gave up (e.g. Unicode word boundary over non-ASCII);
            // it cannot prove death, so keep the text.
            return true;
        }
    }
    true
}

/// Parse `/pattern/` regex syntax. Returns (pattern, `is_regex`).
#[must_use]
pub fn parse_pattern(query: &str) -> (&str, bool) {
    if query.starts_with('/') && query.ends_with('/') && query.len() > 2 {
        (&query[1..query.len() - 1], true)
    } else {
        (query, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_pattern_is_a_configuration_error() {
        let err = Pattern::compile("(unclosed").unwrap_err();
        match err {
            SiftError::Pattern { pattern, reason } => {
                assert_eq!(pattern, "(unclosed");
                assert!(!reason.is_empty());
            }
            other => panic!("expected Pattern error, got {other:?}"),
        }
    }

    #[test]
    fn from_regex_derives_an_independent_instance() {
        let theirs = Regex::new(r"ca+t").unwrap();
        let ours = Pattern::from_regex(&theirs);
        assert_eq!(ours.as_str(), theirs.as_str());
        // Both keep working regardless of what the other is used for.
        assert!(theirs.is_match("caat"));
        assert_eq!(ours.find_at("x caat", 0), Some((2, 6)));
    }

    #[test]
    fn retention_keeps_a_viable_literal_prefix() {
        let p = Pattern::compile("cat").unwrap();
        // "ca" could be completed by a future "t..." chunk.
        assert_eq!(p.retention_start("the ca"), 4);
        // Nothing in "xyz" can begin a match.
        assert_eq!(p.retention_start("xyz"), 3);
    }

    #[test]
    fn retention_drops_everything_for_single_byte_patterns() {
        // A one-byte match can never straddle a chunk boundary.
        let p = Pattern::compile(r"\+").unwrap();
        assert_eq!(p.retention_start("abc"), 3);
    }

    #[test]
    fn retention_handles_unbounded_patterns() {
        let p = Pattern::compile("ab+").unwrap();
        // "a" is a viable start: "a" + "bb…" matches.
        assert_eq!(p.retention_start("xa"), 1);
        // "b" alone cannot begin a match.
        assert_eq!(p.retention_start("xb"), 2);
    }

    #[test]
    fn retention_is_utf8_safe() {
        let p = Pattern::compile("日本").unwrap();
        let tail = "x日";
        assert_eq!(p.retention_start(tail), 1);
        assert!(tail.is_char_boundary(p.retention_start(tail)));
    }

    #[test]
    fn parse_pattern_recognizes_slash_delimiters() {
        assert_eq!(parse_pattern("/a.b/"), ("a.b", true));
        assert_eq!(parse_pattern("a.b"), ("a.b", false));
        // Degenerate slashes are literal text, not an empty regex.
        assert_eq!(parse_pattern("/"), ("/", false));
        assert_eq!(parse_pattern("//"), ("//", false));
    }
}
