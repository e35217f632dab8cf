use crate::matcher::Match;
use crate::RunStats;

/// Prefix for a human-readable match line: `line:offset  `.
pub fn match_prefix(m: &Match) -> String {
    format!("{}:{}  ", m.line, m.start)
}

/// Build the summary footer:
/// `# Pattern: "\+" — 3 matches (2 chunks, 14B)`
pub fn summary(pattern: &str, stats: &RunStats) -> String {
    let matches = match stats.matches {
        1 => "1 match".to_string(),
        n => format!("{n} matches"),
    };
    format!(
        "# Pattern: \"{pattern}\" — {matches} ({} chunks, {})",
        stats.chunks,
        format_size(stats.bytes)
    )
}

/// Human-readable byte size. Integer math only — no floats.
fn format_size(bytes: u64) -> String {
    match bytes {
        b if b < 1024 => format!("{b}B"),
        b if b < 1024 * 1024 => format!("{}KB", b / 1024),
        b => format!(
            "{}.{}MB",
            b / (1024 * 1024),
            (b % (1024 * 1024)) * 10 / (1024 * 1024)
        ),
    }
}
