//! Where matches go.
//!
//! The matcher produces values; it has no opinion about their destination.
//! A [`MatchSink`] receives each emitted match in stream order. Closures
//! work directly, which is what tests use; the CLI uses [`Printer`] for
//! humans and [`JsonPrinter`] for machines (one JSON object per line).

use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::format;
use crate::matcher::Match;

/// Receives emitted matches in stream order.
pub trait MatchSink {
    fn matched(&mut self, m: &Match) -> io::Result<()>;
}

impl<F: FnMut(&Match) -> io::Result<()>> MatchSink for F {
    fn matched(&mut self, m: &Match) -> io::Result<()> {
        self(m)
    }
}

/// Human-readable output: `line:offset  text`, match text colorized when
/// the underlying writer supports it.
pub struct Printer<W> {
    wtr: W,
    spec: ColorSpec,
}

impl<W: WriteColor> Printer<W> {
    pub fn new(wtr: W) -> Self {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        Self { wtr, spec }
    }

    /// Hand back the underlying writer.
    pub fn into_inner(self) -> W {
        self.wtr
    }
}

impl<W: WriteColor> MatchSink for Printer<W> {
    fn matched(&mut self, m: &Match) -> io::Result<()> {
        write!(self.wtr, "{}", format::match_prefix(m))?;
        self.wtr.set_color(&self.spec)?;
        write!(self.wtr, "{}", m.text)?;
        self.wtr.reset()?;
        writeln!(self.wtr)
    }
}

/// Machine-readable output: JSON Lines, one object per match.
pub struct JsonPrinter<W> {
    wtr: W,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(wtr: W) -> Self {
        Self { wtr }
    }

    pub fn into_inner(self) -> W {
        self.wtr
    }
}

impl<W: Write> MatchSink for JsonPrinter<W> {
    fn matched(&mut self, m: &Match) -> io::Result<()> {
        serde_json::to_writer(&mut self.wtr, m).map_err(io::Error::from)?;
        self.wtr.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::NoColor;

    fn sample() -> Match {
        Match {
            text: "+".to_string(),
            start: 14,
            end: 15,
            line: 3,
        }
    }

    #[test]
    fn closure_sinks_collect() {
        let mut seen = Vec::new();
        {
            let mut sink = |m: &Match| -> io::Result<()> {
                seen.push(m.clone());
                Ok(())
            };
            sink.matched(&sample()).unwrap();
        }
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "+");
    }

    #[test]
    fn printer_writes_line_and_offset() {
        let mut printer = Printer::new(NoColor::new(Vec::new()));
        printer.matched(&sample()).unwrap();
        let out = String::from_utf8(printer.into_inner().into_inner()).unwrap();
        assert_eq!(out, "3:14  +\n");
    }

    #[test]
    fn json_printer_emits_one_parseable_object_per_match() {
        let mut printer = JsonPrinter::new(Vec::new());
        printer.matched(&sample()).unwrap();
        printer
            .matched(&Match {
                text: "cat".to_string(),
                start: 20,
                end: 23,
                line: 4,
            })
            .unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["text"], "+");
        assert_eq!(first["start"], 14);
        assert_eq!(first["end"], 15);
        assert_eq!(first["line"], 3);
    }
}
