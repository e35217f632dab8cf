use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use termcolor::{ColorChoice, StandardStream};

use sift::{JsonPrinter, Printer, RunStats, SiftError};

/// sift — stream a file (or stdin) through a pattern matcher, printing
/// every match exactly once. Matches that straddle chunk boundaries are
/// resolved before they are reported, so the output never depends on how
/// the input happened to be split.
#[derive(Parser)]
#[command(
    name = "sift",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SIFT_BUILD_COMMIT"), ")"),
    about
)]
struct Cli {
    /// Text to find. Wrap in slashes for a regex: /ca+t/
    pattern: Option<String>,

    /// File to scan. Reads stdin when omitted.
    file: Option<PathBuf>,

    /// Bytes per read. Smaller chunks bound memory; matching is unaffected.
    #[arg(long, default_value_t = 8192, value_name = "BYTES")]
    chunk_size: usize,

    /// Machine-readable JSON Lines output.
    #[arg(long)]
    json: bool,

    /// Print a summary footer (matches, chunks, bytes).
    #[arg(long)]
    stats: bool,

    /// Print shell completions for the given shell.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    let cli = Cli::parse();

    // Shell completions
    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "sift", &mut io::stdout());
        return;
    }

    let Some(query) = cli.pattern.as_deref() else {
        eprintln!("usage: sift <pattern> [file] [--chunk-size BYTES] [--json]");
        process::exit(3);
    };

    // Bare text matches literally; /slashes/ opt into regex syntax.
    let (raw, is_regex) = sift::parse_pattern(query);
    let pattern = if is_regex {
        raw.to_string()
    } else {
        regex_syntax::escape(raw)
    };

    let result = match cli.file {
        Some(ref path) => match File::open(path) {
            Ok(file) => search(&pattern, file, path, &cli),
            Err(source) => Err(SiftError::Io {
                path: path.clone(),
                source,
            }),
        },
        None => search(&pattern, io::stdin().lock(), Path::new("<stdin>"), &cli),
    };

    match result {
        Ok(stats) => {
            if cli.stats {
                // Keep stdout parseable in JSON mode.
                let footer = sift::summary(query, &stats);
                if cli.json {
                    eprintln!("{footer}");
                } else {
                    println!("{footer}");
                }
            }
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(e.exit_code());
        }
    }
}

fn search<R: io::Read>(
    pattern: &str,
    reader: R,
    origin: &Path,
    cli: &Cli,
) -> Result<RunStats, SiftError> {
    if cli.json {
        let mut sink = JsonPrinter::new(io::stdout().lock());
        return sift::run(pattern, reader, origin, cli.chunk_size, &mut sink);
    }

    let choice = if io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut sink = Printer::new(StandardStream::stdout(choice));
    sift::run(pattern, reader, origin, cli.chunk_size, &mut sink)
}
