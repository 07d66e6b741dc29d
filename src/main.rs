//! The `witcher` command-line driver: run a `.witcher` file, or fall into
//! an interactive read-eval loop when given none. This binary is a thin
//! collaborator around the [`witcher`] library — all language semantics
//! live there.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use witcher::Engine;

const FILE_EXTENSION: &str = "witcher";

#[derive(Parser)]
#[clap(name = "witcher", version, about = "A tree-walking interpreter for the Witcher scripting language")]
struct Args {
    /// Script to run. Omit to start an interactive session.
    path: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, ...).
    #[clap(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    install_logging(args.verbose);

    let result = match &args.path {
        Some(path) => run_file(path),
        None => {
            run_repl();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn install_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "witcher=warn",
        1 => "witcher=info",
        2 => "witcher=debug",
        _ => "witcher=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run_file(path: &std::path::Path) -> anyhow::Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
        warn!(path = %path.display(), "expected a .{FILE_EXTENSION} file, running anyway");
    }

    let mut engine = Engine::new();
    engine
        .run_file(path)
        .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Accumulates input lines until they parse as a complete program, then
/// evaluates against one long-lived `Engine`. A genuine parse error is
/// therefore indistinguishable from incomplete input until `quit`/EOF ends
/// the session — this is the reference REPL's documented behavior, not a
/// bug (`spec.md` §7).
fn run_repl() {
    let mut engine = Engine::new();
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        print!("{}", if buffer.is_empty() { "witcher> " } else { "...... > " });
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(_) => break,
        }

        if buffer.is_empty() && line.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        buffer.push_str(&line);

        match witcher::parse(match witcher::tokenize(&buffer) {
            Ok(tokens) => tokens,
            Err(_) => continue, // keep accumulating; could be mid-token input
        }) {
            Ok(_) => {
                if let Err(e) = engine.eval(&buffer) {
                    eprintln!("{e}");
                }
                buffer.clear();
            }
            Err(_) => continue, // keep accumulating until it parses
        }
    }
}
