//! Brick Wall Counter
//!
//! Reads a list of queries, each a wall height and a supply of bricks of
//! length 1 to 4, and prints how many distinct walls of that height can be
//! built. Every row is four units wide and every internal seam must be
//! bridged by a brick somewhere in the wall.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};

use bricklayer::input::{parse_queries, read_queries};
use bricklayer::state::SearchState;
use bricklayer::{count_walls_with, FxMemo, MemoStore, NoMemo, Query};

/// Counts the brick walls that can be built from limited supplies.
#[derive(Parser)]
#[command(name = "bricklayer")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    count: CountArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Count the walls for every query (the default).
    Count(CountArgs),
    /// Print the canonical starting state of every query.
    Inspect(Source),
}

#[derive(Args)]
struct Source {
    /// Query file; reads standard input when omitted.
    input: Option<PathBuf>,

    /// Log more detail (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args)]
struct CountArgs {
    #[command(flatten)]
    source: Source,

    /// Recompute every state instead of memoizing.
    #[arg(long)]
    no_memo: bool,

    /// Print memo hit statistics for each query to stderr.
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Count(args)) => run_count(&args),
        Some(Command::Inspect(source)) => run_inspect(&source),
        None => run_count(&cli.count),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Reads queries from the given file, or from stdin.
fn load_queries(source: &Source) -> Result<Vec<Query>> {
    match &source.input {
        Some(path) => read_queries(path)
            .with_context(|| format!("failed to read queries from {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            parse_queries(&text).context("invalid query input")
        }
    }
}

/// Counts every query and prints one result per line.
fn run_count(args: &CountArgs) -> Result<()> {
    init_logging(args.source.verbose);
    let queries = load_queries(&args.source)?;
    info!("loaded {} queries", queries.len());

    let stdout = io::stdout();
    let stderr = io::stderr();
    let (mut out, mut err) = (stdout.lock(), stderr.lock());

    if args.no_memo {
        write_counts(&queries, &mut NoMemo::default(), args.stats, &mut out, &mut err)?;
    } else {
        write_counts(&queries, &mut FxMemo::new(), args.stats, &mut out, &mut err)?;
    }
    Ok(())
}

/// Writes the wall count of each query to `out`, and memo statistics to
/// `err` when requested.
fn write_counts<M: MemoStore>(
    queries: &[Query],
    memo: &mut M,
    stats: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    for query in queries {
        let outcome = count_walls_with(query, memo);
        writeln!(out, "{}", outcome.walls)?;
        if stats {
            writeln!(
                err,
                "Cache miss ratio: {}/{} ({:.1}%)",
                outcome.stats.misses,
                outcome.stats.lookups,
                outcome.stats.miss_ratio()
            )?;
        }
    }
    out.flush()
}

/// Prints the packed starting state of each query.
fn run_inspect(source: &Source) -> Result<()> {
    init_logging(source.verbose);
    let queries = load_queries(source)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (i, query) in queries.iter().enumerate() {
        let state = SearchState::new(&query.pieces, (query.height + 1) as u8)
            .encode()
            .canonicalize();
        writeln!(out, "Query {} (height {}):", i + 1, query.height)?;
        writeln!(out, "{}", state)?;
        writeln!(out, "{:#034x}", state.bits())?;
    }
    Ok(())
}
