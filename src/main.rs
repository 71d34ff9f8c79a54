use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use primes_bench::config::parse_bound;
use primes_bench::counter::{self, Strategy};
use primes_bench::io::create_progress_bar;
use primes_bench::parallel::ParallelProcessor;

#[derive(Parser, Debug)]
#[command(name = "primes-bench")]
#[command(about = "Count primes up to N, sequentially or across worker threads", long_about = None)]
struct Args {
    /// Upper bound (defaults to 100000000, also used when N does not parse)
    #[arg(value_name = "N", allow_negative_numbers = true)]
    bound: Option<String>,

    /// Counting strategy
    #[arg(short, long, value_enum, default_value_t = Mode::Sequential)]
    mode: Mode,

    /// Disable progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Sequential,
    Parallel,
    Rayon,
    /// Every strategy in turn, checking that the counts agree
    All,
}

impl Mode {
    fn strategies(self) -> Vec<Strategy> {
        match self {
            Mode::Sequential => vec![Strategy::Sequential],
            Mode::Parallel => vec![Strategy::Parallel],
            Mode::Rayon => vec![Strategy::Rayon],
            Mode::All => Strategy::ALL.to_vec(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("primes_bench=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let n = parse_bound(args.bound.as_deref());
    let processor = ParallelProcessor::new(None);

    let mut counts = Vec::new();
    for strategy in args.mode.strategies() {
        let report = if strategy == Strategy::Parallel && !args.quiet {
            let pb = create_progress_bar(processor.num_workers())?;
            let report = counter::run_with(strategy, n, &processor, |_, _| pb.inc(1));
            pb.finish_and_clear();
            report?
        } else {
            counter::run(strategy, n, &processor)?
        };

        println!("{}", report);
        counts.push((strategy, report.count));
    }

    if let Some(&(first, expected)) = counts.first() {
        if let Some(&(other, got)) = counts.iter().find(|(_, c)| *c != expected) {
            anyhow::bail!(
                "Count mismatch: {:?} found {} but {:?} found {}",
                first,
                expected,
                other,
                got
            );
        }
    }

    Ok(())
}
