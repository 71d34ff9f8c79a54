use anyhow::Result;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

use crate::io::Report;
use crate::parallel::{Chunk, ParallelProcessor};
use crate::prime::is_prime;

/// How the range `[2, n]` is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One thread, every integer in order.
    Sequential,
    /// Fixed fork-join pool over contiguous chunks.
    Parallel,
    /// Rayon's work-stealing pool over the whole range.
    Rayon,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Parallel, Strategy::Rayon];

    /// Qualifier shown in the elapsed line, if any.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Strategy::Sequential => None,
            Strategy::Parallel => Some("parallel"),
            Strategy::Rayon => Some("rayon"),
        }
    }
}

pub fn count_sequential(n: u64) -> u64 {
    let mut count = 0;
    for i in 2..=n {
        if is_prime(i) {
            count += 1;
        }
    }
    count
}

pub fn count_rayon(n: u64) -> u64 {
    (2..=n).into_par_iter().map(|x| is_prime(x) as u64).sum()
}

pub fn run(strategy: Strategy, n: u64, processor: &ParallelProcessor) -> Result<Report> {
    run_with(strategy, n, processor, |_, _| {})
}

/// Counts primes up to `n` and times the work.
///
/// `on_chunk` is only invoked by [`Strategy::Parallel`], once per finished worker.
pub fn run_with<F>(
    strategy: Strategy,
    n: u64,
    processor: &ParallelProcessor,
    on_chunk: F,
) -> Result<Report>
where
    F: Fn(&Chunk, u64) + Sync,
{
    info!(?strategy, bound = n, "counting primes");

    // Timed span covers dispatch through aggregation, not report formatting.
    let start = Instant::now();
    let count = match strategy {
        Strategy::Sequential => count_sequential(n),
        Strategy::Parallel => processor.count_primes_with(n, on_chunk)?,
        Strategy::Rayon => count_rayon(n),
    };
    let elapsed = start.elapsed();

    info!(?strategy, count, elapsed_ms = elapsed.as_millis() as u64, "done");

    Ok(Report::new(strategy, n, count, elapsed))
}
