use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::Duration;

use crate::counter::Strategy;

/// Outcome of one timed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub strategy: Strategy,
    pub bound: u64,
    pub count: u64,
    pub elapsed: Duration,
}

impl Report {
    pub fn new(strategy: Strategy, bound: u64, count: u64, elapsed: Duration) -> Self {
        Self {
            strategy,
            bound,
            count,
            elapsed,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "primes up to {}: {}", self.bound, self.count)?;

        let secs = self.elapsed.as_secs_f64();
        match self.strategy.label() {
            Some(label) => write!(f, "elapsed ({}): {:.3}s", label, secs),
            None => write!(f, "elapsed: {:.3}s", secs),
        }
    }
}

/// Progress over finished workers, drawn on stderr.
pub fn create_progress_bar(num_workers: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(num_workers as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} workers")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}
