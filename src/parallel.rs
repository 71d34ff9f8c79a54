use anyhow::{anyhow, Context, Result};
use std::thread;
use tracing::debug;

use crate::prime::is_prime;

/// Upper limit on worker threads, whether derived from the host or requested.
pub const MAX_WORKERS: usize = 8;

/// Inclusive range of integers scanned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of integers covered; zero when `start > end`.
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start).saturating_add(1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, n: u64) -> bool {
        self.start <= n && n <= self.end
    }

    pub fn count_primes(&self) -> u64 {
        (self.start..=self.end).map(|n| is_prime(n) as u64).sum()
    }
}

/// Fork-join prime counter with a fixed number of workers.
pub struct ParallelProcessor {
    num_workers: usize,
}

impl ParallelProcessor {
    pub fn new(num_workers: Option<usize>) -> Self {
        let num_workers = num_workers
            .unwrap_or_else(num_cpus::get)
            .clamp(1, MAX_WORKERS); // Chunks are CPU-bound, more threads than 8 buy little

        Self { num_workers }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// `ceil(n / workers)`.
    pub fn chunk_size(&self, n: u64) -> u64 {
        n.div_ceil(self.num_workers as u64)
    }

    /// Splits `[1, n]` into one contiguous chunk per worker.
    ///
    /// Chunk `t` spans `t * size + 1 ..= min((t + 1) * size, n)`, so the first
    /// chunk starts at 1 and trailing chunks come out empty when `n` is smaller
    /// than the worker count.
    pub fn partition(&self, n: u64) -> Vec<Chunk> {
        let chunk_size = self.chunk_size(n);

        (0..self.num_workers as u64)
            .map(|t| {
                // 1-based, so chunk 0 holds 1; it is never prime and the sum is unaffected
                let start = t.saturating_mul(chunk_size).saturating_add(1);
                let end = (t + 1).saturating_mul(chunk_size).min(n);
                Chunk::new(start, end)
            })
            .collect()
    }

    pub fn count_primes(&self, n: u64) -> Result<u64> {
        self.count_primes_with(n, |_, _| {})
    }

    /// Counts primes in `[1, n]`, calling `on_done` from each worker with its
    /// chunk and partial count as soon as that worker finishes.
    pub fn count_primes_with<F>(&self, n: u64, on_done: F) -> Result<u64>
    where
        F: Fn(&Chunk, u64) + Sync,
    {
        let chunks = self.partition(n);
        debug!(
            workers = self.num_workers,
            chunk_size = self.chunk_size(n),
            bound = n,
            "partitioned range"
        );

        thread::scope(|scope| {
            let on_done = &on_done;

            let handles = chunks
                .iter()
                .enumerate()
                .map(|(t, chunk)| {
                    debug!(worker = t, start = chunk.start, end = chunk.end, "dispatching worker");
                    thread::Builder::new()
                        .name(format!("primes-worker-{}", t))
                        .spawn_scoped(scope, move || {
                            let partial = chunk.count_primes();
                            on_done(chunk, partial);
                            partial
                        })
                        .with_context(|| {
                            format!(
                                "Failed to spawn worker {} for {}..={}",
                                t, chunk.start, chunk.end
                            )
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            // Join everything before inspecting results so no worker is left running.
            let results: Vec<_> = handles.into_iter().map(|h| h.join()).collect();

            let mut total = 0u64;
            for (t, result) in results.into_iter().enumerate() {
                let partial = result.map_err(|_| anyhow!("Worker {} panicked", t))?;
                debug!(worker = t, partial, "worker finished");
                total += partial;
            }

            Ok(total)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_worker_count_is_capped() {
        let processor = ParallelProcessor::new(None);
        assert!(processor.num_workers() >= 1);
        assert!(processor.num_workers() <= MAX_WORKERS);
        assert_eq!(processor.num_workers(), num_cpus::get().min(MAX_WORKERS));
    }

    #[test]
    fn test_explicit_worker_count() {
        assert_eq!(ParallelProcessor::new(Some(3)).num_workers(), 3);
        assert_eq!(ParallelProcessor::new(Some(0)).num_workers(), 1);
    }

    #[test]
    fn test_explicit_worker_count_is_capped() {
        let processor = ParallelProcessor::new(Some(64));
        assert_eq!(processor.num_workers(), MAX_WORKERS);
        assert_eq!(processor.partition(1000).len(), MAX_WORKERS);
        assert_eq!(processor.count_primes(1000).unwrap(), 168);
    }

    #[test]
    fn test_partition_layout() {
        let processor = ParallelProcessor::new(Some(4));
        assert_eq!(processor.chunk_size(10), 3);
        assert_eq!(
            processor.partition(10),
            vec![
                Chunk::new(1, 3),
                Chunk::new(4, 6),
                Chunk::new(7, 9),
                Chunk::new(10, 10),
            ]
        );
    }

    #[test]
    fn test_first_chunk_starts_at_one() {
        let processor = ParallelProcessor::new(Some(8));
        let chunks = processor.partition(1000);
        assert_eq!(chunks[0].start, 1);
        assert_eq!(chunks.last().unwrap().end, 1000);
    }

    #[test]
    fn test_small_bounds_leave_trailing_chunks_empty() {
        let processor = ParallelProcessor::new(Some(8));

        let chunks = processor.partition(1);
        assert_eq!(chunks[0], Chunk::new(1, 1));
        assert!(chunks[1..].iter().all(Chunk::is_empty));

        let chunks = processor.partition(0);
        assert!(chunks.iter().all(Chunk::is_empty));
    }

    #[test]
    fn test_partition_does_not_overflow() {
        let processor = ParallelProcessor::new(Some(8));
        let chunks = processor.partition(u64::MAX);

        assert_eq!(chunks[0].start, 1);
        assert_eq!(chunks[7].end, u64::MAX);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
    }

    #[test]
    fn test_chunk_counts() {
        assert_eq!(Chunk::new(1, 10).count_primes(), 4);
        assert_eq!(Chunk::new(11, 20).count_primes(), 4);
        assert_eq!(Chunk::new(5, 4).count_primes(), 0);
        assert_eq!(Chunk::new(5, 4).len(), 0);
        assert_eq!(Chunk::new(1, 1).len(), 1);
    }

    #[test]
    fn test_count_primes_small_bounds() {
        let processor = ParallelProcessor::new(Some(8));
        assert_eq!(processor.count_primes(0).unwrap(), 0);
        assert_eq!(processor.count_primes(1).unwrap(), 0);
        assert_eq!(processor.count_primes(2).unwrap(), 1);
        assert_eq!(processor.count_primes(10).unwrap(), 4);
        assert_eq!(processor.count_primes(100).unwrap(), 25);
    }

    #[test]
    fn test_on_done_called_once_per_worker() {
        let processor = ParallelProcessor::new(Some(5));
        let calls = AtomicUsize::new(0);
        let found = AtomicUsize::new(0);

        let total = processor
            .count_primes_with(1000, |_, partial| {
                calls.fetch_add(1, Ordering::SeqCst);
                found.fetch_add(partial as usize, Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(found.load(Ordering::SeqCst) as u64, total);
        assert_eq!(total, 168);
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let processor = ParallelProcessor::new(Some(2));
        let err = processor
            .count_primes_with(100, |chunk, _| {
                if chunk.start > 1 {
                    panic!("boom");
                }
            })
            .unwrap_err();

        assert!(err.to_string().contains("Worker 1 panicked"));
    }
}
