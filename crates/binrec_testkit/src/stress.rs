//! Stress tests for binrec record types.
//!
//! A defined record type is shared read-only between threads; these helpers
//! hammer one type with concurrent decodes and re-encodes.

use binrec_core::RecordType;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
        }
    }
}

/// Decodes `inputs` round-robin from several threads at once.
///
/// An operation succeeds when the input decodes, re-encodes, and the
/// re-encoded bytes decode to an equal record. Inputs that should fail to
/// decode count as failures, so callers can mix valid and invalid inputs
/// and check the split.
pub fn stress_concurrent_decode(
    record_type: &RecordType,
    inputs: &[Vec<u8>],
    config: &StressConfig,
) -> StressTestResult {
    if inputs.is_empty() || config.threads == 0 {
        return StressTestResult::new(0, 0, Duration::ZERO);
    }

    let inputs: Arc<[Vec<u8>]> = inputs.into();
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads;

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let record_type = record_type.clone();
            let inputs = Arc::clone(&inputs);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let input = &inputs[(t * ops_per_thread + i) % inputs.len()];
                    let stable = record_type.decode(input).and_then(|record| {
                        let bytes = record.encode()?;
                        Ok(record_type.decode(&bytes)? == record)
                    });
                    match stable {
                        Ok(true) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        _ => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}
