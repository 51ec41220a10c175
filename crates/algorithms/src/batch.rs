//! Per-image batch execution
//!
//! Every per-image computation is independent, so a batch is a map over
//! image indices. Results always come back in input order, and a failing
//! batch reports the lowest failing index regardless of completion order.

use crate::maybe_rayon::*;
use cellfeat_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a batch map is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing on the global rayon pool
    #[default]
    Parallel,
    /// Parallel processing on a dedicated pool with this many threads
    ParallelWith(usize),
}

impl ExecutionMode {
    /// Map `f` over `0..n`, keeping every per-index outcome.
    ///
    /// The outer error only reports a thread pool that could not be built.
    pub fn map_all<T, F>(&self, n: usize, f: F) -> Result<Vec<Result<T>>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        match self {
            ExecutionMode::Sequential => Ok((0..n).map(f).collect()),
            ExecutionMode::Parallel => Ok((0..n).into_par_iter().map(f).collect()),
            ExecutionMode::ParallelWith(threads) => run_on_pool(*threads, n, f),
        }
    }

    /// Map `f` over `0..n`, failing fast with the lowest-index error.
    ///
    /// Errors are wrapped in [`Error::AtImage`] with their index.
    pub fn try_map<T, F>(&self, n: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> Result<T> + Sync + Send,
    {
        let outcomes = self.map_all(n, f)?;
        let mut out = Vec::with_capacity(n);
        for (i, outcome) in outcomes.into_iter().enumerate() {
            out.push(outcome.map_err(|e| e.at_image(i))?);
        }
        Ok(out)
    }
}

#[cfg(feature = "parallel")]
fn run_on_pool<T, F>(threads: usize, n: usize, f: F) -> Result<Vec<Result<T>>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    if threads == 0 {
        return Err(Error::config("threads", 0, "thread count must be at least 1"));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::Other(format!("failed to build thread pool: {}", e)))?;
    Ok(pool.install(|| (0..n).into_par_iter().map(f).collect()))
}

#[cfg(not(feature = "parallel"))]
fn run_on_pool<T, F>(threads: usize, n: usize, f: F) -> Result<Vec<Result<T>>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    if threads == 0 {
        return Err(Error::config("threads", 0, "thread count must be at least 1"));
    }
    Ok((0..n).map(f).collect())
}

/// Fail with [`Error::LengthMismatch`] unless two paired lists agree.
pub fn ensure_paired(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_or_fail(i: usize) -> Result<usize> {
        if i == 3 || i == 6 {
            Err(Error::Domain(format!("bad {}", i)))
        } else {
            Ok(i * i)
        }
    }

    #[test]
    fn test_order_preserved() {
        for mode in [
            ExecutionMode::Sequential,
            ExecutionMode::Parallel,
            ExecutionMode::ParallelWith(2),
        ] {
            let out = mode.try_map(50, |i| Ok(i * 2)).unwrap();
            let expected: Vec<usize> = (0..50).map(|i| i * 2).collect();
            assert_eq!(out, expected, "mode {:?}", mode);
        }
    }

    #[test]
    fn test_lowest_index_error() {
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let err = mode.try_map(10, square_or_fail).unwrap_err();
            assert_eq!(err.image_index(), Some(3));
            assert!(matches!(err.root(), Error::Domain(_)));
        }
    }

    #[test]
    fn test_map_all_keeps_siblings() {
        let out = ExecutionMode::Parallel.map_all(8, square_or_fail).unwrap();
        assert_eq!(out.iter().filter(|r| r.is_err()).count(), 2);
        assert_eq!(*out[7].as_ref().unwrap(), 49);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let result = ExecutionMode::ParallelWith(0).try_map(1, |i| Ok(i));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_ensure_paired() {
        assert!(ensure_paired("masks", 3, 3).is_ok());
        assert!(matches!(
            ensure_paired("masks", 3, 2),
            Err(Error::LengthMismatch { expected: 3, actual: 2, .. })
        ));
    }
}
