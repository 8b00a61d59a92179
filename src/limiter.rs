//! Counting admission gate.
//!
//! [`ConcurrencyLimiter`] bounds how many Operations are past admission
//! and not yet completed. A finite bound is backed by
//! `tokio::sync::Semaphore`; an unbounded limiter admits everything
//! immediately and holds no state.
//!
//! Permits are RAII guards: dropping a [`Permit`] returns it to the pool,
//! so a permit is released on every exit path of the Operation that holds
//! it, including a panic unwinding through it and the surrounding future
//! being dropped by a timeout.
//!
//! # Examples
//!
//! ```rust
//! use partraverse::config::Bound;
//! use partraverse::limiter::ConcurrencyLimiter;
//!
//! # futures::executor::block_on(async {
//! let limiter = ConcurrencyLimiter::new(Bound::limited(2).unwrap());
//! let first = limiter.acquire().await;
//! let _second = limiter.acquire().await;
//! assert_eq!(limiter.available_permits(), Some(0));
//!
//! limiter.release(first);
//! assert_eq!(limiter.available_permits(), Some(1));
//! # });
//! ```

use std::fmt;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::config::Bound;

/// Admission gate for at most `bound` concurrent Operations.
pub struct ConcurrencyLimiter {
    bound: Bound,
    semaphore: Option<Semaphore>,
}

impl fmt::Debug for ConcurrencyLimiter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConcurrencyLimiter")
            .field("bound", &self.bound)
            .field("available_permits", &self.available_permits())
            .finish()
    }
}

impl ConcurrencyLimiter {
    /// Creates a limiter for `bound`.
    ///
    /// `Bound` is validated when it is built, so construction cannot fail.
    #[must_use]
    pub fn new(bound: Bound) -> Self {
        let semaphore = bound
            .limit()
            .map(|limit| Semaphore::new(limit.min(Semaphore::MAX_PERMITS)));
        Self { bound, semaphore }
    }

    /// A limiter that admits every Operation immediately.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            bound: Bound::Unbounded,
            semaphore: None,
        }
    }

    /// The bound this limiter enforces.
    #[must_use]
    #[inline]
    pub const fn bound(&self) -> Bound {
        self.bound
    }

    /// Permits currently available, or `None` when unbounded.
    #[must_use]
    pub fn available_permits(&self) -> Option<usize> {
        self.semaphore.as_ref().map(Semaphore::available_permits)
    }

    /// Waits until a permit is available and takes it.
    ///
    /// Returns immediately when unbounded.
    ///
    /// # Panics
    ///
    /// Panics if the semaphore was closed, which the limiter never does.
    pub async fn acquire(&self) -> Permit<'_> {
        let Some(semaphore) = &self.semaphore else {
            return Permit { inner: None };
        };
        // The semaphore is private and `close` is never called on it, so
        // acquisition only fails if that invariant is broken.
        match semaphore.acquire().await {
            Ok(permit) => Permit {
                inner: Some(permit),
            },
            Err(_) => unreachable!("concurrency limiter semaphore was closed"),
        }
    }

    /// Returns a permit to the pool. Equivalent to dropping it.
    pub fn release(&self, permit: Permit<'_>) {
        drop(permit);
    }
}

/// Proof of admission. Released on drop.
#[must_use = "dropping a permit releases it immediately"]
pub struct Permit<'a> {
    inner: Option<SemaphorePermit<'a>>,
}

impl Permit<'_> {
    /// Returns `true` if this permit came from a finite pool.
    #[must_use]
    pub const fn is_counted(&self) -> bool {
        self.inner.is_some()
    }
}

impl fmt::Debug for Permit<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Permit")
            .field("counted", &self.is_counted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn unbounded_acquire_is_immediate() {
        let limiter = ConcurrencyLimiter::unbounded();
        let permits: Vec<_> = futures::future::join_all((0..100).map(|_| limiter.acquire())).await;
        assert_eq!(permits.len(), 100);
        assert!(permits.iter().all(|permit| !permit.is_counted()));
        assert_eq!(limiter.available_permits(), None);
    }

    #[rstest]
    #[tokio::test]
    async fn release_returns_permit() {
        let limiter = ConcurrencyLimiter::new(Bound::limited(1).unwrap());
        let permit = limiter.acquire().await;
        assert!(permit.is_counted());
        assert_eq!(limiter.available_permits(), Some(0));
        limiter.release(permit);
        assert_eq!(limiter.available_permits(), Some(1));
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn acquire_waits_when_exhausted() {
        let limiter = ConcurrencyLimiter::new(Bound::limited(1).unwrap());
        let _held = limiter.acquire().await;
        let waited = tokio::time::timeout(Duration::from_millis(10), limiter.acquire()).await;
        assert!(waited.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn dropped_permits_return_to_pool() {
        let limiter = ConcurrencyLimiter::new(Bound::limited(2).unwrap());
        {
            let _first = limiter.acquire().await;
            let _second = limiter.acquire().await;
        }
        assert_eq!(limiter.available_permits(), Some(2));
    }

    #[rstest]
    #[tokio::test]
    async fn contended_acquire_always_yields_counted_permits() {
        let limiter = ConcurrencyLimiter::new(Bound::limited(2).unwrap());
        let counted = futures::future::join_all((0..50).map(|_| async {
            let permit = limiter.acquire().await;
            tokio::task::yield_now().await;
            permit.is_counted()
        }))
        .await;
        assert!(counted.into_iter().all(|is_counted| is_counted));
        assert_eq!(limiter.available_permits(), Some(2));
    }

    #[rstest]
    fn debug_shows_bound() {
        let limiter = ConcurrencyLimiter::new(Bound::limited(3).unwrap());
        let debug = format!("{limiter:?}");
        assert!(debug.contains("ConcurrencyLimiter"));
        assert!(debug.contains("available_permits: Some(3)"));
    }
}
