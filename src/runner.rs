//! Bounded-parallelism execution of a batch of Operations.
//!
//! [`ParallelRunner`] takes N work items and a per-item Operation, runs up
//! to `bound` Operations at once, and returns their outcomes indexed by
//! input position, whatever order they completed in.
//!
//! # Execution Model
//!
//! Operations are polled concurrently inside the calling task through
//! `FuturesUnordered`. Parallelism across worker threads comes from the
//! Operations themselves (for example an Operation that awaits a spawned
//! task or an I/O call); the runner only throttles, orders and observes
//! cancellation.
//!
//! - When the bound admits the whole batch, every Operation starts at once
//!   and the limiter is bypassed.
//! - Otherwise each Operation waits for a [`Permit`](crate::limiter::Permit)
//!   and holds it until it completes. The permit is released on every exit
//!   path.
//! - The mapping function is invoked only after admission.
//! - All admitted Operations run to completion. A rejection from one of
//!   them does not stop the others.
//!
//! # Cancellation
//!
//! The cancellation handle is checked before the batch is admitted, after
//! each admission and before the Operation is invoked, and once more after
//! every Operation has completed. A fired handle never aborts an in-flight
//! Operation: it stops further invocations and replaces the result with
//! [`TraverseError::Cancelled`].
//!
//! # Panics
//!
//! A panic raised by an Operation is not caught. It unwinds out of
//! [`ParallelRunner::run`], dropping the remaining Operations.
//!
//! # Examples
//!
//! ```rust
//! use partraverse::config::ParallelOptions;
//! use partraverse::runner::ParallelRunner;
//!
//! # futures::executor::block_on(async {
//! let runner = ParallelRunner::new(ParallelOptions::try_with_limit(2).unwrap());
//! let doubled = runner.run(vec![1, 2, 3], |number| async move { number * 2 }).await;
//! assert_eq!(doubled, Ok(vec![2, 4, 6]));
//! # });
//! ```

use std::future::Future;
use std::iter;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, trace};

use crate::config::ParallelOptions;
use crate::error::{Checkpoint, TraverseError};
use crate::limiter::ConcurrencyLimiter;

// =============================================================================
// ResultSlots
// =============================================================================

/// Fixed-size outcome storage indexed by input position.
///
/// Each slot is written exactly once and the vector is only read after
/// every slot has been written.
struct ResultSlots<O> {
    slots: Vec<Option<O>>,
    filled: usize,
}

impl<O> ResultSlots<O> {
    fn new(length: usize) -> Self {
        Self {
            slots: iter::repeat_with(|| None).take(length).collect(),
            filled: 0,
        }
    }

    fn fill(&mut self, index: usize, outcome: O) {
        debug_assert!(self.slots[index].is_none(), "slot {index} written twice");
        self.slots[index] = Some(outcome);
        self.filled += 1;
    }

    fn into_ordered(self) -> Vec<O> {
        debug_assert_eq!(self.filled, self.slots.len());
        self.slots.into_iter().flatten().collect()
    }
}

// =============================================================================
// ParallelRunner
// =============================================================================

/// Runs a batch of Operations under a concurrency bound.
#[derive(Debug, Clone, Default)]
pub struct ParallelRunner {
    options: ParallelOptions,
}

impl ParallelRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new(options: ParallelOptions) -> Self {
        Self { options }
    }

    /// The options this runner was built with.
    #[must_use]
    #[inline]
    pub const fn options(&self) -> &ParallelOptions {
        &self.options
    }

    /// Applies `operation` to every item and collects the outcomes in input
    /// order.
    ///
    /// An empty batch returns an empty vector without creating a limiter.
    ///
    /// # Errors
    ///
    /// Returns [`TraverseError::Cancelled`] if the cancellation handle fires
    /// at any checkpoint. Outcomes of Operations that already ran are
    /// discarded.
    pub async fn run<I, F, Fut>(
        &self,
        items: I,
        operation: F,
    ) -> Result<Vec<Fut::Output>, TraverseError>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future,
    {
        self.checkpoint(Checkpoint::BeforeAdmission)?;

        let items: Vec<I::Item> = items.into_iter().collect();
        let total = items.len();
        if total == 0 {
            trace!("empty batch");
            return Ok(Vec::new());
        }

        let bound = self.options.bound();
        let limiter = if bound.admits_all(total) {
            ConcurrencyLimiter::unbounded()
        } else {
            ConcurrencyLimiter::new(bound)
        };
        debug!(
            total,
            %bound,
            gated = !limiter.bound().is_unbounded(),
            "running batch"
        );

        let limiter = &limiter;
        let operation = &operation;
        let options = &self.options;
        let mut pending: FuturesUnordered<_> = items
            .into_iter()
            .enumerate()
            .map(move |(index, item)| async move {
                let _permit = limiter.acquire().await;
                if options.is_cancelled() {
                    trace!(index, "not invoked: cancelled");
                    return (index, None);
                }
                trace!(index, "admitted");
                let outcome = operation(item).await;
                trace!(index, "completed");
                (index, Some(outcome))
            })
            .collect();

        let mut slots = ResultSlots::new(total);
        let mut cancelled_at: Option<usize> = None;
        while let Some((index, outcome)) = pending.next().await {
            match outcome {
                Some(outcome) => slots.fill(index, outcome),
                None => {
                    cancelled_at = Some(cancelled_at.map_or(index, |lowest| lowest.min(index)));
                }
            }
        }

        if let Some(index) = cancelled_at {
            let checkpoint = Checkpoint::Admission { index };
            debug!(%checkpoint, "batch cancelled");
            return Err(TraverseError::Cancelled(checkpoint));
        }
        self.checkpoint(Checkpoint::AfterCompletion)?;

        Ok(slots.into_ordered())
    }

    /// Runs already-built Operations and collects their outcomes in input
    /// order.
    ///
    /// # Errors
    ///
    /// Same as [`ParallelRunner::run`].
    pub async fn run_all<I>(
        &self,
        operations: I,
    ) -> Result<Vec<<I::Item as Future>::Output>, TraverseError>
    where
        I: IntoIterator,
        I::Item: Future,
    {
        self.run(operations, |operation| operation).await
    }

    fn checkpoint(&self, checkpoint: Checkpoint) -> Result<(), TraverseError> {
        if self.options.is_cancelled() {
            debug!(%checkpoint, "batch cancelled");
            return Err(TraverseError::Cancelled(checkpoint));
        }
        Ok(())
    }
}
