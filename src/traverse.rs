//! Entry points: sequence, traverse, choose and partition.
//!
//! Each entry point runs a batch through [`ParallelRunner`] and then folds
//! the ordered outcomes:
//!
//! - [`sequence`]: already-built Operations, folded with the policy of
//!   their outcome type.
//! - [`traverse`]: one Operation per item, built by a mapping function.
//! - [`choose`]: keeps only the success payloads.
//! - [`partition`]: keeps every payload, split into successes and
//!   rejections.
//!
//! The same operations are available as methods through
//! [`ParTraversable`] and [`ParSequence`].
//!
//! # Examples
//!
//! ```rust
//! use partraverse::config::ParallelOptions;
//! use partraverse::outcome::Validation;
//! use partraverse::traverse::{ParTraversable, traverse};
//!
//! async fn check_age(age: i32) -> Validation<i32, String> {
//!     if age >= 0 {
//!         Validation::valid(age)
//!     } else {
//!         Validation::invalid(format!("{age} is negative"))
//!     }
//! }
//!
//! # futures::executor::block_on(async {
//! let options = ParallelOptions::try_with_limit(2).unwrap();
//!
//! let ages = traverse(vec![30, -1, 12, -7], check_age, &options).await.unwrap();
//! assert_eq!(
//!     ages,
//!     Validation::Invalid(vec!["-1 is negative".to_owned(), "-7 is negative".to_owned()])
//! );
//!
//! let valid = vec![30, -1, 12].choose_par(check_age, &options).await.unwrap();
//! assert_eq!(valid, vec![30, 12]);
//! # });
//! ```
//!
//! # Timeouts
//!
//! Timeouts are composed from outside: race the call against a timer and
//! cancel the handle when the timer wins.
//!
//! ```rust,ignore
//! let token = CancellationToken::new();
//! let options = ParallelOptions::new().with_cancellation(token.clone());
//! match tokio::time::timeout(deadline, traverse(items, fetch, &options)).await {
//!     Ok(aggregate) => aggregate,
//!     Err(_elapsed) => {
//!         token.cancel();
//!         Err(TraverseError::Cancelled(Checkpoint::BeforeAdmission))
//!     }
//! }
//! ```

use std::future::Future;

use crate::config::ParallelOptions;
use crate::error::TraverseError;
use crate::fold::{self, Aggregate};
use crate::outcome::Outcome;
use crate::runner::ParallelRunner;

/// Aggregate produced by folding outcomes of type `O`.
pub type Collected<O> = <O as Aggregate>::Collected;

// =============================================================================
// Free Functions
// =============================================================================

/// Runs already-built Operations and folds their outcomes.
///
/// An empty collection yields the success aggregate over an empty list.
///
/// # Errors
///
/// Returns [`TraverseError::Cancelled`] if the cancellation handle in
/// `options` fires. Domain rejections are part of the aggregate, not
/// errors.
pub async fn sequence<I>(
    operations: I,
    options: &ParallelOptions,
) -> Result<Collected<<I::Item as Future>::Output>, TraverseError>
where
    I: IntoIterator,
    I::Item: Future,
    <I::Item as Future>::Output: Aggregate,
{
    let outcomes = ParallelRunner::new(options.clone())
        .run_all(operations)
        .await?;
    Ok(fold::fold(outcomes))
}

/// Maps every item to an Operation, runs them and folds their outcomes.
///
/// `function` is called for an item only once the item is admitted.
///
/// # Errors
///
/// Same as [`sequence`].
pub async fn traverse<I, F, Fut>(
    items: I,
    function: F,
    options: &ParallelOptions,
) -> Result<Collected<Fut::Output>, TraverseError>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future,
    Fut::Output: Aggregate,
{
    let outcomes = ParallelRunner::new(options.clone())
        .run(items, function)
        .await?;
    Ok(fold::fold(outcomes))
}

/// Maps every item to an Operation and keeps the success payloads, in
/// input order. Rejections are dropped.
///
/// # Errors
///
/// Same as [`sequence`].
pub async fn choose<I, F, Fut>(
    items: I,
    function: F,
    options: &ParallelOptions,
) -> Result<Vec<<Fut::Output as Outcome>::Success>, TraverseError>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future,
    Fut::Output: Outcome,
{
    let outcomes = ParallelRunner::new(options.clone())
        .run(items, function)
        .await?;
    Ok(fold::choose(outcomes))
}

/// Maps every item to an Operation and splits the outcomes into success
/// payloads and rejection payloads, each in input order.
///
/// # Errors
///
/// Same as [`sequence`].
#[allow(clippy::type_complexity)]
pub async fn partition<I, F, Fut>(
    items: I,
    function: F,
    options: &ParallelOptions,
) -> Result<
    (
        Vec<<Fut::Output as Outcome>::Success>,
        Vec<<Fut::Output as Outcome>::Rejection>,
    ),
    TraverseError,
>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future,
    Fut::Output: Outcome,
{
    let outcomes = ParallelRunner::new(options.clone())
        .run(items, function)
        .await?;
    Ok(fold::partition(outcomes))
}

// =============================================================================
// Extension Traits
// =============================================================================

/// Method syntax for [`traverse`], [`choose`] and [`partition`] on any
/// collection.
///
/// # Examples
///
/// ```rust
/// use partraverse::config::ParallelOptions;
/// use partraverse::traverse::ParTraversable;
///
/// # futures::executor::block_on(async {
/// let options = ParallelOptions::default();
/// let parsed = vec!["1", "2", "x"]
///     .partition_par(|text| async move { text.parse::<i32>() }, &options)
///     .await
///     .unwrap();
/// assert_eq!(parsed.0, vec![1, 2]);
/// assert_eq!(parsed.1.len(), 1);
/// # });
/// ```
pub trait ParTraversable: IntoIterator + Sized {
    /// See [`traverse`].
    fn traverse_par<F, Fut>(
        self,
        function: F,
        options: &ParallelOptions,
    ) -> impl Future<Output = Result<Collected<Fut::Output>, TraverseError>>
    where
        F: Fn(Self::Item) -> Fut,
        Fut: Future,
        Fut::Output: Aggregate,
    {
        traverse(self, function, options)
    }

    /// See [`choose`].
    fn choose_par<F, Fut>(
        self,
        function: F,
        options: &ParallelOptions,
    ) -> impl Future<Output = Result<Vec<<Fut::Output as Outcome>::Success>, TraverseError>>
    where
        F: Fn(Self::Item) -> Fut,
        Fut: Future,
        Fut::Output: Outcome,
    {
        choose(self, function, options)
    }

    /// See [`partition`].
    #[allow(clippy::type_complexity)]
    fn partition_par<F, Fut>(
        self,
        function: F,
        options: &ParallelOptions,
    ) -> impl Future<
        Output = Result<
            (
                Vec<<Fut::Output as Outcome>::Success>,
                Vec<<Fut::Output as Outcome>::Rejection>,
            ),
            TraverseError,
        >,
    >
    where
        F: Fn(Self::Item) -> Fut,
        Fut: Future,
        Fut::Output: Outcome,
    {
        partition(self, function, options)
    }
}

impl<I: IntoIterator> ParTraversable for I {}

/// Method syntax for [`sequence`] on a collection of Operations.
pub trait ParSequence: IntoIterator<Item: Future> + Sized {
    /// See [`sequence`].
    fn sequence_par(
        self,
        options: &ParallelOptions,
    ) -> impl Future<Output = Result<Collected<<Self::Item as Future>::Output>, TraverseError>>
    where
        <Self::Item as Future>::Output: Aggregate,
    {
        sequence(self, options)
    }
}

impl<I> ParSequence for I
where
    I: IntoIterator,
    I::Item: Future,
{
}
