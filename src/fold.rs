//! Reducing an ordered vector of outcomes to one aggregate.
//!
//! The fold rule depends on the outcome type, and is selected statically
//! through [`Aggregate`]:
//!
//! | Type              | Policy                             | Aggregate on rejection          |
//! |-------------------|------------------------------------|---------------------------------|
//! | `Option<T>`       | [`FoldPolicy::FailFastAbsent`]     | `None`                          |
//! | `Result<T, E>`    | [`FoldPolicy::FailFastError`]      | lowest-indexed `Err`            |
//! | `Try<T>`          | [`FoldPolicy::FailFastError`]      | lowest-indexed `Failure`        |
//! | `RemoteData<T,E>` | [`FoldPolicy::PriorityMerge`]      | highest-priority state, first wins ties |
//! | `Validation<T,E>` | [`FoldPolicy::AccumulateErrors`]   | every error, in input order     |
//!
//! In every case the success aggregate holds all payloads in input order.
//! Folding is a pure function of the vector: no state survives a call.
//!
//! # Examples
//!
//! ```rust
//! use partraverse::fold::{choose, fold, partition};
//! use partraverse::outcome::Validation;
//!
//! let results = vec![Ok(1), Err("a"), Ok(3), Err("b")];
//! assert_eq!(fold(results.clone()), Err("a"));
//! assert_eq!(choose(results.clone()), vec![1, 3]);
//! assert_eq!(partition(results), (vec![1, 3], vec!["a", "b"]));
//!
//! let validations = vec![
//!     Validation::valid(1),
//!     Validation::invalid("x"),
//!     Validation::valid(3),
//!     Validation::invalid_all(vec!["y", "z"]),
//! ];
//! assert_eq!(fold(validations), Validation::Invalid(vec!["x", "y", "z"]));
//! ```

use std::fmt;

use crate::outcome::{Fault, Outcome, RemoteData, RemoteRejection, Try, Validation};

// =============================================================================
// FoldPolicy
// =============================================================================

/// Tag naming the rule used to fold a given outcome type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldPolicy {
    /// Any absent element makes the aggregate absent.
    FailFastAbsent,
    /// The lowest-indexed error becomes the aggregate.
    FailFastError,
    /// The highest-priority non-success state becomes the aggregate.
    PriorityMerge,
    /// Every error of every invalid element is concatenated.
    AccumulateErrors,
}

impl fmt::Display for FoldPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FailFastAbsent => "fail-fast-absent",
            Self::FailFastError => "fail-fast-error",
            Self::PriorityMerge => "priority-merge",
            Self::AccumulateErrors => "accumulate-errors",
        };
        formatter.write_str(name)
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Outcome types that know how to fold a vector of themselves.
///
/// `Collected` is the same outcome type over `Vec<Self::Success>`.
pub trait Aggregate: Outcome {
    /// The same outcome type over the ordered payload list.
    type Collected;

    /// Rule used by [`Aggregate::fold`].
    const POLICY: FoldPolicy;

    /// Folds outcomes given in input order.
    fn fold(outcomes: Vec<Self>) -> Self::Collected;

    /// The success aggregate over an empty list.
    fn empty() -> Self::Collected;
}

impl<T> Aggregate for Option<T> {
    type Collected = Option<Vec<T>>;

    const POLICY: FoldPolicy = FoldPolicy::FailFastAbsent;

    fn fold(outcomes: Vec<Self>) -> Option<Vec<T>> {
        outcomes.into_iter().collect()
    }

    fn empty() -> Option<Vec<T>> {
        Some(Vec::new())
    }
}

impl<T, E> Aggregate for Result<T, E> {
    type Collected = Result<Vec<T>, E>;

    const POLICY: FoldPolicy = FoldPolicy::FailFastError;

    fn fold(outcomes: Vec<Self>) -> Result<Vec<T>, E> {
        // `collect` stops at the first `Err` in iteration order, which is
        // input order here.
        outcomes.into_iter().collect()
    }

    fn empty() -> Result<Vec<T>, E> {
        Ok(Vec::new())
    }
}

impl<T> Aggregate for Try<T> {
    type Collected = Try<Vec<T>>;

    const POLICY: FoldPolicy = FoldPolicy::FailFastError;

    fn fold(outcomes: Vec<Self>) -> Try<Vec<T>> {
        let collected: Result<Vec<T>, Fault> =
            outcomes.into_iter().map(Outcome::into_result).collect();
        match collected {
            Ok(values) => Try::Success(values),
            Err(fault) => Try::Failure(fault),
        }
    }

    fn empty() -> Try<Vec<T>> {
        Try::Success(Vec::new())
    }
}

impl<T, E> Aggregate for RemoteData<T, E> {
    type Collected = RemoteData<Vec<T>, E>;

    const POLICY: FoldPolicy = FoldPolicy::PriorityMerge;

    fn fold(outcomes: Vec<Self>) -> RemoteData<Vec<T>, E> {
        let mut values = Vec::with_capacity(outcomes.len());
        let mut strongest: Option<RemoteRejection<E>> = None;

        for outcome in outcomes {
            match outcome.into_result() {
                Ok(value) => {
                    if strongest.is_none() {
                        values.push(value);
                    }
                }
                Err(rejection) => {
                    // Strictly greater: the first rejection of a given
                    // priority is kept.
                    let replaces = strongest
                        .as_ref()
                        .is_none_or(|current| rejection.priority() > current.priority());
                    if replaces {
                        strongest = Some(rejection);
                    }
                }
            }
        }

        strongest.map_or(RemoteData::Success(values), RemoteData::from)
    }

    fn empty() -> RemoteData<Vec<T>, E> {
        RemoteData::Success(Vec::new())
    }
}

impl<T, E> Aggregate for Validation<T, E> {
    type Collected = Validation<Vec<T>, E>;

    const POLICY: FoldPolicy = FoldPolicy::AccumulateErrors;

    fn fold(outcomes: Vec<Self>) -> Validation<Vec<T>, E> {
        let mut values = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        let mut any_invalid = false;

        for outcome in outcomes {
            match outcome {
                Validation::Valid(value) => {
                    if !any_invalid {
                        values.push(value);
                    }
                }
                Validation::Invalid(mut element_errors) => {
                    any_invalid = true;
                    errors.append(&mut element_errors);
                }
            }
        }

        if any_invalid {
            Validation::Invalid(errors)
        } else {
            Validation::Valid(values)
        }
    }

    fn empty() -> Validation<Vec<T>, E> {
        Validation::Valid(Vec::new())
    }
}

// =============================================================================
// Free Functions
// =============================================================================

/// Folds outcomes given in input order with the policy of their type.
///
/// An empty vector folds to [`Aggregate::empty`].
pub fn fold<O: Aggregate>(outcomes: Vec<O>) -> O::Collected {
    if outcomes.is_empty() {
        return O::empty();
    }
    O::fold(outcomes)
}

/// Keeps the payloads of success-like outcomes, in input order, dropping
/// every rejection.
pub fn choose<O: Outcome>(outcomes: Vec<O>) -> Vec<O::Success> {
    outcomes.into_iter().filter_map(Outcome::into_payload).collect()
}

/// Splits outcomes into success payloads and rejection payloads, each in
/// input order. No element is dropped.
pub fn partition<O: Outcome>(outcomes: Vec<O>) -> (Vec<O::Success>, Vec<O::Rejection>) {
    let mut successes = Vec::new();
    let mut rejections = Vec::new();
    for outcome in outcomes {
        match outcome.into_result() {
            Ok(value) => successes.push(value),
            Err(rejection) => rejections.push(rejection),
        }
    }
    (successes, rejections)
}
