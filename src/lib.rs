//! # partraverse
//!
//! Bounded-parallelism traversal over algebraic outcome types.
//!
//! ## Overview
//!
//! Given N asynchronous Operations, this library runs up to K of them at
//! once, observes a cooperative cancellation handle, and folds the N
//! outcomes into one aggregate whose rule depends on the outcome type:
//!
//! - **`Option` / `Result` / `Try`**: fail-fast, the lowest-indexed
//!   rejection wins
//! - **`RemoteData`**: priority merge, `Failure > Loading > NotAsked`
//! - **`Validation`**: every error of every element is accumulated
//!
//! Output is always in input order, regardless of completion order.
//!
//! ## Modules
//!
//! - [`outcome`]: the `Outcome` capability trait and the `Validation`,
//!   `RemoteData` and `Try` types
//! - [`config`]: `Bound` and `ParallelOptions`
//! - [`limiter`]: the counting admission gate
//! - [`runner`]: ordered, bounded execution of a batch
//! - [`fold`]: fold policies, `choose` and `partition`
//! - [`traverse`]: the `sequence`, `traverse`, `choose` and `partition`
//!   entry points
//!
//! ## Example
//!
//! ```rust
//! use partraverse::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let options = ParallelOptions::try_with_limit(4).unwrap();
//!
//! let lengths = vec!["alpha", "beta", ""]
//!     .traverse_par(
//!         |word| async move {
//!             if word.is_empty() { Err("empty word") } else { Ok(word.len()) }
//!         },
//!         &options,
//!     )
//!     .await;
//!
//! assert_eq!(lengths, Ok(Err("empty word")));
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use partraverse::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Bound, ParallelOptions};
    pub use crate::error::{Checkpoint, ConfigurationError, TraverseError};
    pub use crate::fold::{Aggregate, FoldPolicy};
    pub use crate::outcome::{Fault, Outcome, RemoteData, RemoteRejection, Try, Validation};
    pub use crate::runner::ParallelRunner;
    pub use crate::traverse::{ParSequence, ParTraversable, choose, partition, sequence, traverse};
}

pub mod config;
pub mod error;
pub mod fold;
pub mod limiter;
pub mod outcome;
pub mod runner;
pub mod traverse;
