//! `Try` - a result whose failure is a captured panic.
//!
//! The engine never catches a panic raised by an Operation: it unwinds out
//! of the whole batch. An Operation that should fail on its own instead
//! wraps its body with [`Try::catching`], turning the panic into a
//! [`Try::Failure`] that folds like any other rejection.
//!
//! ```rust
//! use partraverse::outcome::Try;
//!
//! let outcome: Try<u32> =
//!     futures::executor::block_on(Try::catching(async { panic!("disk on fire") }));
//! assert_eq!(outcome.fault().unwrap().message(), "disk on fire");
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use thiserror::Error;

use super::Outcome;

/// Description of a panic captured by [`Try`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("operation panicked: {message}")]
pub struct Fault {
    message: String,
}

impl Fault {
    /// Creates a fault with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The panic message, or a placeholder for non-string payloads.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self { message }
    }
}

/// Either a value or the [`Fault`] raised while computing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Try<T> {
    /// The computation returned normally.
    Success(T),
    /// The computation panicked.
    Failure(Fault),
}

impl<T> Try<T> {
    /// Runs `function`, capturing a panic as a failure.
    pub fn of<F>(function: F) -> Self
    where
        F: FnOnce() -> T,
    {
        match panic::catch_unwind(AssertUnwindSafe(function)) {
            Ok(value) => Self::Success(value),
            Err(payload) => Self::Failure(Fault::from_panic(&*payload)),
        }
    }

    /// Awaits `future`, capturing a panic raised while polling it.
    pub async fn catching<F>(future: F) -> Self
    where
        F: Future<Output = T>,
    {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(value) => Self::Success(value),
            Err(payload) => Self::Failure(Fault::from_panic(&*payload)),
        }
    }

    /// Returns `true` for [`Try::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The captured fault, if any.
    #[must_use]
    pub const fn fault(&self) -> Option<&Fault> {
        match self {
            Self::Success(_) => None,
            Self::Failure(fault) => Some(fault),
        }
    }

    /// Maps the success value.
    pub fn map<U, F>(self, function: F) -> Try<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Try::Success(function(value)),
            Self::Failure(fault) => Try::Failure(fault),
        }
    }
}

impl<T> From<Try<T>> for Result<T, Fault> {
    fn from(attempt: Try<T>) -> Self {
        attempt.into_result()
    }
}

impl<T> Outcome for Try<T> {
    type Success = T;
    type Rejection = Fault;

    #[inline]
    fn is_acceptable(&self) -> bool {
        self.is_success()
    }

    fn payload(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    fn into_result(self) -> Result<T, Fault> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(fault) => Err(fault),
        }
    }
}
