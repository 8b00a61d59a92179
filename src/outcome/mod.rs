//! Outcome types the engine can fold.
//!
//! Every per-element result of a batch is an [`Outcome`]: a tagged value
//! that is either success-like (carrying a payload) or a rejection
//! (carrying a rejection payload). The standard library's [`Option`] and
//! [`Result`] are outcomes, and this module adds three more:
//!
//! - [`Validation`]: valid, or invalid with a list of errors
//! - [`RemoteData`]: success, failure, loading or not-asked
//! - [`Try`]: success, or a fault captured from a panic
//!
//! # Examples
//!
//! ```rust
//! use partraverse::outcome::{Outcome, RemoteData, Validation};
//!
//! assert!(Some(1).is_acceptable());
//! assert_eq!(Err::<i32, _>("boom").into_result(), Err("boom"));
//!
//! let invalid: Validation<i32, &str> = Validation::invalid("too small");
//! assert!(!invalid.is_acceptable());
//!
//! let loading: RemoteData<i32, String> = RemoteData::Loading;
//! assert_eq!(loading.payload(), None);
//! ```

mod attempt;
mod remote_data;
mod validation;

pub use attempt::{Fault, Try};
pub use remote_data::{RemoteData, RemoteRejection};
pub use validation::Validation;

/// The capability set the engine needs from a per-element result.
///
/// The trait is deliberately small: a tag test, a borrowing payload
/// accessor and a consuming split into payload or rejection payload. The
/// fold policy for each type lives in [`Aggregate`](crate::fold::Aggregate).
pub trait Outcome: Sized {
    /// Payload of the success-like variant.
    type Success;

    /// Payload of the rejection variants.
    type Rejection;

    /// Returns `true` for the success-like variant.
    fn is_acceptable(&self) -> bool;

    /// Borrows the success payload, if any.
    fn payload(&self) -> Option<&Self::Success>;

    /// Splits the outcome into its success or rejection payload.
    ///
    /// # Errors
    ///
    /// Returns the rejection payload for every non-success variant.
    fn into_result(self) -> Result<Self::Success, Self::Rejection>;

    /// Consumes the outcome, keeping only the success payload.
    fn into_payload(self) -> Option<Self::Success> {
        self.into_result().ok()
    }
}

impl<T> Outcome for Option<T> {
    type Success = T;
    type Rejection = ();

    #[inline]
    fn is_acceptable(&self) -> bool {
        self.is_some()
    }

    #[inline]
    fn payload(&self) -> Option<&T> {
        self.as_ref()
    }

    #[inline]
    fn into_result(self) -> Result<T, ()> {
        self.ok_or(())
    }
}

impl<T, E> Outcome for Result<T, E> {
    type Success = T;
    type Rejection = E;

    #[inline]
    fn is_acceptable(&self) -> bool {
        self.is_ok()
    }

    #[inline]
    fn payload(&self) -> Option<&T> {
        self.as_ref().ok()
    }

    #[inline]
    fn into_result(self) -> Self {
        self
    }
}
