//! Engine-level failures.
//!
//! Only two things can go wrong in the engine itself: the caller handed it
//! an unusable configuration, or the caller's cancellation handle fired at
//! one of the checkpoints. Domain rejections (`None`, `Err`, `Failure`,
//! `Invalid`) are *not* errors here; they are folded into the aggregate.
//!
//! A panic inside an Operation is not represented either. It unwinds out of
//! the whole batch call. Wrap the Operation with
//! [`Try::catching`](crate::outcome::Try::catching) to isolate faults per
//! element.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Reasons a concurrency configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The bound was zero or a negative value other than the unbounded
    /// sentinel (`-1`).
    #[error("invalid concurrency bound {0}: expected a positive integer or -1 for unbounded")]
    InvalidBound(i64),

    /// The bound could not be parsed from text.
    #[error("unparsable concurrency bound {0:?}: expected a positive integer, -1 or \"unbounded\"")]
    UnparsableBound(String),
}

// =============================================================================
// Cancellation Checkpoints
// =============================================================================

/// The point at which a cancellation request was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    /// Before any Operation of the batch was admitted.
    BeforeAdmission,
    /// Right after the Operation at `index` obtained its permit, before it
    /// was invoked. The lowest such index is reported.
    Admission {
        /// Input position of the Operation that observed the request.
        index: usize,
    },
    /// After every admitted Operation completed, before folding.
    AfterCompletion,
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeAdmission => write!(formatter, "before admission"),
            Self::Admission { index } => write!(formatter, "at admission of item {index}"),
            Self::AfterCompletion => write!(formatter, "after completion"),
        }
    }
}

// =============================================================================
// TraverseError
// =============================================================================

/// Failure of a whole batch call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraverseError {
    /// The configuration was rejected before any Operation started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigurationError),

    /// The cancellation handle fired.
    #[error("traversal cancelled {0}")]
    Cancelled(Checkpoint),
}

impl TraverseError {
    /// Returns `true` if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}
