//! Concurrency configuration for batch calls.
//!
//! A [`Bound`] is either a positive limit or unbounded. Integer sources use
//! `-1` as the unbounded sentinel; every other non-positive value is
//! rejected with [`TraverseError::InvalidConfiguration`] before any work
//! starts.
//!
//! # Examples
//!
//! ```rust
//! use partraverse::config::{Bound, ParallelOptions};
//!
//! let bound: Bound = "8".parse().unwrap();
//! assert_eq!(bound.limit(), Some(8));
//!
//! assert!(Bound::try_from(-1_i64).unwrap().is_unbounded());
//! assert!(Bound::try_from(0_i64).is_err());
//!
//! let options = ParallelOptions::try_with_limit(4).unwrap();
//! assert_eq!(options.bound(), Bound::limited(4).unwrap());
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use tokio_util::sync::CancellationToken;

use crate::error::{ConfigurationError, TraverseError};

/// Integer sentinel meaning "no limit".
pub const UNBOUNDED_SENTINEL: i64 = -1;

// =============================================================================
// Bound
// =============================================================================

/// Maximum number of Operations allowed in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "i64", into = "i64")
)]
pub enum Bound {
    /// Every Operation is admitted immediately.
    #[default]
    Unbounded,
    /// At most this many Operations run concurrently.
    Limited(NonZeroUsize),
}

impl Bound {
    /// Creates a finite bound.
    ///
    /// # Errors
    ///
    /// Returns [`TraverseError::InvalidConfiguration`] if `limit` is 0.
    pub fn limited(limit: usize) -> Result<Self, TraverseError> {
        Self::try_from(limit)
    }

    /// Returns `true` for [`Bound::Unbounded`].
    #[must_use]
    #[inline]
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Returns the finite limit, if any.
    #[must_use]
    #[inline]
    pub const fn limit(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Limited(limit) => Some(limit.get()),
        }
    }

    /// Returns `true` if `total` Operations can all be admitted at once
    /// under this bound.
    #[must_use]
    pub const fn admits_all(&self, total: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limited(limit) => limit.get() >= total,
        }
    }
}

impl From<NonZeroUsize> for Bound {
    fn from(limit: NonZeroUsize) -> Self {
        Self::Limited(limit)
    }
}

impl TryFrom<usize> for Bound {
    type Error = TraverseError;

    fn try_from(limit: usize) -> Result<Self, Self::Error> {
        NonZeroUsize::new(limit).map(Self::Limited).ok_or_else(|| {
            ConfigurationError::InvalidBound(i64::try_from(limit).unwrap_or(i64::MAX)).into()
        })
    }
}

impl TryFrom<i64> for Bound {
    type Error = TraverseError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value == UNBOUNDED_SENTINEL {
            return Ok(Self::Unbounded);
        }
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self::Limited)
            .ok_or_else(|| ConfigurationError::InvalidBound(value).into())
    }
}

impl From<Bound> for i64 {
    fn from(bound: Bound) -> Self {
        match bound {
            Bound::Unbounded => UNBOUNDED_SENTINEL,
            Bound::Limited(limit) => Self::try_from(limit.get()).unwrap_or(Self::MAX),
        }
    }
}

impl FromStr for Bound {
    type Err = TraverseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| ConfigurationError::UnparsableBound(text.to_owned()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => write!(formatter, "unbounded"),
            Self::Limited(limit) => write!(formatter, "{limit}"),
        }
    }
}

// =============================================================================
// ParallelOptions
// =============================================================================

/// Options shared by every entry point: the bound and an optional
/// cancellation handle.
///
/// The handle is owned by the caller. The engine only calls
/// [`CancellationToken::is_cancelled`] on it.
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct ParallelOptions {
    bound: Bound,
    #[cfg_attr(feature = "serde", serde(skip))]
    cancellation: Option<CancellationToken>,
}

impl ParallelOptions {
    /// Unbounded, never cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for [`ParallelOptions::new`].
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Builds options from an integer bound (`-1` for unbounded).
    ///
    /// # Errors
    ///
    /// Returns [`TraverseError::InvalidConfiguration`] for zero or any
    /// negative value other than `-1`.
    pub fn try_with_limit(limit: i64) -> Result<Self, TraverseError> {
        Ok(Self::default().with_bound(Bound::try_from(limit)?))
    }

    /// Replaces the bound.
    #[must_use]
    pub fn with_bound(mut self, bound: Bound) -> Self {
        self.bound = bound;
        self
    }

    /// Attaches a cancellation handle.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The configured bound.
    #[must_use]
    #[inline]
    pub const fn bound(&self) -> Bound {
        self.bound
    }

    /// The attached cancellation handle, if any.
    #[must_use]
    #[inline]
    pub const fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
