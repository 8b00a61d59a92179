//! `RemoteData` - the four states of a remote fetch.

use std::cmp::Ordering;

use super::Outcome;

/// State of data fetched from somewhere else.
///
/// When many `RemoteData` are folded and not all of them succeeded, the
/// aggregate is the most important non-success state present:
/// `Failure` over `Loading` over `NotAsked`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemoteData<T, E> {
    /// The request has not been made.
    NotAsked,
    /// The request is in flight.
    Loading,
    /// The request failed.
    Failure(E),
    /// The request succeeded.
    Success(T),
}

impl<T, E> RemoteData<T, E> {
    /// Returns `true` for [`RemoteData::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`RemoteData::Failure`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns `true` for [`RemoteData::Loading`].
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` for [`RemoteData::NotAsked`].
    #[must_use]
    pub const fn is_not_asked(&self) -> bool {
        matches!(self, Self::NotAsked)
    }

    /// Maps the success payload.
    pub fn map<U, F>(self, function: F) -> RemoteData<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => RemoteData::Success(function(value)),
            Self::Failure(error) => RemoteData::Failure(error),
            Self::Loading => RemoteData::Loading,
            Self::NotAsked => RemoteData::NotAsked,
        }
    }

    /// Maps the failure payload.
    pub fn map_failure<F2, F>(self, function: F) -> RemoteData<T, F2>
    where
        F: FnOnce(E) -> F2,
    {
        match self {
            Self::Success(value) => RemoteData::Success(value),
            Self::Failure(error) => RemoteData::Failure(function(error)),
            Self::Loading => RemoteData::Loading,
            Self::NotAsked => RemoteData::NotAsked,
        }
    }
}

impl<T, E> From<Result<T, E>> for RemoteData<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T, E> From<Option<T>> for RemoteData<T, E> {
    fn from(option: Option<T>) -> Self {
        option.map_or(Self::NotAsked, Self::Success)
    }
}

impl<T, E> From<RemoteRejection<E>> for RemoteData<T, E> {
    fn from(rejection: RemoteRejection<E>) -> Self {
        match rejection {
            RemoteRejection::Failure(error) => Self::Failure(error),
            RemoteRejection::Loading => Self::Loading,
            RemoteRejection::NotAsked => Self::NotAsked,
        }
    }
}

impl<T, E> Outcome for RemoteData<T, E> {
    type Success = T;
    type Rejection = RemoteRejection<E>;

    #[inline]
    fn is_acceptable(&self) -> bool {
        self.is_success()
    }

    fn payload(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    fn into_result(self) -> Result<T, RemoteRejection<E>> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(RemoteRejection::Failure(error)),
            Self::Loading => Err(RemoteRejection::Loading),
            Self::NotAsked => Err(RemoteRejection::NotAsked),
        }
    }
}

// =============================================================================
// RemoteRejection
// =============================================================================

/// The non-success states of [`RemoteData`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemoteRejection<E> {
    /// The request has not been made.
    NotAsked,
    /// The request is in flight.
    Loading,
    /// The request failed.
    Failure(E),
}

impl<E> RemoteRejection<E> {
    /// Merge priority: higher wins.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::NotAsked => 0,
            Self::Loading => 1,
            Self::Failure(_) => 2,
        }
    }

    /// Compares two rejections by priority only.
    #[must_use]
    pub fn cmp_priority(&self, other: &Self) -> Ordering {
        self.priority().cmp(&other.priority())
    }
}
