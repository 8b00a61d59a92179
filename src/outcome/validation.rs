//! `Validation` - a result that keeps every error.

use super::Outcome;

/// Either a valid value or the list of errors explaining why it is invalid.
///
/// Unlike [`Result`], folding many `Validation`s concatenates the error
/// lists of every invalid element instead of stopping at the first one.
///
/// # Examples
///
/// ```rust
/// use partraverse::outcome::Validation;
///
/// let age: Validation<u8, String> = Validation::invalid("age is negative".to_owned());
/// assert_eq!(age.errors(), ["age is negative".to_owned()]);
///
/// let name: Validation<&str, String> = Validation::valid("alice");
/// assert_eq!(name.map(str::len), Validation::Valid(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Validation<T, E> {
    /// The value passed validation.
    Valid(T),
    /// The value failed validation, with every reported error.
    Invalid(Vec<E>),
}

impl<T, E> Validation<T, E> {
    /// Creates a valid value.
    #[must_use]
    pub const fn valid(value: T) -> Self {
        Self::Valid(value)
    }

    /// Creates an invalid value with a single error.
    #[must_use]
    pub fn invalid(error: E) -> Self {
        Self::Invalid(vec![error])
    }

    /// Creates an invalid value from a list of errors.
    #[must_use]
    pub const fn invalid_all(errors: Vec<E>) -> Self {
        Self::Invalid(errors)
    }

    /// Returns `true` for [`Validation::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Returns `true` for [`Validation::Invalid`].
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The errors of an invalid value; empty when valid.
    #[must_use]
    pub fn errors(&self) -> &[E] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Maps the valid value.
    pub fn map<U, F>(self, function: F) -> Validation<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Valid(value) => Validation::Valid(function(value)),
            Self::Invalid(errors) => Validation::Invalid(errors),
        }
    }

    /// Maps every error.
    pub fn map_errors<F2, F>(self, function: F) -> Validation<T, F2>
    where
        F: FnMut(E) -> F2,
    {
        match self {
            Self::Valid(value) => Validation::Valid(value),
            Self::Invalid(errors) => {
                Validation::Invalid(errors.into_iter().map(function).collect())
            }
        }
    }
}

impl<T, E> From<Result<T, E>> for Validation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Valid(value),
            Err(error) => Self::invalid(error),
        }
    }
}

impl<T, E> From<Validation<T, E>> for Result<T, Vec<E>> {
    fn from(validation: Validation<T, E>) -> Self {
        validation.into_result()
    }
}

impl<T, E> Outcome for Validation<T, E> {
    type Success = T;
    type Rejection = Vec<E>;

    #[inline]
    fn is_acceptable(&self) -> bool {
        self.is_valid()
    }

    fn payload(&self) -> Option<&T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    fn into_result(self) -> Result<T, Vec<E>> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }
}
