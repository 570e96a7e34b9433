//! Error types for basis construction, operator lifting, and assembly of
//! master-equation inputs.

use thiserror::Error;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A single-particle space was requested with fewer than one level.
    #[error("invalid single-particle dimension {0}: must be at least 1")]
    InvalidDimension(usize),

    /// A mode index lies outside `0..dim`.
    #[error("mode index {index} out of range for a {dim}-level space")]
    IndexOutOfRange { index: usize, dim: usize },

    /// Operator, vector, or occupation size does not match what was declared.
    #[error("dimension mismatch in {context}: expected {expected}, got {got}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },

    /// An occupation state violates the exchange-symmetry constraints of the
    /// basis.
    #[error("invalid occupation {occupation:?}: {reason}")]
    InvalidOccupation { occupation: Vec<usize>, reason: String },

    /// A valid occupation state is absent from the enumerated basis.
    ///
    /// Raised during lifting this signals an inconsistent enumeration and
    /// should be treated as fatal.
    #[error("occupation {0:?} is not a state of this basis")]
    StateNotInBasis(Vec<usize>),

    /// An enumeration rule selected no states at all.
    #[error("occupation policy admits no states: {0}")]
    EmptyBasis(String),

    /// An operator required to be Hermitian is not.
    #[error("operator is not Hermitian (max deviation {0:.3e})")]
    NotHermitian(f64),

    /// A jump operator was given a negative or non-finite rate.
    #[error("jump operator '{label}' has invalid rate {rate}")]
    InvalidRate { label: String, rate: f64 },

    /// The time grid handed to a master-equation problem is unusable.
    #[error("invalid time grid: {0}")]
    InvalidTimeGrid(String),

    /// A model configuration failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn mismatch(context: &'static str, expected: usize, got: usize)
        -> Self
    {
        Self::DimensionMismatch { context, expected, got }
    }

    pub(crate) fn invalid_occupation<S>(occupation: &[usize], reason: S)
        -> Self
    where S: Into<String>
    {
        Self::InvalidOccupation {
            occupation: occupation.to_vec(),
            reason: reason.into(),
        }
    }
}
