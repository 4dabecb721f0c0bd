//! Error types for spiral filling, run detection and scoring.

/// Failure reported by a [`crate::primes::PrimePredicate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    /// The predicate only covers values up to `max`.
    #[error("value {value} is outside the predicate range 0..={max}")]
    OutOfRange { value: u64, max: u64 },

    /// A lookup table for `0..=max` would exceed `cap` entries.
    #[error("predicate range 0..={max} exceeds the table cap of {cap}")]
    RangeTooLarge { max: u64, cap: u64 },

    /// Any other predicate-specific failure.
    #[error("prime predicate failed on {value}: {message}")]
    Failed { value: u64, message: String },
}

/// The three error kinds callers dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OutOfBounds,
    InvalidConfig,
    PredicateFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum UlamError {
    /// More spiral steps requested than the grid holds, or a start cell off the grid.
    #[error("spiral of {requested} steps does not fit a grid of {capacity} cells")]
    OutOfBounds { requested: u64, capacity: u64 },

    /// A start coordinate outside the grid.
    #[error("start cell ({row}, {col}) is outside a {size}x{size} grid")]
    StartOutside { row: usize, col: usize, size: usize },

    /// A spiral laid out for a different grid side than the buffer it fills.
    #[error("spiral for a {spiral}x{spiral} grid applied to a {grid}x{grid} grid")]
    SizeMismatch { spiral: usize, grid: usize },

    /// Grid rows of unequal length, or row count different from column count.
    #[error("grid is not square: {rows} rows, {cols} columns")]
    NonSquare { rows: usize, cols: usize },

    /// A configuration value violates its numeric constraint.
    #[error("invalid config: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Propagated unchanged from the prime predicate.
    #[error(transparent)]
    PredicateFailure(#[from] PredicateError),
}

impl UlamError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfBounds { .. }
            | Self::StartOutside { .. }
            | Self::SizeMismatch { .. }
            | Self::NonSquare { .. } => ErrorKind::OutOfBounds,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::PredicateFailure(_) => ErrorKind::PredicateFailure,
        }
    }

    /// Exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidConfig => 2,
            ErrorKind::OutOfBounds => 3,
            ErrorKind::PredicateFailure => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, UlamError>;
