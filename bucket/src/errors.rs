use thiserror::Error;

/// Errors returned when the parts of a bucket violate its invariants.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum BuildError {
    #[error("frequency must be within 0.0..=1.0, got {0}")]
    FrequencyOutOfRange(f64),
    #[error("distinct value count must be non-negative, got {0}")]
    DistinctOutOfRange(f64),
    #[error("singleton bucket must have both bounds closed")]
    OpenSingleton,
    #[error("lower bound is greater than upper bound")]
    InvertedBounds,
}

/// Errors returned by bucket operations.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The value domain cannot map points onto numbers, so the named
    /// operation has no meaning for it.
    #[error("{0} is not supported for this value domain")]
    Unsupported(&'static str),
    #[error("point is outside the bucket")]
    NotContained,
    #[error("buckets do not intersect")]
    Disjoint,
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl Error {
    /// Returns true when the failure comes from the value domain rather than
    /// from the arguments. Callers can fall back to a heuristic that does not
    /// need distances.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
