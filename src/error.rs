//! Errors reported by [`OpenAddressingMap`](crate::OpenAddressingMap) construction

/// The error type returned when an [`OpenAddressingMap`](crate::OpenAddressingMap)
/// cannot be built from the given parameters.
///
/// Every operation on an already constructed map is total, so this is the only
/// failure the crate reports.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A constructor argument was out of range.
    ///
    /// Raised when the initial capacity is zero, or when the maximum load factor
    /// is not a finite number strictly between 0 and 1.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
