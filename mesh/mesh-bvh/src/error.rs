//! Error types for index construction.

use thiserror::Error;

/// Result type alias for BVH operations.
pub type BvhResult<T> = Result<T, BvhError>;

/// Errors that can occur while building a spatial index.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BvhError {
    /// The input exceeds the capacity the builder's scratch buffers were
    /// sized for. The failed build leaves no partially built index behind.
    #[error("input has {required} primitives, but the builder was sized for {capacity}")]
    CapacityExceeded {
        /// Number of primitives in the rejected input.
        required: usize,
        /// Maximum primitive count this builder was constructed with.
        capacity: usize,
    },

    /// The input contains no primitives.
    #[error("input contains no primitives")]
    EmptyInput,

    /// The maximum leaf size must be at least 1.
    #[error("max leaf size must be at least 1")]
    InvalidLeafSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BvhError::CapacityExceeded {
            required: 100,
            capacity: 10,
        };
        assert!(format!("{err}").contains("100"));
        assert!(format!("{err}").contains("10"));

        let err = BvhError::EmptyInput;
        assert!(format!("{err}").contains("no primitives"));
    }
}
