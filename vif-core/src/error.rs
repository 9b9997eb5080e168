//! Error types for the VIF feature core.

use thiserror::Error;

/// Errors produced by [`crate::VifExtractor`].
#[derive(Debug, Error)]
pub enum Error {
    /// The buffer pool could not be allocated at construction time.
    ///
    /// This is fatal to the instance; a new [`crate::VifExtractor`] must be
    /// constructed with a smaller frame size or after memory pressure has
    /// eased.
    #[error("failed to allocate vif buffer pool ({requested} bytes)")]
    OutOfMemory {
        /// Number of bytes the pool attempted to reserve.
        requested: usize,
    },

    /// The reference and distorted pictures passed to `extract` did not
    /// agree on dimensions with each other or with the size given to `init`.
    #[error("picture dimensions {actual:?} do not match the configured {expected:?}")]
    DimensionMismatch {
        /// Width/height configured at `init`.
        expected: (u32, u32),
        /// Width/height observed on the picture that didn't match.
        actual: (u32, u32),
    },

    /// `VifConfig::bit_depth` was not one of the supported 8/10/12.
    #[error("unsupported bit depth {got}, expected 8, 10, or 12")]
    InvalidBitDepth {
        /// The rejected bit depth.
        got: u8,
    },

    /// The external feature collector rejected an observation.
    #[error("feature collector rejected an observation")]
    CollectorAppend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, Error>;
