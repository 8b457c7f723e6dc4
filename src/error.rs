use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Contract violations reported by the blending, SAD and weight-check entry points.
///
/// Every variant is a programming error on the caller's side. Nothing here is
/// transient, so none of these should be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Unsupported block size for the operation, mismatched block sizes,
    /// or a buffer too small for the region it is supposed to cover.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A pixel was normalized before any block contributed weight to it.
    #[error("accumulated weight is zero at ({x}, {y})")]
    DivisionByZero { x: usize, y: usize },

    /// No kernel can handle the requested sample format.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),
}
