//! Precondition violations raised by the image layer.
//!
//! Both variants are fatal to the cycle that produced them. A blank or
//! unclear region is never an error here; that is recognition uncertainty
//! and is reported through values, not through `Err`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A region fraction fell outside `[0, 1]`.
    #[error("region {edge} must be between 0 and 1, got {value}")]
    InvalidRegion { edge: &'static str, value: f64 },

    /// Two images handed to a comparison differ in shape.
    #[error("image shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: (u32, u32), right: (u32, u32) },
}
