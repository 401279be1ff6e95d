use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PageBoundError>;

#[derive(Error, Debug)]
pub enum PageBoundError {
    /// Page geometry cannot hold any content (zero page height, or header
    /// plus footer reserve consuming the whole page).
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    /// The precise pass produced a plan whose block sequence does not match
    /// the content model. This is an internal invariant violation; the
    /// export is aborted rather than shipping a corrupted document.
    #[error("page plan does not match content sequence: {0}")]
    PlanMismatch(String),

    /// An image asset could not be interpreted at all (bad data URI scheme,
    /// unnamed asset). Decode failures during settling are not errors.
    #[error("asset error: {0}")]
    Asset(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
