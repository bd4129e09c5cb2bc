use thiserror::Error;

use crate::address::AddressKind;

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while encoding, rendering or driving the Receive screen.
#[derive(Debug, Error)]
pub enum Error {
    /// The data does not fit in any version up to the requested maximum.
    ///
    /// Ways to handle this: lower the error correction level, raise the
    /// maximum version, or shorten the data.
    #[error("data length = {used} bits, max capacity = {capacity} bits")]
    DataTooLong { used: usize, capacity: usize },

    /// A single segment has more characters than its count field can hold.
    #[error("segment too long")]
    SegmentTooLong,

    /// Addresses must be non-empty before they can be encoded.
    #[error("address is empty")]
    EmptyAddress,

    /// The quiet zone is wider than the renderer accepts.
    #[error("quiet zone of {0} modules is too wide")]
    InvalidQuietZone(u32),

    /// The requested bitmap size cannot hold the module matrix.
    #[error("invalid QR image size {size} for a {dimension}x{dimension} module matrix")]
    InvalidSize { size: f32, dimension: u32 },

    /// The address set has not been supplied yet.
    #[error("wallet addresses are not available yet")]
    AddressesUnavailable,

    /// The variant is not part of the blocks currently on screen.
    #[error("{0:?} address is not shown")]
    AddressNotShown(AddressKind),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
