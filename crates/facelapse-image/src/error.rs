/// An error type for the image module.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the data length does not match the image size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image sizes of two containers do not match.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a channel index is out of bounds.
    #[error("Channel index {0} out of bounds for {1} channels")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when a pixel coordinate is out of bounds.
    #[error("Pixel ({0}, {1}) out of bounds for image of size {2}x{3}")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the pixel data cannot be cast to the requested type.
    #[error("Failed to cast pixel data to {0}")]
    CastError(String),
}
