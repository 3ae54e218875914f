use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImageError>;

/// Invalid image buffer geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("row stride {stride} is smaller than width {width} x {channels} channels")]
    StrideTooSmall {
        stride: usize,
        width: usize,
        channels: usize,
    },

    #[error("buffer holds {actual} bytes, {required} required for the declared geometry")]
    BufferTooSmall { required: usize, actual: usize },
}
