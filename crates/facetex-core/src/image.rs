//! Borrowed pixel buffers and grayscale conversion.

use crate::error::{ImageError, Result};

/// Read-only view over an 8-bit interleaved image.
///
/// `stride` is the number of bytes between the starts of consecutive rows and
/// may exceed `width * channels` when rows are padded.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a> ImageView<'a> {
    /// Wrap `data` after checking that the declared geometry fits inside it.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> Result<Self> {
        let overflow = || ImageError::BufferTooSmall {
            required: usize::MAX,
            actual: data.len(),
        };
        let row_bytes = width.checked_mul(channels).ok_or_else(overflow)?;
        if stride < row_bytes {
            return Err(ImageError::StrideTooSmall {
                stride,
                width,
                channels,
            });
        }
        let required = if height == 0 {
            0
        } else {
            stride
                .checked_mul(height - 1)
                .and_then(|n| n.checked_add(row_bytes))
                .ok_or_else(overflow)?
        };
        if data.len() < required {
            return Err(ImageError::BufferTooSmall {
                required,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    /// Tightly packed single-channel view.
    pub fn from_gray(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, 1, width)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes of row `y`, without the padding.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width * self.channels]
    }

    /// Convert to a single-channel plane.
    ///
    /// 1-channel input is copied row by row (dropping the stride padding);
    /// 3- and 4-channel input is read as RGB(A) and mapped through Rec.601
    /// luma. Returns `None` for any other channel count.
    pub fn to_gray(&self) -> Option<GrayPlane> {
        let mut data = Vec::with_capacity(self.width * self.height);
        match self.channels {
            1 => {
                for y in 0..self.height {
                    data.extend_from_slice(self.row(y));
                }
            }
            3 | 4 => {
                let ch = self.channels;
                for y in 0..self.height {
                    data.extend(
                        self.row(y)
                            .chunks_exact(ch)
                            .map(|px| luma(px[0], px[1], px[2])),
                    );
                }
            }
            _ => return None,
        }
        Some(GrayPlane {
            width: self.width,
            height: self.height,
            data,
        })
    }
}

/// Rec.601 luma in 16-bit fixed point, rounded to nearest.
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    // 0.299, 0.587, 0.114 scaled by 2^16; the weights sum to 65536.
    let y = 19595 * r as u32 + 38470 * g as u32 + 7471 * b as u32;
    ((y + 32768) >> 16) as u8
}

/// Owned, tightly packed grayscale image.
///
/// `data` always holds at least `width * height` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayPlane {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayPlane {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let required = width
            .checked_mul(height)
            .ok_or(ImageError::BufferTooSmall {
                required: usize::MAX,
                actual: data.len(),
            })?;
        if data.len() < required {
            return Err(ImageError::BufferTooSmall {
                required,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            channels: 1,
            stride: self.width,
        }
    }
}
