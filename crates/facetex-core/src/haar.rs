//! Haar-like box descriptor.
//!
//! A 4×4 box slides over every top-left position `(x, y)` with
//! `x < width - 4` and `y < height - 4`. At each position five sub-region
//! sum comparisons are packed into one value:
//!
//! | bit | value | comparison                                        |
//! |-----|-------|---------------------------------------------------|
//! | 0   | 1     | left 2×4 half > right 2×4 half                    |
//! | 1   | 2     | top 4×2 half > bottom 4×2 half                    |
//! | 2   | 4     | outer columns > middle two columns                |
//! | 3   | 8     | outer rows > middle two rows                      |
//! | 4   | 16    | top-left + bottom-right quadrants > the other two |
//!
//! All comparisons are strict. The output is row-major over box positions.
use crate::dispatch::gray_or_warn;
use crate::image::{GrayPlane, ImageView};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Side of the sliding box in pixels.
pub const HAAR_BOX: usize = 4;

/// Number of values produced for a `width × height` image; 0 when either
/// side is below 5.
#[inline]
pub fn haar_feature_len(width: usize, height: usize) -> usize {
    if width <= HAAR_BOX || height <= HAAR_BOX {
        return 0;
    }
    (width - HAAR_BOX) * (height - HAAR_BOX)
}

/// Sum of `patch[r][c]` over rows `r0..r1` and columns `c0..c1`.
#[inline]
fn region(
    patch: &[[u32; HAAR_BOX]; HAAR_BOX],
    c0: usize,
    r0: usize,
    c1: usize,
    r1: usize,
) -> u32 {
    patch[r0..r1]
        .iter()
        .map(|row| row[c0..c1].iter().sum::<u32>())
        .sum()
}

/// Packed comparison bits for one 4×4 patch.
pub fn box_code(patch: &[[u32; HAAR_BOX]; HAAR_BOX]) -> u8 {
    let mut code = 0u8;

    // edge, vertical split
    if region(patch, 0, 0, 2, 4) > region(patch, 2, 0, 4, 4) {
        code |= 1;
    }
    // edge, horizontal split
    if region(patch, 0, 0, 4, 2) > region(patch, 0, 2, 4, 4) {
        code |= 2;
    }
    // line, vertical
    if region(patch, 0, 0, 1, 4) + region(patch, 3, 0, 4, 4) > region(patch, 1, 0, 3, 4) {
        code |= 4;
    }
    // line, horizontal
    if region(patch, 0, 0, 4, 1) + region(patch, 0, 3, 4, 4) > region(patch, 0, 1, 4, 3) {
        code |= 8;
    }
    // checkerboard
    let tl = region(patch, 0, 0, 2, 2);
    let tr = region(patch, 2, 0, 4, 2);
    let bl = region(patch, 0, 2, 2, 4);
    let br = region(patch, 2, 2, 4, 4);
    if tl + br > tr + bl {
        code |= 16;
    }

    code
}

/// Box descriptor of a grayscale plane. Empty when the plane is smaller than
/// 5×5.
pub fn haar_features(gray: &GrayPlane) -> Vec<f32> {
    let len = haar_feature_len(gray.width(), gray.height());
    if len == 0 {
        return Vec::new();
    }
    let x_bound = gray.width() - HAAR_BOX;
    let y_bound = gray.height() - HAAR_BOX;

    let mut out = Vec::with_capacity(len);
    let mut patch = [[0u32; HAAR_BOX]; HAAR_BOX];
    for y in 0..y_bound {
        for x in 0..x_bound {
            for (r, row) in patch.iter_mut().enumerate() {
                let src = &gray.row(y + r)[x..x + HAAR_BOX];
                for (dst, &v) in row.iter_mut().zip(src) {
                    *dst = v as u32;
                }
            }
            out.push(box_code(&patch) as f32);
        }
    }
    out
}

/// Haar box descriptor of an image.
///
/// Returns the values together with the produced length, which is 0 when the
/// image is too small or its channel count is unsupported.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(img), fields(w = img.width(), h = img.height()))
)]
pub fn compute_haar(img: &ImageView<'_>) -> (Vec<f32>, usize) {
    if haar_feature_len(img.width(), img.height()) == 0 {
        #[cfg(feature = "tracing")]
        tracing::error!(
            width = img.width(),
            height = img.height(),
            "image too small for the Haar box descriptor (minimum 5x5)"
        );
        return (Vec::new(), 0);
    }
    match gray_or_warn(img) {
        Some(gray) => {
            let values = haar_features(&gray);
            let len = values.len();
            (values, len)
        }
        None => (Vec::new(), 0),
    }
}
