//! Local Binary Pattern histogram.
use crate::dispatch::gray_or_warn;
use crate::image::{GrayPlane, ImageView};
use crate::neighborhood::for_each_interior;
use crate::LBP_FEATURE_LENGTH;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Bit weights in neighbor order (most significant bit first).
pub const LBP_WEIGHTS: [u8; 8] = [128, 64, 32, 16, 8, 4, 2, 1];

/// 8-bit LBP code: bit `7-k` is set when the center is strictly brighter
/// than neighbor `k`. Every comparison contributes independently.
#[inline]
pub fn lbp_code(center: u8, ring: &[u8; 8]) -> u8 {
    let mut code = 0u8;
    for (&n, &w) in ring.iter().zip(LBP_WEIGHTS.iter()) {
        if center > n {
            code |= w;
        }
    }
    code
}

/// 256-bin histogram of LBP codes over the interior of `gray` (raw counts).
pub fn lbp_histogram(gray: &GrayPlane) -> Vec<f32> {
    let mut hist = vec![0.0f32; LBP_FEATURE_LENGTH];
    for_each_interior(gray, |c, ring| {
        hist[lbp_code(c, ring) as usize] += 1.0;
    });
    hist
}

/// LBP descriptor of an image. Empty when the channel count is unsupported.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(img), fields(w = img.width(), h = img.height()))
)]
pub fn compute_lbp(img: &ImageView<'_>) -> Vec<f32> {
    match gray_or_warn(img) {
        Some(gray) => lbp_histogram(&gray),
        None => Vec::new(),
    }
}
