//! Local Ternary Pattern histogram.
use crate::dispatch::gray_or_warn;
use crate::image::{GrayPlane, ImageView};
use crate::neighborhood::for_each_interior;
use crate::LTP_FEATURE_LENGTH;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// `(above, within)` weights per neighbor: `2·3^(7-k)` when the neighbor is
/// above the band, `3^(7-k)` when it is inside it.
pub const LTP_WEIGHTS: [(u32, u32); 8] = [
    (4374, 2187),
    (1458, 729),
    (486, 243),
    (162, 81),
    (54, 27),
    (18, 9),
    (6, 3),
    (2, 1),
];

/// Ternary state of `value` against the band `[center - t, center + t]`.
///
/// 2 above the band, 1 inside (inclusive), 0 below.
#[inline]
pub fn ternary_state(value: i32, center: i32, threshold: i32) -> u8 {
    // widened so any i32 threshold is representable
    let (v, c, t) = (i64::from(value), i64::from(center), i64::from(threshold));
    if v > c + t {
        2
    } else if v >= c - t && v <= c + t {
        1
    } else {
        0
    }
}

#[inline]
pub(crate) fn state_weight(state: u8, weights: (u32, u32)) -> u32 {
    match state {
        2 => weights.0,
        1 => weights.1,
        _ => 0,
    }
}

/// LTP code of one pixel; always below 6561.
#[inline]
pub fn ltp_code(center: u8, ring: &[u8; 8], threshold: i32) -> u32 {
    let c = center as i32;
    ring.iter()
        .zip(LTP_WEIGHTS.iter())
        .map(|(&n, &w)| state_weight(ternary_state(n as i32, c, threshold), w))
        .sum()
}

/// LTP histogram over the interior of `gray`, sized to the canonical length.
pub fn ltp_histogram(gray: &GrayPlane, threshold: i32) -> Vec<f32> {
    let mut hist = vec![0.0f32; LTP_FEATURE_LENGTH];
    for_each_interior(gray, |c, ring| {
        let code = ltp_code(c, ring, threshold) as usize;
        debug_assert!(code < LTP_FEATURE_LENGTH, "LTP code {code} out of range");
        hist[code] += 1.0;
    });
    hist
}

/// LTP descriptor of an image. Empty when the channel count is unsupported.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(img), fields(w = img.width(), h = img.height()))
)]
pub fn compute_ltp(img: &ImageView<'_>, threshold: i32) -> Vec<f32> {
    match gray_or_warn(img) {
        Some(gray) => ltp_histogram(&gray, threshold),
        None => Vec::new(),
    }
}
