//! Center-Symmetric Local Ternary Pattern histogram.
use crate::dispatch::gray_or_warn;
use crate::image::{GrayPlane, ImageView};
use crate::ltp::state_weight;
use crate::neighborhood::{for_each_interior, SYMMETRIC_PAIRS};
use crate::CSLTP_FEATURE_LENGTH;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// `(above, within)` weights per symmetric pair.
pub const CSLTP_WEIGHTS: [(u32, u32); 4] = [(54, 27), (18, 9), (6, 3), (2, 1)];

/// Ternary state of a pair difference against `[-t, t]`.
#[inline]
fn pair_state(diff: i32, threshold: i32) -> u8 {
    let (d, t) = (i64::from(diff), i64::from(threshold));
    if d > t {
        2
    } else if d >= -t && d <= t {
        1
    } else {
        0
    }
}

/// CS-LTP code of one pixel; always below 81.
#[inline]
pub fn csltp_code(ring: &[u8; 8], threshold: i32) -> u32 {
    SYMMETRIC_PAIRS
        .iter()
        .zip(CSLTP_WEIGHTS.iter())
        .map(|(&(a, b), &w)| {
            let diff = ring[a] as i32 - ring[b] as i32;
            state_weight(pair_state(diff, threshold), w)
        })
        .sum()
}

/// CS-LTP histogram over the interior of `gray`, sized to the canonical
/// length.
pub fn csltp_histogram(gray: &GrayPlane, threshold: i32) -> Vec<f32> {
    let mut hist = vec![0.0f32; CSLTP_FEATURE_LENGTH];
    for_each_interior(gray, |_, ring| {
        let code = csltp_code(ring, threshold) as usize;
        debug_assert!(code < CSLTP_FEATURE_LENGTH, "CS-LTP code {code} out of range");
        hist[code] += 1.0;
    });
    hist
}

/// CS-LTP descriptor of an image. Empty when the channel count is
/// unsupported.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "trace", skip(img), fields(w = img.width(), h = img.height()))
)]
pub fn compute_csltp(img: &ImageView<'_>, threshold: i32) -> Vec<f32> {
    match gray_or_warn(img) {
        Some(gray) => csltp_histogram(&gray, threshold),
        None => Vec::new(),
    }
}
