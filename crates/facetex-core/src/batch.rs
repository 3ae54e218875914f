//! Encode many images with the same parameters.
use crate::dispatch::{extract, Features};
use crate::image::ImageView;
use crate::FeatureParams;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Run [`extract`] over every view, preserving input order.
///
/// With the `rayon` feature the images are encoded in parallel; the output is
/// identical to the sequential path.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(images), fields(kind = %params.kind, n = images.len()))
)]
pub fn extract_batch(images: &[ImageView<'_>], params: &FeatureParams) -> Vec<Features> {
    #[cfg(feature = "rayon")]
    let out: Vec<Features> = images.par_iter().map(|img| extract(img, params)).collect();

    #[cfg(not(feature = "rayon"))]
    let out: Vec<Features> = images.iter().map(|img| extract(img, params)).collect();

    out
}
