//! `image` crate helpers for the descriptor encoders.
//!
//! These wrappers expose the `facetex-core` encoders in terms of
//! `image::ImageBuffer` / `image::DynamicImage`, which is what decoders hand
//! back.

use facetex_core::{batch, dispatch, FeatureParams, Features, ImageView};
use image::{imageops::FilterType, DynamicImage, ImageBuffer, Pixel};

/// Number of values [`brief`] prints.
pub const BRIEF_LEN: usize = 20;

/// Borrow an 8-bit image buffer as an [`ImageView`].
pub fn view_of<P>(img: &ImageBuffer<P, Vec<u8>>) -> facetex_core::Result<ImageView<'_>>
where
    P: Pixel<Subpixel = u8>,
{
    let channels = P::CHANNEL_COUNT as usize;
    let width = img.width() as usize;
    ImageView::new(
        img.as_raw(),
        width,
        img.height() as usize,
        channels,
        width * channels,
    )
}

/// Encode any decoded image. Gray, RGB and RGBA buffers are used as they are;
/// other layouts (16-bit, float, luma+alpha) are converted to RGB first.
pub fn extract_image(
    img: &DynamicImage,
    params: &FeatureParams,
) -> facetex_core::Result<Features> {
    match img {
        DynamicImage::ImageLuma8(buf) => Ok(dispatch::extract(&view_of(buf)?, params)),
        DynamicImage::ImageRgb8(buf) => Ok(dispatch::extract(&view_of(buf)?, params)),
        DynamicImage::ImageRgba8(buf) => Ok(dispatch::extract(&view_of(buf)?, params)),
        other => {
            let rgb = other.to_rgb8();
            Ok(dispatch::extract(&view_of(&rgb)?, params))
        }
    }
}

/// Encode a batch of grayscale images (in parallel).
pub fn extract_gray_batch(
    images: &[image::GrayImage],
    params: &FeatureParams,
) -> facetex_core::Result<Vec<Features>> {
    let views = images
        .iter()
        .map(view_of)
        .collect::<facetex_core::Result<Vec<_>>>()?;
    Ok(batch::extract_batch(&views, params))
}

/// Resize to exactly `width × height`; images already at that size are
/// returned unchanged.
pub fn resize_face(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Short preview of a feature vector for log lines: the first
/// [`BRIEF_LEN`] values and the total length.
pub fn brief(values: &[f32]) -> String {
    let shown: Vec<String> = values
        .iter()
        .take(BRIEF_LEN)
        .map(|v| v.to_string())
        .collect();
    let more = if values.len() > BRIEF_LEN { ",..." } else { "" };
    format!("[{}{more}] ({} values)", shown.join(","), values.len())
}
