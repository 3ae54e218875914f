//! Photometric and geometric augmentation of face crops.
use image::{ImageBuffer, Pixel};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// `saturate(alpha * v + beta)` on every color channel, rounding to nearest.
/// Alpha channels are left untouched.
pub fn change_brightness<P>(img: &mut ImageBuffer<P, Vec<u8>>, alpha: f64, beta: f64)
where
    P: Pixel<Subpixel = u8>,
{
    for px in img.pixels_mut() {
        px.apply_without_alpha(|v| (alpha * v as f64 + beta).round().clamp(0.0, 255.0) as u8);
    }
}

/// Rotate counter-clockwise by `degrees` about the image center, keeping the
/// original size. Uncovered pixels take `fill`.
pub fn rotate<P>(img: &ImageBuffer<P, Vec<u8>>, degrees: f64, fill: P) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + Send + Sync,
{
    // imageproc rotates clockwise for positive angles
    let theta = -(degrees.to_radians()) as f32;
    rotate_about_center(img, theta, Interpolation::Bilinear, fill)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn brightness_saturates() {
        let mut img = GrayImage::from_raw(3, 1, vec![10, 100, 250]).unwrap();
        change_brightness(&mut img, 2.0, 10.0);
        assert_eq!(img.as_raw(), &vec![30, 210, 255]);
        change_brightness(&mut img, 1.0, -100.0);
        assert_eq!(img.as_raw(), &vec![0, 110, 155]);
    }

    #[test]
    fn brightness_keeps_alpha() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([100, 50, 0, 128]));
        change_brightness(&mut img, 0.5, 0.0);
        assert_eq!(img.get_pixel(1, 1), &Rgba([50, 25, 0, 128]));
    }

    #[test]
    fn rotation_keeps_size_and_center() {
        let mut img = GrayImage::new(8, 8);
        img.put_pixel(4, 4, Luma([200]));
        let out = rotate(&img, 90.0, Luma([0]));
        assert_eq!(out.dimensions(), (8, 8));
        assert!(out.get_pixel(4, 4)[0] >= 199);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn quarter_turn_moves_right_edge_to_top() {
        // bright column on the right; a counter-clockwise quarter turn moves it up
        let img = GrayImage::from_fn(8, 8, |x, _| Luma([if x == 6 { 255 } else { 0 }]));
        let out = rotate(&img, 90.0, Luma([0]));
        let top: u32 = (1..7).map(|x| out.get_pixel(x, 2)[0] as u32).sum();
        let right: u32 = (1..7).map(|y| out.get_pixel(6, y)[0] as u32).sum();
        assert!(top > right, "top {top} right {right}");
    }
}
