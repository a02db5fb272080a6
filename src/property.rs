//! Named properties of a single test image.
//!
//! Every property is a plain function `&TestImage -> Result<T, ImageError>`,
//! so it can be passed to [`TestImage::evaluate`] or called directly.
//!
//! ```
//! use testimages::{property, CanonicalPixel, PixelBuffer, TestImage};
//!
//! let image = TestImage::from_buffer(PixelBuffer::filled(3, 2, CanonicalPixel::WHITE).unwrap());
//! assert_eq!(image.evaluate(property::pixel_area).unwrap(), 6);
//! assert_eq!(image.evaluate(property::count(CanonicalPixel::WHITE)).unwrap(), 6);
//! ```

use alloc::string::String;

use crate::image::{ImageError, TestImage};
use crate::pixel::CanonicalPixel;

/// A value derived from one image.
pub trait ImageProperty<T> {
    /// Compute the value for `image`.
    fn evaluate(&self, image: &TestImage<'_>) -> Result<T, ImageError>;
}

impl<T, F> ImageProperty<T> for F
where
    F: Fn(&TestImage<'_>) -> Result<T, ImageError>,
{
    fn evaluate(&self, image: &TestImage<'_>) -> Result<T, ImageError> {
        self(image)
    }
}

/// Width in pixels.
pub fn pixel_width(image: &TestImage<'_>) -> Result<u32, ImageError> {
    Ok(image.width())
}

/// Height in pixels.
pub fn pixel_height(image: &TestImage<'_>) -> Result<u32, ImageError> {
    Ok(image.height())
}

/// Number of pixels.
pub fn pixel_area(image: &TestImage<'_>) -> Result<u64, ImageError> {
    Ok(u64::from(image.width()) * u64::from(image.height()))
}

/// See [`TestImage::checksum`].
pub fn checksum(image: &TestImage<'_>) -> Result<u64, ImageError> {
    image.checksum()
}

/// See [`TestImage::pixels_sha256_hex`].
pub fn pixels_sha256_hex(image: &TestImage<'_>) -> Result<String, ImageError> {
    image.pixels_sha256_hex()
}

/// Mean [`brightness`](CanonicalPixel::brightness) over all pixels.
pub fn average_brightness(image: &TestImage<'_>) -> Result<f64, ImageError> {
    let bitmap = image.bitmap()?;
    let total: f64 = bitmap.pixels().map(|p| f64::from(p.brightness())).sum();
    Ok(total / bitmap.area() as f64)
}

/// Pixels with alpha 0.
pub fn transparent_pixels_count(image: &TestImage<'_>) -> Result<usize, ImageError> {
    count_matching(image, CanonicalPixel::is_transparent)
}

/// Pixels with alpha 255.
pub fn opaque_pixels_count(image: &TestImage<'_>) -> Result<usize, ImageError> {
    count_matching(image, CanonicalPixel::is_opaque)
}

/// Pixels with alpha below 255, including fully transparent ones.
pub fn not_opaque_pixels_count(image: &TestImage<'_>) -> Result<usize, ImageError> {
    count_matching(image, |p| !p.is_opaque())
}

/// Property counting pixels equal to `color`.
///
/// Equality is alpha-aware, so counting any fully transparent color counts
/// every fully transparent pixel.
pub fn count(color: CanonicalPixel) -> impl Fn(&TestImage<'_>) -> Result<usize, ImageError> {
    move |image| count_matching(image, |p| p == color)
}

fn count_matching(
    image: &TestImage<'_>,
    predicate: impl Fn(CanonicalPixel) -> bool,
) -> Result<usize, ImageError> {
    Ok(image.bitmap()?.pixels().filter(|&p| predicate(p)).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;

    fn mixed() -> TestImage<'static> {
        // Row 0: opaque red, opaque red. Row 1: half transparent, transparent.
        let pixels = [
            CanonicalPixel::opaque(255, 0, 0),
            CanonicalPixel::opaque(255, 0, 0),
            CanonicalPixel::new(0, 0, 255, 128),
            CanonicalPixel::new(9, 9, 9, 0),
        ];
        TestImage::from_buffer(PixelBuffer::from_pixels(&pixels, 2, 2).unwrap())
    }

    #[test]
    fn dimensions() {
        let image = mixed();
        assert_eq!(image.evaluate(pixel_width).unwrap(), 2);
        assert_eq!(image.evaluate(pixel_height).unwrap(), 2);
        assert_eq!(image.evaluate(pixel_area).unwrap(), 4);
    }

    #[test]
    fn alpha_counts() {
        let image = mixed();
        assert_eq!(image.evaluate(transparent_pixels_count).unwrap(), 1);
        assert_eq!(image.evaluate(opaque_pixels_count).unwrap(), 2);
        assert_eq!(image.evaluate(not_opaque_pixels_count).unwrap(), 2);
    }

    #[test]
    fn color_count() {
        let image = mixed();
        assert_eq!(image.evaluate(count(CanonicalPixel::opaque(255, 0, 0))).unwrap(), 2);
        assert_eq!(image.evaluate(count(CanonicalPixel::TRANSPARENT)).unwrap(), 1);
        assert_eq!(image.evaluate(count(CanonicalPixel::WHITE)).unwrap(), 0);
    }

    #[test]
    fn brightness() {
        let white = PixelBuffer::filled(3, 3, CanonicalPixel::WHITE).unwrap();
        let white = TestImage::from_buffer(white);
        assert!((average_brightness(&white).unwrap() - 1.0).abs() < 1e-6);
        let black = PixelBuffer::filled(3, 3, CanonicalPixel::BLACK).unwrap();
        let black = TestImage::from_buffer(black);
        assert_eq!(average_brightness(&black).unwrap(), 0.0);
    }

    #[test]
    fn fingerprints_match_image() {
        let image = mixed();
        assert_eq!(image.evaluate(checksum).unwrap(), image.checksum().unwrap());
        assert_eq!(
            pixels_sha256_hex(&image).unwrap(),
            image.pixels_sha256_hex().unwrap()
        );
    }

    #[test]
    fn evaluation_is_repeatable() {
        let image = mixed();
        let property = count(CanonicalPixel::opaque(255, 0, 0));
        assert_eq!(
            property.evaluate(&image).unwrap(),
            property.evaluate(&image).unwrap()
        );
    }
}
