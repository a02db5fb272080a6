//! Pairwise comparisons between test images.
//!
//! [`ComparingPair`] compares two images directly. [`Comparison`] binds a
//! reference image and hands out evaluators that compare any subject against
//! it, usable wherever an [`ImageProperty`](crate::ImageProperty) is.

use crate::image::{ImageError, TestImage};
use crate::stats;

/// Two images compared left against right.
#[derive(Clone, Copy, Debug)]
pub struct ComparingPair<'p> {
    left: &'p TestImage<'p>,
    right: &'p TestImage<'p>,
}

impl<'p> ComparingPair<'p> {
    /// Pair `left` with `right`.
    pub fn new(left: &'p TestImage<'p>, right: &'p TestImage<'p>) -> Self {
        Self { left, right }
    }

    /// Left image.
    pub fn left(&self) -> &'p TestImage<'p> {
        self.left
    }

    /// Right image.
    pub fn right(&self) -> &'p TestImage<'p> {
        self.right
    }

    /// Whether the canonical pixels are identical.
    ///
    /// # Errors
    ///
    /// Canonicalization errors of either image.
    pub fn by_exact_pixels(&self) -> Result<bool, ImageError> {
        self.left.pixels_equal(self.right)
    }

    /// Variance of the per-pixel distance.
    ///
    /// # Errors
    ///
    /// [`BufferError::DimensionMismatch`](crate::BufferError::DimensionMismatch)
    /// if the sizes differ, or canonicalization errors.
    pub fn by_variance(&self) -> Result<f64, ImageError> {
        Ok(stats::variance(self.left.bitmap()?, self.right.bitmap()?)?)
    }

    /// Standard deviation of the per-pixel distance.
    ///
    /// # Errors
    ///
    /// Same as [`by_variance`](Self::by_variance).
    pub fn by_standard_deviation(&self) -> Result<f64, ImageError> {
        Ok(stats::standard_deviation(
            self.left.bitmap()?,
            self.right.bitmap()?,
        )?)
    }

    /// `left.width - right.width`.
    pub fn by_pixel_width(&self) -> i64 {
        i64::from(self.left.width()) - i64::from(self.right.width())
    }

    /// `left.height - right.height`.
    pub fn by_pixel_height(&self) -> i64 {
        i64::from(self.left.height()) - i64::from(self.right.height())
    }

    /// `left.area - right.area`, saturating.
    pub fn by_pixel_area(&self) -> i64 {
        let area = |image: &TestImage<'_>| {
            i64::try_from(u64::from(image.width()) * u64::from(image.height()))
                .unwrap_or(i64::MAX)
        };
        area(self.left).saturating_sub(area(self.right))
    }

    /// How often the right image occurs inside the left one.
    ///
    /// # Errors
    ///
    /// Search limits of the left image, or canonicalization errors.
    pub fn by_occurrences(&self) -> Result<usize, ImageError> {
        Ok(self.left.find_occurrences(self.right)?.count())
    }
}

/// Evaluators comparing a subject image against a fixed reference.
///
/// ```
/// use testimages::{CanonicalPixel, Comparison, PixelBuffer, TestImage};
///
/// let reference = TestImage::from_buffer(PixelBuffer::filled(2, 2, CanonicalPixel::BLACK).unwrap());
/// let subject = TestImage::from_buffer(PixelBuffer::filled(2, 2, CanonicalPixel::BLACK).unwrap());
/// let same = Comparison::with(&reference).by_exact_pixels();
/// assert!(subject.evaluate(same).unwrap());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Comparison<'r> {
    reference: &'r TestImage<'r>,
}

impl<'r> Comparison<'r> {
    /// Bind `reference` as the right-hand side of every comparison.
    pub fn with(reference: &'r TestImage<'r>) -> Self {
        Self { reference }
    }

    /// Reference image.
    pub fn reference(&self) -> &'r TestImage<'r> {
        self.reference
    }

    /// See [`ComparingPair::by_exact_pixels`].
    pub fn by_exact_pixels(self) -> impl Fn(&TestImage<'_>) -> Result<bool, ImageError> + 'r {
        move |subject| subject.compared_to(self.reference).by_exact_pixels()
    }

    /// See [`ComparingPair::by_variance`].
    pub fn by_variance(self) -> impl Fn(&TestImage<'_>) -> Result<f64, ImageError> + 'r {
        move |subject| subject.compared_to(self.reference).by_variance()
    }

    /// See [`ComparingPair::by_standard_deviation`].
    pub fn by_standard_deviation(
        self,
    ) -> impl Fn(&TestImage<'_>) -> Result<f64, ImageError> + 'r {
        move |subject| subject.compared_to(self.reference).by_standard_deviation()
    }

    /// See [`ComparingPair::by_pixel_width`].
    pub fn by_pixel_width(self) -> impl Fn(&TestImage<'_>) -> Result<i64, ImageError> + 'r {
        move |subject| Ok(subject.compared_to(self.reference).by_pixel_width())
    }

    /// See [`ComparingPair::by_pixel_height`].
    pub fn by_pixel_height(self) -> impl Fn(&TestImage<'_>) -> Result<i64, ImageError> + 'r {
        move |subject| Ok(subject.compared_to(self.reference).by_pixel_height())
    }

    /// See [`ComparingPair::by_pixel_area`].
    pub fn by_pixel_area(self) -> impl Fn(&TestImage<'_>) -> Result<i64, ImageError> + 'r {
        move |subject| Ok(subject.compared_to(self.reference).by_pixel_area())
    }

    /// See [`ComparingPair::by_occurrences`]. The reference is the needle.
    pub fn by_occurrences(self) -> impl Fn(&TestImage<'_>) -> Result<usize, ImageError> + 'r {
        move |subject| subject.compared_to(self.reference).by_occurrences()
    }
}
