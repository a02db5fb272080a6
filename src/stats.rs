//! Perceptual distance statistics between two canonical buffers.

use crate::buffer::{BufferError, PixelBuffer, zip_pixels};
use crate::pixel::CanonicalPixel;

/// Running variance of a stream of samples.
///
/// Single pass and numerically stable: the deviation term is updated from the
/// running sum, so no sample is revisited and large means do not cancel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VarianceAccumulator {
    count: u64,
    sum: f64,
    deviation: f64,
}

impl VarianceAccumulator {
    /// Empty accumulator.
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            deviation: 0.0,
        }
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Fold one sample into the running state.
    pub fn add_sample(&mut self, x: f64) {
        self.count += 1;
        self.sum += x;
        if self.count > 1 {
            let n = self.count as f64;
            let d = n * x - self.sum;
            self.deviation += d * d / (n * (n - 1.0));
        }
    }

    /// Number of samples added since the last [`clear`](Self::clear).
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean, NaN when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.sum / self.count as f64
    }

    /// Sample variance `M / (n - 1)`. NaN with fewer than two samples.
    pub fn variance(&self) -> f64 {
        if self.count <= 1 {
            return f64::NAN;
        }
        self.deviation / (self.count - 1) as f64
    }

    /// Square root of [`variance`](Self::variance).
    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl Extend<f64> for VarianceAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add_sample(x);
        }
    }
}

impl FromIterator<f64> for VarianceAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

/// Accumulate the per-pixel [`distance`](CanonicalPixel::distance) between
/// two buffers.
///
/// # Errors
///
/// Returns [`BufferError::DimensionMismatch`] if the buffers differ in size.
pub fn distance_statistics(
    left: &PixelBuffer<'_, CanonicalPixel>,
    right: &PixelBuffer<'_, CanonicalPixel>,
) -> Result<VarianceAccumulator, BufferError> {
    Ok(zip_pixels(left, right)?
        .map(|(a, b)| f64::from(a.distance(b)))
        .collect())
}

/// Variance of the per-pixel distance between two equally sized buffers.
///
/// NaN for single-pixel buffers.
///
/// # Errors
///
/// Returns [`BufferError::DimensionMismatch`] if the buffers differ in size.
pub fn variance(
    left: &PixelBuffer<'_, CanonicalPixel>,
    right: &PixelBuffer<'_, CanonicalPixel>,
) -> Result<f64, BufferError> {
    Ok(distance_statistics(left, right)?.variance())
}

/// Standard deviation of the per-pixel distance between two equally sized
/// buffers.
///
/// # Errors
///
/// Returns [`BufferError::DimensionMismatch`] if the buffers differ in size.
pub fn standard_deviation(
    left: &PixelBuffer<'_, CanonicalPixel>,
    right: &PixelBuffer<'_, CanonicalPixel>,
) -> Result<f64, BufferError> {
    Ok(distance_statistics(left, right)?.standard_deviation())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_variance(samples: &[f64]) -> f64 {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0)
    }

    #[test]
    fn matches_two_pass_variance() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let acc: VarianceAccumulator = samples.iter().copied().collect();
        assert_eq!(acc.count(), 8);
        assert!((acc.variance() - naive_variance(&samples)).abs() < 1e-12);
        assert!((acc.mean() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn stable_with_large_offset() {
        let samples: Vec<f64> = [4.0, 7.0, 13.0, 16.0].iter().map(|x| x + 1e9).collect();
        let acc: VarianceAccumulator = samples.iter().copied().collect();
        assert!((acc.variance() - 30.0).abs() < 1e-3, "{}", acc.variance());
    }

    #[test]
    fn fewer_than_two_samples_is_nan() {
        let mut acc = VarianceAccumulator::new();
        assert!(acc.variance().is_nan());
        acc.add_sample(3.0);
        assert!(acc.variance().is_nan());
        assert!(acc.standard_deviation().is_nan());
        acc.add_sample(3.0);
        assert_eq!(acc.variance(), 0.0);
    }

    #[test]
    fn clear_resets() {
        let mut acc: VarianceAccumulator = [1.0, 2.0, 3.0].into_iter().collect();
        acc.clear();
        assert_eq!(acc, VarianceAccumulator::default());
        acc.extend([10.0, 12.0]);
        assert!((acc.variance() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn identical_buffers_have_zero_spread() {
        let red = PixelBuffer::filled(4, 4, CanonicalPixel::opaque(255, 0, 0)).unwrap();
        assert_eq!(variance(&red, &red).unwrap(), 0.0);
        assert_eq!(standard_deviation(&red, &red).unwrap(), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = PixelBuffer::from_fn(5, 3, |x, y| CanonicalPixel::opaque(x as u8 * 40, y as u8, 9))
            .unwrap();
        let b = PixelBuffer::from_fn(5, 3, |x, _| CanonicalPixel::new(0, 0, x as u8, 128)).unwrap();
        let ab = variance(&a, &b).unwrap();
        let ba = variance(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-12);
        assert!(ab > 0.0);
    }

    #[test]
    fn dimension_mismatch() {
        let a = PixelBuffer::filled(2, 2, CanonicalPixel::BLACK).unwrap();
        let b = PixelBuffer::filled(2, 3, CanonicalPixel::BLACK).unwrap();
        assert!(matches!(
            variance(&a, &b),
            Err(BufferError::DimensionMismatch { .. })
        ));
        assert!(standard_deviation(&b, &a).is_err());
    }

    #[test]
    fn single_pixel_buffers_are_nan() {
        let a = PixelBuffer::filled(1, 1, CanonicalPixel::BLACK).unwrap();
        assert!(variance(&a, &a).unwrap().is_nan());
    }

    #[test]
    fn one_differing_pixel() {
        // Distances: three zeros and one sqrt(3).
        let mut pixels = [CanonicalPixel::BLACK; 4];
        let a = PixelBuffer::from_pixels(&pixels, 2, 2).unwrap();
        pixels[0] = CanonicalPixel::WHITE;
        let b = PixelBuffer::from_pixels(&pixels, 2, 2).unwrap();
        let expected = naive_variance(&[3f64.sqrt(), 0.0, 0.0, 0.0]);
        assert!((variance(&a, &b).unwrap() - expected).abs() < 1e-5);
    }
}
