//! The canonicalizing test image façade.
//!
//! A [`TestImage`] wraps whatever an adapter produced and converts it into a
//! canonical [`PixelBuffer`] the first time anything needs pixels. The
//! buffer, its checksum and its digest are cached until
//! [`invalidate`](TestImage::invalidate) is called.
//!
//! ```
//! use testimages::{CanonicalPixel, PixelBuffer, TestImage};
//!
//! let buffer = PixelBuffer::filled(4, 4, CanonicalPixel::opaque(255, 0, 0)).unwrap();
//! let image = TestImage::from_buffer(buffer);
//! let corner = image.crop(0, 0, 2, 2).unwrap();
//! assert_eq!(corner.width(), 2);
//! assert!(image.compared_to(&image).by_exact_pixels().unwrap());
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::buffer::{BufferError, PixelBuffer};
use crate::cache::{CacheState, LazyCache};
use crate::comparison::ComparingPair;
use crate::format::{SourceFormat, SourcePixels};
use crate::hash::PixelDigest;
use crate::limits::{LimitExceeded, ResourceLimits};
use crate::pixel::CanonicalPixel;
use crate::property::ImageProperty;
use crate::search::{self, Occurrences};
use crate::source::{ImageSource, RenderFn, SourceError};

/// Errors from [`TestImage`] operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImageError {
    /// Geometry or comparison precondition failed.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// A configured resource limit was exceeded.
    #[error(transparent)]
    Limit(#[from] LimitExceeded),
    /// The source delivered pixels that cannot be canonicalized.
    #[error("unsupported source format {0}: convert to straight alpha first")]
    UnsupportedFormat(SourceFormat),
    /// The source failed to produce pixels.
    #[error("image source failed: {0}")]
    Source(#[source] SourceError),
    /// The checksum is none of the expected values.
    #[error("expected checksum {} but was {actual}", ExpectedChecksums(.expected))]
    ChecksumMismatch {
        /// Accepted checksums.
        expected: Vec<u64>,
        /// Checksum of the image.
        actual: u64,
    },
}

struct ExpectedChecksums<'e>(&'e [u64]);

impl fmt::Display for ExpectedChecksums<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [single] => write!(f, "{single}"),
            values => {
                f.write_str("any of ")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

enum Origin<'a> {
    Source(Box<dyn ImageSource + Send + Sync + 'a>),
    Buffer(PixelBuffer<'a, CanonicalPixel>),
}

/// Image under test, canonicalized on demand.
///
/// `TestImage` is `Send + Sync`; concurrent first accesses may convert the
/// source more than once but every caller observes the same published buffer.
pub struct TestImage<'a> {
    origin: Origin<'a>,
    limits: ResourceLimits,
    canonical: LazyCache<PixelBuffer<'static, CanonicalPixel>>,
    checksum: LazyCache<u64>,
    digest: LazyCache<PixelDigest>,
}

impl TestImage<'static> {
    /// Image over pixels already in memory.
    pub fn from_pixels(pixels: SourcePixels) -> Self {
        Self::from_source(pixels)
    }
}

impl<'a> TestImage<'a> {
    /// Image whose pixels come from an adapter.
    pub fn from_source(source: impl ImageSource + Send + Sync + 'a) -> Self {
        Self::with_origin(Origin::Source(Box::new(source)))
    }

    /// Image rendered by `render(width, height)` on first access.
    pub fn from_render<F>(width: u32, height: u32, render: F) -> Self
    where
        F: Fn(u32, u32) -> Result<SourcePixels, SourceError> + Send + Sync + 'a,
    {
        Self::from_source(RenderFn::new(width, height, render))
    }

    /// Image over an existing canonical buffer, borrowed or owned.
    pub fn from_buffer(buffer: PixelBuffer<'a, CanonicalPixel>) -> Self {
        Self::with_origin(Origin::Buffer(buffer))
    }

    fn with_origin(origin: Origin<'a>) -> Self {
        Self {
            origin,
            limits: ResourceLimits::none(),
            canonical: LazyCache::new(),
            checksum: LazyCache::new(),
            digest: LazyCache::new(),
        }
    }

    /// Apply resource limits to canonicalization and search.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Limits in effect.
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    /// Width in pixels, known without canonicalizing.
    pub fn width(&self) -> u32 {
        self.size().0
    }

    /// Height in pixels, known without canonicalizing.
    pub fn height(&self) -> u32 {
        self.size().1
    }

    /// `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        match &self.origin {
            Origin::Source(source) => source.dimensions(),
            Origin::Buffer(buffer) => buffer.size(),
        }
    }

    /// Whether the canonical buffer has been built.
    pub fn cache_state(&self) -> CacheState {
        match self.origin {
            Origin::Source(_) => self.canonical.state(),
            Origin::Buffer(_) => CacheState::Computed,
        }
    }

    /// The canonical pixels, converting the source on first call.
    ///
    /// # Errors
    ///
    /// Limit, source, format and geometry errors from the conversion,
    /// including a source that delivers a size other than it declared. A
    /// failed conversion is retried on the next call.
    pub fn bitmap(&self) -> Result<&PixelBuffer<'a, CanonicalPixel>, ImageError> {
        match &self.origin {
            Origin::Buffer(buffer) => Ok(buffer),
            Origin::Source(source) => {
                let canonical = self
                    .canonical
                    .get_or_try_init(|| self.canonicalize(source.as_ref()))?;
                Ok(canonical)
            }
        }
    }

    fn canonicalize(
        &self,
        source: &(dyn ImageSource + Send + Sync + 'a),
    ) -> Result<PixelBuffer<'static, CanonicalPixel>, ImageError> {
        let (width, height) = source.dimensions();
        self.limits.check_dimensions(width, height)?;
        let pixels = source.read_pixels().map_err(ImageError::Source)?;
        if (pixels.width(), pixels.height()) != (width, height) {
            return Err(BufferError::DimensionMismatch {
                left_width: width,
                left_height: height,
                right_width: pixels.width(),
                right_height: pixels.height(),
            }
            .into());
        }
        let format = pixels.format();
        let buffer = pixels.into_canonical()?;
        tracing::debug!(
            width = buffer.width(),
            height = buffer.height(),
            %format,
            "canonicalized test image"
        );
        Ok(buffer)
    }

    /// 64-bit checksum of the canonical pixels (see
    /// [`PixelBuffer::checksum`]).
    ///
    /// # Errors
    ///
    /// Errors from [`bitmap`](Self::bitmap).
    pub fn checksum(&self) -> Result<u64, ImageError> {
        self.checksum
            .get_or_try_init(|| Ok(self.bitmap()?.checksum()))
            .copied()
    }

    /// SHA-256 of the canonical pixels.
    ///
    /// # Errors
    ///
    /// Errors from [`bitmap`](Self::bitmap).
    pub fn pixels_digest(&self) -> Result<PixelDigest, ImageError> {
        self.digest
            .get_or_try_init(|| Ok(self.bitmap()?.digest()))
            .copied()
    }

    /// [`pixels_digest`](Self::pixels_digest) as uppercase hex.
    ///
    /// # Errors
    ///
    /// Errors from [`bitmap`](Self::bitmap).
    pub fn pixels_sha256_hex(&self) -> Result<String, ImageError> {
        Ok(self.pixels_digest()?.to_hex())
    }

    /// Legacy 32-bit pixel hash. Not cached.
    ///
    /// # Errors
    ///
    /// Errors from [`bitmap`](Self::bitmap).
    pub fn legacy_hash(&self) -> Result<i32, ImageError> {
        Ok(self.bitmap()?.legacy_hash())
    }

    /// Whether the checksum is one of `expected`.
    ///
    /// # Errors
    ///
    /// Errors from [`bitmap`](Self::bitmap).
    pub fn checksum_is_any_of(&self, expected: &[u64]) -> Result<bool, ImageError> {
        let actual = self.checksum()?;
        Ok(expected.contains(&actual))
    }

    /// Fail unless the checksum is one of `expected`.
    ///
    /// # Errors
    ///
    /// [`ImageError::ChecksumMismatch`] carrying the expected values and the
    /// actual checksum, or errors from [`bitmap`](Self::bitmap).
    pub fn assert_checksum_is_any_of(&self, expected: &[u64]) -> Result<(), ImageError> {
        let actual = self.checksum()?;
        if expected.contains(&actual) {
            Ok(())
        } else {
            Err(ImageError::ChecksumMismatch {
                expected: expected.to_vec(),
                actual,
            })
        }
    }

    /// Image over the `w` x `h` region at `(x, y)` of this image's pixels.
    ///
    /// The crop borrows this image's canonical buffer, so this image cannot
    /// be invalidated while the crop exists.
    ///
    /// # Errors
    ///
    /// [`BufferError::OutOfRange`] (wrapped) if the region does not fit, or
    /// errors from [`bitmap`](Self::bitmap).
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Result<TestImage<'_>, ImageError> {
        let view = self.bitmap()?.crop(x, y, w, h)?;
        Ok(TestImage::from_buffer(view).with_limits(self.limits))
    }

    /// Drop every cached value; the next access converts the source again.
    pub fn invalidate(&mut self) {
        let was = self.canonical.state();
        self.canonical.invalidate();
        self.checksum.invalidate();
        self.digest.invalidate();
        tracing::debug!(previous = ?was, "invalidated test image caches");
    }

    /// Whether both images have identical canonical pixels.
    ///
    /// # Errors
    ///
    /// Errors from [`bitmap`](Self::bitmap) on either image.
    pub fn pixels_equal(&self, other: &TestImage<'_>) -> Result<bool, ImageError> {
        Ok(self.bitmap()? == other.bitmap()?)
    }

    /// Every position where `needle` occurs in this image.
    ///
    /// # Errors
    ///
    /// [`LimitExceeded::SearchCandidates`] (wrapped) if the search is larger
    /// than this image's limits allow, or errors from
    /// [`bitmap`](Self::bitmap) on either image.
    pub fn find_occurrences<'s>(
        &'s self,
        needle: &'s TestImage<'_>,
    ) -> Result<Occurrences<'s, 's, CanonicalPixel>, ImageError> {
        let haystack = self.bitmap()?;
        let needle = needle.bitmap()?;
        self.limits.check_search(haystack.size(), needle.size())?;
        tracing::trace!(
            candidates = search::candidate_count(haystack.size(), needle.size()),
            "occurrence search"
        );
        Ok(search::find_occurrences(haystack, needle))
    }

    /// Evaluate a property of this image.
    ///
    /// # Errors
    ///
    /// Whatever the property returns.
    pub fn evaluate<T>(&self, property: impl ImageProperty<T>) -> Result<T, ImageError> {
        property.evaluate(self)
    }

    /// Pair this image with `other` for pairwise comparisons.
    pub fn compared_to<'p>(&'p self, other: &'p TestImage<'p>) -> ComparingPair<'p> {
        ComparingPair::new(self, other)
    }
}

impl fmt::Debug for TestImage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size();
        write!(f, "TestImage({width}x{height}, {:?})", self.cache_state())
    }
}
