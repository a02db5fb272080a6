//! Canonical pixel buffers and comparison primitives for visual tests.
//!
//! Adapters for UI and image frameworks hand raw pixels to a [`TestImage`],
//! which converts them once into a [`PixelBuffer`] of [`CanonicalPixel`]s.
//! Everything else works on that canonical buffer only:
//!
//! - [`PixelBuffer`]: row-addressed pixels with zero-copy [`crop`](PixelBuffer::crop)
//! - equality, [`legacy_hash`](PixelBuffer::legacy_hash),
//!   [`checksum`](PixelBuffer::checksum) and [`digest`](PixelBuffer::digest)
//! - [`variance`] / [`standard_deviation`] of the per-pixel color distance
//! - [`find_occurrences`] of one buffer inside another
//! - [`property`] evaluators and [`ComparingPair`] / [`Comparison`]
//! - [`ResourceLimits`] guarding conversion and search
//!
//! ```
//! use testimages::{CanonicalPixel, SourceFormat, SourcePixels, TestImage};
//!
//! let red = CanonicalPixel::opaque(255, 0, 0);
//! let bytes = bytemuck::bytes_of(&red).repeat(16);
//! let image = TestImage::from_pixels(SourcePixels::new(bytes, 4, 4, SourceFormat::BGRA8));
//!
//! let checksum = image.checksum().unwrap();
//! image.assert_checksum_is_any_of(&[checksum]).unwrap();
//! assert_eq!(image.compared_to(&image).by_standard_deviation().unwrap(), 0.0);
//! ```

#![forbid(unsafe_code)]

extern crate alloc;

mod buffer;
mod cache;
mod comparison;
mod format;
mod hash;
mod image;
mod limits;
mod pixel;
pub mod property;
mod search;
mod source;
mod stats;

pub use buffer::{BufferError, PixelBuffer, Rect, zip_pixels};
pub use cache::CacheState;
pub use comparison::{ComparingPair, Comparison};
pub use format::{AlphaMode, ChannelLayout, SourceFormat, SourcePixels};
pub use hash::PixelDigest;
pub use image::{ImageError, TestImage};
pub use limits::{LimitExceeded, ResourceLimits};
pub use pixel::{CanonicalPixel, Pixel};
pub use property::ImageProperty;
pub use search::{Occurrences, Point, candidate_count, find_occurrences};
pub use source::{ImageSource, RenderFn, SourceError};
pub use stats::{VarianceAccumulator, distance_statistics, standard_deviation, variance};

// Re-exports for adapter implementors.
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb;
pub use rgb::alt::BGRA as Bgra;
pub use rgb::{Rgb, Rgba};
