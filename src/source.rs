//! Adapters that supply raw pixels to a [`TestImage`](crate::TestImage).

use alloc::boxed::Box;
use core::fmt;

use crate::format::SourcePixels;

/// Error type adapters report failures with.
pub type SourceError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Something that can produce pixels for a test image.
///
/// Implemented by framework adapters. [`dimensions`](ImageSource::dimensions)
/// must be cheap since it is queried before any pixels are read;
/// [`read_pixels`](ImageSource::read_pixels) may render, copy, or decode.
pub trait ImageSource {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Produce the pixels. May be called again after the owning image is
    /// invalidated, and should then reflect the source's current content.
    fn read_pixels(&self) -> Result<SourcePixels, SourceError>;
}

impl ImageSource for SourcePixels {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn read_pixels(&self) -> Result<SourcePixels, SourceError> {
        Ok(self.clone())
    }
}

impl<S: ImageSource + ?Sized> ImageSource for &S {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn read_pixels(&self) -> Result<SourcePixels, SourceError> {
        (**self).read_pixels()
    }
}

impl<S: ImageSource + ?Sized> ImageSource for Box<S> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn read_pixels(&self) -> Result<SourcePixels, SourceError> {
        (**self).read_pixels()
    }
}

/// Source backed by a render callback invoked with the target size.
pub struct RenderFn<F> {
    width: u32,
    height: u32,
    render: F,
}

impl<F> RenderFn<F>
where
    F: Fn(u32, u32) -> Result<SourcePixels, SourceError>,
{
    /// Render `width` x `height` pixels on demand.
    pub fn new(width: u32, height: u32, render: F) -> Self {
        Self {
            width,
            height,
            render,
        }
    }
}

impl<F> ImageSource for RenderFn<F>
where
    F: Fn(u32, u32) -> Result<SourcePixels, SourceError>,
{
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_pixels(&self) -> Result<SourcePixels, SourceError> {
        (self.render)(self.width, self.height)
    }
}

impl<F> fmt::Debug for RenderFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderFn({}x{})", self.width, self.height)
    }
}
