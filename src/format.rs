//! Raw pixel formats accepted from image sources.
//!
//! [`SourcePixels`] is what an adapter hands over: bytes plus a compact
//! [`SourceFormat`] descriptor. Straight-alpha BGRA8 is the canonical layout
//! and is adopted without copying; other 8-bit layouts are converted pixel by
//! pixel. Premultiplied data is rejected rather than guessed at.

use alloc::vec::Vec;
use core::fmt;

use bytemuck::Pod;
use imgref::ImgRef;
use rgb::alt::BGRA;
use rgb::{Rgb, Rgba};

use crate::buffer::{BufferError, PixelBuffer};
use crate::image::ImageError;
use crate::pixel::CanonicalPixel;

// ---------------------------------------------------------------------------
// Descriptor enums
// ---------------------------------------------------------------------------

/// Channel layout (number, order and meaning of 8-bit channels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum ChannelLayout {
    /// Single luminance channel.
    Gray = 1,
    /// Luminance + alpha.
    GrayAlpha = 2,
    /// Red, green, blue.
    Rgb = 3,
    /// Blue, green, red.
    Bgr = 4,
    /// Red, green, blue, alpha.
    Rgba = 5,
    /// Blue, green, red, alpha (Windows/DirectX byte order).
    Bgra = 6,
}

impl ChannelLayout {
    /// Number of channels in this layout.
    #[inline]
    pub const fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    /// Whether this layout includes an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba | Self::Bgra)
    }

    /// Decode one pixel of this layout. `px` holds exactly
    /// [`channels()`](Self::channels) bytes.
    #[inline]
    fn decode(self, px: &[u8], alpha: AlphaMode) -> CanonicalPixel {
        let pixel = match self {
            Self::Gray => CanonicalPixel::opaque(px[0], px[0], px[0]),
            Self::GrayAlpha => CanonicalPixel::new(px[0], px[0], px[0], px[1]),
            Self::Rgb => CanonicalPixel::opaque(px[0], px[1], px[2]),
            Self::Bgr => CanonicalPixel::opaque(px[2], px[1], px[0]),
            Self::Rgba => CanonicalPixel::new(px[0], px[1], px[2], px[3]),
            Self::Bgra => CanonicalPixel::new(px[2], px[1], px[0], px[3]),
        };
        // A fourth channel without alpha meaning is padding (BGRX, RGBX).
        if alpha == AlphaMode::None {
            CanonicalPixel { a: u8::MAX, ..pixel }
        } else {
            pixel
        }
    }
}

/// Alpha channel interpretation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum AlphaMode {
    /// No alpha channel, or an alpha byte that is padding.
    None = 0,
    /// Straight (unassociated) alpha.
    Straight = 1,
    /// Premultiplied (associated) alpha.
    Premultiplied = 2,
}

// ---------------------------------------------------------------------------
// SourceFormat
// ---------------------------------------------------------------------------

/// Compact descriptor of 8-bit source pixels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SourceFormat {
    /// Channel layout.
    pub layout: ChannelLayout,
    /// Alpha interpretation.
    pub alpha: AlphaMode,
}

impl SourceFormat {
    /// Create a format descriptor.
    pub const fn new(layout: ChannelLayout, alpha: AlphaMode) -> Self {
        Self { layout, alpha }
    }

    /// Canonical layout: BGRA with straight alpha.
    pub const BGRA8: Self = Self::new(ChannelLayout::Bgra, AlphaMode::Straight);
    /// BGRA with premultiplied alpha. Not accepted for canonicalization.
    pub const PBGRA8: Self = Self::new(ChannelLayout::Bgra, AlphaMode::Premultiplied);
    /// BGR with an ignored fourth byte.
    pub const BGRX8: Self = Self::new(ChannelLayout::Bgra, AlphaMode::None);
    /// RGBA with straight alpha.
    pub const RGBA8: Self = Self::new(ChannelLayout::Rgba, AlphaMode::Straight);
    /// RGB.
    pub const RGB8: Self = Self::new(ChannelLayout::Rgb, AlphaMode::None);
    /// BGR.
    pub const BGR8: Self = Self::new(ChannelLayout::Bgr, AlphaMode::None);
    /// Grayscale.
    pub const GRAY8: Self = Self::new(ChannelLayout::Gray, AlphaMode::None);
    /// Grayscale with straight alpha.
    pub const GRAYA8: Self = Self::new(ChannelLayout::GrayAlpha, AlphaMode::Straight);

    /// Bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.layout.channels()
    }

    /// Whether pixels of this format can be adopted as canonical without
    /// conversion.
    #[inline]
    pub fn is_canonical(self) -> bool {
        self == Self::BGRA8
    }

    /// Whether canonicalization accepts this format.
    #[inline]
    pub fn is_supported(self) -> bool {
        self.alpha != AlphaMode::Premultiplied
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = match self.layout {
            ChannelLayout::Gray => "Gray8",
            ChannelLayout::GrayAlpha => "GrayAlpha8",
            ChannelLayout::Rgb => "Rgb8",
            ChannelLayout::Bgr => "Bgr8",
            ChannelLayout::Rgba => "Rgba8",
            ChannelLayout::Bgra => "Bgra8",
        };
        let alpha = match self.alpha {
            AlphaMode::None => "no alpha",
            AlphaMode::Straight => "straight alpha",
            AlphaMode::Premultiplied => "premultiplied alpha",
        };
        write!(f, "{layout} ({alpha})")
    }
}

// ---------------------------------------------------------------------------
// SourcePixels
// ---------------------------------------------------------------------------

/// Raw pixels read from an image source.
#[derive(Clone, PartialEq, Eq)]
pub struct SourcePixels {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
    format: SourceFormat,
}

impl SourcePixels {
    /// Wrap tightly packed pixel bytes.
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: SourceFormat) -> Self {
        Self {
            data,
            width,
            height,
            stride: width as usize * format.bytes_per_pixel(),
            format,
        }
    }

    /// Override the row stride in bytes.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Copy a straight-alpha BGRA image.
    pub fn from_bgra8(img: ImgRef<'_, BGRA<u8>>) -> Self {
        Self::from_img(img, SourceFormat::BGRA8)
    }

    /// Copy a straight-alpha RGBA image.
    pub fn from_rgba8(img: ImgRef<'_, Rgba<u8>>) -> Self {
        Self::from_img(img, SourceFormat::RGBA8)
    }

    /// Copy an RGB image.
    pub fn from_rgb8(img: ImgRef<'_, Rgb<u8>>) -> Self {
        Self::from_img(img, SourceFormat::RGB8)
    }

    fn from_img<P: Pod>(img: ImgRef<'_, P>, format: SourceFormat) -> Self {
        let data: Vec<u8> = img
            .rows()
            .flat_map(|row| bytemuck::cast_slice::<P, u8>(row).iter().copied())
            .collect();
        // Oversized dimensions surface as a geometry error on conversion.
        let to_u32 = |v: usize| u32::try_from(v).unwrap_or(u32::MAX);
        Self::new(data, to_u32(img.width()), to_u32(img.height()), format)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel format.
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Convert to a canonical buffer.
    ///
    /// Straight-alpha BGRA8 storage is adopted as is. Other layouts are
    /// converted into a tightly packed buffer.
    ///
    /// # Errors
    ///
    /// [`ImageError::UnsupportedFormat`] for premultiplied alpha, and
    /// [`ImageError::Buffer`] if the geometry does not fit the data.
    pub fn into_canonical(self) -> Result<PixelBuffer<'static, CanonicalPixel>, ImageError> {
        let Self {
            data,
            width,
            height,
            stride,
            format,
        } = self;
        if !format.is_supported() {
            return Err(ImageError::UnsupportedFormat(format));
        }
        if format.is_canonical() {
            return Ok(PixelBuffer::from_vec(data, width, height, Some(stride))?);
        }

        let bpp = format.bytes_per_pixel();
        let row_width = width
            .checked_mul(bpp as u32)
            .ok_or(BufferError::InvalidDimensions { width, height })?;
        let raw = PixelBuffer::<u8>::from_bytes(&data, row_width, height, Some(stride))?;

        let mut canonical = Vec::with_capacity(width as usize * height as usize * 4);
        for row in raw.rows() {
            for px in row.chunks_exact(bpp) {
                let pixel = format.layout.decode(px, format.alpha);
                canonical.extend_from_slice(bytemuck::bytes_of(&pixel));
            }
        }
        Ok(PixelBuffer::from_vec(canonical, width, height, None)?)
    }
}

impl fmt::Debug for SourcePixels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SourcePixels({}x{}, {}, stride {})",
            self.width, self.height, self.format, self.stride
        )
    }
}
