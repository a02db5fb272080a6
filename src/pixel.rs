//! Pixel element types.
//!
//! [`CanonicalPixel`] is the single representation every adapter is converted
//! into before comparison. [`Pixel`] is the bound a [`PixelBuffer`](crate::PixelBuffer)
//! places on its element type.

use core::fmt;
use core::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};
use rgb::alt::BGRA;
use rgb::{Rgb, Rgba};

/// Element type of a [`PixelBuffer`](crate::PixelBuffer).
///
/// Pixels are plain old data so a buffer can reinterpret raw rows in place.
/// Equality may be coarser than bitwise equality (see [`CanonicalPixel`]);
/// [`canonical`](Pixel::canonical) must map every member of an equality class
/// to the same bit pattern, and [`legacy_hash`](Pixel::legacy_hash) must agree
/// with equality.
pub trait Pixel: Pod + PartialEq + fmt::Debug {
    /// Representative value with all don't-care bits cleared.
    ///
    /// Checksums and digests hash the bytes of this value.
    #[inline]
    fn canonical(self) -> Self {
        self
    }

    /// 32-bit hash used by the legacy buffer hash.
    fn legacy_hash(&self) -> i32;
}

impl Pixel for u8 {
    #[inline]
    fn legacy_hash(&self) -> i32 {
        i32::from(*self)
    }
}

impl Pixel for u16 {
    #[inline]
    fn legacy_hash(&self) -> i32 {
        i32::from(*self)
    }
}

impl Pixel for u32 {
    #[inline]
    fn legacy_hash(&self) -> i32 {
        *self as i32
    }
}

/// Straight-alpha 8-bit pixel, stored in BGRA byte order.
///
/// A fully transparent pixel is a void value: any two pixels with `a == 0`
/// compare equal, hash equal and have zero [`distance`](Self::distance)
/// regardless of their color channels.
#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
pub struct CanonicalPixel {
    /// Blue channel.
    pub b: u8,
    /// Green channel.
    pub g: u8,
    /// Red channel.
    pub r: u8,
    /// Alpha channel (straight, not premultiplied).
    pub a: u8,
}

impl CanonicalPixel {
    /// Fully transparent pixel.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a pixel from red, green, blue and alpha channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Create an opaque pixel.
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// The four channels packed as `R | G << 8 | B << 16 | A << 24`.
    #[inline]
    pub const fn packed(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Inverse of [`packed`](Self::packed).
    #[inline]
    pub const fn from_packed(word: u32) -> Self {
        let [r, g, b, a] = word.to_le_bytes();
        Self::new(r, g, b, a)
    }

    /// Whether alpha is zero.
    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Whether alpha is 255.
    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == u8::MAX
    }

    /// Same pixel with red and blue exchanged.
    #[inline]
    pub const fn swap_red_blue(self) -> Self {
        Self::new(self.b, self.g, self.r, self.a)
    }

    /// Luminance scaled by alpha, in `0.0..=1.0`.
    ///
    /// Uses 16-bit fixed point Rec. 601 style weights.
    pub fn brightness(self) -> f32 {
        const R_WEIGHT: u32 = 19562;
        const G_WEIGHT: u32 = 38550;
        const B_WEIGHT: u32 = 7424;
        const RCP: f32 = 1.0 / (255.0 * 255.0);

        let mut accum = R_WEIGHT * u32::from(self.r)
            + G_WEIGHT * u32::from(self.g)
            + B_WEIGHT * u32::from(self.b);
        accum >>= 16;
        accum *= u32::from(self.a);

        accum as f32 * RCP
    }

    /// Perceptual distance between two pixels.
    ///
    /// Euclidean distance of the premultiplied RGB vectors, normalized by
    /// `255 * 255`. Zero when both pixels are fully transparent.
    pub fn distance(self, other: Self) -> f32 {
        if self.a == 0 && other.a == 0 {
            return 0.0;
        }

        let [ar, ag, ab] = self.premultiplied();
        let [br, bg, bb] = other.premultiplied();
        let (dr, dg, db) = (ar - br, ag - bg, ab - bb);

        (dr * dr + dg * dg + db * db).sqrt() / (255.0 * 255.0)
    }

    #[inline]
    fn premultiplied(self) -> [f32; 3] {
        let a = f32::from(self.a);
        [
            f32::from(self.r) * a,
            f32::from(self.g) * a,
            f32::from(self.b) * a,
        ]
    }
}

impl Pixel for CanonicalPixel {
    #[inline]
    fn canonical(self) -> Self {
        if self.a == 0 { Self::TRANSPARENT } else { self }
    }

    #[inline]
    fn legacy_hash(&self) -> i32 {
        if self.a == 0 { 0 } else { self.packed() as i32 }
    }
}

impl PartialEq for CanonicalPixel {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        (self.a == 0 && other.a == 0) || self.packed() == other.packed()
    }
}

impl Eq for CanonicalPixel {}

impl Hash for CanonicalPixel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.canonical().packed());
    }
}

impl fmt::Debug for CanonicalPixel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R:{} G:{} B:{} A:{}", self.r, self.g, self.b, self.a)
    }
}

impl From<BGRA<u8>> for CanonicalPixel {
    #[inline]
    fn from(p: BGRA<u8>) -> Self {
        Self::new(p.r, p.g, p.b, p.a)
    }
}

impl From<Rgba<u8>> for CanonicalPixel {
    #[inline]
    fn from(p: Rgba<u8>) -> Self {
        Self::new(p.r, p.g, p.b, p.a)
    }
}

impl From<Rgb<u8>> for CanonicalPixel {
    #[inline]
    fn from(p: Rgb<u8>) -> Self {
        Self::opaque(p.r, p.g, p.b)
    }
}

impl From<CanonicalPixel> for BGRA<u8> {
    #[inline]
    fn from(p: CanonicalPixel) -> Self {
        BGRA {
            b: p.b,
            g: p.g,
            r: p.r,
            a: p.a,
        }
    }
}

impl From<CanonicalPixel> for Rgba<u8> {
    #[inline]
    fn from(p: CanonicalPixel) -> Self {
        Rgba {
            r: p.r,
            g: p.g,
            b: p.b,
            a: p.a,
        }
    }
}
