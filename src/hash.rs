//! Content fingerprints for pixel buffers.
//!
//! Three fingerprints are provided, from weakest to strongest:
//!
//! - [`legacy_hash`](PixelBuffer::legacy_hash): 32-bit multiplicative hash of
//!   the pixel stream. Ignores geometry, so a 4x1 and a 2x2 buffer of the
//!   same pixels collide. Kept so recorded values stay comparable.
//! - [`checksum`](PixelBuffer::checksum): 64-bit SipHash-2-4 over the
//!   geometry followed by the canonical pixel bytes. Used for "is any of"
//!   assertions.
//! - [`digest`](PixelBuffer::digest): SHA-256 over the same stream.
//!
//! All three hash [`Pixel::canonical`] values, so pixels that compare equal
//! always contribute the same bytes.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::hash::Hasher;

use sha2::{Digest, Sha256};
use siphasher::sip::SipHasher;

use crate::buffer::PixelBuffer;
use crate::pixel::Pixel;

/// SHA-256 of a buffer's geometry and canonical pixels.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelDigest([u8; 32]);

impl PixelDigest {
    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Uppercase hexadecimal rendering, 64 characters.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PixelDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PixelDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PixelDigest({self})")
    }
}

impl From<PixelDigest> for [u8; 32] {
    fn from(digest: PixelDigest) -> Self {
        digest.0
    }
}

impl<T: Pixel> PixelBuffer<'_, T> {
    /// 32-bit hash of the pixel stream, consistent with equality.
    ///
    /// Rows top to bottom, pixels left to right, seeded at zero:
    /// `h = (h + pixel_hash) * 17` with wrapping arithmetic.
    pub fn legacy_hash(&self) -> i32 {
        self.pixels()
            .fold(0i32, |h, p| h.wrapping_add(p.legacy_hash()).wrapping_mul(17))
    }

    /// Deterministic 64-bit checksum of geometry and pixel content.
    ///
    /// Stable across runs and platforms: SipHash-2-4 with zero keys over
    /// `width` and `height` as little-endian `u32`, then the canonical
    /// bytes of every pixel in row-major order.
    pub fn checksum(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.feed_canonical(|bytes| hasher.write(bytes));
        hasher.finish()
    }

    /// SHA-256 of the same stream [`checksum`](Self::checksum) hashes.
    pub fn digest(&self) -> PixelDigest {
        let mut hasher = Sha256::new();
        self.feed_canonical(|bytes| hasher.update(bytes));
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        PixelDigest(out)
    }

    fn feed_canonical(&self, mut sink: impl FnMut(&[u8])) {
        sink(&self.width().to_le_bytes());
        sink(&self.height().to_le_bytes());
        let mut scratch: Vec<T> = Vec::with_capacity(self.width() as usize);
        for row in self.rows() {
            scratch.clear();
            scratch.extend(row.iter().map(|p| p.canonical()));
            sink(bytemuck::cast_slice(&scratch));
        }
    }
}
