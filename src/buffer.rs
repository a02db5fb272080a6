//! Row-addressed pixel buffers.
//!
//! [`PixelBuffer`] owns or borrows a block of bytes and exposes it as rows of
//! typed pixels. Stride and padding never leak out of the buffer: two buffers
//! with different strides but the same logical content are equal.
//!
//! Cropping is zero-copy. A crop borrows the storage of its parent and only
//! records a new origin and size, so crop-of-crop composes offsets instead of
//! stacking indirections, and the borrow checker keeps the parent alive and
//! unmodified for as long as the view exists.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{align_of, size_of};

use imgref::{ImgRef, ImgVec};

use crate::pixel::Pixel;

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from pixel buffer operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum BufferError {
    /// A coordinate or size argument violates the buffer geometry.
    #[error("argument `{argument}` is out of range: expected {expected}, got {value}")]
    OutOfRange {
        /// Name of the offending argument.
        argument: &'static str,
        /// Value that was passed.
        value: u64,
        /// Constraint the value had to satisfy.
        expected: String,
    },
    /// Width or height is zero or overflows the addressable range.
    #[error("width and height must be positive and addressable, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The byte slice is too small for the declared geometry.
    #[error("pixel data holds {actual} bytes but the declared geometry needs {required}")]
    InsufficientData {
        /// Bytes needed: `(height - 1) * stride + width * size_of::<T>()`.
        required: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// Stride is smaller than one row of pixels.
    #[error("stride {stride} is smaller than a row of {row_bytes} bytes")]
    StrideTooSmall {
        /// Requested stride in bytes.
        stride: usize,
        /// Bytes occupied by one row of pixels.
        row_bytes: usize,
    },
    /// Borrowed data or stride is not aligned for the pixel type.
    #[error("pixel data or stride is not aligned to {align} bytes")]
    AlignmentViolation {
        /// Required alignment in bytes.
        align: usize,
    },
    /// Pairwise operation on buffers of different size.
    #[error(
        "dimensions mismatch: {left_width}x{left_height} vs {right_width}x{right_height}"
    )]
    DimensionMismatch {
        /// Width of the left operand.
        left_width: u32,
        /// Height of the left operand.
        left_height: u32,
        /// Width of the right operand.
        right_width: u32,
        /// Height of the right operand.
        right_height: u32,
    },
}

impl BufferError {
    fn out_of_range(argument: &'static str, value: u32, expected: String) -> Self {
        Self::OutOfRange {
            argument,
            value: u64::from(value),
            expected,
        }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Storage<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl Storage<'_> {
    #[inline]
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Owned(data) => data,
            Self::Borrowed(data) => data,
        }
    }
}

// ---------------------------------------------------------------------------
// PixelBuffer
// ---------------------------------------------------------------------------

/// Two-dimensional grid of pixels addressed by rows.
///
/// `'a` is the lifetime of borrowed storage. Buffers that own their bytes are
/// `PixelBuffer<'static, T>`; crops borrow their parent and live no longer
/// than it.
pub struct PixelBuffer<'a, T: Pixel> {
    storage: Storage<'a>,
    /// Byte offset of the first pixel of row 0.
    offset: usize,
    stride: usize,
    width: u32,
    height: u32,
    _pixel: PhantomData<T>,
}

impl<T: Pixel> PixelBuffer<'static, T> {
    /// Take ownership of raw pixel bytes.
    ///
    /// `byte_stride` defaults to `width * size_of::<T>()`. If the vec is not
    /// aligned for `T` its contents are moved into an aligned allocation.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero, the stride is smaller than a
    /// row or not a multiple of `T`'s alignment, or the data is too small.
    pub fn from_vec(
        data: Vec<u8>,
        width: u32,
        height: u32,
        byte_stride: Option<usize>,
    ) -> Result<Self, BufferError> {
        let stride = check_geometry::<T>(data.len(), width, height, byte_stride)?;
        let align = align_of::<T>();
        let (data, offset) = if (data.as_ptr() as usize).is_multiple_of(align) {
            (data, 0)
        } else {
            realign(&data, align)
        };
        Ok(Self {
            storage: Storage::Owned(data),
            offset,
            stride,
            width,
            height,
            _pixel: PhantomData,
        })
    }

    /// Copy tightly packed pixels into a new owned buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero or `pixels` holds fewer than
    /// `width * height` elements.
    pub fn from_pixels(pixels: &[T], width: u32, height: u32) -> Result<Self, BufferError> {
        let bytes: &[u8] = bytemuck::cast_slice(pixels);
        Self::from_vec(bytes.to_vec(), width, height, None)
    }

    /// Allocate a buffer where every pixel is `value`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidDimensions`] if a dimension is zero.
    pub fn filled(width: u32, height: u32, value: T) -> Result<Self, BufferError> {
        Self::from_fn(width, height, |_, _| value)
    }

    /// Allocate a buffer whose pixel at `(x, y)` is `f(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidDimensions`] if a dimension is zero.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> T,
    ) -> Result<Self, BufferError> {
        let len = pixel_count(width, height)?;
        let mut pixels = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::from_pixels(&pixels, width, height)
    }
}

impl<'a, T: Pixel> PixelBuffer<'a, T> {
    /// Borrow raw pixel bytes without copying.
    ///
    /// `byte_stride` defaults to `width * size_of::<T>()`.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero, the stride is too small, the
    /// data is too small, or the data is not aligned for `T`.
    pub fn from_bytes(
        data: &'a [u8],
        width: u32,
        height: u32,
        byte_stride: Option<usize>,
    ) -> Result<Self, BufferError> {
        let stride = check_geometry::<T>(data.len(), width, height, byte_stride)?;
        let align = align_of::<T>();
        if !(data.as_ptr() as usize).is_multiple_of(align) {
            return Err(BufferError::AlignmentViolation { align });
        }
        Ok(Self {
            storage: Storage::Borrowed(data),
            offset: 0,
            stride,
            width,
            height,
            _pixel: PhantomData,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Pixels of row `y`, exactly [`width()`](Self::width) elements.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] if `y >= height`.
    pub fn row(&self, y: u32) -> Result<&[T], BufferError> {
        if y >= self.height {
            return Err(BufferError::out_of_range(
                "y",
                y,
                format!("y < {}", self.height),
            ));
        }
        let row = self.row_at(y);
        debug_assert_eq!(row.len(), self.width as usize, "row {y} length");
        Ok(row)
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] if either coordinate is outside
    /// the buffer.
    pub fn get(&self, x: u32, y: u32) -> Result<T, BufferError> {
        if x >= self.width {
            return Err(BufferError::out_of_range(
                "x",
                x,
                format!("x < {}", self.width),
            ));
        }
        Ok(self.row(y)?[x as usize])
    }

    /// Zero-copy view of the `w` x `h` region at `(x, y)`.
    ///
    /// Row `yy` of the view is `self.row(y + yy)[x..x + w]`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] naming the first argument that
    /// does not fit: `w` and `h` must be in `1..=width` / `1..=height`, and
    /// the region must lie inside the buffer.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Result<PixelBuffer<'_, T>, BufferError> {
        let rect = Rect::new(x, y, w, h);
        self.check_rect(rect)?;
        tracing::trace!(x, y, w, h, "pixel buffer crop view");
        Ok(self.view(rect))
    }

    /// [`crop`](Self::crop) taking a [`Rect`].
    ///
    /// # Errors
    ///
    /// Same as [`crop`](Self::crop).
    pub fn crop_rect(&self, rect: Rect) -> Result<PixelBuffer<'_, T>, BufferError> {
        self.crop(rect.x, rect.y, rect.width, rect.height)
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[T]> + Clone + '_ {
        (0..self.height).map(move |y| self.row_at(y))
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = T> + Clone + '_ {
        self.rows().flat_map(|row| row.iter().copied())
    }

    /// Copy into a tightly packed buffer that owns its storage.
    pub fn to_owned_buffer(&self) -> PixelBuffer<'static, T> {
        let row_bytes = self.row_bytes();
        let mut data = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.rows() {
            data.extend_from_slice(bytemuck::cast_slice(row));
        }
        let (data, offset) = if (data.as_ptr() as usize).is_multiple_of(align_of::<T>()) {
            (data, 0)
        } else {
            realign(&data, align_of::<T>())
        };
        PixelBuffer {
            storage: Storage::Owned(data),
            offset,
            stride: row_bytes,
            width: self.width,
            height: self.height,
            _pixel: PhantomData,
        }
    }

    /// Copy into a tightly packed [`ImgVec`].
    pub fn to_imgvec(&self) -> ImgVec<T> {
        let pixels: Vec<T> = self.pixels().collect();
        ImgVec::new(pixels, self.width as usize, self.height as usize)
    }

    /// Whether both buffers have the same size and equal pixels.
    ///
    /// Stride and storage are never compared. A buffer is always equal to
    /// itself.
    pub fn are_equal(left: &Self, right: &PixelBuffer<'_, T>) -> bool {
        if core::ptr::addr_eq(left, right) {
            return true;
        }
        if left.size() != right.size() {
            return false;
        }
        left.rows().zip(right.rows()).all(|(a, b)| a == b)
    }

    // --- crate-internal ----------------------------------------------------

    /// View of `rect`, which the caller guarantees lies inside the buffer.
    pub(crate) fn view(&self, rect: Rect) -> PixelBuffer<'_, T> {
        PixelBuffer {
            storage: Storage::Borrowed(self.storage.bytes()),
            offset: self.offset
                + rect.y as usize * self.stride
                + rect.x as usize * size_of::<T>(),
            stride: self.stride,
            width: rect.width,
            height: rect.height,
            _pixel: PhantomData,
        }
    }

    pub(crate) fn check_rect(&self, rect: Rect) -> Result<(), BufferError> {
        let Rect { x, y, width: w, height: h } = rect;
        if w == 0 || w > self.width {
            return Err(BufferError::out_of_range(
                "w",
                w,
                format!("0 < w <= {}", self.width),
            ));
        }
        if h == 0 || h > self.height {
            return Err(BufferError::out_of_range(
                "h",
                h,
                format!("0 < h <= {}", self.height),
            ));
        }
        if x > self.width - w {
            return Err(BufferError::out_of_range(
                "x",
                x,
                format!("x <= width - w ({})", self.width - w),
            ));
        }
        if y > self.height - h {
            return Err(BufferError::out_of_range(
                "y",
                y,
                format!("y <= height - h ({})", self.height - h),
            ));
        }
        Ok(())
    }

    #[inline]
    fn row_bytes(&self) -> usize {
        self.width as usize * size_of::<T>()
    }

    /// Row `y` without the range check. Geometry and alignment were
    /// validated at construction, so slicing and casting cannot fail.
    #[inline]
    fn row_at(&self, y: u32) -> &[T] {
        let start = self.offset + y as usize * self.stride;
        let bytes = &self.storage.bytes()[start..start + self.row_bytes()];
        bytemuck::cast_slice(bytes)
    }
}

impl<T: Pixel> Clone for PixelBuffer<'_, T> {
    fn clone(&self) -> Self {
        let (storage, offset) = match &self.storage {
            Storage::Borrowed(data) => (Storage::Borrowed(*data), self.offset),
            // A copied vec lands at a new address, so the alignment offset
            // has to be recomputed.
            Storage::Owned(data) => {
                let align = align_of::<T>();
                let copy = data.clone();
                if (copy.as_ptr() as usize + self.offset).is_multiple_of(align) {
                    (Storage::Owned(copy), self.offset)
                } else {
                    let (data, offset) = realign(&data[self.offset..], align);
                    (Storage::Owned(data), offset)
                }
            }
        };
        Self {
            storage,
            offset,
            stride: self.stride,
            width: self.width,
            height: self.height,
            _pixel: PhantomData,
        }
    }
}

impl<T: Pixel> PartialEq<PixelBuffer<'_, T>> for PixelBuffer<'_, T> {
    fn eq(&self, other: &PixelBuffer<'_, T>) -> bool {
        Self::are_equal(self, other)
    }
}

impl<T: Pixel + Eq> Eq for PixelBuffer<'_, T> {}

impl<T: Pixel> core::hash::Hash for PixelBuffer<'_, T> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        state.write_i32(self.legacy_hash());
    }
}

impl<T: Pixel> fmt::Debug for PixelBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.storage {
            Storage::Owned(_) => "owned",
            Storage::Borrowed(_) => "borrowed",
        };
        write!(f, "PixelBuffer({}x{}, {kind})", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// ImgRef → PixelBuffer (zero-copy)
// ---------------------------------------------------------------------------

impl<'a, T: Pixel> TryFrom<ImgRef<'a, T>> for PixelBuffer<'a, T> {
    type Error = BufferError;

    fn try_from(img: ImgRef<'a, T>) -> Result<Self, BufferError> {
        let (width, height) = (img.width(), img.height());
        let to_u32 = |v: usize| u32::try_from(v).unwrap_or(0);
        let (w, h) = (to_u32(width), to_u32(height));
        if w == 0 || h == 0 {
            return Err(BufferError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        let byte_stride = img.stride() * size_of::<T>();
        let pixels: &'a [T] = img.into_buf();
        Self::from_bytes(bytemuck::cast_slice(pixels), w, h, Some(byte_stride))
    }
}

/// Pair up the pixels of two equally sized buffers in row-major order.
///
/// # Errors
///
/// Returns [`BufferError::DimensionMismatch`] if the sizes differ.
pub fn zip_pixels<'l, 'r, T: Pixel>(
    left: &'l PixelBuffer<'l, T>,
    right: &'r PixelBuffer<'r, T>,
) -> Result<impl Iterator<Item = (T, T)> + use<'l, 'r, T>, BufferError> {
    if left.size() != right.size() {
        return Err(BufferError::DimensionMismatch {
            left_width: left.width(),
            left_height: left.height(),
            right_width: right.width(),
            right_height: right.height(),
        });
    }
    Ok(left.pixels().zip(right.pixels()))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Round `val` up to the next multiple of `align` (must be a power of 2).
const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Compute the byte offset needed to align `ptr` to `align`.
fn align_offset(ptr: *const u8, align: usize) -> usize {
    let addr = ptr as usize;
    align_up(addr, align) - addr
}

/// Copy `data` into a fresh allocation at an offset aligned to `align`.
fn realign(data: &[u8], align: usize) -> (Vec<u8>, usize) {
    let mut out = alloc::vec![0u8; data.len() + align - 1];
    let offset = align_offset(out.as_ptr(), align);
    out[offset..offset + data.len()].copy_from_slice(data);
    (out, offset)
}

fn pixel_count(width: u32, height: u32) -> Result<usize, BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(BufferError::InvalidDimensions { width, height })
}

/// Validate geometry for `T` pixels over `len` bytes; returns the stride.
fn check_geometry<T>(
    len: usize,
    width: u32,
    height: u32,
    byte_stride: Option<usize>,
) -> Result<usize, BufferError> {
    pixel_count(width, height)?;
    let row_bytes = (width as usize)
        .checked_mul(size_of::<T>())
        .ok_or(BufferError::InvalidDimensions { width, height })?;
    let stride = byte_stride.unwrap_or(row_bytes);
    if stride < row_bytes {
        return Err(BufferError::StrideTooSmall { stride, row_bytes });
    }
    let align = align_of::<T>();
    if !stride.is_multiple_of(align) {
        return Err(BufferError::AlignmentViolation { align });
    }
    let required = required_bytes(height, stride, row_bytes)
        .ok_or(BufferError::InvalidDimensions { width, height })?;
    if len < required {
        return Err(BufferError::InsufficientData {
            required,
            actual: len,
        });
    }
    Ok(stride)
}

/// Minimum bytes needed: `(rows - 1) * stride + row_bytes`.
fn required_bytes(rows: u32, stride: usize, row_bytes: usize) -> Option<usize> {
    (rows as usize - 1)
        .checked_mul(stride)?
        .checked_add(row_bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::CanonicalPixel;
    use alloc::vec;

    fn gradient(w: u32, h: u32) -> PixelBuffer<'static, CanonicalPixel> {
        PixelBuffer::from_fn(w, h, |x, y| CanonicalPixel::opaque(x as u8, y as u8, 7)).unwrap()
    }

    // --- construction ---

    #[test]
    fn from_vec_default_stride() {
        let data = vec![0u8; 4 * 3 * 2];
        let buf = PixelBuffer::<CanonicalPixel>::from_vec(data, 3, 2, None).unwrap();
        assert_eq!(buf.size(), (3, 2));
        assert_eq!(buf.row(1).unwrap().len(), 3);
    }

    #[test]
    fn from_vec_too_small() {
        let data = vec![0u8; 10];
        let err = PixelBuffer::<CanonicalPixel>::from_vec(data, 3, 2, None).unwrap_err();
        assert_eq!(
            err,
            BufferError::InsufficientData {
                required: 24,
                actual: 10
            }
        );
    }

    #[test]
    fn last_row_needs_no_padding() {
        // 2 rows, stride 16, row of 8 bytes: 16 + 8 = 24 bytes suffice.
        let data = vec![1u8; 24];
        let buf = PixelBuffer::<CanonicalPixel>::from_vec(data, 2, 2, Some(16)).unwrap();
        assert_eq!(buf.row(1).unwrap().len(), 2);
    }

    #[test]
    fn zero_dimensions_rejected() {
        let err = PixelBuffer::<u8>::from_vec(vec![], 0, 4, None).unwrap_err();
        assert_eq!(
            err,
            BufferError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
        assert!(PixelBuffer::filled(4, 0, 0u8).is_err());
    }

    #[test]
    fn stride_too_small() {
        let err = PixelBuffer::<CanonicalPixel>::from_vec(vec![0; 64], 4, 2, Some(8)).unwrap_err();
        assert_eq!(
            err,
            BufferError::StrideTooSmall {
                stride: 8,
                row_bytes: 16
            }
        );
    }

    #[test]
    fn misaligned_borrow_rejected_owned_accepted() {
        let words = vec![0u32; 5];
        let bytes: &[u8] = bytemuck::cast_slice(&words);
        let err = PixelBuffer::<u32>::from_bytes(&bytes[1..], 2, 2, None).unwrap_err();
        assert_eq!(err, BufferError::AlignmentViolation { align: 4 });

        let mut shifted = bytes[..17].to_vec();
        shifted[1..5].copy_from_slice(&7u32.to_ne_bytes());
        let owned = PixelBuffer::<u32>::from_vec(shifted[1..].to_vec(), 2, 2, None).unwrap();
        assert_eq!(owned.get(0, 0).unwrap(), 7);
    }

    #[test]
    fn realign_places_data_at_aligned_offset() {
        let (out, offset) = realign(&[1, 2, 3, 4, 5], 8);
        assert!((out.as_ptr() as usize + offset).is_multiple_of(8));
        assert_eq!(&out[offset..offset + 5], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn clone_recomputes_alignment_of_owned_storage() {
        // Owned storage whose pixels start one byte past a 4-byte boundary.
        let mut data = vec![0u8; 16];
        let offset = align_offset(data.as_ptr(), 4) + 1;
        data[offset..offset + 4].copy_from_slice(&7u32.to_ne_bytes());
        data[offset + 4..offset + 8].copy_from_slice(&9u32.to_ne_bytes());
        let skewed = PixelBuffer::<u32> {
            storage: Storage::Owned(data),
            offset,
            stride: 8,
            width: 2,
            height: 1,
            _pixel: PhantomData,
        };

        let copy = skewed.clone();
        assert_eq!(copy.row(0).unwrap(), &[7, 9]);
        assert_eq!(copy.clone().get(1, 0).unwrap(), 9);
    }

    #[test]
    fn clone_of_aligned_buffer_keeps_content() {
        let buf = PixelBuffer::<u16>::from_pixels(&[1, 2, 3, 4, 5, 6], 3, 2).unwrap();
        let copy = buf.clone();
        assert_eq!(copy, buf);
        assert_eq!(copy.row(1).unwrap(), &[4, 5, 6]);
    }

    #[test]
    fn stride_must_respect_alignment() {
        let err = PixelBuffer::<u16>::from_vec(vec![0; 16], 2, 2, Some(5)).unwrap_err();
        assert_eq!(err, BufferError::AlignmentViolation { align: 2 });
    }

    #[test]
    fn padded_stride_is_invisible() {
        // 2x2 pixels, 12-byte stride with 4 bytes of garbage padding per row.
        let mut padded = vec![0xEEu8; 24];
        let tight = gradient(2, 2);
        for (y, row) in tight.rows().enumerate() {
            let bytes: &[u8] = bytemuck::cast_slice(row);
            padded[y * 12..y * 12 + 8].copy_from_slice(bytes);
        }
        let strided = PixelBuffer::<CanonicalPixel>::from_bytes(&padded, 2, 2, Some(12)).unwrap();
        assert_eq!(strided, tight);
        assert_eq!(strided.legacy_hash(), tight.legacy_hash());
        assert_eq!(strided.checksum(), tight.checksum());
    }

    // --- access ---

    #[test]
    fn row_out_of_range() {
        let buf = gradient(3, 3);
        let err = buf.row(3).unwrap_err();
        assert!(matches!(err, BufferError::OutOfRange { argument: "y", .. }));
        assert!(format!("{err}").contains("y < 3"));
    }

    #[test]
    fn get_out_of_range() {
        let buf = gradient(3, 3);
        assert!(matches!(
            buf.get(3, 0),
            Err(BufferError::OutOfRange { argument: "x", .. })
        ));
        assert!(matches!(
            buf.get(0, 5),
            Err(BufferError::OutOfRange { argument: "y", .. })
        ));
        assert_eq!(buf.get(2, 1).unwrap(), CanonicalPixel::opaque(2, 1, 7));
    }

    #[test]
    fn pixels_are_row_major() {
        let buf = gradient(2, 2);
        let order: Vec<(u8, u8)> = buf.pixels().map(|p| (p.r, p.g)).collect();
        assert_eq!(order, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    // --- crop ---

    #[test]
    fn crop_composition_law() {
        let buf = gradient(16, 12);
        let (x, y, w, h) = (3, 4, 9, 6);
        let crop = buf.crop(x, y, w, h).unwrap();
        assert_eq!(crop.size(), (w, h));
        for j in 0..h {
            for i in 0..w {
                assert_eq!(crop.get(i, j).unwrap(), buf.get(x + i, y + j).unwrap());
            }
        }
    }

    #[test]
    fn crop_is_zero_copy() {
        let buf = gradient(8, 8);
        let crop = buf.crop(2, 3, 4, 4).unwrap();
        let parent_row = &buf.row(3).unwrap()[2..];
        assert_eq!(crop.row(0).unwrap().as_ptr(), parent_row.as_ptr());
        assert!(format!("{crop:?}").contains("borrowed"));
    }

    #[test]
    fn crop_of_crop_composes() {
        let buf = gradient(20, 20);
        let outer = buf.crop(2, 3, 15, 15).unwrap();
        let inner = outer.crop(4, 5, 6, 7).unwrap();
        let direct = buf.crop(6, 8, 6, 7).unwrap();
        assert_eq!(inner, direct);
        assert_eq!(inner.row(0).unwrap().as_ptr(), direct.row(0).unwrap().as_ptr());
    }

    #[test]
    fn crop_full_buffer() {
        let buf = gradient(5, 5);
        let all = buf.crop(0, 0, 5, 5).unwrap();
        assert_eq!(all, buf);
    }

    #[test]
    fn crop_last_column_allowed() {
        let buf = gradient(100, 100);
        let edge = buf.crop(90, 90, 10, 10).unwrap();
        assert_eq!(edge.get(9, 9).unwrap(), buf.get(99, 99).unwrap());
    }

    #[test]
    fn crop_exceeding_right_bound() {
        let buf = gradient(100, 100);
        let err = buf.crop(95, 0, 10, 10).unwrap_err();
        match &err {
            BufferError::OutOfRange {
                argument, value, ..
            } => {
                assert_eq!(*argument, "x");
                assert_eq!(*value, 95);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(format!("{err}").contains("x <= width - w (90)"));
    }

    #[test]
    fn crop_invalid_sizes() {
        let buf = gradient(10, 10);
        assert!(matches!(
            buf.crop(0, 0, 11, 1),
            Err(BufferError::OutOfRange { argument: "w", .. })
        ));
        assert!(matches!(
            buf.crop(0, 0, 1, 0),
            Err(BufferError::OutOfRange { argument: "h", .. })
        ));
        assert!(matches!(
            buf.crop(0, 5, 1, 6),
            Err(BufferError::OutOfRange { argument: "y", .. })
        ));
    }

    // --- equality ---

    #[test]
    fn equality_reflexive_and_symmetric() {
        let a = gradient(6, 4);
        let b = gradient(6, 4);
        let c = PixelBuffer::filled(6, 4, CanonicalPixel::BLACK).unwrap();
        assert!(PixelBuffer::are_equal(&a, &a));
        assert_eq!(a == b, b == a);
        assert!(a == b);
        assert_eq!(a == c, c == a);
        assert!(a != c);
    }

    #[test]
    fn equality_different_sizes_is_false() {
        let a = PixelBuffer::filled(4, 2, CanonicalPixel::WHITE).unwrap();
        let b = PixelBuffer::filled(2, 4, CanonicalPixel::WHITE).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn opaque_red_equals_itself() {
        let red = PixelBuffer::filled(4, 4, CanonicalPixel::opaque(255, 0, 0)).unwrap();
        assert!(PixelBuffer::are_equal(&red, &red));
        assert_eq!(red, red.to_owned_buffer());
    }

    #[test]
    fn transparent_pixels_do_not_break_equality() {
        let mut left = vec![CanonicalPixel::opaque(1, 2, 3); 4];
        let mut right = left.clone();
        left[3] = CanonicalPixel::new(255, 0, 0, 0);
        right[3] = CanonicalPixel::new(0, 255, 0, 0);
        let a = PixelBuffer::from_pixels(&left, 2, 2).unwrap();
        let b = PixelBuffer::from_pixels(&right, 2, 2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.legacy_hash(), b.legacy_hash());
    }

    // --- zip ---

    #[test]
    fn zip_pixels_dimension_mismatch() {
        let a = gradient(2, 3);
        let b = gradient(3, 2);
        let err = zip_pixels(&a, &b).err().unwrap();
        assert_eq!(
            err,
            BufferError::DimensionMismatch {
                left_width: 2,
                left_height: 3,
                right_width: 3,
                right_height: 2
            }
        );
        assert_eq!(zip_pixels(&a, &a).unwrap().count(), 6);
    }

    // --- imgref interop ---

    #[test]
    fn imgref_roundtrip() {
        let pixels: Vec<u16> = (0..12).collect();
        let img = imgref::Img::new_stride(pixels.as_slice(), 3, 3, 4);
        let buf = PixelBuffer::try_from(img).unwrap();
        assert_eq!(buf.size(), (3, 3));
        assert_eq!(buf.row(1).unwrap(), &[4, 5, 6]);
        assert_eq!(buf.row(2).unwrap(), &[8, 9, 10]);

        let out = buf.to_imgvec();
        assert_eq!(out.width(), 3);
        assert_eq!(out.buf().as_slice(), &[0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }

    #[test]
    fn to_owned_buffer_compacts() {
        let buf = gradient(10, 10);
        let crop = buf.crop(1, 1, 3, 3).unwrap();
        let owned = crop.to_owned_buffer();
        assert!(format!("{owned:?}").contains("owned"));
        assert_eq!(owned, crop);
    }

    #[test]
    fn debug_format() {
        let buf = PixelBuffer::filled(10, 5, 0u8).unwrap();
        assert_eq!(format!("{buf:?}"), "PixelBuffer(10x5, owned)");
    }

    #[test]
    fn error_messages_name_arguments() {
        let msg = format!("{}", BufferError::StrideTooSmall {
            stride: 2,
            row_bytes: 8
        });
        assert!(msg.contains("stride"));
    }
}
