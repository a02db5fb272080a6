//! Exact sub-image search.

use core::iter::FusedIterator;

use crate::buffer::{PixelBuffer, Rect};
use crate::pixel::Pixel;

/// Top-left corner of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Lazy iterator over every position where a needle matches a haystack.
///
/// Positions come in row-major order. Cloning the iterator restarts nothing;
/// it forks the scan at the current position.
#[derive(Clone)]
pub struct Occurrences<'h, 'n, T: Pixel> {
    haystack: &'h PixelBuffer<'h, T>,
    needle: &'n PixelBuffer<'n, T>,
    /// Next candidate origin, `None` once exhausted.
    cursor: Option<Point>,
    /// Largest valid origin.
    last: Point,
}

impl<'h, 'n, T: Pixel> Occurrences<'h, 'n, T> {
    pub(crate) fn new(haystack: &'h PixelBuffer<'h, T>, needle: &'n PixelBuffer<'n, T>) -> Self {
        let fits = needle.width() <= haystack.width() && needle.height() <= haystack.height();
        let last = if fits {
            Point::new(
                haystack.width() - needle.width(),
                haystack.height() - needle.height(),
            )
        } else {
            Point::default()
        };
        Self {
            haystack,
            needle,
            cursor: fits.then_some(Point::default()),
            last,
        }
    }

    /// Number of candidate origins not yet examined.
    pub fn remaining_candidates(&self) -> u64 {
        let Some(cursor) = self.cursor else {
            return 0;
        };
        let columns = u64::from(self.last.x) + 1;
        let full_rows = u64::from(self.last.y - cursor.y);
        full_rows * columns + (columns - u64::from(cursor.x))
    }

    fn advance(&mut self, from: Point) {
        self.cursor = if from.x < self.last.x {
            Some(Point::new(from.x + 1, from.y))
        } else if from.y < self.last.y {
            Some(Point::new(0, from.y + 1))
        } else {
            None
        };
    }

    fn matches_at(&self, at: Point) -> bool {
        let region = self.haystack.view(Rect::new(
            at.x,
            at.y,
            self.needle.width(),
            self.needle.height(),
        ));
        region == *self.needle
    }
}

impl<T: Pixel> Iterator for Occurrences<'_, '_, T> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while let Some(at) = self.cursor {
            self.advance(at);
            if self.matches_at(at) {
                return Some(at);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, usize::try_from(self.remaining_candidates()).ok())
    }
}

impl<T: Pixel> FusedIterator for Occurrences<'_, '_, T> {}

impl<T: Pixel> core::fmt::Debug for Occurrences<'_, '_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Occurrences")
            .field("haystack", &self.haystack.size())
            .field("needle", &self.needle.size())
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// Every position where `needle` equals the same-sized region of `haystack`.
///
/// Exhaustive scan over all origins `0..=W-w` x `0..=H-h`. A needle larger
/// than the haystack in either dimension yields nothing.
pub fn find_occurrences<'h, 'n, T: Pixel>(
    haystack: &'h PixelBuffer<'h, T>,
    needle: &'n PixelBuffer<'n, T>,
) -> Occurrences<'h, 'n, T> {
    Occurrences::new(haystack, needle)
}

/// Number of candidate origins a search of `needle` in `haystack` examines.
pub fn candidate_count(haystack: (u32, u32), needle: (u32, u32)) -> u64 {
    let (hw, hh) = haystack;
    let (nw, nh) = needle;
    if nw > hw || nh > hh {
        return 0;
    }
    (u64::from(hw - nw) + 1) * (u64::from(hh - nh) + 1)
}
