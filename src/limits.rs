//! Resource limits for canonicalization and search.
//!
//! [`ResourceLimits`] caps the work a [`TestImage`](crate::TestImage) will do
//! on behalf of an adapter. [`LimitExceeded`] is returned when a check fails.
//! Dimensions are checked before any pixels are read, so an oversized render
//! is rejected before its buffer is allocated.

/// Caps on image size and search effort.
///
/// All fields are optional; `None` means no limit for that resource.
///
/// # Example
///
/// ```
/// use testimages::ResourceLimits;
///
/// let limits = ResourceLimits::none()
///     .with_max_pixels(4_000_000)
///     .with_max_occurrence_candidates(1_000_000);
/// assert!(limits.check_dimensions(1920, 1080).is_ok());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum image width in pixels.
    pub max_width: Option<u32>,
    /// Maximum image height in pixels.
    pub max_height: Option<u32>,
    /// Maximum number of candidate origins an occurrence search may examine.
    pub max_occurrence_candidates: Option<u64>,
}

impl ResourceLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum image width in pixels.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum image height in pixels.
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Set maximum number of occurrence search candidates.
    pub fn with_max_occurrence_candidates(mut self, candidates: u64) -> Self {
        self.max_occurrence_candidates = Some(candidates);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_pixels.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
            || self.max_occurrence_candidates.is_some()
    }

    // --- Validation methods ---

    /// Check image dimensions against `max_width`, `max_height`, and `max_pixels`.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check the candidate count of searching `needle` in `haystack` against
    /// `max_occurrence_candidates`.
    pub fn check_search(
        &self,
        haystack: (u32, u32),
        needle: (u32, u32),
    ) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_occurrence_candidates {
            let candidates = crate::search::candidate_count(haystack, needle);
            if candidates > max {
                return Err(LimitExceeded::SearchCandidates {
                    actual: candidates,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum LimitExceeded {
    /// Image width exceeded `max_width`.
    #[error("width {actual} exceeds limit {max}")]
    Width {
        /// Actual width.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Image height exceeded `max_height`.
    #[error("height {actual} exceeds limit {max}")]
    Height {
        /// Actual height.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Pixel count exceeded `max_pixels`.
    #[error("pixel count {actual} exceeds limit {max}")]
    Pixels {
        /// Actual pixel count.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Search would examine more than `max_occurrence_candidates` origins.
    #[error("occurrence search over {actual} candidates exceeds limit {max}")]
    SearchCandidates {
        /// Candidate origins the search would examine.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_limits() {
        let limits = ResourceLimits::none();
        assert!(!limits.has_any());
        assert_eq!(limits, ResourceLimits::default());
    }

    #[test]
    fn builder_sets_limits() {
        let limits = ResourceLimits::none()
            .with_max_pixels(1_000_000)
            .with_max_occurrence_candidates(500);
        assert!(limits.has_any());
        assert_eq!(limits.max_pixels, Some(1_000_000));
        assert_eq!(limits.max_occurrence_candidates, Some(500));
        assert!(limits.max_width.is_none());
    }

    #[test]
    fn check_dimensions_pass() {
        let limits = ResourceLimits::none()
            .with_max_width(1920)
            .with_max_height(1080)
            .with_max_pixels(2_073_600);
        assert!(limits.check_dimensions(1920, 1080).is_ok());
        assert!(limits.check_dimensions(100, 100).is_ok());
    }

    #[test]
    fn check_dimensions_width_exceeded() {
        let limits = ResourceLimits::none().with_max_width(1920);
        let err = limits.check_dimensions(1921, 1080).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Width {
                actual: 1921,
                max: 1920
            }
        );
    }

    #[test]
    fn check_dimensions_height_exceeded() {
        let limits = ResourceLimits::none().with_max_height(1080);
        let err = limits.check_dimensions(1920, 1081).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Height {
                actual: 1081,
                max: 1080
            }
        );
    }

    #[test]
    fn check_dimensions_pixels_exceeded() {
        let limits = ResourceLimits::none().with_max_pixels(1_000_000);
        let err = limits.check_dimensions(1001, 1000).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Pixels {
                actual: 1_001_000,
                max: 1_000_000
            }
        );
    }

    #[test]
    fn check_dimensions_no_limits_always_passes() {
        let limits = ResourceLimits::none();
        assert!(limits.check_dimensions(100_000, 100_000).is_ok());
    }

    #[test]
    fn check_search_counts_origins() {
        // 100x100 haystack, 10x10 needle: 91 * 91 = 8281 origins.
        let limits = ResourceLimits::none().with_max_occurrence_candidates(8281);
        assert!(limits.check_search((100, 100), (10, 10)).is_ok());
        let err = limits.check_search((100, 100), (9, 10)).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::SearchCandidates {
                actual: 92 * 91,
                max: 8281
            }
        );
    }

    #[test]
    fn oversized_needle_costs_nothing() {
        let limits = ResourceLimits::none().with_max_occurrence_candidates(0);
        assert!(limits.check_search((4, 4), (5, 1)).is_ok());
    }

    #[test]
    fn limit_exceeded_display() {
        let err = LimitExceeded::Width {
            actual: 5000,
            max: 4096,
        };
        assert_eq!(format!("{err}"), "width 5000 exceeds limit 4096");

        let err = LimitExceeded::SearchCandidates {
            actual: 20,
            max: 10,
        };
        assert_eq!(
            format!("{err}"),
            "occurrence search over 20 candidates exceeds limit 10"
        );
    }

    #[test]
    fn limit_exceeded_is_error() {
        fn assert_error<E: core::error::Error + Send + Sync + 'static>(_: &E) {}
        let err = LimitExceeded::Height {
            actual: 5000,
            max: 4096,
        };
        assert_error(&err);
    }
}
