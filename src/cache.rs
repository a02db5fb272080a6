//! Lock-free lazily computed values.

use core::fmt;
use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

const UNCOMPUTED: u8 = 0;
const COMPUTING: u8 = 1;
const COMPUTED: u8 = 2;

/// Observable state of a lazily computed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheState {
    /// Nothing computed since creation or the last invalidation.
    Uncomputed,
    /// A computation is in flight.
    Computing,
    /// A value is published and will be returned by every access.
    Computed,
}

/// Value computed on first access and published exactly once per epoch.
///
/// Racing first accesses may each run the initializer; the first value to be
/// published wins and the others are dropped. No thread ever blocks on another
/// thread's computation. A failed computation leaves the cache empty so the
/// next access retries.
pub(crate) struct LazyCache<T> {
    state: AtomicU8,
    value: OnceLock<T>,
}

impl<T> LazyCache<T> {
    pub(crate) const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNCOMPUTED),
            value: OnceLock::new(),
        }
    }

    pub(crate) fn state(&self) -> CacheState {
        if self.value.get().is_some() {
            return CacheState::Computed;
        }
        match self.state.load(Ordering::Acquire) {
            COMPUTING => CacheState::Computing,
            COMPUTED => CacheState::Computed,
            _ => CacheState::Uncomputed,
        }
    }

    pub(crate) fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let claimed = self
            .state
            .compare_exchange(UNCOMPUTED, COMPUTING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !claimed {
            tracing::trace!("cache computation already in flight, computing concurrently");
        }

        match init() {
            Ok(computed) => {
                let mut published = false;
                let value = self.value.get_or_init(|| {
                    published = true;
                    computed
                });
                if !published {
                    tracing::trace!("discarding cache value computed concurrently");
                }
                self.state.store(COMPUTED, Ordering::Release);
                Ok(value)
            }
            Err(err) => {
                if claimed {
                    let _ = self.state.compare_exchange(
                        COMPUTING,
                        UNCOMPUTED,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                }
                Err(err)
            }
        }
    }

    /// Drop the cached value. Requires exclusive access, so no reader can
    /// hold a reference into it.
    pub(crate) fn invalidate(&mut self) {
        self.value.take();
        *self.state.get_mut() = UNCOMPUTED;
    }
}

impl<T> fmt::Debug for LazyCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyCache({:?})", self.state())
    }
}
