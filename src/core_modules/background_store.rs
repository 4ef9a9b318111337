// THEORY:
// The background store owns the single reference frame that motion is measured
// against. Its lifecycle is explicit: `initialize` allocates an all-black cache,
// `capture` replaces it, `current` hands out a read-only snapshot.
//
// The stored cache sits behind an `Arc`. A snapshot taken by the diff engine is an
// independent handle: replacing the background swaps the pointer and never writes
// into a cache someone may still be reading, so every diff sees either the whole
// old background or the whole new one.
//
// Until the first capture the background is black, so every pixel brighter than
// the threshold counts as motion ("everything is foreground until you capture").

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::core_modules::frame_cache::FrameCache;
use crate::error::FrameError;

/// Owns the active reference `FrameCache`.
#[derive(Debug, Clone)]
pub struct BackgroundStore {
    current: Arc<FrameCache>,
    captures: u64,
}

impl BackgroundStore {
    pub fn initialize(width: u32, height: u32) -> Result<Self, FrameError> {
        let current = Arc::new(FrameCache::zeroed(width, height)?);
        debug!(width, height, "background store initialized to black");
        Ok(Self { current, captures: 0 })
    }

    /// Replaces the background with `cache`. A cache of the wrong size is rejected
    /// and the previous background stays active.
    pub fn capture(&mut self, cache: FrameCache) -> Result<(), FrameError> {
        ensure_same_size(&self.current, &cache)?;
        self.current = Arc::new(cache);
        self.captures += 1;
        info!(captures = self.captures, "background captured");
        Ok(())
    }

    /// A read-only snapshot of the active background.
    pub fn current(&self) -> Arc<FrameCache> {
        Arc::clone(&self.current)
    }

    pub fn has_captured(&self) -> bool {
        self.captures > 0
    }

    pub fn capture_count(&self) -> u64 {
        self.captures
    }
}

/// A cloneable handle over one background, for hosts that capture on a different
/// thread than the one diffing.
#[derive(Debug, Clone)]
pub struct SharedBackground {
    inner: Arc<RwLock<Arc<FrameCache>>>,
}

impl SharedBackground {
    pub fn new(store: &BackgroundStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store.current())),
        }
    }

    /// The background as of now. The lock is only held long enough to clone the pointer.
    pub fn snapshot(&self) -> Arc<FrameCache> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Atomically swaps in a new background of the same size.
    pub fn publish(&self, cache: FrameCache) -> Result<(), FrameError> {
        let cache = Arc::new(cache);
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        ensure_same_size(&guard, &cache)?;
        *guard = cache;
        Ok(())
    }
}

fn ensure_same_size(current: &FrameCache, incoming: &FrameCache) -> Result<(), FrameError> {
    if current.width() != incoming.width() || current.height() != incoming.height() {
        return Err(FrameError::DimensionMismatch {
            expected: current.len(),
            actual: incoming.len(),
        });
    }
    Ok(())
}
