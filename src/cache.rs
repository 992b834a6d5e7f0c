use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::models::DashboardBundle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Refreshed,
}

struct CachedBundle {
    bundle: DashboardBundle,
    cached_at: Instant,
}

/// Single-slot bundle cache with a fixed time-to-live.
pub struct BundleCache {
    ttl: Duration,
    slot: Mutex<Option<CachedBundle>>,
}

impl BundleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached bundle while it is younger than the TTL, otherwise
    /// stores and returns a fresh one from `build`. `force_refresh` always
    /// rebuilds.
    pub fn get_or_refresh(
        &self,
        now: Instant,
        force_refresh: bool,
        build: impl FnOnce() -> DashboardBundle,
    ) -> (DashboardBundle, CacheOutcome) {
        let mut slot = self.lock();

        if !force_refresh {
            if let Some(cached) = slot.as_ref() {
                if now.saturating_duration_since(cached.cached_at) < self.ttl {
                    return (cached.bundle.clone(), CacheOutcome::Hit);
                }
            }
        }

        let bundle = build();
        *slot = Some(CachedBundle {
            bundle: bundle.clone(),
            cached_at: now,
        });
        (bundle, CacheOutcome::Refreshed)
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedBundle>> {
        // The slot holds plain data, so a poisoned lock is still usable.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
