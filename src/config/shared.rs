//! Process-wide configuration cell.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::{ConfigUpdate, DumpConfig};

/// Shared, atomically swapped configuration.
///
/// Readers get a consistent snapshot without locking; every update installs a
/// whole new `DumpConfig`.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<ArcSwap<DumpConfig>>,
}

impl SharedConfig {
    pub fn new(config: DumpConfig) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Current configuration snapshot.
    pub fn load(&self) -> Arc<DumpConfig> {
        self.inner.load_full()
    }

    /// Merge `update` over the current configuration.
    pub fn apply(&self, update: &ConfigUpdate) {
        if update.is_empty() {
            return;
        }
        let previous = self.inner.rcu(|current| current.merge(update));
        tracing::debug!(
            previous = ?previous,
            update = ?update,
            "Debug dump configuration updated"
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.load().enabled
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(DumpConfig::default())
    }
}

impl std::fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedConfig").field(&self.load()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_is_visible_to_clones() {
        let shared = SharedConfig::default();
        let other = shared.clone();

        shared.apply(&ConfigUpdate::new().enabled(false));
        assert!(!other.is_enabled());
        assert_eq!(other.load().port, 8765);

        other.apply(&ConfigUpdate::new().enabled(true).port(9100));
        assert!(shared.is_enabled());
        assert_eq!(shared.load().port, 9100);

        let before = shared.load();
        shared.apply(&ConfigUpdate::new());
        assert!(Arc::ptr_eq(&before, &shared.load()));
    }
}
