//! Global enable/disable gate.
//!
//! The persisted key stores the *disabled* flag, so a missing key means
//! sounds are enabled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use super::broadcast::StopBroadcaster;
use crate::settings::SettingsStore;

/// Persisted switch consulted before every play.
pub struct GlobalGate {
    key: String,
    store: Arc<dyn SettingsStore>,
    stops: Arc<StopBroadcaster>,
    enabled: OnceLock<AtomicBool>,
}

impl GlobalGate {
    /// Creates a gate; the stored value is read on first access.
    #[must_use]
    pub fn new(
        store: Arc<dyn SettingsStore>,
        key: impl Into<String>,
        stops: Arc<StopBroadcaster>,
    ) -> Self {
        Self {
            key: key.into(),
            store,
            stops,
            enabled: OnceLock::new(),
        }
    }

    /// Returns true if playback is allowed.
    pub fn is_enabled(&self) -> bool {
        self.state().load(Ordering::SeqCst)
    }

    /// Changes the gate and writes the inverse through to the store.
    ///
    /// Disabling stops every live sound before returning. A failed write is
    /// logged; the in-memory value changes regardless.
    pub fn set_enabled(&self, enabled: bool) {
        self.state().store(enabled, Ordering::SeqCst);
        if let Err(e) = self.store.set_bool(&self.key, !enabled) {
            warn!("Failed to persist sound setting {}: {}", self.key, e);
        }
        debug!("Sound playback {}", if enabled { "enabled" } else { "disabled" });

        if !enabled {
            self.stops.publish();
        }
    }

    /// Settings key holding the disabled flag.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn state(&self) -> &AtomicBool {
        self.enabled.get_or_init(|| AtomicBool::new(self.load()))
    }

    fn load(&self) -> bool {
        match self.store.get_bool(&self.key) {
            Ok(Some(disabled)) => !disabled,
            Ok(None) => true,
            Err(e) => {
                warn!("Failed to read sound setting {}: {}", self.key, e);
                true
            }
        }
    }
}

impl std::fmt::Debug for GlobalGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalGate")
            .field("key", &self.key)
            .field("enabled", &self.enabled.get().map(|s| s.load(Ordering::SeqCst)))
            .finish_non_exhaustive()
    }
}
