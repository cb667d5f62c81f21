//! Registry of sounds played by identity.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::sound::{AssetIdentity, Sound, SoundError};

/// Maps asset identity to the sound built for it.
///
/// Entries are added lazily and only removed all at once by [`clear`].
///
/// [`clear`]: SoundRegistry::clear
#[derive(Default)]
pub struct SoundRegistry {
    sounds: Mutex<HashMap<AssetIdentity, Arc<Sound>>>,
}

impl SoundRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registered sound for `asset`.
    #[must_use]
    pub fn get(&self, asset: &AssetIdentity) -> Option<Arc<Sound>> {
        self.sounds.lock().get(asset).cloned()
    }

    /// Returns the registered sound, building and inserting it if absent.
    ///
    /// The lock is held while `build` runs, so concurrent callers for the
    /// same asset never build twice. A failed build inserts nothing.
    ///
    /// # Errors
    ///
    /// Propagates the error from `build`.
    pub fn get_or_try_insert_with<F>(
        &self,
        asset: &AssetIdentity,
        build: F,
    ) -> Result<Arc<Sound>, SoundError>
    where
        F: FnOnce() -> Result<Sound, SoundError>,
    {
        let mut sounds = self.sounds.lock();
        if let Some(sound) = sounds.get(asset) {
            return Ok(Arc::clone(sound));
        }
        let sound = Arc::new(build()?);
        sounds.insert(asset.clone(), Arc::clone(&sound));
        Ok(sound)
    }

    #[must_use]
    pub fn contains(&self, asset: &AssetIdentity) -> bool {
        self.sounds.lock().contains_key(asset)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sounds.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sounds.lock().is_empty()
    }

    /// Removes every entry and returns how many were dropped.
    ///
    /// Handles held elsewhere stay valid.
    pub fn clear(&self) -> usize {
        let drained: Vec<Arc<Sound>> = self.sounds.lock().drain().map(|(_, s)| s).collect();
        // Sounds are dropped outside the lock
        drained.len()
    }
}

impl std::fmt::Debug for SoundRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundRegistry")
            .field("len", &self.len())
            .finish()
    }
}
