//! Process-scoped playback context.
//!
//! [`SoundEngine`] owns what would otherwise be global state: the registry
//! of sounds played by identity, the persisted enable gate, the per-asset
//! pool size, the stop broadcast and the session category. Each engine is
//! independent, so tests can run isolated engines in parallel.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use soundpool::engine::SoundEngine;
//! use soundpool::settings::MemorySettingsStore;
//! use soundpool::sound::{DirectoryResolver, MockPlayerFactory};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("dog.wav"), b"RIFF").unwrap();
//!
//! let engine = SoundEngine::new(
//!     Arc::new(MockPlayerFactory::new()),
//!     Arc::new(MemorySettingsStore::new()),
//! )
//! .with_resolver(Arc::new(DirectoryResolver::new(dir.path())));
//!
//! assert!(engine.play_file("dog", Some("wav"), 0));
//! assert!(!engine.play_file("nonexistent", Some("mp3"), 0));
//!
//! engine.set_enabled(false);
//! assert!(!engine.play_file("dog", Some("wav"), 0));
//! ```

mod broadcast;
mod gate;
mod registry;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

pub use broadcast::{StopBroadcaster, StopListener, Subscription};
pub use gate::GlobalGate;
pub use registry::SoundRegistry;

use crate::config::EngineConfig;
use crate::session::{NoopSession, Session, SoundCategory};
use crate::settings::SettingsStore;
use crate::sound::{AssetIdentity, AssetResolver, DirectoryResolver, PlayerFactory, Sound, SoundError};

#[derive(Debug, Clone, Copy)]
struct CategoryState {
    category: SoundCategory,
    applied: bool,
}

/// Playback context shared by every sound it builds.
pub struct SoundEngine {
    factory: Arc<dyn PlayerFactory>,
    resolver: Arc<dyn AssetResolver>,
    session: Arc<dyn Session>,
    category: Mutex<CategoryState>,
    players_per_sound: AtomicUsize,
    gate: Arc<GlobalGate>,
    stops: Arc<StopBroadcaster>,
    registry: SoundRegistry,
}

impl SoundEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new(factory: Arc<dyn PlayerFactory>, settings: Arc<dyn SettingsStore>) -> Self {
        Self::with_config(factory, settings, EngineConfig::default())
    }

    /// Creates an engine from an explicit configuration.
    ///
    /// Assets resolve against [`DirectoryResolver::application_default`]
    /// and the session is a no-op until replaced.
    #[must_use]
    pub fn with_config(
        factory: Arc<dyn PlayerFactory>,
        settings: Arc<dyn SettingsStore>,
        config: EngineConfig,
    ) -> Self {
        let stops = StopBroadcaster::new();
        let gate = Arc::new(GlobalGate::new(
            settings,
            config.settings_key.clone(),
            Arc::clone(&stops),
        ));
        Self {
            factory,
            resolver: Arc::new(DirectoryResolver::application_default()),
            session: Arc::new(NoopSession),
            category: Mutex::new(CategoryState {
                category: config.category,
                applied: false,
            }),
            players_per_sound: AtomicUsize::new(config.effective_players_per_sound()),
            gate,
            stops,
            registry: SoundRegistry::new(),
        }
    }

    /// Replaces the asset resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn AssetResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the audio session.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = session;
        self
    }

    // ------------------------------------------------------------------
    // Play / stop by identity
    // ------------------------------------------------------------------

    /// Plays the registered sound for `asset`, building it on first use.
    ///
    /// Returns false if the engine is disabled, the asset cannot be decoded
    /// or the backend rejects playback.
    pub fn play_asset(&self, asset: &AssetIdentity, loops: i32) -> bool {
        if !self.gate.is_enabled() {
            return false;
        }
        match self
            .registry
            .get_or_try_insert_with(asset, || Sound::new(self, asset))
        {
            Ok(sound) => sound.play_looping(loops),
            Err(e) => {
                debug!("Cannot play {}: {}", asset, e);
                false
            }
        }
    }

    /// Resolves `name` and plays it through the registry.
    pub fn play_file(&self, name: &str, extension: Option<&str>, loops: i32) -> bool {
        match self.resolve(name, extension) {
            Some(asset) => self.play_asset(&asset, loops),
            None => false,
        }
    }

    /// Plays a `file://` URL or bare path through the registry.
    pub fn play_url(&self, url: &str, loops: i32) -> bool {
        match AssetIdentity::from_url(url) {
            Ok(asset) => self.play_asset(&asset, loops),
            Err(e) => {
                debug!("Cannot play {}: {}", url, e);
                false
            }
        }
    }

    /// Stops the registered sound for `asset`, if any.
    pub fn stop_asset(&self, asset: &AssetIdentity) {
        if let Some(sound) = self.registry.get(asset) {
            sound.stop();
        }
    }

    /// Resolves `name` and stops its registered sound, if any.
    pub fn stop_file(&self, name: &str, extension: Option<&str>) {
        if let Some(asset) = self.resolve(name, extension) {
            self.stop_asset(&asset);
        }
    }

    /// Stops every live sound built by this engine, registered or not.
    ///
    /// Returns the number of sounds notified.
    pub fn stop_all(&self) -> usize {
        self.stops.publish()
    }

    // ------------------------------------------------------------------
    // Sound construction and lookup
    // ------------------------------------------------------------------

    /// Builds an unregistered sound.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::NoPlayers` if no player could be built.
    pub fn sound(&self, asset: &AssetIdentity) -> Result<Sound, SoundError> {
        Sound::new(self, asset)
    }

    /// Resolves `name` and builds an unregistered sound.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::AssetNotFound` if the name does not resolve, or
    /// `SoundError::NoPlayers` if no player could be built.
    pub fn sound_for_file(&self, name: &str, extension: Option<&str>) -> Result<Sound, SoundError> {
        let asset = self.resolve(name, extension).ok_or_else(|| {
            SoundError::AssetNotFound(match extension {
                Some(ext) => format!("{name}.{ext}"),
                None => name.to_string(),
            })
        })?;
        Sound::new(self, &asset)
    }

    /// Resolves an asset name with the engine's resolver.
    #[must_use]
    pub fn resolve(&self, name: &str, extension: Option<&str>) -> Option<AssetIdentity> {
        self.resolver.resolve(name, extension)
    }

    /// Registered sound for `asset`.
    #[must_use]
    pub fn registered(&self, asset: &AssetIdentity) -> Option<Arc<Sound>> {
        self.registry.get(asset)
    }

    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of sounds currently subscribed to the stop broadcast.
    #[must_use]
    pub fn live_sound_count(&self) -> usize {
        self.stops.subscriber_count()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    /// Enables or disables playback; disabling stops every live sound.
    pub fn set_enabled(&self, enabled: bool) {
        self.gate.set_enabled(enabled);
    }

    #[must_use]
    pub fn players_per_sound(&self) -> usize {
        self.players_per_sound.load(Ordering::SeqCst)
    }

    /// Changes the pool size for sounds built from now on.
    ///
    /// Stops every live sound and empties the registry. Sounds held by
    /// callers keep working with their existing pools.
    pub fn set_players_per_sound(&self, players: usize) {
        let players = players.max(1);
        self.players_per_sound.store(players, Ordering::SeqCst);
        self.stop_all();
        let cleared = self.registry.clear();
        debug!(
            "Players per sound set to {}, {} registered sounds cleared",
            players, cleared
        );
    }

    #[must_use]
    pub fn category(&self) -> SoundCategory {
        self.category.lock().category
    }

    /// Switches the session category. Failures are logged and ignored.
    pub fn set_category(&self, category: SoundCategory) {
        let mut state = self.category.lock();
        state.category = category;
        state.applied = true;
        self.apply_category(category);
    }

    // ------------------------------------------------------------------
    // Crate-internal access for Sound construction
    // ------------------------------------------------------------------

    pub(crate) fn ensure_session_category(&self) {
        let mut state = self.category.lock();
        if !state.applied {
            state.applied = true;
            self.apply_category(state.category);
        }
    }

    pub(crate) fn factory(&self) -> &dyn PlayerFactory {
        self.factory.as_ref()
    }

    pub(crate) fn gate(&self) -> &Arc<GlobalGate> {
        &self.gate
    }

    pub(crate) fn stops(&self) -> &Arc<StopBroadcaster> {
        &self.stops
    }

    fn apply_category(&self, category: SoundCategory) {
        match self.session.set_category(category) {
            Ok(()) => debug!("Session category set to {}", category),
            Err(e) => warn!("Failed to set session category {}: {}", category, e),
        }
    }
}

impl std::fmt::Debug for SoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEngine")
            .field("players_per_sound", &self.players_per_sound())
            .field("category", &self.category())
            .field("registry", &self.registry)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
