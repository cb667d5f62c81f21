//! Asset-level playback handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tracing::trace;

use super::asset::AssetIdentity;
use super::error::SoundError;
use super::pool::PlayerPool;
use super::PlayerCompletion;
use crate::engine::{GlobalGate, SoundEngine, StopBroadcaster, StopListener, Subscription};

/// A playable asset backed by a pool of players.
///
/// Every `play` takes the next player in rotation, so up to
/// `players_per_sound` copies of the same effect can overlap; the next play
/// after that reuses (and interrupts) the oldest selected player. Queries
/// and `pause`/`resume` act on the most recently selected player.
///
/// A sound stays subscribed to the engine's stop broadcast for as long as it
/// lives, whether or not it is registered.
pub struct Sound {
    inner: Arc<SoundInner>,
    _subscription: Subscription,
}

struct SoundInner {
    asset: AssetIdentity,
    pool: PlayerPool,
    paused: AtomicBool,
    gate: Arc<GlobalGate>,
}

impl SoundInner {
    fn stop(&self) {
        for player in self.pool.iter() {
            player.stop();
        }
        self.paused.store(false, Ordering::SeqCst);
    }
}

impl StopListener for SoundInner {
    fn on_stop(&self) {
        trace!("Stop notification received for {}", self.asset);
        self.stop();
    }
}

impl Sound {
    /// Builds a sound for `asset` using the engine's backend and pool size.
    ///
    /// The sound is not added to the engine's registry.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::NoPlayers` if no player could be built.
    pub fn new(engine: &SoundEngine, asset: &AssetIdentity) -> Result<Self, SoundError> {
        engine.ensure_session_category();
        let pool = PlayerPool::build(engine.factory(), asset, engine.players_per_sound())?;
        Ok(Self::from_pool(
            asset.clone(),
            pool,
            Arc::clone(engine.gate()),
            engine.stops(),
        ))
    }

    fn from_pool(
        asset: AssetIdentity,
        pool: PlayerPool,
        gate: Arc<GlobalGate>,
        stops: &Arc<StopBroadcaster>,
    ) -> Self {
        let inner = Arc::new(SoundInner {
            asset,
            pool,
            paused: AtomicBool::new(false),
            gate,
        });
        let listener: Arc<dyn StopListener> = inner.clone();
        let weak: Weak<dyn StopListener> = Arc::downgrade(&listener);
        let subscription = stops.subscribe(weak);
        Self {
            inner,
            _subscription: subscription,
        }
    }

    /// Plays once.
    pub fn play(&self) -> bool {
        self.play_with(0, None)
    }

    /// Plays `loops + 1` times, or forever when `loops` is negative.
    pub fn play_looping(&self, loops: i32) -> bool {
        self.play_with(loops, None)
    }

    /// Plays with an optional completion callback.
    ///
    /// Returns false without side effects when the engine is disabled;
    /// otherwise returns the backend's acceptance result.
    pub fn play_with(&self, loops: i32, completion: Option<PlayerCompletion>) -> bool {
        if !self.inner.gate.is_enabled() {
            trace!("Sound disabled, not playing {}", self.inner.asset);
            return false;
        }
        self.inner.paused.store(false, Ordering::SeqCst);
        let player = self.inner.pool.next();
        player.play(loops, completion)
    }

    /// Stops every player in the pool.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Pauses the current player.
    pub fn pause(&self) {
        self.inner.pool.current().pause();
        self.inner.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes after `pause`.
    ///
    /// Returns false and does nothing unless the sound is paused.
    pub fn resume(&self) -> bool {
        if self
            .inner
            .paused
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.inner.pool.current().resume();
        true
    }

    /// Live playing state of the current player.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.inner.pool.current().is_playing()
    }

    /// True between `pause` and the next `resume`, `play` or `stop`.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    /// Pre-buffers the player the next `play` will use.
    ///
    /// Peeks at the rotation without advancing it.
    pub fn prepare(&self) -> bool {
        self.inner.pool.peek_next().prepare()
    }

    /// Volume of the current player.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.inner.pool.current().volume()
    }

    /// Sets the volume of every player, clamped to `0.0..=1.0`.
    pub fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        for player in self.inner.pool.iter() {
            player.set_volume(volume);
        }
    }

    /// Fades every player to `volume` over `duration`.
    pub fn fade_volume(&self, volume: f32, duration: Duration) {
        let volume = volume.clamp(0.0, 1.0);
        for player in self.inner.pool.iter() {
            player.fade_volume(volume, duration);
        }
    }

    /// Length of the asset.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.inner.pool.current().duration()
    }

    /// Playback position of the current player.
    #[must_use]
    pub fn current_time(&self) -> Duration {
        self.inner.pool.current().current_time()
    }

    /// Moves the playback position of the current player.
    pub fn set_current_time(&self, position: Duration) {
        self.inner.pool.current().set_current_time(position);
    }

    #[must_use]
    pub fn asset(&self) -> &AssetIdentity {
        &self.inner.asset
    }

    /// Number of players that were successfully built.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.inner.pool.len()
    }

    #[must_use]
    pub fn pool(&self) -> &PlayerPool {
        &self.inner.pool
    }
}

impl std::fmt::Debug for Sound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sound")
            .field("asset", &self.inner.asset)
            .field("pool", &self.inner.pool)
            .field("paused", &self.is_paused())
            .finish()
    }
}
