//! Mock player backend for testing.
//!
//! `MockPlayerFactory` mirrors the decode rules of a real backend closely
//! enough for engine tests: missing files and zero-length files fail to
//! construct, everything else yields a [`MockPlayer`] that records calls.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::asset::AssetIdentity;
use super::error::SoundError;
use super::{Player, PlayerCompletion, PlayerFactory};

/// Duration reported by every mock player.
const MOCK_DURATION: Duration = Duration::from_secs(1);

/// Mock player factory for testing.
#[derive(Default)]
pub struct MockPlayerFactory {
    create_calls: AtomicUsize,
    should_fail: AtomicBool,
    success_limit: Mutex<Option<usize>>,
    players: Mutex<Vec<Arc<MockPlayer>>>,
}

impl MockPlayerFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `create` fail with a decode error.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Caps the total number of players this factory will ever build.
    pub fn set_success_limit(&self, limit: Option<usize>) {
        *self.success_limit.lock() = limit;
    }

    /// Number of `create` calls, successful or not.
    #[must_use]
    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Every player built so far, in creation order.
    #[must_use]
    pub fn players(&self) -> Vec<Arc<MockPlayer>> {
        self.players.lock().clone()
    }

    /// Players built for one asset, in creation order.
    #[must_use]
    pub fn players_for(&self, asset: &AssetIdentity) -> Vec<Arc<MockPlayer>> {
        self.players
            .lock()
            .iter()
            .filter(|p| p.asset() == asset)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.create_calls.store(0, Ordering::SeqCst);
        self.players.lock().clear();
    }
}

impl PlayerFactory for MockPlayerFactory {
    fn create(&self, asset: &AssetIdentity) -> Result<Arc<dyn Player>, SoundError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let metadata = std::fs::metadata(asset.path())
            .map_err(|e| SoundError::FileNotFound(format!("{}: {}", asset, e)))?;
        if metadata.len() == 0 {
            return Err(SoundError::DecodeError(format!("{}: empty file", asset)));
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::DecodeError("Mock failure".to_string()));
        }

        let mut players = self.players.lock();
        if let Some(limit) = *self.success_limit.lock() {
            if players.len() >= limit {
                return Err(SoundError::DecodeError("Mock limit reached".to_string()));
            }
        }
        let player = Arc::new(MockPlayer::new(asset.clone()));
        players.push(Arc::clone(&player));
        Ok(player)
    }
}

/// Mock player that records calls and lets tests end playback on demand.
pub struct MockPlayer {
    asset: AssetIdentity,
    playing: AtomicBool,
    accept_play: AtomicBool,
    volume: Mutex<f32>,
    current_time: Mutex<Duration>,
    pending: Mutex<Option<PlayerCompletion>>,
    fades: Mutex<Vec<(f32, Duration)>>,
    last_loops: AtomicI32,
    play_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    pause_calls: AtomicUsize,
    resume_calls: AtomicUsize,
    prepare_calls: AtomicUsize,
}

impl MockPlayer {
    #[must_use]
    pub fn new(asset: AssetIdentity) -> Self {
        Self {
            asset,
            playing: AtomicBool::new(false),
            accept_play: AtomicBool::new(true),
            volume: Mutex::new(1.0),
            current_time: Mutex::new(Duration::ZERO),
            pending: Mutex::new(None),
            fades: Mutex::new(Vec::new()),
            last_loops: AtomicI32::new(0),
            play_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            pause_calls: AtomicUsize::new(0),
            resume_calls: AtomicUsize::new(0),
            prepare_calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn asset(&self) -> &AssetIdentity {
        &self.asset
    }

    /// Makes `play` report rejection by the backend.
    pub fn set_accept_play(&self, accept: bool) {
        self.accept_play.store(accept, Ordering::SeqCst);
    }

    /// Simulates playback reaching its natural end.
    ///
    /// Returns true if a completion callback was fired.
    pub fn finish(&self) -> bool {
        self.playing.store(false, Ordering::SeqCst);
        let completion = self.pending.lock().take();
        match completion {
            Some(completion) => {
                completion(true);
                true
            }
            None => false,
        }
    }

    /// True if a completion callback is waiting for `finish`.
    #[must_use]
    pub fn has_pending_completion(&self) -> bool {
        self.pending.lock().is_some()
    }

    #[must_use]
    pub fn last_loops(&self) -> i32 {
        self.last_loops.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn fades(&self) -> Vec<(f32, Duration)> {
        self.fades.lock().clone()
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn pause_count(&self) -> usize {
        self.pause_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn resume_count(&self) -> usize {
        self.resume_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn prepare_count(&self) -> usize {
        self.prepare_calls.load(Ordering::SeqCst)
    }
}

impl Player for MockPlayer {
    fn play(&self, loops: i32, completion: Option<PlayerCompletion>) -> bool {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
        if !self.accept_play.load(Ordering::SeqCst) {
            return false;
        }
        self.last_loops.store(loops, Ordering::SeqCst);
        // A replayed player drops the interrupted request's callback
        *self.pending.lock() = completion;
        *self.current_time.lock() = Duration::ZERO;
        self.playing.store(true, Ordering::SeqCst);
        true
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
        self.pending.lock().take();
    }

    fn pause(&self) {
        self.pause_calls.fetch_add(1, Ordering::SeqCst);
        self.playing.store(false, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.resume_calls.fetch_add(1, Ordering::SeqCst);
        self.playing.store(true, Ordering::SeqCst);
    }

    fn prepare(&self) -> bool {
        self.prepare_calls.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume.clamp(0.0, 1.0);
    }

    fn fade_volume(&self, target: f32, duration: Duration) {
        self.fades.lock().push((target, duration));
        *self.volume.lock() = target.clamp(0.0, 1.0);
    }

    fn duration(&self) -> Duration {
        MOCK_DURATION
    }

    fn current_time(&self) -> Duration {
        *self.current_time.lock()
    }

    fn set_current_time(&self, position: Duration) {
        *self.current_time.lock() = position.min(MOCK_DURATION);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for MockPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPlayer")
            .field("asset", &self.asset)
            .field("playing", &self.is_playing())
            .finish_non_exhaustive()
    }
}
