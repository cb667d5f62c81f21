//! Sound playback layer.
//!
//! This module provides the asset-level playback handle and everything it
//! sits on:
//!
//! - The [`Player`] capability, one decodable and playable audio instance
//! - [`PlayerPool`], a fixed set of players for one asset dispatched
//!   round-robin so the same effect can overlap with itself
//! - [`Sound`], the handle callers play, stop, pause and fade
//! - Asset identity and resolution
//! - A rodio-backed player and a mock player for tests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │      Sound       │ ← play / stop / pause / resume / volume
//! └────────┬─────────┘
//!          │ next() / current()
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │    PlayerPool    │────▶│  Player (rodio)  │ × players_per_sound
//! │  (round-robin)   │     ├──────────────────┤
//! │                  │────▶│  Player (mock)   │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use soundpool::engine::SoundEngine;
//! use soundpool::settings::MemorySettingsStore;
//! use soundpool::sound::{RodioOutput, Sound, AssetIdentity};
//!
//! // Keep the output alive for as long as sounds should play
//! let output = RodioOutput::try_default().expect("audio init");
//! let engine = SoundEngine::new(
//!     Arc::new(output.factory()),
//!     Arc::new(MemorySettingsStore::new()),
//! );
//!
//! let sound = Sound::new(&engine, &AssetIdentity::from_path("sounds/dog.wav"))
//!     .expect("decodable asset");
//! sound.play();
//! ```

mod asset;
mod error;
mod mock;
mod player;
mod playback;
mod pool;

use std::sync::Arc;
use std::time::Duration;

pub use asset::{AssetIdentity, AssetResolver, DirectoryResolver, SUPPORTED_EXTENSIONS};
pub use error::SoundError;
pub use mock::{MockPlayer, MockPlayerFactory};
pub use player::{RodioOutput, RodioPlayer, RodioPlayerFactory};
pub use playback::Sound;
pub use pool::PlayerPool;

/// Callback fired once when a play request reaches its natural end.
///
/// The argument reports whether playback finished successfully. It is never
/// invoked for playback interrupted by `stop()` or by a newer `play()`.
pub type PlayerCompletion = Box<dyn FnOnce(bool) + Send + 'static>;

/// A single decodable, playable audio resource instance.
///
/// Construction (through a [`PlayerFactory`]) is the only fallible step; a
/// player that exists is assumed playable. All methods take `&self` so that
/// players can be shared with completion threads.
pub trait Player: Send + Sync {
    /// Starts playback.
    ///
    /// `loops == 0` plays once, `loops == n` plays `n + 1` times and a
    /// negative value loops until stopped. Returns true if the backend
    /// accepted the request.
    fn play(&self, loops: i32, completion: Option<PlayerCompletion>) -> bool;

    /// Stops playback. Safe to call whether or not playing.
    fn stop(&self);

    /// Freezes the playback position.
    fn pause(&self);

    /// Continues from the frozen position.
    fn resume(&self);

    /// Pre-buffers without audible output.
    fn prepare(&self) -> bool;

    /// Current volume in `0.0..=1.0`.
    fn volume(&self) -> f32;

    /// Sets the volume immediately.
    fn set_volume(&self, volume: f32);

    /// Moves the volume linearly to `target` over `duration`.
    fn fade_volume(&self, target: f32, duration: Duration);

    /// Length of the asset as reported by the backend.
    fn duration(&self) -> Duration;

    /// Playback position.
    fn current_time(&self) -> Duration;

    /// Moves the playback position.
    fn set_current_time(&self, position: Duration);

    /// Live playing state.
    fn is_playing(&self) -> bool;
}

/// Builds players for an asset.
///
/// Injected into the engine so tests can run without an audio device.
pub trait PlayerFactory: Send + Sync {
    /// Creates one player for `asset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is unreadable or cannot be decoded.
    fn create(&self, asset: &AssetIdentity) -> Result<Arc<dyn Player>, SoundError>;
}
