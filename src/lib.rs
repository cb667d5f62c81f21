//! Sound Effect Pool Library
//!
//! This library provides a small façade for playing short sound effects.
//! It includes:
//! - Per-asset player pools dispatched round-robin so an effect can overlap
//!   with itself
//! - A registry keyed by asset identity for fire-and-forget playback
//! - A persisted global enable switch
//! - Broadcast stop-all reaching every live sound, registered or not
//! - Pause/resume and volume fades on individual sounds
//! - A rodio output backend and mock players for tests

pub mod config;
pub mod engine;
pub mod logging;
pub mod session;
pub mod settings;
pub mod sound;

// Re-export commonly used types for convenience
pub use config::{ConfigError, EngineConfig};
pub use engine::{GlobalGate, SoundEngine, StopBroadcaster, StopListener};
pub use session::{MockSession, NoopSession, Session, SessionError, SoundCategory};
pub use settings::{JsonFileSettingsStore, MemorySettingsStore, SettingsError, SettingsStore};

// Re-export sound types
pub use sound::{
    AssetIdentity, AssetResolver, DirectoryResolver, MockPlayer, MockPlayerFactory, Player,
    PlayerCompletion, PlayerFactory, PlayerPool, RodioOutput, RodioPlayerFactory, Sound,
    SoundError,
};
