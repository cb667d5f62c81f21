//! Fixed-size player pool with round-robin dispatch.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::asset::AssetIdentity;
use super::error::SoundError;
use super::{Player, PlayerFactory};

/// Interchangeable players for one asset.
///
/// The pool size is fixed at construction and never changes. The cursor
/// uses pre-increment semantics: it starts at 0 and the first `next()` on a
/// pool of more than one player returns index 1.
pub struct PlayerPool {
    players: Vec<Arc<dyn Player>>,
    cursor: Mutex<usize>,
}

impl PlayerPool {
    /// Builds up to `size` players (minimum 1) for `asset`.
    ///
    /// Individual construction failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::NoPlayers` if not a single player could be built.
    pub fn build(
        factory: &dyn PlayerFactory,
        asset: &AssetIdentity,
        size: usize,
    ) -> Result<Self, SoundError> {
        let attempts = size.max(1);
        let mut players = Vec::with_capacity(attempts);
        for _ in 0..attempts {
            match factory.create(asset) {
                Ok(player) => players.push(player),
                Err(e) => warn!("Failed to create player for {}: {}", asset, e),
            }
        }

        if players.is_empty() {
            return Err(SoundError::NoPlayers {
                asset: asset.to_string(),
                attempts,
            });
        }

        debug!(
            "Player pool ready for {} ({}/{} players)",
            asset,
            players.len(),
            attempts
        );
        Ok(Self::from_players(players))
    }

    /// Wraps already-built players. Callers guarantee `players` is non-empty.
    fn from_players(players: Vec<Arc<dyn Player>>) -> Self {
        debug_assert!(!players.is_empty());
        Self {
            players,
            cursor: Mutex::new(0),
        }
    }

    /// Advances the cursor and returns the player it lands on.
    pub fn next(&self) -> Arc<dyn Player> {
        let mut cursor = self.cursor.lock();
        *cursor = (*cursor + 1) % self.players.len();
        Arc::clone(&self.players[*cursor])
    }

    /// The player `next()` would return, without advancing.
    #[must_use]
    pub fn peek_next(&self) -> Arc<dyn Player> {
        let cursor = self.cursor.lock();
        Arc::clone(&self.players[(*cursor + 1) % self.players.len()])
    }

    /// The most recently selected player.
    #[must_use]
    pub fn current(&self) -> Arc<dyn Player> {
        let cursor = self.cursor.lock();
        Arc::clone(&self.players[*cursor])
    }

    /// Current cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        *self.cursor.lock()
    }

    /// All players in pool order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Player>> {
        self.players.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Always false for a constructed pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl std::fmt::Debug for PlayerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerPool")
            .field("len", &self.players.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}
