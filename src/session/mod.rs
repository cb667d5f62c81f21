//! Audio session category configuration.
//!
//! Some platforms route sound through a session whose category decides how
//! effects mix with other audio. The engine only ever asks the session to
//! switch category, and treats failures as best-effort.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the host session should treat this application's audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    /// Mixes with other audio and is silenced by the ringer switch.
    #[default]
    Ambient,
    /// Like `Ambient` but interrupts other audio.
    SoloAmbient,
    /// Playback that continues when the device is silenced.
    Playback,
    /// Recording only.
    Record,
    /// Simultaneous recording and playback.
    PlayAndRecord,
}

impl SoundCategory {
    /// All categories, in declaration order.
    pub const ALL: [SoundCategory; 5] = [
        SoundCategory::Ambient,
        SoundCategory::SoloAmbient,
        SoundCategory::Playback,
        SoundCategory::Record,
        SoundCategory::PlayAndRecord,
    ];

    /// Returns the string representation of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCategory::Ambient => "ambient",
            SoundCategory::SoloAmbient => "solo_ambient",
            SoundCategory::Playback => "playback",
            SoundCategory::Record => "record",
            SoundCategory::PlayAndRecord => "play_and_record",
        }
    }
}

impl fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session error type.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session refused the category.
    #[error("Session rejected category {0}: {1}")]
    CategoryRejected(SoundCategory, String),
}

/// Host audio session.
pub trait Session: Send + Sync {
    /// Switches the session category.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the category.
    fn set_category(&self, category: SoundCategory) -> Result<(), SessionError>;
}

/// Session for platforms without a session concept.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSession;

impl Session for NoopSession {
    fn set_category(&self, _category: SoundCategory) -> Result<(), SessionError> {
        Ok(())
    }
}

/// Mock session for testing.
#[derive(Debug, Default)]
pub struct MockSession {
    calls: Mutex<Vec<SoundCategory>>,
    should_fail: Mutex<bool>,
}

impl MockSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock() = should_fail;
    }

    /// Categories requested so far, including rejected ones.
    #[must_use]
    pub fn calls(&self) -> Vec<SoundCategory> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Session for MockSession {
    fn set_category(&self, category: SoundCategory) -> Result<(), SessionError> {
        self.calls.lock().push(category);
        if *self.should_fail.lock() {
            return Err(SessionError::CategoryRejected(
                category,
                "simulated failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_category_is_ambient() {
        assert_eq!(SoundCategory::default(), SoundCategory::Ambient);
    }

    #[test]
    fn test_category_serde_names() {
        for category in SoundCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            let back: SoundCategory = serde_json::from_str(&json).unwrap();
            assert_eq!(back, category);
        }
    }

    #[test]
    fn test_noop_session_accepts_everything() {
        for category in SoundCategory::ALL {
            assert!(NoopSession.set_category(category).is_ok());
        }
    }

    #[test]
    fn test_mock_session_records_calls() {
        let session = MockSession::new();
        session.set_category(SoundCategory::Playback).unwrap();
        session.set_should_fail(true);
        let err = session.set_category(SoundCategory::Record).unwrap_err();
        assert!(err.to_string().contains("record"));
        assert_eq!(
            session.calls(),
            vec![SoundCategory::Playback, SoundCategory::Record]
        );
    }
}
