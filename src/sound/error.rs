//! Sound system error types.
//!
//! Only construction-time failures are errors. Expected playback conditions
//! (disabled gate, missing asset at play time, resume without pause) are
//! reported as `false` by the play/resume surface instead.

use thiserror::Error;

/// Errors that can occur while building sounds and players.
#[derive(Debug, Error)]
pub enum SoundError {
    /// The asset name did not resolve to a resource.
    #[error("サウンドアセットが見つかりません: {0}")]
    AssetNotFound(String),

    /// The URL scheme is not supported by the asset layer.
    #[error("サポートされていないURLです: {0}")]
    UnsupportedUrl(String),

    /// Sound file was not found at the specified path.
    #[error("サウンドファイルが見つかりません: {0}")]
    FileNotFound(String),

    /// Failed to decode the audio file.
    #[error("サウンドファイルのデコードに失敗しました: {0}")]
    DecodeError(String),

    /// Audio device is not available (e.g., no speakers connected).
    #[error("オーディオデバイスが利用できません: {0}")]
    DeviceNotAvailable(String),

    /// Failed to create the audio output stream.
    #[error("オーディオストリームの作成に失敗しました: {0}")]
    StreamError(String),

    /// Every player in the pool failed to construct.
    #[error("プレイヤーを1つも作成できませんでした: {asset} ({attempts}回試行)")]
    NoPlayers {
        /// Display form of the asset.
        asset: String,
        /// Number of construction attempts made.
        attempts: usize,
    },

    /// Generic sound playback error.
    #[error("サウンド再生エラー: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the audio file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_) | Self::DecodeError(_) | Self::NoPlayers { .. }
        )
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AssetNotFound(_) => "アセットディレクトリとファイル名を確認してください",
            Self::UnsupportedUrl(_) => "file:// URLまたはファイルパスを指定してください",
            Self::FileNotFound(_) => "ファイルパスを確認してください",
            Self::DecodeError(_) | Self::NoPlayers { .. } => {
                "サウンドファイルが破損している可能性があります"
            }
            Self::DeviceNotAvailable(_) => "オーディオデバイスを接続してください",
            Self::StreamError(_) => "オーディオ設定を確認してください",
            Self::PlaybackError(_) => "アプリケーションを再起動してください",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SoundError::AssetNotFound("dog.wav".to_string());
        assert!(err.to_string().contains("dog.wav"));

        let err = SoundError::UnsupportedUrl("https://example.com/a.wav".to_string());
        assert!(err.to_string().contains("https://example.com/a.wav"));

        let err = SoundError::DecodeError("invalid format".to_string());
        assert!(err.to_string().contains("invalid format"));

        let err = SoundError::NoPlayers {
            asset: "/sounds/empty.wav".to_string(),
            attempts: 5,
        };
        assert!(err.to_string().contains("/sounds/empty.wav"));
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn test_is_device_error() {
        assert!(SoundError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(SoundError::StreamError("x".into()).is_device_error());
        assert!(!SoundError::DecodeError("x".into()).is_device_error());
        assert!(!SoundError::AssetNotFound("x".into()).is_device_error());
    }

    #[test]
    fn test_is_file_error() {
        assert!(SoundError::FileNotFound("x".into()).is_file_error());
        assert!(SoundError::DecodeError("x".into()).is_file_error());
        assert!(SoundError::NoPlayers {
            asset: "x".into(),
            attempts: 1
        }
        .is_file_error());
        assert!(!SoundError::StreamError("x".into()).is_file_error());
    }

    #[test]
    fn test_suggestion() {
        let err = SoundError::DeviceNotAvailable("x".into());
        assert!(err.suggestion().contains("オーディオデバイス"));

        let err = SoundError::DecodeError("x".into());
        assert!(err.suggestion().contains("破損"));

        let err = SoundError::PlaybackError("x".into());
        assert!(err.suggestion().contains("再起動"));
    }
}
