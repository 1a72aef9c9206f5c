use std::path::PathBuf;

use thiserror::Error;

/// Errors a playback session can end with.
///
/// Cancellation is not an error; see `gr_player::Outcome`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The source could not be opened (missing file, no video stream, codec).
    #[error("Source illisible : {} ({reason})", path.display())]
    SourceUnreadable {
        /// Path that was requested.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Malformed configuration, rejected before a session starts.
    #[error("Argument invalide : {0}")]
    InvalidArgument(String),

    /// Mid-stream decode error, distinct from end of stream.
    #[error("Échec de décodage après la frame {frame_index} : {reason}")]
    DecodeFailure {
        /// Number of frames successfully emitted before the failure.
        frame_index: u64,
        /// Human-readable cause.
        reason: String,
    },

    /// A session is already running.
    #[error("Une lecture est déjà en cours")]
    Busy,
}

impl PlaybackError {
    /// Shorthand for [`PlaybackError::SourceUnreadable`].
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let e = PlaybackError::unreadable("/tmp/none.mp4", "fichier introuvable");
        assert!(e.to_string().contains("/tmp/none.mp4"));

        let e = PlaybackError::DecodeFailure {
            frame_index: 42,
            reason: "pipe cassé".into(),
        };
        assert!(e.to_string().contains("42"));
    }
}
