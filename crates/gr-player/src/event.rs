use gr_core::error::PlaybackError;
use gr_core::frame::TextFrame;

/// État d'une session : `Idle → Running → {Completed | Cancelled | Failed} → Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }
}

/// How a session ended. Cancellation is not an error.
///
/// # Example
/// ```
/// use gr_player::event::{Outcome, SessionState};
/// let o = Outcome::Cancelled { frames: 3 };
/// assert_eq!(o.state(), SessionState::Cancelled);
/// assert_eq!(o.frames(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Completed { frames: u64 },
    Cancelled { frames: u64 },
    Failed(PlaybackError),
}

impl Outcome {
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self {
            Self::Completed { .. } => SessionState::Completed,
            Self::Cancelled { .. } => SessionState::Cancelled,
            Self::Failed(_) => SessionState::Failed,
        }
    }

    /// Frames émises avant la fin (celles d'un échec de décodage incluses).
    #[must_use]
    pub fn frames(&self) -> u64 {
        match self {
            Self::Completed { frames } | Self::Cancelled { frames } => *frames,
            Self::Failed(PlaybackError::DecodeFailure { frame_index, .. }) => *frame_index,
            Self::Failed(_) => 0,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed { frames } => write!(f, "Terminé ({frames} frames)"),
            Self::Cancelled { frames } => write!(f, "Arrêté ({frames} frames)"),
            Self::Failed(e) => write!(f, "Erreur : {e}"),
        }
    }
}

/// Événements typés émis par le worker.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    /// Frame texte complète, remplace la précédente.
    Frame(TextFrame),
    /// Ratio dans `[0.0, 1.0]`, jamais décroissant dans une session.
    Progress(f32),
    /// Ligne de log lisible.
    Status(String),
    /// Dernier événement d'une session.
    Terminal(Outcome),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Running.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        let o = Outcome::Failed(PlaybackError::DecodeFailure {
            frame_index: 7,
            reason: "x".into(),
        });
        assert_eq!(o.state(), SessionState::Failed);
        assert_eq!(o.frames(), 7);
        assert!(o.to_string().starts_with("Erreur"));
    }
}
