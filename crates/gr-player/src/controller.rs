use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use gr_core::config::PlayerConfig;
use gr_core::error::PlaybackError;
use gr_core::frame::TextFrame;
use gr_core::traits::DecoderBackend;

use crate::driver::run_session;
use crate::event::{Outcome, PlaybackEvent, SessionState};
use crate::session::{CancelToken, SessionConfig};
use crate::sink::{EventReceiver, channel};

/// Ce qu'un appel à [`Player::poll`] a récupéré.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollUpdate {
    /// Frame la plus récente, les intermédiaires sont perdues.
    pub frame: Option<TextFrame>,
    /// Dernière progression reçue.
    pub progress: Option<f32>,
    /// Lignes de statut, dans l'ordre d'émission.
    pub status: Vec<String>,
    /// Présent si la session s'est terminée pendant ce poll.
    pub outcome: Option<Outcome>,
}

impl PollUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_none()
            && self.progress.is_none()
            && self.status.is_empty()
            && self.outcome.is_none()
    }
}

struct ActiveSession {
    path: PathBuf,
    cancel: CancelToken,
    receiver: EventReceiver,
    handle: Option<JoinHandle<Outcome>>,
}

/// Contrôleur de lecture côté interface.
///
/// Une seule session à la fois, exécutée sur un thread `gr-playback`.
/// Le thread appelant démarre, annule et poll ; il ne bloque jamais sur le
/// worker sauf à la destruction.
///
/// # Example
/// ```
/// use gr_player::{Player, SessionState};
/// use gr_source::video::FfmpegBackend;
///
/// let player = Player::new(FfmpegBackend::default());
/// assert_eq!(player.state(), SessionState::Idle);
/// assert!(player.last_outcome().is_none());
/// ```
pub struct Player<B: DecoderBackend> {
    backend: Arc<B>,
    state: SessionState,
    active: Option<ActiveSession>,
    last_outcome: Option<Outcome>,
}

impl<B: DecoderBackend> Player<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            state: SessionState::Idle,
            active: None,
            last_outcome: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Fichier de la session en cours.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.path.as_path())
    }

    /// Démarre une session sur `path` avec un snapshot de `config`.
    ///
    /// # Errors
    /// - [`PlaybackError::Busy`] si une session tourne déjà.
    /// - [`PlaybackError::InvalidArgument`] si la config est rejetée.
    ///
    /// Une source illisible n'est pas une erreur ici : la session se
    /// termine en `Failed(SourceUnreadable)` au poll suivant.
    pub fn start(&mut self, path: &Path, config: &PlayerConfig) -> Result<(), PlaybackError> {
        if self.state == SessionState::Running {
            return Err(PlaybackError::Busy);
        }
        let session_config = SessionConfig::from_config(config)?;

        let cancel = CancelToken::new();
        let (mut sink, receiver) = channel();
        let backend = Arc::clone(&self.backend);
        let worker_cancel = cancel.clone();
        let worker_path = path.to_path_buf();

        let handle = thread::Builder::new()
            .name("gr-playback".to_string())
            .spawn(move || {
                run_session(
                    backend.as_ref(),
                    &worker_path,
                    &session_config,
                    &worker_cancel,
                    &mut sink,
                )
            })
            .map_err(|e| {
                PlaybackError::unreadable(path, format!("thread de lecture impossible : {e}"))
            })?;

        log::info!("Session démarrée : {}", path.display());
        self.state = SessionState::Running;
        self.active = Some(ActiveSession {
            path: path.to_path_buf(),
            cancel,
            receiver,
            handle: Some(handle),
        });
        Ok(())
    }

    /// Demande l'arrêt. Non bloquant ; observé à la prochaine frame.
    pub fn cancel(&self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }

    /// Récupère ce que le worker a produit depuis le dernier appel.
    pub fn poll(&mut self) -> PollUpdate {
        let mut update = PollUpdate::default();
        let Some(active) = self.active.as_mut() else {
            return update;
        };

        // Lu avant le drain : tout ce qui précède la déconnexion est récupéré
        let disconnected = active.receiver.is_disconnected();
        for event in active.receiver.drain() {
            match event {
                PlaybackEvent::Frame(frame) => update.frame = Some(frame),
                PlaybackEvent::Progress(p) => update.progress = Some(p),
                PlaybackEvent::Status(s) => update.status.push(s),
                PlaybackEvent::Terminal(outcome) => update.outcome = Some(outcome),
            }
        }
        if let Some(frame) = active.receiver.latest_frame() {
            update.frame = Some(frame);
        }

        // Worker mort sans événement terminal (panic)
        if update.outcome.is_none() && disconnected {
            let joined = active.handle.take().map(JoinHandle::join);
            update.outcome = Some(match joined {
                Some(Ok(outcome)) => outcome,
                _ => Outcome::Failed(PlaybackError::DecodeFailure {
                    frame_index: 0,
                    reason: "le thread de lecture s'est interrompu".into(),
                }),
            });
        }

        if let Some(outcome) = &update.outcome {
            self.finish(outcome.clone());
        }
        update
    }

    /// Retour à `Idle` après un état terminal. Sans effet pendant une lecture.
    pub fn reset(&mut self) {
        if self.state.is_terminal() {
            self.state = SessionState::Idle;
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        if let Some(mut active) = self.active.take()
            && let Some(handle) = active.handle.take()
            && handle.join().is_err()
        {
            log::error!("Thread de lecture paniqué ({})", active.path.display());
        }
        self.state = outcome.state();
        self.last_outcome = Some(outcome);
    }
}

impl<B: DecoderBackend> Drop for Player<B> {
    fn drop(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.cancel.cancel();
            if let Some(handle) = active.handle.take() {
                let _ = handle.join();
            }
        }
    }
}
