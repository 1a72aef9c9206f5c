use std::path::Path;
use std::thread;

use gr_ascii::transform::FrameTransformer;
use gr_core::error::PlaybackError;
use gr_core::frame::GrayFrame;
use gr_core::traits::{DecoderBackend, VideoStream};

use crate::event::{Outcome, PlaybackEvent};
use crate::session::{CancelToken, PlaybackSession, SessionConfig, effective_fps, pacing_interval};
use crate::sink::EventSink;

/// Exécute une session complète sur le thread courant.
///
/// Ouvre la source, décode, transforme et émet chaque frame dans l'ordre,
/// puis émet `Terminal(outcome)`. La source est libérée exactement une
/// fois sur tous les chemins où elle a été ouverte.
///
/// # Example
/// ```
/// use gr_core::config::PlayerConfig;
/// use gr_core::error::PlaybackError;
/// use gr_player::driver::run_session;
/// use gr_player::event::Outcome;
/// use gr_player::session::{CancelToken, SessionConfig};
/// use gr_source::video::FfmpegBackend;
/// use std::path::Path;
///
/// let config = SessionConfig::from_config(&PlayerConfig::default()).unwrap();
/// let mut events = Vec::new();
/// let outcome = run_session(
///     &FfmpegBackend::default(),
///     Path::new("/nonexistent/clip.mp4"),
///     &config,
///     &CancelToken::new(),
///     &mut events,
/// );
/// assert!(matches!(outcome, Outcome::Failed(PlaybackError::SourceUnreadable { .. })));
/// ```
pub fn run_session<B, S>(
    backend: &B,
    path: &Path,
    config: &SessionConfig,
    cancel: &CancelToken,
    sink: &mut S,
) -> Outcome
where
    B: DecoderBackend,
    S: EventSink,
{
    let mut session = PlaybackSession::new(path, cancel.clone());

    let outcome = match FrameTransformer::new(config.palette.clone(), config.transform) {
        Err(e) => Outcome::Failed(e),
        Ok(mut transformer) => match backend.open(path) {
            Err(e) => {
                log::warn!("Ouverture impossible : {e}");
                Outcome::Failed(e)
            }
            Ok(mut stream) => {
                let outcome = drive(&mut session, &mut stream, &mut transformer, config, sink);
                stream.release();
                outcome
            }
        },
    };

    session.finish(outcome.state());
    log::info!("{} [{}] : {outcome}", path.display(), session.state().label());
    sink.emit(PlaybackEvent::Status(outcome.to_string()));
    sink.emit(PlaybackEvent::Terminal(outcome.clone()));
    outcome
}

/// Boucle principale, source déjà ouverte. Ne libère pas la source.
fn drive<V, S>(
    session: &mut PlaybackSession,
    stream: &mut V,
    transformer: &mut FrameTransformer,
    config: &SessionConfig,
    sink: &mut S,
) -> Outcome
where
    V: VideoStream,
    S: EventSink,
{
    let fps = effective_fps(stream.frame_rate(), config.fallback_fps);
    if stream.frame_rate().is_none_or(|f| f <= 0.0) {
        log::debug!("FPS source absent, repli sur {fps}");
    }
    let pause = pacing_interval(fps, config.pacing_factor);
    let total = stream.frame_count_estimate();
    session.begin(fps, total);

    let name = session
        .path()
        .file_name()
        .map_or_else(|| session.path().display().to_string(), |n| n.to_string_lossy().into_owned());
    let opened = match total {
        Some(n) => format!("Lecture : {name} ({:.2} fps, ~{n} frames)", session.fps()),
        None => format!("Lecture : {name} ({:.2} fps)", session.fps()),
    };
    if !sink.emit(PlaybackEvent::Status(opened)) {
        return Outcome::Cancelled { frames: 0 };
    }

    loop {
        // === Annulation : un seul point de contrôle par itération ===
        if session.is_cancelled() {
            return Outcome::Cancelled {
                frames: session.frame_index(),
            };
        }

        let fb = match stream.read_next_frame() {
            Ok(Some(fb)) => fb,
            Ok(None) => {
                if let Some(p) = session.complete_progress() {
                    sink.emit(PlaybackEvent::Progress(p));
                }
                return Outcome::Completed {
                    frames: session.frame_index(),
                };
            }
            Err(e) => {
                let reason = match e {
                    PlaybackError::DecodeFailure { reason, .. } => reason,
                    other => other.to_string(),
                };
                return Outcome::Failed(PlaybackError::DecodeFailure {
                    frame_index: session.frame_index(),
                    reason,
                });
            }
        };

        let gray = GrayFrame::from_rgba(&fb);
        let text = transformer.transform(&gray);
        if !sink.emit(PlaybackEvent::Frame(text)) {
            log::debug!("Consommateur fermé, arrêt de la session");
            return Outcome::Cancelled {
                frames: session.frame_index(),
            };
        }

        if let Some(p) = session.advance() {
            sink.emit(PlaybackEvent::Progress(p));
        }
        if session.status_due() {
            sink.emit(PlaybackEvent::Status(format!("[Frame {}]", session.frame_index())));
        }

        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }
}
