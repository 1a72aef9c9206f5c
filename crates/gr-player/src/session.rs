use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use gr_ascii::transform::TransformOptions;
use gr_core::config::PlayerConfig;
use gr_core::error::PlaybackError;
use gr_core::palette::Palette;

use crate::event::SessionState;

/// Drapeau d'annulation coopératif, partagé entre contrôleur et worker.
///
/// Vérifié une seule fois par frame, avant la lecture suivante.
///
/// # Example
/// ```
/// use gr_player::session::CancelToken;
/// let token = CancelToken::new();
/// let worker_side = token.clone();
/// token.cancel();
/// assert!(worker_side.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Paramètres figés au démarrage d'une session.
///
/// Un rechargement de config pendant la lecture ne les modifie pas.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub palette: Palette,
    pub transform: TransformOptions,
    pub pacing_factor: f32,
    pub fallback_fps: f64,
}

impl SessionConfig {
    /// Snapshot de la config courante.
    ///
    /// # Errors
    /// [`PlaybackError::InvalidArgument`] si la largeur de sortie est nulle.
    ///
    /// # Example
    /// ```
    /// use gr_core::config::PlayerConfig;
    /// use gr_player::session::SessionConfig;
    /// let mut config = PlayerConfig::default();
    /// assert!(SessionConfig::from_config(&config).is_ok());
    /// config.output_width = 0;
    /// assert!(SessionConfig::from_config(&config).is_err());
    /// ```
    pub fn from_config(config: &PlayerConfig) -> Result<Self, PlaybackError> {
        if config.output_width == 0 {
            return Err(PlaybackError::InvalidArgument(
                "la largeur de sortie doit être > 0".into(),
            ));
        }
        Ok(Self {
            palette: config.palette(),
            transform: TransformOptions::new(config.output_width)
                .with_char_aspect(config.char_aspect),
            pacing_factor: config.pacing_factor,
            fallback_fps: config.fallback_fps,
        })
    }
}

/// FPS retenu pour le pacing : celui de la source s'il est positif, sinon le repli.
///
/// # Example
/// ```
/// use gr_player::session::effective_fps;
/// assert_eq!(effective_fps(Some(30.0), 24.0), 30.0);
/// assert_eq!(effective_fps(Some(0.0), 24.0), 24.0);
/// assert_eq!(effective_fps(None, 24.0), 24.0);
/// ```
#[must_use]
pub fn effective_fps(reported: Option<f64>, fallback: f64) -> f64 {
    match reported {
        Some(fps) if fps.is_finite() && fps > 0.0 => fps,
        _ if fallback.is_finite() && fallback > 0.0 => fallback,
        _ => 24.0,
    }
}

/// Pause après chaque frame : `factor / fps`.
///
/// # Example
/// ```
/// use gr_player::session::pacing_interval;
/// use std::time::Duration;
/// assert_eq!(pacing_interval(25.0, 0.5), Duration::from_millis(20));
/// assert_eq!(pacing_interval(25.0, 0.0), Duration::ZERO);
/// ```
#[must_use]
pub fn pacing_interval(fps: f64, factor: f32) -> Duration {
    let factor = f64::from(factor.max(0.0));
    if fps <= 0.0 || factor == 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(factor / fps).unwrap_or(Duration::ZERO)
}

/// `clamp(frame_index / total, 0, 1)`; `None` si le total est inconnu ou nul.
#[must_use]
pub fn progress_ratio(frame_index: u64, total: Option<u64>) -> Option<f32> {
    let total = total.filter(|&t| t > 0)?;
    Some(((frame_index as f64 / total as f64).clamp(0.0, 1.0)) as f32)
}

/// État explicite d'une session de lecture, possédé par le worker.
#[derive(Debug)]
pub struct PlaybackSession {
    path: PathBuf,
    state: SessionState,
    frame_index: u64,
    total_estimate: Option<u64>,
    fps: f64,
    progress: f32,
    cancel: CancelToken,
}

impl PlaybackSession {
    #[must_use]
    pub fn new(path: &Path, cancel: CancelToken) -> Self {
        Self {
            path: path.to_path_buf(),
            state: SessionState::Idle,
            frame_index: 0,
            total_estimate: None,
            fps: 0.0,
            progress: 0.0,
            cancel,
        }
    }

    /// Passe en `Running` avec les métadonnées de la source ouverte.
    pub fn begin(&mut self, fps: f64, total_estimate: Option<u64>) {
        self.state = SessionState::Running;
        self.fps = fps;
        self.total_estimate = total_estimate;
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn finish(&mut self, state: SessionState) {
        self.state = state;
    }

    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Compte une frame émise et retourne la progression si elle a avancé.
    ///
    /// La progression ne recule jamais, même si l'estimation est fausse.
    pub fn advance(&mut self) -> Option<f32> {
        self.frame_index += 1;
        let ratio = progress_ratio(self.frame_index, self.total_estimate)?;
        if ratio > self.progress {
            self.progress = ratio;
            Some(ratio)
        } else {
            None
        }
    }

    /// Progression finale ; `None` si déjà à 1.0.
    pub fn complete_progress(&mut self) -> Option<f32> {
        if self.progress >= 1.0 {
            return None;
        }
        self.progress = 1.0;
        Some(1.0)
    }

    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Vrai toutes les `round(fps)` frames.
    #[must_use]
    pub fn status_due(&self) -> bool {
        let every = (self.fps.round() as u64).max(1);
        self.frame_index > 0 && self.frame_index % every == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped_and_monotone() {
        let mut s = PlaybackSession::new(Path::new("a.mp4"), CancelToken::new());
        // Estimation trop basse : le ratio sature à 1.0
        s.begin(10.0, Some(3));
        let mut seen = Vec::new();
        for _ in 0..6 {
            if let Some(p) = s.advance() {
                seen.push(p);
            }
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!((s.progress() - 1.0).abs() < f32::EPSILON);
        assert_eq!(s.complete_progress(), None);
    }

    #[test]
    fn unknown_total_stays_at_zero_until_completion() {
        let mut s = PlaybackSession::new(Path::new("a.mp4"), CancelToken::new());
        s.begin(10.0, None);
        assert_eq!(s.advance(), None);
        assert_eq!(s.progress(), 0.0);
        assert_eq!(s.complete_progress(), Some(1.0));
    }

    #[test]
    fn status_every_rounded_fps() {
        let mut s = PlaybackSession::new(Path::new("a.mp4"), CancelToken::new());
        s.begin(2.6, None);
        let due: Vec<u64> = (0..9)
            .filter_map(|_| {
                s.advance();
                s.status_due().then_some(s.frame_index())
            })
            .collect();
        assert_eq!(due, vec![3, 6, 9]);
    }

    #[test]
    fn zero_fps_falls_back() {
        let fps = effective_fps(Some(0.0), 24.0);
        assert_eq!(fps, 24.0);
        assert_eq!(pacing_interval(fps, 0.5), Duration::from_secs_f64(0.5 / 24.0));
        assert_eq!(effective_fps(Some(f64::NAN), 0.0), 24.0);
    }

    #[test]
    fn progress_ratio_edges() {
        assert_eq!(progress_ratio(5, Some(0)), None);
        assert_eq!(progress_ratio(5, None), None);
        assert_eq!(progress_ratio(5, Some(10)), Some(0.5));
        assert_eq!(progress_ratio(50, Some(10)), Some(1.0));
    }
}
