use std::path::Path;

use crate::error::PlaybackError;
use crate::frame::FrameBuffer;

/// Ouvre des sources vidéo. Partagé entre le thread de contrôle et le worker.
///
/// # Example
/// ```
/// use gr_core::error::PlaybackError;
/// use gr_core::frame::FrameBuffer;
/// use gr_core::traits::{DecoderBackend, VideoStream};
/// use std::path::Path;
///
/// struct Empty;
/// impl VideoStream for Empty {
///     fn read_next_frame(&mut self) -> Result<Option<FrameBuffer>, PlaybackError> { Ok(None) }
///     fn frame_rate(&self) -> Option<f64> { None }
///     fn frame_count_estimate(&self) -> Option<u64> { Some(0) }
///     fn release(&mut self) {}
/// }
///
/// struct EmptyBackend;
/// impl DecoderBackend for EmptyBackend {
///     type Stream = Empty;
///     fn open(&self, _path: &Path) -> Result<Empty, PlaybackError> { Ok(Empty) }
/// }
/// ```
pub trait DecoderBackend: Send + Sync + 'static {
    /// Handle type returned by [`DecoderBackend::open`].
    type Stream: VideoStream;

    /// Open a source.
    ///
    /// # Errors
    /// Returns [`PlaybackError::SourceUnreadable`] if the source cannot be opened.
    fn open(&self, path: &Path) -> Result<Self::Stream, PlaybackError>;
}

/// Un flux vidéo ouvert, possédé exclusivement par le worker de lecture.
pub trait VideoStream: Send {
    /// Décode la frame suivante.
    ///
    /// `Ok(None)` = fin de flux normale.
    ///
    /// # Errors
    /// Returns [`PlaybackError::DecodeFailure`] on a mid-stream error.
    fn read_next_frame(&mut self) -> Result<Option<FrameBuffer>, PlaybackError>;

    /// Frame rate reported by the source, if any.
    fn frame_rate(&self) -> Option<f64>;

    /// Best-effort total frame count. May be wrong or missing.
    fn frame_count_estimate(&self) -> Option<u64>;

    /// Libère les ressources du flux. Le driver l'appelle exactement une fois.
    fn release(&mut self);
}
