use gr_core::frame::TextFrame;
use triple_buffer::TripleBuffer;

use crate::event::PlaybackEvent;

/// Observateur des événements d'une session.
pub trait EventSink {
    /// Livre un événement. `false` = le consommateur a disparu.
    fn emit(&mut self, event: PlaybackEvent) -> bool;
}

/// Côté worker du conduit : frames dans un triple buffer (la plus récente
/// gagne, jamais bloquant), le reste dans un canal flume.
pub struct ChannelSink {
    frames: triple_buffer::Input<Option<TextFrame>>,
    events: flume::Sender<PlaybackEvent>,
}

/// Côté contrôleur du conduit.
pub struct EventReceiver {
    frames: triple_buffer::Output<Option<TextFrame>>,
    events: flume::Receiver<PlaybackEvent>,
}

/// Crée une paire producteur/consommateur.
///
/// # Example
/// ```
/// use gr_core::frame::TextFrame;
/// use gr_player::event::PlaybackEvent;
/// use gr_player::sink::{EventSink, channel};
///
/// let (mut sink, mut rx) = channel();
/// let a = TextFrame::from_rows(vec!["a".into()]).unwrap();
/// let b = TextFrame::from_rows(vec!["b".into()]).unwrap();
/// assert!(sink.emit(PlaybackEvent::Frame(a)));
/// assert!(sink.emit(PlaybackEvent::Frame(b.clone())));
/// assert_eq!(rx.latest_frame(), Some(b));
/// assert_eq!(rx.latest_frame(), None);
/// ```
#[must_use]
pub fn channel() -> (ChannelSink, EventReceiver) {
    let (frames_in, frames_out) = TripleBuffer::new(&None).split();
    let (tx, rx) = flume::unbounded();
    (
        ChannelSink {
            frames: frames_in,
            events: tx,
        },
        EventReceiver {
            frames: frames_out,
            events: rx,
        },
    )
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: PlaybackEvent) -> bool {
        match event {
            PlaybackEvent::Frame(frame) => {
                self.frames.write(Some(frame));
                !self.events.is_disconnected()
            }
            other => self.events.send(other).is_ok(),
        }
    }
}

/// Collecte en mémoire ; pratique pour un rendu hors ligne ou les tests.
impl EventSink for Vec<PlaybackEvent> {
    fn emit(&mut self, event: PlaybackEvent) -> bool {
        self.push(event);
        true
    }
}

impl EventReceiver {
    /// Dernière frame publiée depuis l'appel précédent, s'il y en a une.
    pub fn latest_frame(&mut self) -> Option<TextFrame> {
        if self.frames.updated() {
            self.frames.read().clone()
        } else {
            None
        }
    }

    /// Vide les événements en attente, sans bloquer.
    pub fn drain(&self) -> Vec<PlaybackEvent> {
        self.events.try_iter().collect()
    }

    /// Vrai si le worker a lâché son côté du conduit.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.events.is_disconnected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Outcome;

    #[test]
    fn non_frame_events_keep_order() {
        let (mut sink, rx) = channel();
        assert!(sink.emit(PlaybackEvent::Progress(0.25)));
        assert!(sink.emit(PlaybackEvent::Status("[Frame 24]".into())));
        assert!(sink.emit(PlaybackEvent::Terminal(Outcome::Completed { frames: 24 })));
        assert_eq!(
            rx.drain(),
            vec![
                PlaybackEvent::Progress(0.25),
                PlaybackEvent::Status("[Frame 24]".into()),
                PlaybackEvent::Terminal(Outcome::Completed { frames: 24 }),
            ]
        );
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn emit_reports_closed_consumer() {
        let (mut sink, rx) = channel();
        drop(rx);
        assert!(!sink.emit(PlaybackEvent::Progress(0.5)));
        let frame = TextFrame::from_rows(vec!["x".into()]).unwrap();
        assert!(!sink.emit(PlaybackEvent::Frame(frame)));
    }

    #[test]
    fn receiver_sees_disconnect() {
        let (sink, rx) = channel();
        assert!(!rx.is_disconnected());
        drop(sink);
        assert!(rx.is_disconnected());
    }
}
