//! Backend en mémoire pour les tests du pilote.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gr_core::error::PlaybackError;
use gr_core::frame::FrameBuffer;
use gr_core::traits::{DecoderBackend, VideoStream};

#[derive(Clone)]
pub struct MockBackend {
    pub frames: usize,
    pub fps: Option<f64>,
    pub count: Option<u64>,
    pub fail_at: Option<usize>,
    pub unreadable: bool,
    pub opened: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            fps: Some(25.0),
            count: Some(frames as u64),
            fail_at: None,
            unreadable: false,
            opened: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// Dégradé horizontal 16×8 dont la luminosité varie avec l'index.
pub fn test_frame(index: usize) -> FrameBuffer {
    let mut fb = FrameBuffer::new(16, 8);
    for (i, px) in fb.data.chunks_exact_mut(4).enumerate() {
        let v = ((i % 16) * 16 + index % 16) as u8;
        px.copy_from_slice(&[v, v, v, 255]);
    }
    fb
}

pub struct MockStream {
    backend: MockBackend,
    next: usize,
}

impl DecoderBackend for MockBackend {
    type Stream = MockStream;

    fn open(&self, path: &Path) -> Result<MockStream, PlaybackError> {
        if self.unreadable {
            return Err(PlaybackError::unreadable(path, "introuvable"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockStream {
            backend: self.clone(),
            next: 0,
        })
    }
}

impl VideoStream for MockStream {
    fn read_next_frame(&mut self) -> Result<Option<FrameBuffer>, PlaybackError> {
        if self.backend.fail_at == Some(self.next) {
            return Err(PlaybackError::DecodeFailure {
                frame_index: 0,
                reason: "flux corrompu".into(),
            });
        }
        if self.next >= self.backend.frames {
            return Ok(None);
        }
        let fb = test_frame(self.next);
        self.next += 1;
        Ok(Some(fb))
    }

    fn frame_rate(&self) -> Option<f64> {
        self.backend.fps
    }

    fn frame_count_estimate(&self) -> Option<u64> {
        self.backend.count
    }

    fn release(&mut self) {
        self.backend.releases.fetch_add(1, Ordering::SeqCst);
    }
}
