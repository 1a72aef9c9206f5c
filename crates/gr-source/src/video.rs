// Décodage via subprocess : ffprobe pour les métadonnées, ffmpeg pour un flux
// RGBA brut sur stdout. Prérequis : `ffmpeg` et `ffprobe` dans le PATH.
//
//   - `probe_video`       : métadonnées du premier flux vidéo
//   - `decode_size`       : dimensions demandées au décodeur (ratio conservé)
//   - `spawn_ffmpeg_pipe` : lance ffmpeg → RGBA sur stdout
//   - `FfmpegBackend`     : implémentation de `DecoderBackend`
//   - `FfmpegStream`      : lecture frame par frame, libération idempotente

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use gr_core::error::PlaybackError;
use gr_core::frame::FrameBuffer;
use gr_core::traits::{DecoderBackend, VideoStream};

/// Métadonnées extraites via ffprobe.
///
/// `width`/`height` sont les dimensions affichées : un quart de tour
/// (tag `rotate` ou side data `rotation`) les échange, comme l'autorotation
/// de ffmpeg le fait sur les frames décodées.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Images par seconde, `None` si ffprobe rapporte `0/0` ou rien.
    pub fps: Option<f64>,
    /// Nombre de frames annoncé, ou estimé via durée × fps.
    pub frame_count: Option<u64>,
}

/// Parse la sortie `key=value` de ffprobe.
///
/// Retourne `None` si aucune dimension exploitable n'est présente.
///
/// # Example
/// ```
/// use gr_source::video::parse_probe_output;
/// let info = parse_probe_output("width=640\nheight=360\nr_frame_rate=30000/1001\nnb_frames=300\n").unwrap();
/// assert_eq!((info.width, info.height), (640, 360));
/// assert_eq!(info.frame_count, Some(300));
/// ```
#[must_use]
pub fn parse_probe_output(text: &str) -> Option<VideoInfo> {
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;
    let mut fps: Option<f64> = None;
    let mut nb_frames: Option<u64> = None;
    let mut duration: Option<f64> = None;
    let mut rotation: Option<i64> = None;

    for line in text.lines() {
        let Some((key, val)) = line.split_once('=') else {
            continue;
        };
        let val = val.trim();
        match key.trim() {
            // Plusieurs flux possibles : on garde le premier
            "width" if width.is_none() => width = val.parse().ok(),
            "height" if height.is_none() => height = val.parse().ok(),
            "r_frame_rate" if fps.is_none() => fps = parse_rational(val),
            "nb_frames" if nb_frames.is_none() => nb_frames = val.parse().ok(),
            "duration" if duration.is_none() => {
                duration = val.parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0);
            }
            "rotation" | "TAG:rotate" if rotation.is_none() => {
                rotation = val.parse::<f64>().ok().filter(|r| r.is_finite()).map(|r| r.round() as i64);
            }
            _ => {}
        }
    }

    let mut width = width.filter(|&w| w > 0)?;
    let mut height = height.filter(|&h| h > 0)?;
    if rotation.is_some_and(|r| r.rem_euclid(180) == 90) {
        std::mem::swap(&mut width, &mut height);
    }

    let frame_count = nb_frames.filter(|&n| n > 0).or_else(|| {
        let (d, f) = (duration?, fps?);
        Some((d * f).round() as u64)
    });

    Some(VideoInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

/// Format: "24/1" ou "30000/1001". `0/0` → None.
fn parse_rational(val: &str) -> Option<f64> {
    let (num, den) = match val.split_once('/') {
        Some((n, d)) => (n.parse::<f64>().ok()?, d.parse::<f64>().ok()?),
        None => (val.parse::<f64>().ok()?, 1.0),
    };
    if den <= 0.0 {
        return None;
    }
    let fps = num / den;
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// [`PlaybackError::SourceUnreadable`] si `ffprobe` est introuvable ou si le
/// fichier ne contient aucun flux vidéo décodable.
pub fn probe_video(path: &Path) -> Result<VideoInfo, PlaybackError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| PlaybackError::unreadable(path, "chemin non-UTF8"))?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_frames:stream_tags=rotate:stream_side_data=rotation:format=duration",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| PlaybackError::unreadable(path, format!("impossible de lancer ffprobe : {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PlaybackError::unreadable(path, stderr.trim().to_string()));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe_output(&text)
        .ok_or_else(|| PlaybackError::unreadable(path, "aucun flux vidéo"))?;

    log::info!(
        "probe_video: {}x{} @ {:?}fps, ~{:?} frames ({})",
        info.width,
        info.height,
        info.fps,
        info.frame_count,
        path.display()
    );
    Ok(info)
}

/// Dimensions demandées au décodeur : largeur plafonnée à `max_width`,
/// ratio conservé, hauteur ≥ 1.
///
/// # Example
/// ```
/// use gr_source::video::decode_size;
/// assert_eq!(decode_size(1920, 1080, 640), (640, 360));
/// assert_eq!(decode_size(320, 240, 640), (320, 240));
/// ```
#[must_use]
pub fn decode_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    let max_width = max_width.max(1);
    if width <= max_width {
        return (width, height);
    }
    let h = (f64::from(height) * f64::from(max_width) / f64::from(width)).round();
    (max_width, (h as u32).max(1))
}

/// Lance un processus `ffmpeg` qui écrit des frames RGBA brutes sur stdout.
///
/// Chaque frame = `w × h × 4` bytes (RGBA row-major, sans padding).
/// `-an` : pas d'audio.
///
/// # Errors
/// Retourne une erreur si le spawn échoue.
pub fn spawn_ffmpeg_pipe(path: &Path, w: u32, h: u32) -> Result<Child> {
    let path_str = path.to_str().context("Chemin vidéo invalide (non-UTF8)")?;
    let scale_filter = format!("scale={w}:{h}:flags=area");

    let child = Command::new("ffmpeg")
        .args([
            "-i",
            path_str,
            "-vf",
            &scale_filter,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Impossible de lancer ffmpeg. Vérifiez que ffmpeg est installé et dans le PATH.")?;

    log::debug!("ffmpeg spawné: {w}x{h} depuis {}", path.display());
    Ok(child)
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// Retourne le nombre de bytes lus : `buf.len()` si complet, moins sur EOF.
///
/// # Errors
/// Erreur I/O fatale (hors `Interrupted`).
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(total)
}

/// Résultat d'une lecture de frame sur le pipe ffmpeg.
#[derive(Debug)]
pub enum PipeRead {
    Frame(FrameBuffer),
    /// Fin du flux ; `truncated` bytes d'une frame incomplète ont été jetés.
    End { truncated: usize },
}

/// Lit une frame RGBA `w × h` complète depuis `reader`.
///
/// # Errors
/// Erreur I/O fatale du pipe.
pub fn read_frame<R: Read>(reader: &mut R, w: u32, h: u32) -> std::io::Result<PipeRead> {
    let mut fb = FrameBuffer::new(w, h);
    let n = read_exact_or_eof(reader, &mut fb.data)?;
    if n == fb.data.len() {
        Ok(PipeRead::Frame(fb))
    } else {
        Ok(PipeRead::End { truncated: n })
    }
}

/// Décision en fin de flux selon le statut de sortie de ffmpeg.
///
/// `exit` vaut `(succès, description)`, ou `None` si le statut est inconnu.
/// Une sortie en erreur devient une `DecodeFailure` à `frames_read`.
///
/// # Errors
/// [`PlaybackError::DecodeFailure`] si ffmpeg a quitté en erreur.
pub fn end_of_stream(exit: Option<(bool, String)>, frames_read: u64) -> Result<(), PlaybackError> {
    match exit {
        Some((false, status)) => Err(PlaybackError::DecodeFailure {
            frame_index: frames_read,
            reason: format!("ffmpeg a quitté : {status}"),
        }),
        _ => Ok(()),
    }
}

/// Vérifie que `ffmpeg` et `ffprobe` sont exécutables.
///
/// # Errors
/// Nomme l'outil manquant.
pub fn tools_available() -> Result<()> {
    for tool in ["ffmpeg", "ffprobe"] {
        let status = Command::new(tool)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("{tool} introuvable dans le PATH"))?;
        if !status.success() {
            anyhow::bail!("{tool} -version a échoué ({status})");
        }
    }
    Ok(())
}

/// Backend de décodage basé sur ffmpeg/ffprobe.
///
/// # Example
/// ```
/// use gr_core::error::PlaybackError;
/// use gr_core::traits::DecoderBackend;
/// use gr_source::video::FfmpegBackend;
/// use std::path::Path;
///
/// let err = FfmpegBackend::new(640).open(Path::new("/nonexistent/clip.mp4")).err();
/// assert!(matches!(err, Some(PlaybackError::SourceUnreadable { .. })));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FfmpegBackend {
    max_decode_width: u32,
}

impl FfmpegBackend {
    #[must_use]
    pub fn new(max_decode_width: u32) -> Self {
        Self { max_decode_width }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(640)
    }
}

impl DecoderBackend for FfmpegBackend {
    type Stream = FfmpegStream;

    fn open(&self, path: &Path) -> Result<FfmpegStream, PlaybackError> {
        // Pas de subprocess pour un fichier absent
        if !path.is_file() {
            return Err(PlaybackError::unreadable(path, "fichier introuvable"));
        }

        let info = probe_video(path)?;
        let (w, h) = decode_size(info.width, info.height, self.max_decode_width);
        let mut child = spawn_ffmpeg_pipe(path, w, h)
            .map_err(|e| PlaybackError::unreadable(path, format!("{e:#}")))?;
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PlaybackError::unreadable(path, "stdout ffmpeg indisponible"));
        };

        Ok(FfmpegStream {
            path: path.to_path_buf(),
            child: Some(child),
            stdout: Some(stdout),
            width: w,
            height: h,
            fps: info.fps,
            frame_count: info.frame_count,
            frames_read: 0,
        })
    }
}

/// Flux ffmpeg ouvert. Possédé par le worker de lecture.
pub struct FfmpegStream {
    path: PathBuf,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    width: u32,
    height: u32,
    fps: Option<f64>,
    frame_count: Option<u64>,
    frames_read: u64,
}

impl VideoStream for FfmpegStream {
    fn read_next_frame(&mut self) -> Result<Option<FrameBuffer>, PlaybackError> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let truncated = match read_frame(stdout, self.width, self.height) {
            Ok(PipeRead::Frame(fb)) => {
                self.frames_read += 1;
                return Ok(Some(fb));
            }
            Ok(PipeRead::End { truncated }) => truncated,
            Err(e) => {
                return Err(PlaybackError::DecodeFailure {
                    frame_index: self.frames_read,
                    reason: format!("lecture du pipe : {e}"),
                });
            }
        };

        // EOF : on distingue fin normale et sortie en erreur de ffmpeg
        self.stdout = None;
        if truncated > 0 {
            log::warn!(
                "{}: frame tronquée ({truncated} bytes) après {} frames",
                self.path.display(),
                self.frames_read
            );
        }
        let exit = self.child.as_mut().and_then(|child| match child.wait() {
            Ok(status) => Some((status.success(), status.to_string())),
            Err(e) => {
                log::warn!("wait ffmpeg: {e}");
                None
            }
        });
        end_of_stream(exit, self.frames_read)?;
        log::info!("{}: EOF après {} frames", self.path.display(), self.frames_read);
        Ok(None)
    }

    fn frame_rate(&self) -> Option<f64> {
        self.fps
    }

    fn frame_count_estimate(&self) -> Option<u64> {
        self.frame_count
    }

    fn release(&mut self) {
        self.stdout = None;
        if let Some(mut c) = self.child.take() {
            let _ = c.kill();
            let _ = c.wait();
            log::debug!("ffmpeg libéré ({})", self.path.display());
        }
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn probe_output_with_duration_fallback() {
        let info = parse_probe_output(
            "width=1280\nheight=720\nr_frame_rate=25/1\nnb_frames=N/A\nduration=4.000000\n",
        )
        .unwrap();
        assert_eq!(info.fps, Some(25.0));
        assert_eq!(info.frame_count, Some(100));
    }

    #[test]
    fn probe_output_zero_rate_is_unknown() {
        let info = parse_probe_output("width=10\nheight=10\nr_frame_rate=0/0\n").unwrap();
        assert_eq!(info.fps, None);
        assert_eq!(info.frame_count, None);
    }

    #[test]
    fn probe_output_without_video_is_none() {
        assert!(parse_probe_output("duration=3.5\n").is_none());
        assert!(parse_probe_output("width=0\nheight=0\n").is_none());
    }

    #[test]
    fn rational_parsing() {
        let fps = parse_rational("30000/1001").unwrap();
        assert!((fps - 29.97).abs() < 0.01);
        assert_eq!(parse_rational("24"), Some(24.0));
        assert_eq!(parse_rational("abc"), None);
        assert_eq!(parse_rational("5/0"), None);
    }

    #[test]
    fn decode_size_keeps_aspect() {
        assert_eq!(decode_size(3840, 2160, 640), (640, 360));
        assert_eq!(decode_size(2000, 1, 100), (100, 1));
        assert_eq!(decode_size(640, 480, 640), (640, 480));
    }

    #[test]
    fn read_exact_or_eof_reports_partial() {
        let mut buf = [0u8; 4];
        assert_eq!(read_exact_or_eof(&mut Cursor::new(vec![1, 2, 3, 4, 5]), &mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(read_exact_or_eof(&mut Cursor::new(vec![9, 9]), &mut buf).unwrap(), 2);
        assert_eq!(read_exact_or_eof(&mut Cursor::new(Vec::new()), &mut buf).unwrap(), 0);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = FfmpegBackend::default()
            .open(Path::new("/nonexistent/dir/clip.mp4"))
            .err()
            .unwrap();
        assert!(matches!(err, PlaybackError::SourceUnreadable { .. }));
    }

    #[test]
    fn probe_output_quarter_turn_swaps_dimensions() {
        let side_data = parse_probe_output("width=1920\nheight=1080\nrotation=-90\n").unwrap();
        assert_eq!((side_data.width, side_data.height), (1080, 1920));
        let tag = parse_probe_output("width=1920\nheight=1080\nTAG:rotate=270\n").unwrap();
        assert_eq!((tag.width, tag.height), (1080, 1920));
        let flipped = parse_probe_output("width=1920\nheight=1080\nrotation=180\n").unwrap();
        assert_eq!((flipped.width, flipped.height), (1920, 1080));
    }

    #[test]
    fn read_frame_full_truncated_and_empty() {
        let mut pipe = Cursor::new(vec![7u8; 11]);
        match read_frame(&mut pipe, 2, 1).unwrap() {
            PipeRead::Frame(fb) => assert_eq!(fb.data, vec![7u8; 8]),
            PipeRead::End { .. } => panic!("frame complète attendue"),
        }
        assert!(matches!(read_frame(&mut pipe, 2, 1).unwrap(), PipeRead::End { truncated: 3 }));
        assert!(matches!(read_frame(&mut pipe, 2, 1).unwrap(), PipeRead::End { truncated: 0 }));
    }

    #[test]
    fn failed_exit_at_eof_is_a_decode_failure() {
        assert_eq!(end_of_stream(Some((true, "exit status: 0".into())), 12), Ok(()));
        assert_eq!(end_of_stream(None, 12), Ok(()));
        let err = end_of_stream(Some((false, "exit status: 1".into())), 12).unwrap_err();
        match err {
            PlaybackError::DecodeFailure { frame_index, reason } => {
                assert_eq!(frame_index, 12);
                assert!(reason.contains("exit status: 1"));
            }
            other => panic!("DecodeFailure attendu, obtenu {other:?}"),
        }
    }

    #[test]
    #[ignore = "nécessite ffmpeg et ffprobe dans le PATH"]
    fn non_video_file_is_unreadable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"pas une video").unwrap();
        let err = FfmpegBackend::default().open(file.path()).err().unwrap();
        assert!(matches!(err, PlaybackError::SourceUnreadable { .. }));
    }

    #[test]
    #[ignore = "nécessite ffmpeg et ffprobe dans le PATH"]
    fn decodes_generated_clip() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("mire.y4m");
        let status = Command::new("ffmpeg")
            .args([
                "-f",
                "lavfi",
                "-i",
                "testsrc=size=64x48:rate=10",
                "-frames:v",
                "5",
                "-pix_fmt",
                "yuv420p",
                "-hide_banner",
                "-loglevel",
                "error",
            ])
            .arg(&clip)
            .status()
            .unwrap();
        assert!(status.success());

        let mut stream = FfmpegBackend::new(32).open(&clip).unwrap();
        assert!((stream.frame_rate().unwrap() - 10.0).abs() < 0.01);

        let mut frames = 0;
        while let Some(fb) = stream.read_next_frame().unwrap() {
            assert_eq!((fb.width, fb.height), (32, 24));
            assert_eq!(fb.data.len(), 32 * 24 * 4);
            frames += 1;
        }
        assert_eq!(frames, 5);
        stream.release();
        stream.release();
    }
}
