/// Sources vidéo pour glyphreel : décodage ffmpeg en subprocess.
pub mod video;

pub use video::{FfmpegBackend, FfmpegStream, VideoInfo, tools_available};
