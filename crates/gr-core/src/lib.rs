/// Types, traits et configuration partagés par le workspace glyphreel.
///
/// Palette et mapping des glyphes, modèle de frames, taxonomie d'erreurs,
/// contrat du décodeur et configuration TOML.

pub mod config;
pub mod error;
pub mod frame;
pub mod palette;
pub mod traits;

pub use config::PlayerConfig;
pub use error::PlaybackError;
pub use frame::{FrameBuffer, GrayFrame, TextFrame};
pub use palette::{GlyphLut, GlyphOrder, Palette, PalettePreset};
