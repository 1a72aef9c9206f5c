/// Moteur de conversion pixels → texte.
///
/// Rééchantillonnage en niveaux de gris, normalisation min/max puis
/// mapping intensité → glyphe.
pub mod resize;
pub mod transform;

pub use transform::{FrameTransformer, TransformOptions, target_height};
