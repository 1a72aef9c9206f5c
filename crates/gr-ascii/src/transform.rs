use gr_core::error::PlaybackError;
use gr_core::frame::{GrayFrame, TextFrame};
use gr_core::palette::{GlyphLut, Palette};

use crate::resize::{GrayResizer, nearest_into};

/// Ratio par défaut hauteur/largeur d'un glyphe monospace.
pub const DEFAULT_CHAR_ASPECT: f64 = 0.55;

/// Paramètres géométriques du transform.
///
/// # Example
/// ```
/// use gr_ascii::transform::TransformOptions;
/// let opts = TransformOptions::new(80);
/// assert_eq!(opts.target_width, 80);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformOptions {
    /// Colonnes de sortie. Doit être > 0.
    pub target_width: u32,
    /// Compensation de la forme des glyphes (plus hauts que larges).
    pub char_aspect: f64,
}

impl TransformOptions {
    #[must_use]
    pub fn new(target_width: u32) -> Self {
        Self {
            target_width,
            char_aspect: DEFAULT_CHAR_ASPECT,
        }
    }

    #[must_use]
    pub fn with_char_aspect(mut self, char_aspect: f64) -> Self {
        self.char_aspect = char_aspect;
        self
    }
}

/// Rows produced for a `width × height` source.
///
/// `max(1, round(height / width * target_width * char_aspect))`, with the
/// aspect taken as 1.0 for a zero-width source.
///
/// # Example
/// ```
/// use gr_ascii::transform::target_height;
/// assert_eq!(target_height(640, 360, 80, 0.55), 25);
/// assert_eq!(target_height(0, 0, 80, 0.55), 44);
/// ```
#[must_use]
pub fn target_height(width: u32, height: u32, target_width: u32, char_aspect: f64) -> u32 {
    let aspect = if width == 0 {
        1.0
    } else {
        f64::from(height) / f64::from(width)
    };
    let rows = (aspect * f64::from(target_width) * char_aspect).round();
    rows.clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Étire min/max de la grille sur 0..=255.
///
/// Une grille plate (min == max) devient entièrement nulle.
///
/// # Example
/// ```
/// use gr_ascii::transform::normalize_min_max;
/// let mut v = vec![100, 150, 200];
/// normalize_min_max(&mut v);
/// assert_eq!(v, vec![0, 128, 255]);
/// ```
pub fn normalize_min_max(data: &mut [u8]) {
    let Some(&min) = data.iter().min() else {
        return;
    };
    let max = data.iter().copied().max().unwrap_or(min);
    if max == min {
        data.fill(0);
        return;
    }
    let span = u32::from(max - min);
    for v in data.iter_mut() {
        let shifted = u32::from(*v - min);
        *v = ((shifted * 255 + span / 2) / span) as u8;
    }
}

/// Convertit des frames en niveaux de gris en [`TextFrame`].
///
/// Garde le resizer et les buffers de travail entre deux appels ; aucune
/// donnée d'image n'est conservée d'une frame à l'autre.
///
/// # Example
/// ```
/// use gr_ascii::transform::{FrameTransformer, TransformOptions};
/// use gr_core::frame::GrayFrame;
/// use gr_core::palette::Palette;
///
/// let mut t = FrameTransformer::new(Palette::default(), TransformOptions::new(8)).unwrap();
/// let frame = GrayFrame::from_raw(16, 16, (0..=255).collect()).unwrap();
/// let text = t.transform(&frame);
/// assert_eq!(text.width(), 8);
/// assert_eq!(text.height(), 4);
/// ```
pub struct FrameTransformer {
    lut: GlyphLut,
    options: TransformOptions,
    resizer: GrayResizer,
    scratch: Vec<u8>,
}

impl FrameTransformer {
    /// # Errors
    /// Returns [`PlaybackError::InvalidArgument`] if `options.target_width == 0`
    /// or `char_aspect` is not a positive finite number.
    pub fn new(palette: Palette, options: TransformOptions) -> Result<Self, PlaybackError> {
        if options.target_width == 0 {
            return Err(PlaybackError::InvalidArgument(
                "la largeur de sortie doit être > 0".into(),
            ));
        }
        if !options.char_aspect.is_finite() || options.char_aspect <= 0.0 {
            return Err(PlaybackError::InvalidArgument(format!(
                "char_aspect invalide : {}",
                options.char_aspect
            )));
        }
        Ok(Self {
            lut: GlyphLut::new(&palette),
            options,
            resizer: GrayResizer::new(),
            scratch: Vec::new(),
        })
    }

    /// Resample, normalize and map one frame.
    pub fn transform(&mut self, frame: &GrayFrame) -> TextFrame {
        let out_w = self.options.target_width;
        let out_h = target_height(frame.width, frame.height, out_w, self.options.char_aspect);

        if frame.width == 0 || frame.height == 0 {
            nearest_into(frame, out_w, out_h, &mut self.scratch);
        } else if let Err(e) = self
            .resizer
            .resize_into(frame, out_w, out_h, &mut self.scratch)
        {
            log::warn!("resize {out_w}x{out_h} refusé ({e:#}), repli plus proche voisin");
            nearest_into(frame, out_w, out_h, &mut self.scratch);
        }

        normalize_min_max(&mut self.scratch);

        let row_len = out_w as usize;
        let rows: Vec<String> = self
            .scratch
            .chunks_exact(row_len)
            .map(|row| row.iter().map(|&v| self.lut.map(v)).collect())
            .collect();

        TextFrame::from_rows(rows).unwrap_or_default()
    }
}

/// One-shot transform. DO NOT use in hot path: rebuilds the LUT and resizer.
///
/// # Errors
/// Returns [`PlaybackError::InvalidArgument`] if `target_width == 0`.
///
/// # Example
/// ```
/// use gr_ascii::transform::transform;
/// use gr_core::frame::GrayFrame;
/// use gr_core::palette::Palette;
///
/// let frame = GrayFrame::from_raw(2, 2, vec![0, 0, 0, 0]).unwrap();
/// assert!(transform(&frame, 0, &Palette::default()).is_err());
/// ```
pub fn transform(
    frame: &GrayFrame,
    target_width: u32,
    palette: &Palette,
) -> Result<TextFrame, PlaybackError> {
    let mut t = FrameTransformer::new(palette.clone(), TransformOptions::new(target_width))?;
    Ok(t.transform(frame))
}
