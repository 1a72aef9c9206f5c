use serde::{Deserialize, Serialize};

/// Palette de secours, 10 caractères.
pub const PALETTE_DEFAULT: &str = " .:-=+*#%@";

/// Preset A : glyphe dense en tête.
pub const PALETTE_A: &str = "♥@%#\\♣☼+=-:. ";

/// Preset B : glyphe vide en tête.
pub const PALETTE_B: &str = " .:-=+☼♣\\#%@♥";

/// Which built-in palette a session uses.
///
/// # Example
/// ```
/// use gr_core::palette::PalettePreset;
/// assert_eq!(PalettePreset::A.toggled(), PalettePreset::B);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum PalettePreset {
    #[default]
    A,
    B,
    /// Uses `custom_palette` from the config file.
    Custom,
}

impl PalettePreset {
    /// Flip between the two built-in presets. `Custom` goes back to `A`.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B | Self::Custom => Self::A,
        }
    }

    /// Short label for the UI.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Custom => "Custom",
        }
    }
}

/// Direction in which a palette string is read against brightness.
///
/// The two presets are written in opposite directions, so the reading
/// direction is an explicit parameter rather than something inferred from
/// the string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum GlyphOrder {
    /// Intensity 0 maps to the first character of the string.
    #[default]
    AsWritten,
    /// Intensity 0 maps to the last character of the string.
    Reversed,
}

impl GlyphOrder {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::AsWritten => Self::Reversed,
            Self::Reversed => Self::AsWritten,
        }
    }
}

/// An ordered, validated glyph sequence (always ≥ 2 glyphs).
///
/// # Example
/// ```
/// use gr_core::palette::{GlyphOrder, Palette};
/// let p = Palette::new(" .:-=+*#%@", GlyphOrder::AsWritten);
/// assert_eq!(p.len(), 10);
/// assert_eq!(p.map(255), '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<char>,
    order: GlyphOrder,
}

impl Palette {
    /// Build a palette. Fewer than 2 glyphs silently falls back to
    /// [`PALETTE_DEFAULT`].
    ///
    /// # Example
    /// ```
    /// use gr_core::palette::{GlyphOrder, Palette, PALETTE_DEFAULT};
    /// let p = Palette::new("#", GlyphOrder::AsWritten);
    /// assert_eq!(p.glyphs().iter().collect::<String>(), PALETTE_DEFAULT);
    /// ```
    #[must_use]
    pub fn new(glyphs: &str, order: GlyphOrder) -> Self {
        let chars: Vec<char> = glyphs.chars().collect();
        if chars.len() < 2 {
            log::debug!(
                "palette {glyphs:?} trop courte ({} glyphe), repli sur la palette par défaut",
                chars.len()
            );
            return Self {
                glyphs: PALETTE_DEFAULT.chars().collect(),
                order,
            };
        }
        Self {
            glyphs: chars,
            order,
        }
    }

    /// Resolve a preset, using `custom` for [`PalettePreset::Custom`].
    #[must_use]
    pub fn from_preset(preset: PalettePreset, custom: &str, order: GlyphOrder) -> Self {
        match preset {
            PalettePreset::A => Self::new(PALETTE_A, order),
            PalettePreset::B => Self::new(PALETTE_B, order),
            PalettePreset::Custom => Self::new(custom, order),
        }
    }

    #[must_use]
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    #[must_use]
    pub fn order(&self) -> GlyphOrder {
        self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always `false`: construction guarantees at least two glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    #[must_use]
    pub fn contains(&self, ch: char) -> bool {
        self.glyphs.contains(&ch)
    }

    /// Map one intensity to a glyph.
    ///
    /// `index = floor(intensity * (len - 1) / 255)`, read from the end of
    /// the string under [`GlyphOrder::Reversed`].
    ///
    /// # Example
    /// ```
    /// use gr_core::palette::{GlyphOrder, Palette};
    /// let p = Palette::new(" .:-=+*#%@", GlyphOrder::AsWritten);
    /// assert_eq!(p.map(0), ' ');
    /// assert_eq!(p.map(128), '=');
    /// ```
    #[must_use]
    pub fn map(&self, intensity: u8) -> char {
        let last = self.glyphs.len() - 1;
        let idx = (usize::from(intensity) * last / 255).min(last);
        match self.order {
            GlyphOrder::AsWritten => self.glyphs[idx],
            GlyphOrder::Reversed => self.glyphs[last - idx],
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(PALETTE_DEFAULT, GlyphOrder::AsWritten)
    }
}

/// Lookup table mapping intensity [0..255] → glyph.
///
/// Pre-computed once per session for O(1) per-pixel cost.
///
/// # Example
/// ```
/// use gr_core::palette::{GlyphLut, GlyphOrder, Palette};
/// let lut = GlyphLut::new(&Palette::new(" .:#@", GlyphOrder::AsWritten));
/// assert_eq!(lut.map(0), ' ');
/// assert_eq!(lut.map(255), '@');
/// ```
pub struct GlyphLut {
    lut: [char; 256],
}

impl GlyphLut {
    #[must_use]
    pub fn new(palette: &Palette) -> Self {
        let mut lut = [' '; 256];
        for (i, slot) in lut.iter_mut().enumerate() {
            *slot = palette.map(i as u8);
        }
        Self { lut }
    }

    #[inline(always)]
    #[must_use]
    pub fn map(&self, intensity: u8) -> char {
        self.lut[intensity as usize]
    }
}
