use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::palette::{GlyphOrder, Palette, PalettePreset, PALETTE_DEFAULT};

/// Thème de l'interface.
///
/// # Example
/// ```
/// use gr_core::config::Theme;
/// assert_eq!(Theme::Dark.toggled(), Theme::Light);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Configuration complète du lecteur, hot-rechargeable.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
/// Un rechargement ne touche pas la session en cours : il s'applique au
/// prochain démarrage.
///
/// # Example
/// ```
/// use gr_core::config::PlayerConfig;
/// let config = PlayerConfig::default();
/// assert_eq!(config.output_width, 80);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PlayerConfig {
    // === Rendu ===
    /// Preset de palette actif.
    pub palette: PalettePreset,
    /// Palette utilisée quand `palette = "Custom"`.
    pub custom_palette: String,
    /// Sens de lecture de la palette.
    pub glyph_order: GlyphOrder,
    /// Largeur de sortie en colonnes.
    pub output_width: u32,
    /// Compensation du ratio hauteur/largeur d'un glyphe monospace.
    pub char_aspect: f64,

    // === Lecture ===
    /// Fraction de l'intervalle inter-frame passée à dormir après chaque frame.
    pub pacing_factor: f32,
    /// FPS supposé quand la source n'en rapporte pas.
    pub fallback_fps: f64,
    /// Largeur maximale demandée au décodeur (le ratio est conservé).
    pub max_decode_width: u32,
    /// Période de polling du thread d'interface, en millisecondes.
    pub poll_interval_ms: u64,

    // === UI ===
    pub theme: Theme,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            palette: PalettePreset::A,
            custom_palette: PALETTE_DEFAULT.to_string(),
            glyph_order: GlyphOrder::AsWritten,
            output_width: 80,
            char_aspect: 0.55,
            pacing_factor: 0.5,
            fallback_fps: 24.0,
            max_decode_width: 640,
            poll_interval_ms: 60,
            theme: Theme::Dark,
        }
    }
}

impl PlayerConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.output_width = self.output_width.clamp(8, 400);
        self.char_aspect = self.char_aspect.clamp(0.2, 2.0);
        self.pacing_factor = self.pacing_factor.clamp(0.0, 2.0);
        self.fallback_fps = self.fallback_fps.clamp(1.0, 240.0);
        self.max_decode_width = self.max_decode_width.clamp(16, 3840);
        self.poll_interval_ms = self.poll_interval_ms.clamp(10, 1000);
    }

    /// Resolve the active palette.
    ///
    /// # Example
    /// ```
    /// use gr_core::config::PlayerConfig;
    /// let config = PlayerConfig::default();
    /// assert_eq!(config.palette().map(0), '♥');
    /// ```
    #[must_use]
    pub fn palette(&self) -> Palette {
        Palette::from_preset(self.palette, &self.custom_palette, self.glyph_order)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    playback: Option<PlaybackSection>,
    ui: Option<UiSection>,
}

#[derive(Deserialize)]
struct RenderSection {
    palette: Option<PalettePreset>,
    custom_palette: Option<String>,
    glyph_order: Option<GlyphOrder>,
    output_width: Option<u32>,
    char_aspect: Option<f64>,
}

#[derive(Deserialize)]
struct PlaybackSection {
    pacing_factor: Option<f32>,
    fallback_fps: Option<f64>,
    max_decode_width: Option<u32>,
    poll_interval_ms: Option<u64>,
}

#[derive(Deserialize)]
struct UiSection {
    theme: Option<Theme>,
}

/// Parse une configuration TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
///
/// # Example
/// ```
/// use gr_core::config::parse_config;
/// let config = parse_config("[render]\noutput_width = 120\n").unwrap();
/// assert_eq!(config.output_width, 120);
/// assert_eq!(config.pacing_factor, 0.5);
/// ```
pub fn parse_config(content: &str) -> Result<PlayerConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = PlayerConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.palette {
            config.palette = v;
        }
        if let Some(v) = r.custom_palette {
            config.custom_palette = v;
        }
        if let Some(v) = r.glyph_order {
            config.glyph_order = v;
        }
        if let Some(v) = r.output_width {
            config.output_width = v;
        }
        if let Some(v) = r.char_aspect {
            config.char_aspect = v;
        }
    }

    if let Some(p) = file.playback {
        if let Some(v) = p.pacing_factor {
            config.pacing_factor = v;
        }
        if let Some(v) = p.fallback_fps {
            config.fallback_fps = v;
        }
        if let Some(v) = p.max_decode_width {
            config.max_decode_width = v;
        }
        if let Some(v) = p.poll_interval_ms {
            config.poll_interval_ms = v;
        }
    }

    if let Some(u) = file.ui
        && let Some(v) = u.theme
    {
        config.theme = v;
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gr_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PlayerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn partial_sections_merge_over_defaults() {
        let config = parse_config(
            r#"
[render]
palette = "B"
glyph_order = "Reversed"

[ui]
theme = "Light"
"#,
        )
        .unwrap();
        assert_eq!(config.palette, PalettePreset::B);
        assert_eq!(config.glyph_order, GlyphOrder::Reversed);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.output_width, 80);
        assert!((config.char_aspect - 0.55).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse_config(
            "[render]\noutput_width = 0\n[playback]\npacing_factor = 9.0\nfallback_fps = -3.0\n",
        )
        .unwrap();
        assert_eq!(config.output_width, 8);
        assert!((config.pacing_factor - 2.0).abs() < f32::EPSILON);
        assert!((config.fallback_fps - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_enum_value_is_an_error() {
        assert!(parse_config("[render]\npalette = \"Z\"\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[playback]\npoll_interval_ms = 100").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.poll_interval_ms, 100);
    }

    #[test]
    fn load_config_missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/glyphreel.toml")).is_err());
    }

    #[test]
    fn invalid_file_error_names_the_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\noutput_width = \"large\"").unwrap();
        let err = load_config(file.path()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains(&file.path().display().to_string()));
        assert!(message.contains("TOML"));
    }

    #[test]
    fn custom_palette_resolves() {
        let config = parse_config("[render]\npalette = \"Custom\"\ncustom_palette = \"01\"\n")
            .unwrap();
        assert_eq!(config.palette().map(255), '1');
    }
}
