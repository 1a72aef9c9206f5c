use std::path::PathBuf;

use clap::Parser;
use gr_core::config::{PlayerConfig, Theme};
use gr_core::palette::{GlyphOrder, PalettePreset};

/// glyphreel : lecture vidéo en ASCII dans le terminal.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Vidéo à présélectionner (MP4, AVI, MKV, MOV...).
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Palette : "A", "B" ou une chaîne de glyphes (sombre → clair).
    #[arg(long)]
    pub palette: Option<String>,

    /// Largeur de sortie en colonnes.
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Lire la palette à l'envers.
    #[arg(long, default_value_t = false)]
    pub reverse_glyphs: bool,

    /// Thème : dark, light.
    #[arg(long)]
    pub theme: Option<String>,

    /// Lancer la lecture de --video dès le démarrage.
    #[arg(long, default_value_t = false)]
    pub autoplay: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Applique les options de ligne de commande par-dessus la config fichier.
    pub fn apply_overrides(&self, config: &mut PlayerConfig) {
        if let Some(ref palette) = self.palette {
            match palette.as_str() {
                "A" | "a" => config.palette = PalettePreset::A,
                "B" | "b" => config.palette = PalettePreset::B,
                custom => {
                    config.palette = PalettePreset::Custom;
                    config.custom_palette = custom.to_string();
                }
            }
        }
        if let Some(width) = self.width {
            config.output_width = width;
        }
        if self.reverse_glyphs {
            config.glyph_order = GlyphOrder::Reversed;
        }
        if let Some(ref theme) = self.theme {
            config.theme = match theme.to_ascii_lowercase().as_str() {
                "dark" => Theme::Dark,
                "light" => Theme::Light,
                _ => {
                    log::warn!("Thème inconnu '{theme}', utilisation du défaut.");
                    config.theme
                }
            };
        }
        config.clamp_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let cli = Cli::try_parse_from(["glyphreel"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert!(cli.video.is_none());
        assert!(!cli.autoplay);
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn overrides_apply_over_file_values() {
        let cli = Cli::try_parse_from([
            "glyphreel",
            "--video",
            "clip.mp4",
            "--palette",
            "B",
            "--width",
            "120",
            "--reverse-glyphs",
            "--theme",
            "light",
        ])
        .unwrap();
        let mut config = PlayerConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.palette, PalettePreset::B);
        assert_eq!(config.output_width, 120);
        assert_eq!(config.glyph_order, GlyphOrder::Reversed);
        assert_eq!(config.theme, Theme::Light);
    }

    #[test]
    fn custom_palette_and_width_clamp() {
        let cli = Cli::try_parse_from(["glyphreel", "--palette", " .oO@", "-w", "2"]).unwrap();
        let mut config = PlayerConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.palette, PalettePreset::Custom);
        assert_eq!(config.palette().map(255), '@');
        assert_eq!(config.output_width, 8);
    }

    #[test]
    fn unknown_theme_keeps_config() {
        let cli = Cli::try_parse_from(["glyphreel", "--theme", "sepia"]).unwrap();
        let mut config = PlayerConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.theme, Theme::Dark);
    }
}
