use gr_core::config::PlayerConfig;
use gr_core::frame::TextFrame;
use gr_core::palette::GlyphOrder;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};

use crate::canvas::{self, Scroll};
use crate::theme::ThemeColors;

/// Tout ce qu'il faut pour dessiner un écran, emprunté à l'application.
pub struct DrawContext<'a> {
    /// Dernière frame reçue, si une session a produit quelque chose.
    pub text: Option<&'a TextFrame>,
    /// Nom du fichier sélectionné.
    pub file: Option<&'a str>,
    /// Libellé de l'état de session (`Idle`, `Running`...).
    pub state: &'a str,
    /// Progression dans `[0, 1]`.
    pub progress: f32,
    pub config: &'a PlayerConfig,
    /// Frames affichées dans la session courante.
    pub frames_shown: u64,
    /// Cadence d'affichage mesurée.
    pub display_fps: f64,
    /// `None` = ffmpeg/ffprobe présents, sinon le message d'erreur.
    pub tools_error: Option<&'a str>,
    /// Lignes de statut récentes, la plus récente en dernier.
    pub log: &'a [String],
    pub scroll: Scroll,
    pub show_help: bool,
}

/// Zone occupée par la vue texte pour une taille de terminal donnée.
///
/// Utilisé par l'application pour borner le défilement.
#[must_use]
pub fn text_area(area: Rect) -> Rect {
    let [_, _, body, _] = vertical_chunks(area);
    let [text, _] = horizontal_chunks(body);
    inner(text)
}

fn vertical_chunks(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(4),
    ])
    .areas(area)
}

fn horizontal_chunks(area: Rect) -> [Rect; 2] {
    Layout::horizontal([Constraint::Min(20), Constraint::Length(26)]).areas(area)
}

fn inner(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Dessine l'écran complet : en-tête, jauge, vue texte, panneau latéral,
/// journal, et l'aide par-dessus si demandée.
pub fn draw(frame: &mut Frame, ctx: &DrawContext<'_>) {
    let colors = ThemeColors::for_theme(ctx.config.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(colors.base()), area);

    let [header, gauge, body, log] = vertical_chunks(area);
    let [text, sidebar] = horizontal_chunks(body);

    draw_header(frame, header, ctx, &colors);
    draw_gauge(frame, gauge, ctx, &colors);
    draw_text_view(frame, text, ctx, &colors);
    draw_sidebar(frame, sidebar, ctx, &colors);
    draw_log(frame, log, ctx, &colors);

    if ctx.show_help {
        draw_help_overlay(frame, area, &colors);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, ctx: &DrawContext<'_>, colors: &ThemeColors) {
    let file = ctx.file.unwrap_or("aucun fichier (o pour ouvrir)");
    let line = Line::from(vec![
        Span::styled(" glyphreel ", colors.title()),
        Span::styled("│ ", colors.dim()),
        Span::styled(file.to_string(), colors.base()),
        Span::styled(" │ ", colors.dim()),
        Span::styled(ctx.state.to_string(), colors.base().fg(colors.accent)),
    ]);
    frame.render_widget(Paragraph::new(line).style(colors.base()), area);
}

fn draw_gauge(frame: &mut Frame, area: Rect, ctx: &DrawContext<'_>, colors: &ThemeColors) {
    let ratio = f64::from(ctx.progress.clamp(0.0, 1.0));
    let gauge = Gauge::default()
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0))
        .gauge_style(colors.base().fg(colors.gauge));
    frame.render_widget(gauge, area);
}

fn draw_text_view(frame: &mut Frame, area: Rect, ctx: &DrawContext<'_>, colors: &ThemeColors) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Vidéo ")
        .border_style(colors.dim())
        .style(colors.base());
    let view = block.inner(area);
    frame.render_widget(block, area);

    match ctx.text {
        Some(text) => {
            let scroll = ctx
                .scroll
                .clamped(text.width(), text.height(), view.width, view.height);
            canvas::render_text(frame.buffer_mut(), view, text, scroll, colors.base());
        }
        None => {
            let hint = Paragraph::new(Line::from(Span::styled(
                " o : ouvrir une vidéo   Entrée : lancer   ? : aide",
                colors.dim(),
            )));
            frame.render_widget(hint, view);
        }
    }
}

fn draw_sidebar(frame: &mut Frame, area: Rect, ctx: &DrawContext<'_>, colors: &ThemeColors) {
    let config = ctx.config;
    let palette = config.palette();
    let order = match palette.order() {
        GlyphOrder::AsWritten => "normal",
        GlyphOrder::Reversed => "inversé",
    };
    let theme = match config.theme {
        gr_core::config::Theme::Dark => "sombre",
        gr_core::config::Theme::Light => "clair",
    };
    let glyphs: String = palette.glyphs().iter().collect();
    let deps = match ctx.tools_error {
        None => Span::styled(" ffmpeg: OK", colors.base()),
        Some(_) => Span::styled(" ffmpeg: ABSENT", colors.base().fg(colors.error)),
    };

    let lines = vec![
        Line::from(Span::styled("─ Rendu ──", colors.title())),
        Line::from(format!(" Palette: {}", config.palette.label())),
        Line::from(format!(" [{glyphs}]")),
        Line::from(format!(" Ordre: {order}")),
        Line::from(format!(" Largeur: {}", config.output_width)),
        Line::from(format!(" Aspect: {:.2}", config.char_aspect)),
        Line::from(format!(" Thème: {theme}")),
        Line::from(""),
        Line::from(Span::styled("─ Lecture ─", colors.title())),
        Line::from(format!(" Frames: {}", ctx.frames_shown)),
        Line::from(format!(" Affichage: {:.1} fps", ctx.display_fps)),
        Line::from(format!(" Pacing: x{:.2}", config.pacing_factor)),
        Line::from(""),
        Line::from(deps),
        Line::from(""),
        Line::from(Span::styled(" ? = aide", colors.dim())),
    ];

    let sidebar = Paragraph::new(lines).style(colors.base()).block(
        Block::default()
            .borders(Borders::LEFT)
            .border_style(colors.dim())
            .title(" Réglages "),
    );
    frame.render_widget(sidebar, area);
}

fn draw_log(frame: &mut Frame, area: Rect, ctx: &DrawContext<'_>, colors: &ThemeColors) {
    let visible = usize::from(area.height.saturating_sub(1));
    let start = ctx.log.len().saturating_sub(visible);
    let lines: Vec<Line> = ctx.log[start..]
        .iter()
        .map(|l| Line::from(format!(" {l}")))
        .collect();
    let log = Paragraph::new(lines).style(colors.base()).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(colors.dim())
            .title(" Journal "),
    );
    frame.render_widget(log, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect, colors: &ThemeColors) {
    let help_text = vec![
        Line::from(Span::styled(" glyphreel : commandes ", colors.title())),
        Line::from(""),
        Line::from(" o         Ouvrir un fichier"),
        Line::from(" Entrée/s  Lancer la lecture"),
        Line::from(" x         Arrêter"),
        Line::from(" p         Palette A/B"),
        Line::from(" r         Inverser l'ordre"),
        Line::from(" t         Thème clair/sombre"),
        Line::from(" d         Vérifier ffmpeg/ffprobe"),
        Line::from(" ↑↓←→      Défiler"),
        Line::from(" PgUp/PgDn Défiler par page"),
        Line::from(" Home      Revenir en haut"),
        Line::from(" ?         Aide"),
        Line::from(" q/Esc     Quitter"),
        Line::from(""),
        Line::from(Span::styled(" ? ou Esc pour fermer ", colors.dim())),
    ];

    let wanted = (36u16, help_text.len() as u16 + 2);
    let help_width = wanted.0.min(area.width);
    let help_height = wanted.1.min(area.height);
    if (help_width, help_height) != wanted {
        log::debug!(
            "Aide tronquée : {help_width}x{help_height} au lieu de {}x{}",
            wanted.0,
            wanted.1
        );
    }
    let x = area.x + area.width.saturating_sub(help_width) / 2;
    let y = area.y + area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Aide ")
            .style(colors.base()),
    );
    frame.render_widget(Clear, help_area);
    frame.render_widget(help, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(ctx: &DrawContext<'_>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, ctx)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn ctx<'a>(config: &'a PlayerConfig, text: Option<&'a TextFrame>, log: &'a [String]) -> DrawContext<'a> {
        DrawContext {
            text,
            file: Some("mire.mp4"),
            state: "Running",
            progress: 0.5,
            config,
            frames_shown: 12,
            display_fps: 24.0,
            tools_error: None,
            log,
            scroll: Scroll::default(),
            show_help: false,
        }
    }

    #[test]
    fn draws_frame_header_and_log() {
        let config = PlayerConfig::default();
        let text = TextFrame::from_rows(vec!["@@##".into(), "..::".into()]).unwrap();
        let log = vec!["[Frame 24]".to_string()];
        let out = screen(&ctx(&config, Some(&text), &log));
        assert!(out.contains("mire.mp4"));
        assert!(out.contains("Running"));
        assert!(out.contains("@@##"));
        assert!(out.contains("[Frame 24]"));
        assert!(out.contains("50%"));
    }

    #[test]
    fn help_overlay_and_missing_tools() {
        let config = PlayerConfig::default();
        let mut c = ctx(&config, None, &[]);
        c.show_help = true;
        c.tools_error = Some("ffmpeg introuvable");
        let out = screen(&c);
        assert!(out.contains("commandes"));
        assert!(out.contains("ABSENT"));
    }

    #[test]
    fn sidebar_reflects_palette_order() {
        let mut config = PlayerConfig::default();
        config.glyph_order = GlyphOrder::Reversed;
        let out = screen(&ctx(&config, None, &[]));
        assert!(out.contains("Ordre: inversé"));
    }

    #[test]
    fn help_overlay_fits_tiny_terminal() {
        let config = PlayerConfig::default();
        let mut c = ctx(&config, None, &[]);
        c.show_help = true;
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        terminal.draw(|f| draw(f, &c)).unwrap();
        let buf = terminal.backend().buffer();
        let top: String = (0..20).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert!(top.contains("Aide"));
    }

    #[test]
    fn text_area_fits_inside_terminal() {
        let area = Rect::new(0, 0, 100, 30);
        let t = text_area(area);
        assert!(t.width > 0 && t.height > 0);
        assert!(t.right() <= area.right() && t.bottom() <= area.bottom());
    }
}
