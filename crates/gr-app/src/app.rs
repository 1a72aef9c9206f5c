use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use arc_swap::ArcSwap;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use gr_core::config::PlayerConfig;
use gr_core::frame::TextFrame;
use gr_player::{Player, PollUpdate, SessionState};
use gr_render::canvas::Scroll;
use gr_render::fps::FrameRateMeter;
use gr_render::ui::{self, DrawContext};
use gr_source::video::FfmpegBackend;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;

/// Lignes de journal conservées.
const LOG_CAPACITY: usize = 200;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv", "mov", "webm", "m4v", "flv", "mpg", "mpeg"];

/// Vrai si l'extension ressemble à une vidéo.
fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// État de l'application TUI.
pub struct App {
    /// Config partagée, hot-reloadable.
    pub config: Arc<ArcSwap<PlayerConfig>>,
    player: Player<FfmpegBackend>,
    /// Largeur de décodage du backend actuel.
    decode_width: u32,
    /// Fichier sélectionné.
    pub selected: Option<PathBuf>,
    /// Dernière frame reçue.
    pub current_frame: Option<TextFrame>,
    progress: f32,
    log: Vec<String>,
    scroll: Scroll,
    /// Dernière zone de la vue texte, pour le défilement par page.
    view: Rect,
    show_help: bool,
    quitting: bool,
    open_requested: bool,
    meter: FrameRateMeter,
    tools_error: Option<String>,
}

impl App {
    #[must_use]
    pub fn new(config: Arc<ArcSwap<PlayerConfig>>, tools: Result<()>) -> Self {
        let decode_width = config.load().max_decode_width;
        let mut app = Self {
            config,
            player: Player::new(FfmpegBackend::new(decode_width)),
            decode_width,
            selected: None,
            current_frame: None,
            progress: 0.0,
            log: Vec::new(),
            scroll: Scroll::default(),
            view: Rect::default(),
            show_help: false,
            quitting: false,
            open_requested: false,
            meter: FrameRateMeter::new(30),
            tools_error: None,
        };
        app.record_tools_check(tools);
        app
    }

    /// Boucle principale : événements clavier, poll du player, rendu.
    ///
    /// # Errors
    /// Returns an error if terminal operations fail.
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut last_tick = Instant::now();

        loop {
            if self.is_quitting() {
                break;
            }

            let interval = Duration::from_millis(self.config.load().poll_interval_ms);
            let elapsed = last_tick.elapsed();
            if elapsed < interval {
                // Rester réactif aux touches entre deux polls
                if event::poll(interval.saturating_sub(elapsed))? {
                    self.handle_event(&event::read()?);
                }
                continue;
            }
            last_tick = Instant::now();

            while event::poll(Duration::ZERO)? {
                self.handle_event(&event::read()?);
            }

            if self.open_requested {
                self.open_requested = false;
                self.open_dialog(&mut terminal);
            }

            self.poll_player();
            self.draw(&mut terminal)?;
        }

        self.player.cancel();
        Ok(())
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let config = self.config.load();
        // Fichier de la session en cours en priorité, sinon la sélection
        let file = self
            .player
            .current_path()
            .or(self.selected.as_deref())
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());
        let state = self.state().label();
        let display_fps = self.meter.rate_since(Instant::now(), Duration::from_secs(1));

        let mut view = self.view;
        terminal.draw(|frame| {
            view = ui::text_area(frame.area());
            let ctx = DrawContext {
                text: self.current_frame.as_ref(),
                file: file.as_deref(),
                state,
                progress: self.progress,
                config: &config,
                frames_shown: self.meter.total(),
                display_fps,
                tools_error: self.tools_error.as_deref(),
                log: self.log_lines(),
                scroll: self.scroll,
                show_help: self.show_help,
            };
            ui::draw(frame, &ctx);
        })?;
        self.view = view;
        Ok(())
    }

    /// Intègre ce que le player a produit depuis le dernier tick.
    pub fn apply_update(&mut self, update: PollUpdate) {
        if let Some(frame) = update.frame {
            self.current_frame = Some(frame);
            self.meter.record();
        }
        if let Some(p) = update.progress {
            self.progress = self.progress.max(p);
        }
        for line in update.status {
            self.push_log(line);
        }
        if let Some(outcome) = update.outcome {
            log::info!("Session terminée : {outcome}");
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.player.state()
    }

    /// Poll direct du player, hors boucle de rendu.
    pub fn poll_player(&mut self) {
        let update = self.player.poll();
        self.apply_update(update);
    }

    #[must_use]
    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    #[must_use]
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    fn push_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
    }

    fn handle_event(&mut self, event: &Event) {
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            self.handle_key(*code);
        }
    }

    /// Dispatch d'une touche.
    pub fn handle_key(&mut self, code: KeyCode) {
        if self.show_help {
            if matches!(code, KeyCode::Char('?' | 'q') | KeyCode::Esc) {
                self.show_help = false;
            }
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.player.cancel();
                self.quitting = true;
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('o') => {
                if self.player.state() == SessionState::Running {
                    self.push_log("Arrêtez la lecture avant d'ouvrir un fichier".into());
                } else {
                    self.open_requested = true;
                }
            }
            KeyCode::Enter | KeyCode::Char('s') => self.start_playback(),
            KeyCode::Char('x') => self.stop_playback(),
            KeyCode::Char('p') => self.toggle_config(|c| c.palette = c.palette.toggled()),
            KeyCode::Char('r') => self.toggle_config(|c| c.glyph_order = c.glyph_order.toggled()),
            KeyCode::Char('t') => self.toggle_config(|c| c.theme = c.theme.toggled()),
            KeyCode::Char('d') => self.record_tools_check(gr_source::tools_available()),
            KeyCode::Up => self.scroll.row = self.scroll.row.saturating_sub(1),
            KeyCode::Down => self.scroll.row = self.scroll.row.saturating_add(1),
            KeyCode::Left => self.scroll.col = self.scroll.col.saturating_sub(1),
            KeyCode::Right => self.scroll.col = self.scroll.col.saturating_add(1),
            KeyCode::PageUp => {
                self.scroll.row = self.scroll.row.saturating_sub(self.view.height.max(1));
            }
            KeyCode::PageDown => {
                self.scroll.row = self.scroll.row.saturating_add(self.view.height.max(1));
            }
            KeyCode::Home => self.scroll = Scroll::default(),
            _ => {}
        }
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        if let Some(frame) = &self.current_frame {
            self.scroll = self.scroll.clamped(
                frame.width(),
                frame.height(),
                self.view.width,
                self.view.height,
            );
        }
    }

    /// Sélectionne un fichier (picker, CLI).
    pub fn select(&mut self, path: PathBuf) {
        if !is_video(&path) {
            log::warn!("Extension inhabituelle : {}", path.display());
        }
        self.push_log(format!("Fichier : {}", path.display()));
        self.selected = Some(path);
        self.player.reset();
    }

    /// Lance une session sur le fichier sélectionné avec la config courante.
    pub fn start_playback(&mut self) {
        let Some(path) = self.selected.clone() else {
            self.push_log("Aucun fichier sélectionné (o pour ouvrir)".into());
            return;
        };
        let config = self.config.load_full();

        if self.player.state() != SessionState::Running
            && config.max_decode_width != self.decode_width
        {
            self.decode_width = config.max_decode_width;
            self.player = Player::new(FfmpegBackend::new(self.decode_width));
        }

        match self.player.start(&path, &config) {
            Ok(()) => {
                self.progress = 0.0;
                self.meter.reset();
                self.scroll = Scroll::default();
            }
            Err(e) => self.push_log(e.to_string()),
        }
    }

    pub fn stop_playback(&mut self) {
        if self.player.state() == SessionState::Running {
            self.player.cancel();
            self.push_log("Arrêt demandé".into());
        }
    }

    /// Résultat d'une vérification ffmpeg/ffprobe, au démarrage ou sur `d`.
    pub fn record_tools_check(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {
                if self.tools_error.take().is_some() {
                    log::info!("ffmpeg/ffprobe de nouveau disponibles");
                }
                self.push_log("Dépendances : ffmpeg et ffprobe disponibles".into());
            }
            Err(e) => {
                let message = format!("{e:#}");
                log::warn!("{message}");
                self.push_log(format!("Dépendance manquante : {message}"));
                self.tools_error = Some(message);
            }
        }
    }

    fn toggle_config(&mut self, mutate: impl FnOnce(&mut PlayerConfig)) {
        let config = self.config.load();
        let mut new = (**config).clone();
        mutate(&mut new);
        self.config.store(Arc::new(new));
        if self.player.state() == SessionState::Running {
            self.push_log("Réglage appliqué à la prochaine lecture".into());
        }
    }

    /// Ouvre le sélecteur natif en suspendant l'écran alterné.
    fn pick_file(terminal: &mut DefaultTerminal) -> Option<PathBuf> {
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen).ok();

        let picked = rfd::FileDialog::new()
            .set_title("Ouvrir une vidéo - glyphreel")
            .add_filter("Vidéo", VIDEO_EXTENSIONS)
            .add_filter("Tous les fichiers", &["*"])
            .pick_file();

        crossterm::terminal::enable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen).ok();
        terminal.clear().ok();

        picked
    }

    fn open_dialog(&mut self, terminal: &mut DefaultTerminal) {
        if let Some(path) = Self::pick_file(terminal) {
            self.select(path);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.player.cancel();
    }
}
