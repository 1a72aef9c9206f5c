use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use clap::Parser;
use gr_core::config::PlayerConfig;

pub mod app;
pub mod cli;
pub mod hotreload;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging (stderr : rediriger avec 2> glyphreel.log)
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.apply_overrides(&mut config);
    let config = Arc::new(ArcSwap::from_pointee(config));

    // 4. Hot-reload (les overrides CLI sont réappliqués à chaque rechargement)
    let _watcher = if cli.config.exists() {
        let overrides = cli.clone();
        match hotreload::spawn_config_watcher(&cli.config, &config, move |c| {
            overrides.apply_overrides(c);
        }) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Hot-reload indisponible : {e}");
                None
            }
        }
    } else {
        None
    };

    // 5. Vérifier ffmpeg/ffprobe (relançable avec `d` ; l'installation reste
    //    à la charge de l'utilisateur)
    let tools = gr_source::tools_available();

    // 6. Construire l'App
    let mut app_instance = app::App::new(Arc::clone(&config), tools);
    if let Some(ref path) = cli.video {
        app_instance.select(path.clone());
        if cli.autoplay {
            app_instance.start_playback();
        }
    }

    // 7. Initialiser le terminal ratatui
    let terminal = ratatui::init();

    // 8. Boucle principale
    let result = app_instance.run(terminal);

    // 9. Restaurer le terminal (TOUJOURS, même en cas d'erreur)
    ratatui::restore();

    result
}

/// Config fichier si présente, sinon défauts.
fn resolve_config(cli: &cli::Cli) -> Result<PlayerConfig> {
    if cli.config.exists() {
        gr_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(PlayerConfig::default())
    }
}
