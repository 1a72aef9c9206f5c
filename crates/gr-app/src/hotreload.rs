use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwap;
use gr_core::config::PlayerConfig;
use notify::{Event, EventKind, RecursiveMode, Watcher};

/// Surveille le fichier config et publie chaque version valide dans l'ArcSwap.
///
/// Une session en cours garde son snapshot ; le changement vaut pour la
/// suivante. Retourne le Watcher (doit rester vivant tant que l'app tourne).
///
/// # Errors
/// Returns an error if the watcher cannot be created or the path cannot be watched.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use arc_swap::ArcSwap;
/// use gr_core::config::PlayerConfig;
/// use gr_app::hotreload::spawn_config_watcher;
/// use std::path::Path;
///
/// let config = Arc::new(ArcSwap::from_pointee(PlayerConfig::default()));
/// let _watcher = spawn_config_watcher(Path::new("config/default.toml"), &config, |_| {});
/// ```
pub fn spawn_config_watcher<F>(
    config_path: &Path,
    config: &Arc<ArcSwap<PlayerConfig>>,
    adjust: F,
) -> Result<impl Watcher + use<F>>
where
    F: Fn(&mut PlayerConfig) + Send + 'static,
{
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res
            && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        {
            reload_into(&path, &config, &adjust);
        }
    })?;

    watcher.watch(config_path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Recharge `path` ; en cas d'erreur l'ancienne config reste en place.
fn reload_into(path: &Path, config: &ArcSwap<PlayerConfig>, adjust: &impl Fn(&mut PlayerConfig)) {
    match gr_core::config::load_config(path) {
        Ok(mut new_config) => {
            adjust(&mut new_config);
            config.store(Arc::new(new_config));
            log::info!("Config rechargée depuis {}", path.display());
        }
        Err(e) => {
            log::warn!("Erreur de rechargement config : {e:#}");
        }
    }
}
