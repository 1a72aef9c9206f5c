/// Rendu TUI de glyphreel.
///
/// Vue texte défilable, jauge de progression, panneau latéral et thèmes.
pub mod canvas;
pub mod fps;
pub mod theme;
pub mod ui;
