use gr_core::frame::TextFrame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

/// Décalage de défilement de la vue texte, en cellules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scroll {
    pub row: u16,
    pub col: u16,
}

impl Scroll {
    /// Borne le décalage pour qu'une frame `frame_w × frame_h` reste visible
    /// dans une vue `view_w × view_h`.
    ///
    /// # Example
    /// ```
    /// use gr_render::canvas::Scroll;
    /// let s = Scroll { row: 50, col: 3 }.clamped(80, 20, 40, 10);
    /// assert_eq!(s, Scroll { row: 10, col: 3 });
    /// ```
    #[must_use]
    pub fn clamped(self, frame_w: usize, frame_h: usize, view_w: u16, view_h: u16) -> Self {
        let max_col = u16::try_from(frame_w.saturating_sub(usize::from(view_w))).unwrap_or(u16::MAX);
        let max_row = u16::try_from(frame_h.saturating_sub(usize::from(view_h))).unwrap_or(u16::MAX);
        Self {
            row: self.row.min(max_row),
            col: self.col.min(max_col),
        }
    }
}

/// Écrit une `TextFrame` directement dans le buffer, à partir de `scroll`.
///
/// Pas de widget Paragraph : écriture directe cellule par cellule, tout le
/// rectangle est repeint (les cellules hors frame reçoivent un espace).
///
/// # Example
/// ```
/// use gr_core::frame::TextFrame;
/// use gr_render::canvas::{Scroll, render_text};
/// use ratatui::buffer::Buffer;
/// use ratatui::layout::Rect;
/// use ratatui::style::Style;
///
/// let area = Rect::new(0, 0, 3, 1);
/// let mut buf = Buffer::empty(area);
/// let tf = TextFrame::from_rows(vec!["@#".into()]).unwrap();
/// render_text(&mut buf, area, &tf, Scroll::default(), Style::default());
/// assert_eq!(buf[(0, 0)].symbol(), "@");
/// assert_eq!(buf[(2, 0)].symbol(), " ");
/// ```
pub fn render_text(buf: &mut Buffer, area: Rect, frame: &TextFrame, scroll: Scroll, style: Style) {
    let rows = frame.rows();
    for cy in 0..area.height {
        let row = rows.get(usize::from(scroll.row) + usize::from(cy));
        let mut glyphs = row
            .map(|r| r.chars().skip(usize::from(scroll.col)))
            .into_iter()
            .flatten();
        for cx in 0..area.width {
            let ch = glyphs.next().unwrap_or(' ');
            if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                cell.set_char(ch).set_style(style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> TextFrame {
        TextFrame::from_rows(vec!["abcd".into(), "efgh".into(), "ijkl".into()]).unwrap()
    }

    fn line(buf: &Buffer, y: u16, w: u16) -> String {
        (0..w).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn scroll_offsets_the_view() {
        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        render_text(&mut buf, area, &frame(), Scroll { row: 1, col: 2 }, Style::default());
        assert_eq!(line(&buf, 0, 2), "gh");
        assert_eq!(line(&buf, 1, 2), "kl");
    }

    #[test]
    fn area_larger_than_frame_is_blanked() {
        let area = Rect::new(0, 0, 6, 4);
        let mut buf = Buffer::empty(area);
        render_text(&mut buf, area, &frame(), Scroll::default(), Style::default());
        assert_eq!(line(&buf, 0, 6), "abcd  ");
        assert_eq!(line(&buf, 3, 6), "      ");
    }

    #[test]
    fn unicode_glyphs_are_written_per_cell() {
        let tf = TextFrame::from_rows(vec!["♥☼♣".into()]).unwrap();
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        render_text(&mut buf, area, &tf, Scroll::default(), Style::default());
        assert_eq!(buf[(1, 0)].symbol(), "☼");
    }

    #[test]
    fn clamp_handles_small_frames() {
        let s = Scroll { row: 9, col: 9 }.clamped(4, 3, 10, 10);
        assert_eq!(s, Scroll::default());
    }
}
