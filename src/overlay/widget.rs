use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Widget};

use crate::overlay::render::{KeyGlyph, OverlayView};
use crate::params::{FontFamily, HexColor};

/// Cells between two key-groups on the same row.
const GROUP_GAP: u16 = 2;

/// Draws an `OverlayView` into a terminal buffer.
///
/// Cells have no alpha, so each layer is composited over the one below it:
/// container over `backdrop`, key-group over container, key over key-group.
pub struct OverlayPanel<'a> {
    view: &'a OverlayView,
    backdrop: HexColor,
}

impl<'a> OverlayPanel<'a> {
    pub fn new(view: &'a OverlayView, backdrop: HexColor) -> Self {
        Self { view, backdrop }
    }
}

fn glyph_label(glyph: &KeyGlyph) -> String {
    let pad = usize::from(glyph.text.size_px / 8);
    format!("{:pad$}{}{:pad$}", "", glyph.symbol, "")
}

fn glyph_style(glyph: &KeyGlyph, bg: HexColor) -> Style {
    let style = Style::default()
        .fg(glyph.text.color.to_color())
        .bg(bg.to_color());
    match glyph.text.family {
        FontFamily::Consolas => style.add_modifier(Modifier::BOLD),
        FontFamily::SansSerif | FontFamily::Monospace => style,
    }
}

impl Widget for OverlayPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let container = self.view.background.over(self.backdrop);
        let group_bg = self.view.background.over(container);
        let key_bg = self.view.background.over(group_bg);

        Block::default()
            .style(Style::default().bg(container.to_color()))
            .render(area, buf);

        if area.width < 3 || area.height < 3 {
            return;
        }
        let inner = Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2);
        let right = inner.x + inner.width;

        let mut cursors: Vec<u16> = Vec::new();
        let mut last: Vec<Option<(usize, u16)>> = Vec::new();

        for glyph in self.view.glyphs() {
            let row = usize::from(glyph.slot.row);
            if row >= usize::from(inner.height) {
                continue;
            }
            if cursors.len() <= row {
                cursors.resize(row + 1, inner.x);
                last.resize(row + 1, None);
            }

            let mut x = cursors[row];
            match last[row] {
                Some((group, column))
                    if group == glyph.slot.group && glyph.slot.column == column + 1 =>
                {
                    if x < right {
                        let separator = Style::default().bg(group_bg.to_color());
                        buf.set_string(x, inner.y + glyph.slot.row, " ", separator);
                    }
                    x = x.saturating_add(1);
                }
                Some(_) => x = x.saturating_add(GROUP_GAP),
                None => {}
            }
            if x >= right {
                last[row] = Some((glyph.slot.group, glyph.slot.column));
                cursors[row] = x;
                continue;
            }

            let label = glyph_label(glyph);
            let width = u16::try_from(Span::raw(label.as_str()).width()).unwrap_or(u16::MAX);
            let max = usize::from(right - x);
            buf.set_stringn(x, inner.y + glyph.slot.row, &label, max, glyph_style(glyph, key_bg));

            cursors[row] = x.saturating_add(width);
            last[row] = Some((glyph.slot.group, glyph.slot.column));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{KeyGroup, KeystrokeFrame};
    use crate::overlay::layout::LayoutStrategy;
    use crate::overlay::render::{OverlayState, render};
    use crate::params::Opacity;

    fn draw(state: &OverlayState, layout: LayoutStrategy, area: Rect) -> Buffer {
        let view = render(state, layout);
        let mut buf = Buffer::empty(area);
        OverlayPanel::new(&view, HexColor::rgb(0, 0, 0)).render(area, &mut buf);
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol().to_string()).collect()
    }

    #[test]
    fn test_chord_group_drawn_together() {
        let mut state = OverlayState::default();
        state.frame = [KeyGroup::new(["Ctrl", "C"])].into_iter().collect();
        let buf = draw(&state, LayoutStrategy::ChordRows, Rect::new(0, 0, 23, 7));
        assert_eq!(row_text(&buf, 1).trim_end(), "  Ctrl   C");
    }

    #[test]
    fn test_layers_get_denser_toward_the_key() {
        let mut state = OverlayState::default();
        state.appearance.background_color = HexColor::rgb(255, 255, 255);
        state.appearance.background_opacity = Opacity::percent(50);
        state.frame = [KeyGroup::new(["A", "B"])].into_iter().collect();
        let buf = draw(&state, LayoutStrategy::ChordRows, Rect::new(0, 0, 20, 5));

        let container = buf[(0, 0)].bg;
        let key = buf[(1, 1)].bg;
        let separator = buf[(4, 1)].bg;
        assert_eq!(container, HexColor::rgb(128, 128, 128).to_color());
        assert_eq!(separator, HexColor::rgb(192, 192, 192).to_color());
        assert_eq!(key, HexColor::rgb(224, 224, 224).to_color());
    }

    #[test]
    fn test_opaque_background_is_flat() {
        let mut state = OverlayState::default();
        state.appearance.transparent_enabled = false;
        state.frame = [KeyGroup::new(["A"])].into_iter().collect();
        let buf = draw(&state, LayoutStrategy::FlatRow, Rect::new(0, 0, 20, 5));
        let bg = HexColor::rgb(0xe0, 0xe0, 0xe0).to_color();
        assert_eq!(buf[(0, 0)].bg, bg);
        assert_eq!(buf[(1, 1)].bg, bg);
    }

    #[test]
    fn test_text_color_and_family_applied() {
        let mut state = OverlayState::default();
        state.typography.text_color = HexColor::rgb(10, 200, 30);
        state.typography.font_family = FontFamily::Consolas;
        state.frame = [KeyGroup::new(["Q"])].into_iter().collect();
        let buf = draw(&state, LayoutStrategy::ChordRows, Rect::new(0, 0, 20, 5));
        let cell = &buf[(2, 1)];
        assert_eq!(cell.symbol(), "Q");
        assert_eq!(cell.fg, HexColor::rgb(10, 200, 30).to_color());
        assert!(cell.modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_overflow_is_clipped() {
        let mut state = OverlayState::default();
        state.frame = (0..20).map(|_| KeyGroup::new(["Space"])).collect::<KeystrokeFrame>();
        // must not panic when groups run past the right edge or bottom
        let buf = draw(&state, LayoutStrategy::FlatRow, Rect::new(0, 0, 12, 3));
        assert_eq!(buf.area.width, 12);
        let buf = draw(&state, LayoutStrategy::ChordRows, Rect::new(0, 0, 12, 3));
        assert_eq!(buf.area.height, 3);
    }
}
