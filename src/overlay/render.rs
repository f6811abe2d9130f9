//! Pure projection-to-view step. No terminal, no bus: give it a state and
//! a layout and it returns the full layered view.

use crate::keyboard::KeystrokeFrame;
use crate::overlay::layout::{LayoutStrategy, Slot, WindowSize};
use crate::params::{
    FontFamily, HexColor, Rgba, TypographyParameters, WindowAppearanceParameters,
};

/// The overlay's local mirror of the parameter groups it reads, plus the
/// frame currently on display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverlayState {
    pub typography: TypographyParameters,
    pub appearance: WindowAppearanceParameters,
    pub frame: KeystrokeFrame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub color: HexColor,
    pub size_px: u8,
    pub family: FontFamily,
}

impl From<&TypographyParameters> for TextStyle {
    fn from(t: &TypographyParameters) -> Self {
        Self {
            color: t.text_color,
            size_px: t.font_size_px,
            family: t.font_family,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGlyph {
    pub symbol: String,
    pub background: Rgba,
    pub text: TextStyle,
    pub slot: Slot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupView {
    pub background: Rgba,
    pub keys: Vec<KeyGlyph>,
}

/// Container, then one layer per key-group, then one per key. Each layer
/// carries the same blended background, so translucent layers stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayView {
    pub size: WindowSize,
    pub layout: LayoutStrategy,
    pub background: Rgba,
    pub groups: Vec<GroupView>,
}

impl OverlayView {
    pub fn glyphs(&self) -> impl Iterator<Item = &KeyGlyph> {
        self.groups.iter().flat_map(|g| g.keys.iter())
    }
}

pub fn render(state: &OverlayState, layout: LayoutStrategy) -> OverlayView {
    let background = state.appearance.effective_background();
    let text = TextStyle::from(&state.typography);
    let slots = layout.arrange(&state.frame);

    let mut groups: Vec<GroupView> = state
        .frame
        .groups()
        .iter()
        .map(|g| GroupView {
            background,
            keys: Vec::with_capacity(g.len()),
        })
        .collect();

    for slot in slots {
        let symbol = state.frame.groups()[slot.group].symbols()[slot.key].clone();
        groups[slot.group].keys.push(KeyGlyph {
            symbol,
            background,
            text,
            slot,
        });
    }

    OverlayView {
        size: WindowSize::for_frame(&state.frame),
        layout,
        background,
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyGroup;
    use crate::params::Opacity;

    fn state_with(frame: KeystrokeFrame) -> OverlayState {
        OverlayState {
            frame,
            ..OverlayState::default()
        }
    }

    #[test]
    fn test_defaults_render_half_transparent() {
        let view = render(&OverlayState::default(), LayoutStrategy::ChordRows);
        assert_eq!(view.background, Rgba::rgba(0xe0, 0xe0, 0xe0, 128));
        assert_eq!(view.size, WindowSize { width: 150, height: 100 });
        assert!(view.groups.is_empty());
    }

    #[test]
    fn test_every_layer_shares_background() {
        let mut state = state_with(
            [KeyGroup::new(["Ctrl", "C"]), KeyGroup::new(["V"])]
                .into_iter()
                .collect(),
        );
        state.appearance.background_opacity = Opacity::percent(30);
        let view = render(&state, LayoutStrategy::FlatRow);
        assert_eq!(view.background.a, 77);
        for group in &view.groups {
            assert_eq!(group.background, view.background);
            for key in &group.keys {
                assert_eq!(key.background, view.background);
            }
        }
    }

    #[test]
    fn test_opaque_when_transparency_disabled() {
        let mut state = OverlayState::default();
        state.appearance.transparent_enabled = false;
        state.appearance.background_opacity = Opacity::percent(20);
        assert!(render(&state, LayoutStrategy::ChordRows).background.is_opaque());
    }

    #[test]
    fn test_glyphs_keep_group_order_and_typography() {
        let mut state = state_with([KeyGroup::new(["Ctrl", "C"])].into_iter().collect());
        state.typography.font_size_px = 20;
        let view = render(&state, LayoutStrategy::ChordRows);
        assert_eq!(view.size.width, 182);
        assert_eq!(view.groups.len(), 1);
        let symbols: Vec<_> = view.glyphs().map(|g| g.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Ctrl", "C"]);
        assert!(view.glyphs().all(|g| g.text.size_px == 20));
    }

    #[test]
    fn test_layout_choice_does_not_change_size_or_colors() {
        let state = state_with(
            [KeyGroup::new(["A"]), KeyGroup::new(["B"]), KeyGroup::new(["C"])]
                .into_iter()
                .collect(),
        );
        let rows = render(&state, LayoutStrategy::ChordRows);
        let grid = render(&state, LayoutStrategy::WrapGrid { columns: 2 });
        assert_eq!(rows.size, grid.size);
        assert_eq!(rows.background, grid.background);
        assert_eq!(rows.glyphs().count(), grid.glyphs().count());
    }
}
