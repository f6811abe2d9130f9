//! Keyboard bindings for the settings form.
//!
//! Every control clamps before anything is broadcast: sliders step inside
//! their range, toggles flip, selects and color swatches cycle through a
//! fixed list. Hex entry only commits a string that parses as `#rrggbb`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::params::{
    BehaviorDelta, HexColor, TIMEOUT_STEP_MS, TypographyDelta, WindowAppearanceDelta,
};
use crate::settings::{SettingsState, SettingsSurface};

pub const OPACITY_STEP: u8 = 5;

pub const PALETTE: [HexColor; 8] = [
    HexColor::rgb(0xe0, 0xe0, 0xe0),
    HexColor::rgb(0xff, 0xff, 0xff),
    HexColor::rgb(0x1e, 0x1e, 0x2e),
    HexColor::rgb(0x00, 0x00, 0x00),
    HexColor::rgb(0xff, 0x00, 0x00),
    HexColor::rgb(0xa6, 0xe3, 0xa1),
    HexColor::rgb(0x89, 0xb4, 0xfa),
    HexColor::rgb(0xf9, 0xe2, 0xaf),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Behavior,
    Typography,
    WindowAppearance,
}

impl Section {
    pub const ALL: [Section; 3] = [
        Section::Behavior,
        Section::Typography,
        Section::WindowAppearance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Behavior => "Behavior",
            Section::Typography => "Typography",
            Section::WindowAppearance => "Window Appearance",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsField {
    Timeout,
    MouseVisible,
    ModifierVisible,
    FontFamily,
    FontSize,
    TextColor,
    BackgroundColor,
    Transparent,
    Opacity,
}

impl SettingsField {
    pub const ALL: [SettingsField; 9] = [
        SettingsField::Timeout,
        SettingsField::MouseVisible,
        SettingsField::ModifierVisible,
        SettingsField::FontFamily,
        SettingsField::FontSize,
        SettingsField::TextColor,
        SettingsField::BackgroundColor,
        SettingsField::Transparent,
        SettingsField::Opacity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::Timeout => "Timeout",
            SettingsField::MouseVisible => "Mouse",
            SettingsField::ModifierVisible => "Modifier",
            SettingsField::FontFamily => "Font family",
            SettingsField::FontSize => "Font size",
            SettingsField::TextColor => "Text color",
            SettingsField::BackgroundColor => "Background",
            SettingsField::Transparent => "Transparent",
            SettingsField::Opacity => "Opacity",
        }
    }

    pub fn section(self) -> Section {
        match self {
            SettingsField::Timeout
            | SettingsField::MouseVisible
            | SettingsField::ModifierVisible => Section::Behavior,
            SettingsField::FontFamily | SettingsField::FontSize | SettingsField::TextColor => {
                Section::Typography
            }
            SettingsField::BackgroundColor
            | SettingsField::Transparent
            | SettingsField::Opacity => Section::WindowAppearance,
        }
    }

    pub fn is_color(self) -> bool {
        matches!(self, SettingsField::TextColor | SettingsField::BackgroundColor)
    }

    /// The opacity slider is disabled while transparency is off.
    pub fn is_enabled(self, state: &SettingsState) -> bool {
        match self {
            SettingsField::Opacity => state.appearance.transparent_enabled,
            _ => true,
        }
    }

    pub fn value_text(self, state: &SettingsState) -> String {
        let visible = |v: bool| if v { "Visible" } else { "Hidden" };
        match self {
            SettingsField::Timeout => format!("{}ms", state.behavior.timeout_ms),
            SettingsField::MouseVisible => visible(state.behavior.mouse_visible).to_string(),
            SettingsField::ModifierVisible => visible(state.behavior.modifier_visible).to_string(),
            SettingsField::FontFamily => state.typography.font_family.to_string(),
            SettingsField::FontSize => format!("{}px", state.typography.font_size_px),
            SettingsField::TextColor => state.typography.text_color.to_string(),
            SettingsField::BackgroundColor => state.appearance.background_color.to_string(),
            SettingsField::Transparent => {
                if state.appearance.transparent_enabled { "On" } else { "Off" }.to_string()
            }
            SettingsField::Opacity => state.appearance.background_opacity.to_string(),
        }
    }

    pub fn color(self, state: &SettingsState) -> Option<HexColor> {
        match self {
            SettingsField::TextColor => Some(state.typography.text_color),
            SettingsField::BackgroundColor => Some(state.appearance.background_color),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Forward,
    Backward,
}

fn cycle_palette(current: HexColor, step: Step) -> HexColor {
    let n = PALETTE.len();
    let next = match (PALETTE.iter().position(|c| *c == current), step) {
        (Some(i), Step::Forward) => (i + 1) % n,
        (Some(i), Step::Backward) => (i + n - 1) % n,
        (None, _) => 0,
    };
    PALETTE[next]
}

/// Move one control one notch. Returns `false` when the control is disabled
/// and nothing was sent.
pub fn adjust(surface: &mut SettingsSurface, field: SettingsField, step: Step) -> bool {
    let state = *surface.state();
    if !field.is_enabled(&state) {
        return false;
    }
    match field {
        SettingsField::Timeout => {
            let ms = match step {
                Step::Forward => state.behavior.timeout_ms.saturating_add(TIMEOUT_STEP_MS),
                Step::Backward => state.behavior.timeout_ms.saturating_sub(TIMEOUT_STEP_MS),
            };
            surface.update_behavior(BehaviorDelta::TimeoutMs(ms));
        }
        SettingsField::MouseVisible => {
            surface.update_behavior(BehaviorDelta::MouseVisible(!state.behavior.mouse_visible));
        }
        SettingsField::ModifierVisible => {
            surface.update_behavior(BehaviorDelta::ModifierVisible(
                !state.behavior.modifier_visible,
            ));
        }
        SettingsField::FontFamily => {
            let family = match step {
                Step::Forward => state.typography.font_family.next(),
                Step::Backward => state.typography.font_family.prev(),
            };
            surface.update_typography(TypographyDelta::FontFamily(family));
        }
        SettingsField::FontSize => {
            let px = match step {
                Step::Forward => state.typography.font_size_px.saturating_add(1),
                Step::Backward => state.typography.font_size_px.saturating_sub(1),
            };
            surface.update_typography(TypographyDelta::FontSizePx(px));
        }
        SettingsField::TextColor => {
            let color = cycle_palette(state.typography.text_color, step);
            surface.update_typography(TypographyDelta::TextColor(color));
        }
        SettingsField::BackgroundColor => {
            let color = cycle_palette(state.appearance.background_color, step);
            surface.update_window_appearance(WindowAppearanceDelta::BackgroundColor(color));
        }
        SettingsField::Transparent => {
            surface.update_window_appearance(WindowAppearanceDelta::TransparentEnabled(
                !state.appearance.transparent_enabled,
            ));
        }
        SettingsField::Opacity => {
            let opacity = match step {
                Step::Forward => state.appearance.background_opacity.saturating_add(OPACITY_STEP),
                Step::Backward => state.appearance.background_opacity.saturating_sub(OPACITY_STEP),
            };
            surface.update_window_appearance(WindowAppearanceDelta::BackgroundOpacity(opacity));
        }
    }
    true
}

/// In-progress `#rrggbb` typed into a color field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HexEntry {
    pub field: Option<SettingsField>,
    pub buffer: String,
    pub invalid: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormOutcome {
    Consumed,
    Ignored,
}

#[derive(Clone, Debug, Default)]
pub struct SettingsForm {
    pub selected: usize,
    pub entry: Option<HexEntry>,
}

impl SettingsForm {
    pub fn selected_field(&self) -> SettingsField {
        SettingsField::ALL[self.selected.min(SettingsField::ALL.len() - 1)]
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % SettingsField::ALL.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = SettingsField::ALL.len() - 1;
        }
    }

    pub fn is_editing(&self) -> bool {
        self.entry.is_some()
    }

    pub fn handle_key(&mut self, surface: &mut SettingsSurface, key: KeyEvent) -> FormOutcome {
        if key.kind != KeyEventKind::Press {
            return FormOutcome::Ignored;
        }
        if self.entry.is_some() {
            return self.handle_entry_key(surface, key);
        }
        let field = self.selected_field();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.prev(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => {
                adjust(surface, field, Step::Forward);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                adjust(surface, field, Step::Backward);
            }
            KeyCode::Char('e') if field.is_color() => {
                let current = field.color(surface.state()).unwrap_or(PALETTE[0]);
                self.entry = Some(HexEntry {
                    field: Some(field),
                    buffer: current.to_string(),
                    invalid: false,
                });
            }
            _ => return FormOutcome::Ignored,
        }
        FormOutcome::Consumed
    }

    fn handle_entry_key(&mut self, surface: &mut SettingsSurface, key: KeyEvent) -> FormOutcome {
        let Some(entry) = self.entry.as_mut() else {
            return FormOutcome::Ignored;
        };
        match key.code {
            KeyCode::Esc => self.entry = None,
            KeyCode::Backspace => {
                entry.buffer.pop();
                entry.invalid = false;
            }
            KeyCode::Char(ch)
                if (ch == '#' || ch.is_ascii_hexdigit()) && entry.buffer.len() < 7 =>
            {
                entry.buffer.push(ch.to_ascii_lowercase());
                entry.invalid = false;
            }
            KeyCode::Enter => match (entry.field, entry.buffer.parse::<HexColor>()) {
                (Some(SettingsField::TextColor), Ok(color)) => {
                    surface.update_typography(TypographyDelta::TextColor(color));
                    self.entry = None;
                }
                (Some(SettingsField::BackgroundColor), Ok(color)) => {
                    surface.update_window_appearance(WindowAppearanceDelta::BackgroundColor(color));
                    self.entry = None;
                }
                _ => entry.invalid = true,
            },
            _ => {}
        }
        FormOutcome::Consumed
    }
}
