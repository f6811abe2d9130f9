//! The three parameter groups owned by the settings surface.
//!
//! Each group is an immutable snapshot. Edits go through a `*Delta`, which
//! produces a whole new snapshot with one field changed and clamped into its
//! allowed range; the snapshot is what gets broadcast.

pub mod color;
pub mod opacity;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use color::{ColorParseError, HexColor, Rgba};
pub use opacity::{Opacity, OpacityError};

pub const TIMEOUT_MIN_MS: u32 = 50;
pub const TIMEOUT_MAX_MS: u32 = 2000;
pub const TIMEOUT_STEP_MS: u32 = 50;
pub const FONT_SIZE_MIN_PX: u8 = 8;
pub const FONT_SIZE_MAX_PX: u8 = 32;

/// Clamp into `[50, 2000]` and snap to the nearest 50 ms step.
pub fn clamp_timeout(ms: u32) -> u32 {
    let clamped = ms.clamp(TIMEOUT_MIN_MS, TIMEOUT_MAX_MS);
    let snapped = (clamped + TIMEOUT_STEP_MS / 2) / TIMEOUT_STEP_MS * TIMEOUT_STEP_MS;
    snapped.clamp(TIMEOUT_MIN_MS, TIMEOUT_MAX_MS)
}

pub fn clamp_font_size(px: u8) -> u8 {
    px.clamp(FONT_SIZE_MIN_PX, FONT_SIZE_MAX_PX)
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Read by the capture source, never by the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorParameters {
    pub timeout_ms: u32,
    pub mouse_visible: bool,
    pub modifier_visible: bool,
}

impl Default for BehaviorParameters {
    fn default() -> Self {
        Self {
            timeout_ms: 500,
            mouse_visible: false,
            modifier_visible: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorDelta {
    TimeoutMs(u32),
    MouseVisible(bool),
    ModifierVisible(bool),
}

impl BehaviorParameters {
    pub fn apply(self, delta: BehaviorDelta) -> Self {
        match delta {
            BehaviorDelta::TimeoutMs(ms) => Self {
                timeout_ms: clamp_timeout(ms),
                ..self
            },
            BehaviorDelta::MouseVisible(v) => Self {
                mouse_visible: v,
                ..self
            },
            BehaviorDelta::ModifierVisible(v) => Self {
                modifier_visible: v,
                ..self
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Typography
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    SansSerif,
    Monospace,
    Consolas,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [
        FontFamily::SansSerif,
        FontFamily::Monospace,
        FontFamily::Consolas,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FontFamily::SansSerif => "SansSerif",
            FontFamily::Monospace => "Monospace",
            FontFamily::Consolas => "Consolas",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyParameters {
    pub font_size_px: u8,
    pub font_family: FontFamily,
    pub text_color: HexColor,
}

impl Default for TypographyParameters {
    fn default() -> Self {
        Self {
            font_size_px: 12,
            font_family: FontFamily::SansSerif,
            text_color: HexColor::rgb(0xe0, 0xe0, 0xe0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypographyDelta {
    FontSizePx(u8),
    FontFamily(FontFamily),
    TextColor(HexColor),
}

impl TypographyParameters {
    pub fn apply(self, delta: TypographyDelta) -> Self {
        match delta {
            TypographyDelta::FontSizePx(px) => Self {
                font_size_px: clamp_font_size(px),
                ..self
            },
            TypographyDelta::FontFamily(family) => Self {
                font_family: family,
                ..self
            },
            TypographyDelta::TextColor(color) => Self {
                text_color: color,
                ..self
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Window appearance
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowAppearanceParameters {
    pub background_color: HexColor,
    pub transparent_enabled: bool,
    pub background_opacity: Opacity,
}

impl Default for WindowAppearanceParameters {
    fn default() -> Self {
        Self {
            background_color: HexColor::rgb(0xe0, 0xe0, 0xe0),
            transparent_enabled: true,
            background_opacity: Opacity::percent(50),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowAppearanceDelta {
    BackgroundColor(HexColor),
    TransparentEnabled(bool),
    BackgroundOpacity(Opacity),
}

impl WindowAppearanceParameters {
    pub fn apply(self, delta: WindowAppearanceDelta) -> Self {
        match delta {
            WindowAppearanceDelta::BackgroundColor(color) => Self {
                background_color: color,
                ..self
            },
            WindowAppearanceDelta::TransparentEnabled(v) => Self {
                transparent_enabled: v,
                ..self
            },
            WindowAppearanceDelta::BackgroundOpacity(o) => Self {
                background_opacity: o,
                ..self
            },
        }
    }

    /// Opacity actually used for blending. The stored value is kept but
    /// ignored while transparency is off.
    pub fn effective_opacity(&self) -> Opacity {
        if self.transparent_enabled {
            self.background_opacity
        } else {
            Opacity::OPAQUE
        }
    }

    pub fn effective_background(&self) -> Rgba {
        Rgba::with_opacity(self.background_color, self.effective_opacity().get())
    }
}
