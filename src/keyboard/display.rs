//! Display names for keys and mouse buttons as they appear on the overlay.
//!
//! All symbol strings that go out on the `keyevent` topic are produced here,
//! so the overlay and any other subscriber see one consistent vocabulary.

use crossterm::event::{KeyCode, KeyModifiers, MouseButton};

pub const CTRL: &str = "Ctrl";
pub const ALT: &str = "Alt";
pub const SHIFT: &str = "Shift";

/// Human-readable name for a key code. `None` for keys we never show
/// (bare modifier reports, media keys and the like).
pub fn key_symbol(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(ch) => ch.to_uppercase().collect(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        KeyCode::Insert => "Ins".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => return None,
    };
    Some(name)
}

/// Modifier names in fixed display order.
pub fn modifier_symbols(modifiers: KeyModifiers) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(3);
    if modifiers.contains(KeyModifiers::CONTROL) {
        out.push(CTRL);
    }
    if modifiers.contains(KeyModifiers::ALT) {
        out.push(ALT);
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        out.push(SHIFT);
    }
    out
}

pub fn mouse_symbol(button: MouseButton) -> &'static str {
    match button {
        MouseButton::Left => "MouseLeft",
        MouseButton::Right => "MouseRight",
        MouseButton::Middle => "MouseMiddle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_symbol_letters_are_uppercased() {
        assert_eq!(key_symbol(KeyCode::Char('c')).as_deref(), Some("C"));
        assert_eq!(key_symbol(KeyCode::Char(' ')).as_deref(), Some("Space"));
        assert_eq!(key_symbol(KeyCode::F(5)).as_deref(), Some("F5"));
        assert_eq!(key_symbol(KeyCode::Null), None);
    }

    #[test]
    fn test_modifier_order_is_fixed() {
        let mods = KeyModifiers::SHIFT | KeyModifiers::CONTROL | KeyModifiers::ALT;
        assert_eq!(modifier_symbols(mods), vec![CTRL, ALT, SHIFT]);
        assert!(modifier_symbols(KeyModifiers::NONE).is_empty());
    }

    #[test]
    fn test_mouse_symbol() {
        assert_eq!(mouse_symbol(MouseButton::Left), "MouseLeft");
    }
}
