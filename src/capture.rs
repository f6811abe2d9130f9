//! Terminal keystroke source.
//!
//! Turns crossterm key and mouse events into key-groups, keeps the current
//! frame, and publishes the whole frame on `keyevent` whenever it changes.
//! It is the one reader of the behavior group: timeout, mouse visibility and
//! modifier visibility all come from the latest delivered broadcast.

use std::time::{Duration, Instant};

use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::bus::{Bus, BusError, Mailbox};
use crate::keyboard::display::{self, ALT, CTRL, SHIFT};
use crate::keyboard::{KeyGroup, KeystrokeFrame};
use crate::params::BehaviorParameters;
use crate::topic::Topic;

pub struct KeyCapture {
    mailbox: Mailbox,
    behavior: BehaviorParameters,
    frame: KeystrokeFrame,
    last_input: Option<Instant>,
}

impl KeyCapture {
    pub fn new(bus: Bus) -> Self {
        Self {
            mailbox: Mailbox::new(bus),
            behavior: BehaviorParameters::default(),
            frame: KeystrokeFrame::empty(),
            last_input: None,
        }
    }

    pub fn start(&mut self) -> Result<(), BusError> {
        self.mailbox.subscribe(Topic::BehaviorChanged)?;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.mailbox.close();
    }

    pub fn behavior(&self) -> &BehaviorParameters {
        &self.behavior
    }

    pub fn frame(&self) -> &KeystrokeFrame {
        &self.frame
    }

    /// Apply any behavior broadcasts that arrived since the last call.
    pub fn sync(&mut self) {
        while let Some(envelope) = self.mailbox.try_next() {
            match envelope.decode::<BehaviorParameters>() {
                Ok(behavior) => {
                    debug!(timeout_ms = behavior.timeout_ms, "capture behavior updated");
                    self.behavior = behavior;
                }
                Err(err) => warn!(error = %err, "dropping malformed behavior message"),
            }
        }
    }

    /// Key press to key-group. Releases, repeats and bare modifiers are
    /// ignored. Returns whether a frame was published.
    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let Some(symbol) = display::key_symbol(key.code) else {
            return false;
        };
        let mut group: Vec<String> = Vec::with_capacity(4);
        if self.behavior.modifier_visible {
            group.extend(display::modifier_symbols(key.modifiers).into_iter().map(String::from));
        }
        group.push(symbol);
        self.push(KeyGroup(group), now)
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent, now: Instant) -> bool {
        if !self.behavior.mouse_visible {
            return false;
        }
        let MouseEventKind::Down(button) = mouse.kind else {
            return false;
        };
        let mut group: Vec<String> = Vec::with_capacity(2);
        if self.behavior.modifier_visible {
            group.extend(display::modifier_symbols(mouse.modifiers).into_iter().map(String::from));
        }
        group.push(display::mouse_symbol(button).to_string());
        self.push(KeyGroup(group), now)
    }

    /// Push a ready-made group, as produced by [`DemoSource`].
    pub fn on_group(&mut self, group: KeyGroup, now: Instant) -> bool {
        if group.is_empty() {
            return false;
        }
        self.push(group, now)
    }

    /// Clear the frame once input has been idle for the configured timeout.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_input else {
            return false;
        };
        let timeout = Duration::from_millis(u64::from(self.behavior.timeout_ms));
        if self.frame.is_empty() || now.saturating_duration_since(last) <= timeout {
            return false;
        }
        self.frame = KeystrokeFrame::empty();
        self.last_input = None;
        self.publish();
        true
    }

    fn push(&mut self, group: KeyGroup, now: Instant) -> bool {
        self.frame.push(group);
        self.last_input = Some(now);
        self.publish();
        true
    }

    fn publish(&self) {
        if let Err(err) = self.mailbox.bus().publish(&self.frame) {
            warn!(error = %err, "keyevent publish failed");
        }
    }
}

const DEMO_KEYS: &[&str] = &[
    "A", "S", "D", "F", "J", "K", "L", "Enter", "Space", "Tab", "Esc", "Bksp", "Z", "X", "C", "V",
];
const DEMO_MODIFIERS: &[&str] = &[CTRL, ALT, SHIFT];

/// Synthetic key-groups for `--demo`, with the occasional chord.
pub struct DemoSource {
    rng: SmallRng,
}

impl DemoSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn next_group(&mut self) -> KeyGroup {
        let mut group = Vec::with_capacity(3);
        if self.rng.gen_bool(0.3) {
            let count = self.rng.gen_range(1..=2);
            let mut mods: Vec<&str> = DEMO_MODIFIERS
                .choose_multiple(&mut self.rng, count)
                .copied()
                .collect();
            mods.sort_by_key(|m| DEMO_MODIFIERS.iter().position(|x| x == m));
            group.extend(mods.into_iter().map(String::from));
        }
        let key = DEMO_KEYS.choose(&mut self.rng).copied().unwrap_or("A");
        group.push(key.to_string());
        KeyGroup(group)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers, MouseButton};

    use super::*;
    use crate::params::BehaviorDelta;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn click() -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn started(bus: &Bus) -> KeyCapture {
        let mut capture = KeyCapture::new(bus.clone());
        capture.start().unwrap();
        capture
    }

    #[test]
    fn test_modifiers_hidden_by_default() {
        let bus = Bus::new();
        let mut capture = started(&bus);
        capture.on_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert_eq!(capture.frame().groups(), &[KeyGroup::new(["C"])]);
    }

    #[test]
    fn test_modifiers_shown_after_behavior_broadcast() {
        let bus = Bus::new();
        let mut capture = started(&bus);
        bus.publish(&BehaviorParameters::default().apply(BehaviorDelta::ModifierVisible(true)))
            .unwrap();
        capture.sync();
        capture.on_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert_eq!(capture.frame().groups(), &[KeyGroup::new(["Ctrl", "C"])]);
    }

    #[test]
    fn test_every_change_publishes_full_frame() {
        let bus = Bus::new();
        let mut sink = Mailbox::new(bus.clone());
        sink.subscribe(Topic::KeyEvent).unwrap();
        let mut capture = started(&bus);
        let now = Instant::now();
        capture.on_key(press(KeyCode::Char('a'), KeyModifiers::NONE), now);
        capture.on_key(press(KeyCode::Enter, KeyModifiers::NONE), now);
        let first: KeystrokeFrame = sink.try_next().unwrap().decode().unwrap();
        let second: KeystrokeFrame = sink.try_next().unwrap().decode().unwrap();
        assert_eq!(first.group_count(), 1);
        assert_eq!(second, [KeyGroup::new(["A"]), KeyGroup::new(["Enter"])].into_iter().collect());
    }

    #[test]
    fn test_timeout_clears_frame() {
        let bus = Bus::new();
        let mut capture = started(&bus);
        let t0 = Instant::now();
        capture.on_key(press(KeyCode::Char('a'), KeyModifiers::NONE), t0);
        assert!(!capture.tick(t0 + Duration::from_millis(400)));
        assert!(capture.tick(t0 + Duration::from_millis(600)));
        assert!(capture.frame().is_empty());
        assert!(!capture.tick(t0 + Duration::from_millis(1200)));
    }

    #[test]
    fn test_mouse_requires_visibility() {
        let bus = Bus::new();
        let mut capture = started(&bus);
        assert!(!capture.on_mouse(click(), Instant::now()));
        bus.publish(&BehaviorParameters::default().apply(BehaviorDelta::MouseVisible(true)))
            .unwrap();
        capture.sync();
        assert!(capture.on_mouse(click(), Instant::now()));
        assert_eq!(capture.frame().groups(), &[KeyGroup::new(["MouseLeft"])]);
    }

    #[test]
    fn test_release_and_bare_modifier_ignored() {
        let bus = Bus::new();
        let mut capture = started(&bus);
        let mut release = press(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!capture.on_key(release, Instant::now()));
        assert!(!capture.on_key(press(KeyCode::Null, KeyModifiers::NONE), Instant::now()));
        assert!(capture.frame().is_empty());
    }

    #[test]
    fn test_demo_source_is_deterministic_with_seed() {
        let mut a = DemoSource::new(Some(7));
        let mut b = DemoSource::new(Some(7));
        for _ in 0..10 {
            let group = a.next_group();
            assert_eq!(group, b.next_group());
            assert!(!group.is_empty());
        }
    }
}
