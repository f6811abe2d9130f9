use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use tracing::{info, warn};

use crate::bus::Bus;
use crate::capture::{DemoSource, KeyCapture};
use crate::event::AppEvent;
use crate::host::TerminalHost;
use crate::settings::SettingsSurface;
use crate::settings::bindings::{FormOutcome, SettingsForm};
use crate::ui::theme::Theme;

const DEMO_INTERVAL: Duration = Duration::from_millis(350);

/// Everything that runs on the terminal thread: the settings surface, the
/// capture source feeding the overlay, and the host panel the overlay
/// draws into.
pub struct App {
    pub bus: Bus,
    pub settings: SettingsSurface,
    pub form: SettingsForm,
    pub capture: KeyCapture,
    pub host: TerminalHost,
    pub theme: Theme,
    pub should_quit: bool,
    demo: Option<DemoSource>,
    last_demo: Option<Instant>,
}

impl App {
    pub fn new(bus: Bus, host: TerminalHost, theme: Theme, demo: Option<DemoSource>) -> Self {
        Self {
            settings: SettingsSurface::new(bus.clone()),
            capture: KeyCapture::new(bus.clone()),
            bus,
            form: SettingsForm::default(),
            host,
            theme,
            should_quit: false,
            demo,
            last_demo: None,
        }
    }

    /// Subscribe the settings surface and the capture source, then publish
    /// the starting groups so every listener agrees with the form.
    pub fn start(&mut self) {
        if let Err(err) = self.settings.start() {
            warn!(error = %err, "settings surface cannot answer snapshot requests");
        }
        if let Err(err) = self.capture.start() {
            warn!(error = %err, "capture source will keep default behavior");
        }
        self.settings.rebroadcast_all();
        self.capture.sync();
        info!(demo = self.demo.is_some(), "app started");
    }

    pub fn stop(&mut self) {
        self.capture.stop();
        self.settings.stop();
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) {
        match event {
            AppEvent::Key(key) => self.handle_key(key, now),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse, now),
            AppEvent::Tick => {}
            AppEvent::Resize(_, _) => {}
        }
        self.settle(now);
    }

    /// Per-iteration housekeeping: answer snapshot requests, pick up
    /// behavior changes, expire the keystroke frame, feed the demo.
    pub fn settle(&mut self, now: Instant) {
        self.settings.pump();
        self.capture.sync();
        self.capture.tick(now);
        self.feed_demo(now);
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind == KeyEventKind::Press
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && key.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        if self.demo.is_none() {
            self.capture.on_key(key, now);
        }

        let outcome = self.form.handle_key(&mut self.settings, key);
        // behavior edits apply to the very next keystroke
        self.capture.sync();

        if outcome == FormOutcome::Ignored
            && key.kind == KeyEventKind::Press
            && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        {
            self.should_quit = true;
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        if self.demo.is_none() {
            self.capture.on_mouse(mouse, now);
        }
    }

    fn feed_demo(&mut self, now: Instant) {
        let Some(demo) = self.demo.as_mut() else {
            return;
        };
        let due = self
            .last_demo
            .is_none_or(|last| now.saturating_duration_since(last) >= DEMO_INTERVAL);
        if !due {
            return;
        }
        self.last_demo = Some(now);
        let group = demo.next_group();
        self.capture.on_group(group, now);
    }
}
