//! The keystroke overlay surface.
//!
//! Holds no authoritative settings: its state is a projection built from
//! whatever the bus has delivered, starting from the same defaults the
//! settings surface starts from. Every delivery replaces one piece of that
//! projection wholesale. A pump drains the whole inbox and renders once;
//! of several queued keystroke frames only the newest is shown, and only it
//! resizes the host window.

pub mod layout;
pub mod render;
pub mod widget;

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, trace, warn};

use crate::bus::{Bus, BusError, Envelope, Mailbox};
use crate::host::WindowHost;
use crate::keyboard::KeystrokeFrame;
use crate::params::{TypographyParameters, WindowAppearanceParameters};
use crate::topic::{SnapshotRequest, Topic};

use layout::{LayoutStrategy, WindowSize};
use render::{OverlayState, OverlayView};

/// Three parameter groups plus the keystroke stream.
pub const OVERLAY_TOPICS: [Topic; 4] = [
    Topic::BehaviorChanged,
    Topic::TypographyChanged,
    Topic::WindowAppearanceChanged,
    Topic::KeyEvent,
];

enum Delivery {
    Parameters,
    Frame(KeystrokeFrame),
    Skipped,
    Rejected,
}

pub struct OverlaySurface<H: WindowHost> {
    label: String,
    mailbox: Mailbox,
    host: H,
    layout: LayoutStrategy,
    state: OverlayState,
    renders: u64,
}

impl<H: WindowHost> OverlaySurface<H> {
    pub fn new(label: impl Into<String>, bus: Bus, host: H, layout: LayoutStrategy) -> Self {
        Self {
            label: label.into(),
            mailbox: Mailbox::new(bus),
            host,
            layout,
            state: OverlayState::default(),
            renders: 0,
        }
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn is_mounted(&self) -> bool {
        self.mailbox.subscription_count() == OVERLAY_TOPICS.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.mailbox.subscription_count()
    }

    /// Open all subscriptions, ask the settings surface for its current
    /// groups, and draw the defaults. Safe to call again: topics that are
    /// already open are skipped and no second snapshot request goes out.
    pub fn mount(&mut self) -> Result<(), BusError> {
        let mut opened = 0;
        for topic in OVERLAY_TOPICS {
            if self.mailbox.subscribe(topic)? {
                opened += 1;
            }
        }
        if opened == 0 {
            trace!(surface = %self.label, "mount: already mounted");
            return Ok(());
        }
        info!(surface = %self.label, layout = self.layout.name(), "overlay mounted");

        let request = SnapshotRequest {
            from: self.label.clone(),
        };
        if let Err(err) = self.mailbox.bus().publish(&request) {
            warn!(surface = %self.label, error = %err, "snapshot request failed, keeping defaults");
        }

        self.host
            .request_resize(WindowSize::for_frame(&self.state.frame));
        self.render();
        Ok(())
    }

    /// Deregister everything. After this returns no handler of this surface
    /// runs again, even for envelopes that were already queued.
    pub fn unmount(&mut self) {
        if self.mailbox.is_closed() {
            return;
        }
        self.mailbox.close();
        info!(surface = %self.label, "overlay unmounted");
    }

    /// Apply one delivery and render it. Returns whether it was understood.
    pub fn handle(&mut self, envelope: &Envelope) -> bool {
        match self.absorb(envelope) {
            Delivery::Parameters => {
                self.render();
                true
            }
            Delivery::Frame(frame) => {
                self.show_frame(frame);
                true
            }
            Delivery::Skipped => true,
            Delivery::Rejected => false,
        }
    }

    /// Fold one delivery into the projection without drawing. Parameter
    /// groups are applied immediately; a keystroke frame is decoded and
    /// handed back so the caller can drop it if a newer one is queued.
    fn absorb(&mut self, envelope: &Envelope) -> Delivery {
        match envelope.topic {
            Topic::TypographyChanged => match envelope.decode::<TypographyParameters>() {
                Ok(typography) => {
                    self.state.typography = typography;
                    Delivery::Parameters
                }
                Err(err) => self.reject(&err),
            },
            Topic::WindowAppearanceChanged => {
                match envelope.decode::<WindowAppearanceParameters>() {
                    Ok(appearance) => {
                        self.state.appearance = appearance;
                        Delivery::Parameters
                    }
                    Err(err) => self.reject(&err),
                }
            }
            Topic::KeyEvent => match envelope.decode::<KeystrokeFrame>() {
                Ok(frame) => Delivery::Frame(frame),
                Err(err) => self.reject(&err),
            },
            // the capture source reads behavior; we only hold the subscription
            Topic::BehaviorChanged => {
                trace!(surface = %self.label, "behavior update ignored");
                Delivery::Skipped
            }
            Topic::SnapshotRequested => Delivery::Rejected,
        }
    }

    fn reject(&self, err: &BusError) -> Delivery {
        warn!(surface = %self.label, error = %err, "dropping malformed message");
        Delivery::Rejected
    }

    fn show_frame(&mut self, frame: KeystrokeFrame) {
        let size = WindowSize::for_frame(&frame);
        self.state.frame = frame;
        self.host.request_resize(size);
        self.render();
    }

    /// Drain everything currently queued and draw once. Only the newest
    /// keystroke frame is shown; older queued frames are dropped unseen.
    /// Returns how many deliveries were consumed.
    pub fn pump(&mut self) -> usize {
        let first = self.mailbox.try_next();
        self.drain(first)
    }

    /// Wait up to `timeout` for a delivery, then drain the rest like
    /// [`pump`](Self::pump).
    pub fn pump_timeout(&mut self, timeout: Duration) -> bool {
        match self.mailbox.next_timeout(timeout) {
            Some(envelope) => {
                self.drain(Some(envelope));
                true
            }
            None => false,
        }
    }

    fn drain(&mut self, first: Option<Envelope>) -> usize {
        let mut consumed = 0;
        let mut redraw = false;
        let mut latest: Option<KeystrokeFrame> = None;
        let mut next = first;
        while let Some(envelope) = next {
            consumed += 1;
            match self.absorb(&envelope) {
                Delivery::Parameters => redraw = true,
                Delivery::Frame(frame) => {
                    if latest.replace(frame).is_some() {
                        trace!(surface = %self.label, "stale keystroke frame superseded");
                    }
                }
                Delivery::Skipped | Delivery::Rejected => {}
            }
            next = self.mailbox.try_next();
        }
        match latest {
            Some(frame) => self.show_frame(frame),
            None if redraw => self.render(),
            None => {}
        }
        consumed
    }

    pub fn view(&self) -> OverlayView {
        render::render(&self.state, self.layout)
    }

    fn render(&mut self) {
        let view = self.view();
        self.host.present(&view);
        self.renders += 1;
    }
}

impl<H: WindowHost> Drop for OverlaySurface<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// An overlay running on its own thread with its own loop.
pub struct OverlayThread {
    stop: Sender<()>,
    join: JoinHandle<()>,
}

impl OverlayThread {
    pub fn spawn<H>(bus: Bus, host: H, layout: LayoutStrategy, tick: Duration) -> Result<Self>
    where
        H: WindowHost + 'static,
    {
        let (stop, stop_rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name("overlay".to_string())
            .spawn(move || run_overlay(bus, host, layout, tick, &stop_rx))?;
        Ok(Self { stop, join })
    }

    /// Stop the loop and wait for the surface to unmount.
    pub fn shutdown(self) -> Result<()> {
        let _ = self.stop.send(());
        self.join
            .join()
            .map_err(|_| anyhow!("overlay thread panicked"))
    }
}

fn run_overlay<H: WindowHost>(
    bus: Bus,
    host: H,
    layout: LayoutStrategy,
    tick: Duration,
    stop: &Receiver<()>,
) {
    let mut surface = OverlaySurface::new("overlay", bus, host, layout);
    if let Err(err) = surface.mount() {
        warn!(error = %err, "overlay subscriptions unavailable, rendering defaults");
    }
    loop {
        match stop.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }
        surface.pump_timeout(tick);
    }
    surface.unmount();
    debug!("overlay loop exited");
}
