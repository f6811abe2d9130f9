//! The settings surface: sole owner and writer of the three parameter
//! groups. Every edit updates local state first, then broadcasts the whole
//! group. Nobody acknowledges, and zero listeners is a normal situation.

pub mod bindings;

use tracing::{debug, info, warn};

use crate::bus::{Bus, BusError, Mailbox};
use crate::params::{
    BehaviorDelta, BehaviorParameters, TypographyDelta, TypographyParameters,
    WindowAppearanceDelta, WindowAppearanceParameters,
};
use crate::topic::{SnapshotRequest, Topic, TopicPayload};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsState {
    pub behavior: BehaviorParameters,
    pub typography: TypographyParameters,
    pub appearance: WindowAppearanceParameters,
}

pub struct SettingsSurface {
    mailbox: Mailbox,
    state: SettingsState,
}

impl SettingsSurface {
    pub fn new(bus: Bus) -> Self {
        Self {
            mailbox: Mailbox::new(bus),
            state: SettingsState::default(),
        }
    }

    /// Start answering snapshot requests from newly mounted surfaces.
    pub fn start(&mut self) -> Result<(), BusError> {
        self.mailbox.subscribe(Topic::SnapshotRequested)?;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.mailbox.close();
    }

    pub fn state(&self) -> &SettingsState {
        &self.state
    }

    pub fn update_behavior(&mut self, delta: BehaviorDelta) -> BehaviorParameters {
        let next = self.state.behavior.apply(delta);
        self.state.behavior = next;
        self.broadcast(&next);
        next
    }

    pub fn update_typography(&mut self, delta: TypographyDelta) -> TypographyParameters {
        let next = self.state.typography.apply(delta);
        self.state.typography = next;
        self.broadcast(&next);
        next
    }

    pub fn update_window_appearance(
        &mut self,
        delta: WindowAppearanceDelta,
    ) -> WindowAppearanceParameters {
        let next = self.state.appearance.apply(delta);
        self.state.appearance = next;
        self.broadcast(&next);
        next
    }

    /// Send every group as it stands now.
    pub fn rebroadcast_all(&self) {
        self.broadcast(&self.state.behavior);
        self.broadcast(&self.state.typography);
        self.broadcast(&self.state.appearance);
    }

    /// Answer pending snapshot requests. Several requests queued together
    /// get a single rebroadcast.
    pub fn pump(&mut self) -> usize {
        let mut requests = 0;
        while let Some(envelope) = self.mailbox.try_next() {
            match envelope.decode::<SnapshotRequest>() {
                Ok(request) => {
                    debug!(from = %request.from, "snapshot requested");
                    requests += 1;
                }
                Err(err) => warn!(error = %err, "dropping malformed snapshot request"),
            }
        }
        if requests > 0 {
            info!(requests, "rebroadcasting current settings");
            self.rebroadcast_all();
        }
        requests
    }

    fn broadcast<T: TopicPayload>(&self, payload: &T) {
        match self.mailbox.bus().publish(payload) {
            Ok(delivered) => debug!(topic = %T::TOPIC, delivered, "broadcast"),
            Err(err) => warn!(topic = %T::TOPIC, error = %err, "broadcast failed"),
        }
    }
}
