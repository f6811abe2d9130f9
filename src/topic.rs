use std::fmt;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::keyboard::KeystrokeFrame;
use crate::params::{BehaviorParameters, TypographyParameters, WindowAppearanceParameters};

/// Named channels on the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    BehaviorChanged,
    TypographyChanged,
    WindowAppearanceChanged,
    KeyEvent,
    SnapshotRequested,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::BehaviorChanged => "behavior-changed",
            Topic::TypographyChanged => "typography-changed",
            Topic::WindowAppearanceChanged => "window-appearance-changed",
            Topic::KeyEvent => "keyevent",
            Topic::SnapshotRequested => "snapshot-requested",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload type that always travels on one topic.
pub trait TopicPayload: Serialize + DeserializeOwned {
    const TOPIC: Topic;
}

impl TopicPayload for BehaviorParameters {
    const TOPIC: Topic = Topic::BehaviorChanged;
}

impl TopicPayload for TypographyParameters {
    const TOPIC: Topic = Topic::TypographyChanged;
}

impl TopicPayload for WindowAppearanceParameters {
    const TOPIC: Topic = Topic::WindowAppearanceChanged;
}

impl TopicPayload for KeystrokeFrame {
    const TOPIC: Topic = Topic::KeyEvent;
}

/// Sent by a surface that just mounted and wants the current parameter
/// groups instead of waiting for the next edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub from: String,
}

impl TopicPayload for SnapshotRequest {
    const TOPIC: Topic = Topic::SnapshotRequested;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_names() {
        assert_eq!(Topic::BehaviorChanged.as_str(), "behavior-changed");
        assert_eq!(Topic::TypographyChanged.as_str(), "typography-changed");
        assert_eq!(Topic::WindowAppearanceChanged.as_str(), "window-appearance-changed");
        assert_eq!(Topic::KeyEvent.to_string(), "keyevent");
    }

    #[test]
    fn test_payload_topic_binding() {
        assert_eq!(<TypographyParameters as TopicPayload>::TOPIC, Topic::TypographyChanged);
        assert_eq!(<KeystrokeFrame as TopicPayload>::TOPIC, Topic::KeyEvent);
    }
}
