//! In-process broadcast channel connecting the surfaces.
//!
//! A `Bus` is a cheap cloneable handle; each surface gets its own clone at
//! construction. Payloads are serialized to JSON once per publish and every
//! subscriber gets its own copy, so surfaces never share state through the
//! bus. Subscriptions are two-phase: `open` registers and returns a handle,
//! `close` (or dropping the handle) deregisters synchronously. Nothing is
//! replayed to late subscribers.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use crate::topic::{Topic, TopicPayload};

#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to encode payload for `{topic}`")]
    Encode {
        topic: Topic,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode payload on `{topic}`")]
    Decode {
        topic: Topic,
        #[source]
        source: serde_json::Error,
    },
    #[error("envelope on `{actual}` cannot be read as `{expected}`")]
    TopicMismatch { expected: Topic, actual: Topic },
    #[error("broadcast registry lock poisoned")]
    Poisoned,
}

/// One delivered message.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub topic: Topic,
    pub payload: Value,
}

impl Envelope {
    pub fn decode<T: TopicPayload>(&self) -> Result<T, BusError> {
        if self.topic != T::TOPIC {
            return Err(BusError::TopicMismatch {
                expected: T::TOPIC,
                actual: self.topic,
            });
        }
        serde_json::from_value(self.payload.clone()).map_err(|source| BusError::Decode {
            topic: self.topic,
            source,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    inbox: Sender<Envelope>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

#[derive(Clone, Default)]
pub struct Bus {
    registry: Arc<Mutex<Registry>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire-and-forget publish. Returns how many subscribers received it;
    /// zero is not an error.
    pub fn publish<T: TopicPayload>(&self, payload: &T) -> Result<usize, BusError> {
        let value = serde_json::to_value(payload).map_err(|source| BusError::Encode {
            topic: T::TOPIC,
            source,
        })?;
        self.publish_value(T::TOPIC, value)
    }

    /// Publish an already-encoded payload. Subscribers decode it themselves,
    /// so a payload that does not match the topic's schema is delivered as-is.
    pub fn publish_value(&self, topic: Topic, payload: Value) -> Result<usize, BusError> {
        let mut registry = self.registry.lock().map_err(|_| BusError::Poisoned)?;
        let mut delivered = 0;
        registry.subscribers.retain(|sub| {
            if sub.topic != topic {
                return true;
            }
            let envelope = Envelope {
                topic,
                payload: payload.clone(),
            };
            if sub.inbox.send(envelope).is_ok() {
                delivered += 1;
                true
            } else {
                debug!(topic = %topic, id = sub.id.0, "pruning subscriber with dropped inbox");
                false
            }
        });
        trace!(topic = %topic, delivered, "published");
        Ok(delivered)
    }

    /// Register `inbox` for `topic`. Delivery starts once this returns;
    /// anything published earlier is not seen.
    pub fn open(
        &self,
        topic: Topic,
        inbox: Sender<Envelope>,
    ) -> Result<SubscriptionHandle, BusError> {
        let mut registry = self.registry.lock().map_err(|_| BusError::Poisoned)?;
        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;
        registry.subscribers.push(Subscriber { id, topic, inbox });
        debug!(topic = %topic, id = id.0, "subscription opened");
        Ok(SubscriptionHandle {
            id,
            topic,
            registry: Arc::downgrade(&self.registry),
            open: true,
        })
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        lock_or_recover(&self.registry)
            .subscribers
            .iter()
            .filter(|sub| sub.topic == topic)
            .count()
    }
}

fn lock_or_recover(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live registration on the bus. Closing is idempotent and also happens on
/// drop, including during unwinding.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    topic: Topic,
    registry: Weak<Mutex<Registry>>,
    open: bool,
}

impl SubscriptionHandle {
    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Deregister. Once this returns, no further envelope is sent to this
    /// subscription's inbox.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Some(registry) = self.registry.upgrade() {
            // A poisoned lock still has to let the deregistration through.
            lock_or_recover(&registry)
                .subscribers
                .retain(|sub| sub.id != self.id);
            debug!(topic = %self.topic, id = self.id.0, "subscription closed");
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// A surface's single inbox plus every subscription feeding it.
///
/// Opening a topic that is already open is a no-op, so repeated or late
/// mount calls never produce duplicate deliveries. After `close`, queued
/// envelopes are discarded and nothing is handed out again.
pub struct Mailbox {
    bus: Bus,
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    handles: Vec<SubscriptionHandle>,
    closed: bool,
}

impl Mailbox {
    pub fn new(bus: Bus) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            bus,
            tx,
            rx,
            handles: Vec::new(),
            closed: false,
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns `Ok(false)` when `topic` was already subscribed.
    pub fn subscribe(&mut self, topic: Topic) -> Result<bool, BusError> {
        if self.is_subscribed(topic) {
            return Ok(false);
        }
        let handle = self.bus.open(topic, self.tx.clone())?;
        self.handles.push(handle);
        self.closed = false;
        Ok(true)
    }

    pub fn is_subscribed(&self, topic: Topic) -> bool {
        self.handles.iter().any(|h| h.is_open() && h.topic() == topic)
    }

    pub fn subscription_count(&self) -> usize {
        self.handles.iter().filter(|h| h.is_open()).count()
    }

    pub fn try_next(&self) -> Option<Envelope> {
        if self.closed {
            return None;
        }
        match self.rx.try_recv() {
            Ok(envelope) => Some(envelope),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<Envelope> {
        if self.closed {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(envelope) => Some(envelope),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Deregister every subscription, then drop whatever was already queued.
    pub fn close(&mut self) {
        for handle in &mut self.handles {
            handle.close();
        }
        self.handles.clear();
        while self.rx.try_recv().is_ok() {}
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Mailbox {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{KeyGroup, KeystrokeFrame};
    use crate::params::{BehaviorParameters, TypographyParameters};

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = Bus::new();
        assert_eq!(bus.publish(&BehaviorParameters::default()).unwrap(), 0);
    }

    #[test]
    fn test_delivery_only_to_matching_topic() {
        let bus = Bus::new();
        let mut typography = Mailbox::new(bus.clone());
        typography.subscribe(Topic::TypographyChanged).unwrap();
        let mut keys = Mailbox::new(bus.clone());
        keys.subscribe(Topic::KeyEvent).unwrap();

        assert_eq!(bus.publish(&TypographyParameters::default()).unwrap(), 1);
        assert!(keys.try_next().is_none());
        let env = typography.try_next().unwrap();
        assert_eq!(env.decode::<TypographyParameters>().unwrap(), TypographyParameters::default());
    }

    #[test]
    fn test_per_topic_order_preserved() {
        let bus = Bus::new();
        let mut mailbox = Mailbox::new(bus.clone());
        mailbox.subscribe(Topic::KeyEvent).unwrap();
        for i in 0..5 {
            let frame: KeystrokeFrame =
                std::iter::repeat_n(KeyGroup::new(["a"]), i).collect();
            bus.publish(&frame).unwrap();
        }
        for i in 0..5 {
            let frame: KeystrokeFrame = mailbox.try_next().unwrap().decode().unwrap();
            assert_eq!(frame.group_count(), i);
        }
    }

    #[test]
    fn test_late_subscriber_gets_no_history() {
        let bus = Bus::new();
        bus.publish(&BehaviorParameters::default()).unwrap();
        let mut mailbox = Mailbox::new(bus.clone());
        mailbox.subscribe(Topic::BehaviorChanged).unwrap();
        assert!(mailbox.try_next().is_none());
    }

    #[test]
    fn test_duplicate_subscribe_is_idempotent() {
        let bus = Bus::new();
        let mut mailbox = Mailbox::new(bus.clone());
        assert!(mailbox.subscribe(Topic::KeyEvent).unwrap());
        assert!(!mailbox.subscribe(Topic::KeyEvent).unwrap());
        assert_eq!(bus.subscriber_count(Topic::KeyEvent), 1);
        assert_eq!(bus.publish(&KeystrokeFrame::empty()).unwrap(), 1);
    }

    #[test]
    fn test_close_is_idempotent_and_stops_delivery() {
        let bus = Bus::new();
        let (tx, rx) = mpsc::channel();
        let mut handle = bus.open(Topic::KeyEvent, tx).unwrap();
        handle.close();
        handle.close();
        assert!(!handle.is_open());
        assert_eq!(bus.subscriber_count(Topic::KeyEvent), 0);
        assert_eq!(bus.publish(&KeystrokeFrame::empty()).unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_handle_deregisters() {
        let bus = Bus::new();
        let (tx, _rx) = mpsc::channel();
        {
            let _handle = bus.open(Topic::TypographyChanged, tx).unwrap();
            assert_eq!(bus.subscriber_count(Topic::TypographyChanged), 1);
        }
        assert_eq!(bus.subscriber_count(Topic::TypographyChanged), 0);
    }

    #[test]
    fn test_dead_inbox_is_pruned() {
        let bus = Bus::new();
        let (tx, rx) = mpsc::channel();
        let handle = bus.open(Topic::KeyEvent, tx).unwrap();
        drop(rx);
        assert_eq!(bus.publish(&KeystrokeFrame::empty()).unwrap(), 0);
        assert_eq!(bus.subscriber_count(Topic::KeyEvent), 0);
        drop(handle);
    }

    #[test]
    fn test_mailbox_close_discards_queued() {
        let bus = Bus::new();
        let mut mailbox = Mailbox::new(bus.clone());
        mailbox.subscribe(Topic::KeyEvent).unwrap();
        bus.publish(&KeystrokeFrame::empty()).unwrap();
        mailbox.close();
        assert!(mailbox.try_next().is_none());
        assert_eq!(mailbox.subscription_count(), 0);
        assert_eq!(bus.subscriber_count(Topic::KeyEvent), 0);
    }

    #[test]
    fn test_decode_rejects_wrong_topic() {
        let env = Envelope {
            topic: Topic::KeyEvent,
            payload: serde_json::json!([]),
        };
        assert!(matches!(
            env.decode::<TypographyParameters>(),
            Err(BusError::TopicMismatch { .. })
        ));
    }
}
