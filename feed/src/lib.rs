use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Alarm severity reported by a channel alongside its properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    None,
    Minor,
    Major,
    Invalid,
}

/// Control-system metadata for one channel.
///
/// A `Properties` event carries the full record; consumers diff it against
/// their last-known copy and react only to the fields that changed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelProperties {
    pub lower_alarm_limit: f64,
    pub upper_alarm_limit: f64,
    pub lower_warning_limit: f64,
    pub upper_warning_limit: f64,
    pub lower_display_limit: f64,
    pub upper_display_limit: f64,
    pub precision: i32,
    pub units: String,
    pub severity: Severity,
}

/// Which property fields differ between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyDelta {
    pub alarm_limits: bool,
    pub warning_limits: bool,
    pub display_limits: bool,
    pub precision: bool,
    pub units: bool,
    pub severity: bool,
}

impl PropertyDelta {
    pub fn any(&self) -> bool {
        self.alarm_limits
            || self.warning_limits
            || self.display_limits
            || self.precision
            || self.units
            || self.severity
    }
}

impl ChannelProperties {
    /// Field-by-field comparison against a previous snapshot.
    ///
    /// A limit pair counts as changed when either bound differs. NaN bounds
    /// always compare unequal, so a channel stuck on NaN keeps reporting a
    /// change; consumers clamp such values before use.
    pub fn diff(&self, old: &ChannelProperties) -> PropertyDelta {
        PropertyDelta {
            alarm_limits: self.lower_alarm_limit != old.lower_alarm_limit
                || self.upper_alarm_limit != old.upper_alarm_limit,
            warning_limits: self.lower_warning_limit != old.lower_warning_limit
                || self.upper_warning_limit != old.upper_warning_limit,
            display_limits: self.lower_display_limit != old.lower_display_limit
                || self.upper_display_limit != old.upper_display_limit,
            precision: self.precision != old.precision,
            units: self.units != old.units,
            severity: self.severity != old.severity,
        }
    }
}

/// One asynchronous update for a named channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Connected,
    Disconnected,
    /// A new sample: absolute feed time and value.
    Value { t: f64, y: f64 },
    Properties(ChannelProperties),
}

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("channel '{0}' already has a subscriber")]
    AlreadySubscribed(String),
}

type TopicMap = HashMap<String, Sender<ChannelEvent>>;

/// Push-source of channel events. One subscriber per channel; dropping the
/// subscription releases the channel again.
pub trait Feed: Send + Sync {
    fn subscribe(&self, channel: &str) -> Result<Subscription, FeedError>;
}

/// Receiving end of one channel subscription.
pub struct Subscription {
    channel: String,
    receiver: Receiver<ChannelEvent>,
    topics: Arc<Mutex<TopicMap>>,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next pending event, if any. Never blocks; the consumer drains this
    /// from its own update pass.
    pub fn try_recv(&self) -> Option<ChannelEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.topics.lock().unwrap().remove(&self.channel);
    }
}

/// In-process feed: publisher and subscribers share an mpsc queue per
/// channel, so event application can be deferred to the consumer's own
/// update pass.
#[derive(Default)]
pub struct InProcessFeed {
    topics: Arc<Mutex<TopicMap>>,
}

impl InProcessFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publisher(&self) -> FeedPublisher {
        FeedPublisher {
            topics: Arc::clone(&self.topics),
        }
    }
}

impl Feed for InProcessFeed {
    fn subscribe(&self, channel: &str) -> Result<Subscription, FeedError> {
        let mut topics = self.topics.lock().unwrap();
        if topics.contains_key(channel) {
            return Err(FeedError::AlreadySubscribed(channel.to_string()));
        }
        let (sender, receiver) = mpsc::channel();
        topics.insert(channel.to_string(), sender);
        Ok(Subscription {
            channel: channel.to_string(),
            receiver,
            topics: Arc::clone(&self.topics),
        })
    }
}

/// Producing side of an [`InProcessFeed`].
#[derive(Clone)]
pub struct FeedPublisher {
    topics: Arc<Mutex<TopicMap>>,
}

impl FeedPublisher {
    /// Deliver an event to the channel's subscriber. Returns `false` when
    /// nobody is listening; the event is discarded.
    pub fn publish(&self, channel: &str, event: ChannelEvent) -> bool {
        let mut topics = self.topics.lock().unwrap();
        match topics.get(channel) {
            Some(sender) => {
                if sender.send(event).is_err() {
                    // Receiver went away without removing itself; forget it.
                    log::debug!("dropping dead subscription for '{channel}'");
                    topics.remove(channel);
                    false
                } else {
                    true
                }
            }
            None => false,
        }
    }

    /// Channels that currently have a subscriber.
    pub fn subscribed_channels(&self) -> Vec<String> {
        self.topics.lock().unwrap().keys().cloned().collect()
    }
}
