//! Signaling relay.
//!
//! A per-meeting publish/subscribe topic. Each connected client owns one
//! channel, identified by a [`ChannelId`] and backed by a bounded mpsc
//! queue that its connection task drains. Publishing fans a message out to
//! every other channel of the same meeting with one non-blocking
//! `try_send` per subscriber, so a slow or closing subscriber only loses its
//! own copy.
//!
//! A channel belongs to at most one meeting at a time. Channels opened
//! through [`SignalingRelay::open`] are released by the returned
//! [`Subscription`] guard when it is dropped, whatever ends the connection.

use crate::observability::metrics;
use common::types::ChannelId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Opaque signaling payload, shared between all recipients of one publish.
///
/// Holds the frame text exactly as the sender wrote it.
pub type Envelope = Arc<str>;

#[derive(Debug, Default)]
struct Topics {
    /// Meeting id -> subscribed channels.
    by_meeting: HashMap<String, HashMap<ChannelId, mpsc::Sender<Envelope>>>,
    /// Channel -> the meeting it is subscribed to.
    meeting_of: HashMap<ChannelId, String>,
}

impl Topics {
    fn remove(&mut self, meeting_id: &str, channel: ChannelId) -> bool {
        if self.meeting_of.get(&channel).map(String::as_str) != Some(meeting_id) {
            return false;
        }
        self.meeting_of.remove(&channel);

        let Some(subscribers) = self.by_meeting.get_mut(meeting_id) else {
            return false;
        };
        let removed = subscribers.remove(&channel).is_some();
        if subscribers.is_empty() {
            self.by_meeting.remove(meeting_id);
        }
        removed
    }
}

/// Fan-out of signaling messages between the channels of each meeting.
#[derive(Debug)]
pub struct SignalingRelay {
    topics: RwLock<Topics>,
    buffer: usize,
}

impl SignalingRelay {
    /// Create a relay whose channels queue up to `buffer` undelivered
    /// messages each.
    pub fn new(buffer: usize) -> Self {
        Self {
            topics: RwLock::new(Topics::default()),
            buffer: buffer.max(1),
        }
    }

    /// Register `sender` as the outbound queue of `channel` in `meeting_id`.
    ///
    /// A channel already subscribed to another meeting is first removed
    /// from it.
    pub fn subscribe(&self, meeting_id: &str, channel: ChannelId, sender: mpsc::Sender<Envelope>) {
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = topics.meeting_of.get(&channel).cloned() {
            if previous != meeting_id {
                warn!(
                    target: "meet.relay",
                    channel_id = %channel,
                    previous_meeting = %previous,
                    meeting_id = %meeting_id,
                    "Channel moved between meetings; removing prior subscription"
                );
            }
            topics.remove(&previous, channel);
        }

        topics
            .by_meeting
            .entry(meeting_id.to_string())
            .or_default()
            .insert(channel, sender);
        topics.meeting_of.insert(channel, meeting_id.to_string());

        debug!(target: "meet.relay", meeting_id = %meeting_id, channel_id = %channel, "Channel subscribed");
    }

    /// Remove `channel` from `meeting_id`. No-op if it is not subscribed
    /// there.
    pub fn unsubscribe(&self, meeting_id: &str, channel: ChannelId) {
        let removed = self
            .topics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(meeting_id, channel);

        if removed {
            debug!(target: "meet.relay", meeting_id = %meeting_id, channel_id = %channel, "Channel unsubscribed");
        }
    }

    /// Deliver `message` to every channel of `meeting_id` except `sender`.
    ///
    /// Never fails. Subscribers whose queue is full or closed are skipped.
    /// Returns the number of channels the message was queued for.
    pub fn publish(&self, meeting_id: &str, sender: ChannelId, message: Envelope) -> usize {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = topics.by_meeting.get(meeting_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (channel, queue) in subscribers.iter().filter(|(id, _)| **id != sender) {
            match queue.try_send(Arc::clone(&message)) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        target: "meet.relay",
                        meeting_id = %meeting_id,
                        channel_id = %channel,
                        "Subscriber queue full, dropping message"
                    );
                    metrics::record_delivery_dropped("full");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(
                        target: "meet.relay",
                        meeting_id = %meeting_id,
                        channel_id = %channel,
                        "Subscriber closing, dropping message"
                    );
                    metrics::record_delivery_dropped("closed");
                }
            }
        }

        delivered
    }

    /// Number of channels currently subscribed to `meeting_id`.
    pub fn subscriber_count(&self, meeting_id: &str) -> usize {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_meeting
            .get(meeting_id)
            .map_or(0, HashMap::len)
    }

    /// Open a new channel on `meeting_id`.
    ///
    /// Returns the guard that keeps the channel subscribed and the receiver
    /// its connection should drain.
    pub fn open(self: &Arc<Self>, meeting_id: &str) -> (Subscription, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let channel = ChannelId::new();
        self.subscribe(meeting_id, channel, tx);

        let subscription = Subscription {
            relay: Arc::clone(self),
            meeting_id: meeting_id.to_string(),
            channel,
        };

        (subscription, rx)
    }
}

/// Live subscription of one channel. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    relay: Arc<SignalingRelay>,
    meeting_id: String,
    channel: ChannelId,
}

impl Subscription {
    pub fn channel_id(&self) -> ChannelId {
        self.channel
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    /// Publish `message` to every other channel of this meeting.
    pub fn publish(&self, message: Envelope) -> usize {
        self.relay.publish(&self.meeting_id, self.channel, message)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.relay.unsubscribe(&self.meeting_id, self.channel);
    }
}
