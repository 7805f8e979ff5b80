//! Broadcast hub with zero-or-one observer per topic.
//!
//! Publishing never blocks and never fails: with no observer attached a frame
//! is discarded, with a full observer queue the frame is dropped, and a closed
//! observer queue releases its slot. Each frame is one payload: plain text for
//! log lines (`\n` separated), compact JSON for everything else. Transports
//! decide how to encode it on the wire.

use loupe_core::event::InspectionEvent;
use loupe_core::message::Message;
use loupe_core::usage::TokenUsage;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

/// An independent observer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Human-readable trace log lines.
    Inspection,
    /// Full JSON snapshots of the conversation context.
    Context,
    /// JSON token-usage snapshots.
    Usage,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Inspection, Topic::Context, Topic::Usage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inspection => "inspection",
            Self::Context => "context",
            Self::Usage => "usage",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Inspection => 0,
            Self::Context => 1,
            Self::Usage => 2,
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one attachment to a topic.
pub type ObserverId = u64;

struct Slot {
    id: ObserverId,
    sender: mpsc::Sender<String>,
}

/// The broadcast hub. Share it behind an `Arc`.
pub struct InspectionHub {
    capacity: usize,
    next_id: AtomicU64,
    slots: Mutex<[Option<Slot>; 3]>,
}

impl InspectionHub {
    /// Create a hub whose observer queues hold `capacity` frames each.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            slots: Mutex::new([None, None, None]),
        }
    }

    fn slots(&self) -> MutexGuard<'_, [Option<Slot>; 3]> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach an observer to `topic`, replacing any previous one.
    ///
    /// A replaced observer's queue is closed, so its `recv` returns `None`
    /// once drained.
    pub fn attach(self: &Arc<Self>, topic: Topic) -> Observer {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let previous = self.slots()[topic.index()].replace(Slot { id, sender });
        match previous {
            Some(old) => {
                debug!(%topic, id, replaced = old.id, "Observer attached, previous replaced")
            }
            None => debug!(%topic, id, "Observer attached"),
        }

        Observer {
            id,
            topic,
            receiver,
            hub: Arc::downgrade(self),
        }
    }

    /// Release `topic` if `id` still holds it. Returns whether a slot was freed.
    pub fn detach(&self, topic: Topic, id: ObserverId) -> bool {
        let mut slots = self.slots();
        let slot = &mut slots[topic.index()];
        if slot.as_ref().is_some_and(|s| s.id == id) {
            *slot = None;
            debug!(%topic, id, "Observer detached");
            true
        } else {
            false
        }
    }

    /// Whether a live observer holds `topic`.
    pub fn is_attached(&self, topic: Topic) -> bool {
        self.slots()[topic.index()]
            .as_ref()
            .is_some_and(|s| !s.sender.is_closed())
    }

    /// Publish a plain log line (possibly multi-line) to the inspection topic.
    ///
    /// Both `\n` and `\r\n` separate lines; the frame carries `\n` only.
    pub fn publish_log(&self, text: &str) {
        info!("{text}");
        self.send(Topic::Inspection, normalize_lines(text));
    }

    /// Publish an event to the inspection topic.
    ///
    /// Log lines go out as plain text, trace records as JSON.
    pub fn publish_event(&self, event: &InspectionEvent) {
        if let InspectionEvent::Log { message } = event {
            self.publish_log(message);
            return;
        }
        info!("{}", event.to_text());
        match serde_json::to_string(event) {
            Ok(json) => self.send(Topic::Inspection, json),
            Err(e) => warn!(error = %e, "Failed to encode inspection event"),
        }
    }

    /// Publish the full context snapshot.
    pub fn publish_context(&self, messages: &[Message]) {
        self.publish_json(Topic::Context, messages);
    }

    /// Publish a token-usage snapshot.
    pub fn publish_usage(&self, usage: &TokenUsage) {
        self.publish_json(Topic::Usage, usage);
    }

    fn publish_json<T: Serialize + ?Sized>(&self, topic: Topic, value: &T) {
        if !self.is_attached(topic) {
            return;
        }
        match serde_json::to_string(value) {
            Ok(json) => self.send(topic, json),
            Err(e) => warn!(%topic, error = %e, "Failed to encode frame"),
        }
    }

    fn send(&self, topic: Topic, frame: String) {
        let mut slots = self.slots();
        let slot = &mut slots[topic.index()];
        let Some(current) = slot.as_ref() else {
            return;
        };

        match current.sender.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(%topic, id = current.id, "Observer queue full, frame dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%topic, id = current.id, "Observer gone, slot released");
                *slot = None;
            }
        }
    }
}

impl Default for InspectionHub {
    fn default() -> Self {
        Self::new(crate::DEFAULT_QUEUE_CAPACITY)
    }
}

/// Receiving end of one attachment. Dropping it releases the slot.
pub struct Observer {
    id: ObserverId,
    topic: Topic,
    receiver: mpsc::Receiver<String>,
    hub: Weak<InspectionHub>,
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Next frame, or `None` once replaced or the hub is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.detach(self.topic, self.id);
        }
    }
}

fn normalize_lines(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_core::event::TraceLabel;

    fn hub(capacity: usize) -> Arc<InspectionHub> {
        Arc::new(InspectionHub::new(capacity))
    }

    #[tokio::test]
    async fn crlf_lines_normalized() {
        let hub = hub(4);
        let mut observer = hub.attach(Topic::Inspection);
        hub.publish_log("a\nb\r\nc");
        assert_eq!(observer.recv().await.unwrap(), "a\nb\nc");
    }

    #[test]
    fn publish_without_observer_is_noop() {
        let hub = hub(4);
        hub.publish_log("nobody listening");
        hub.publish_context(&[Message::user("hi")]);
        hub.publish_usage(&TokenUsage::default());
        for topic in Topic::ALL {
            assert!(!hub.is_attached(topic));
        }
    }

    #[tokio::test]
    async fn observer_receives_log_text() {
        let hub = hub(4);
        let mut observer = hub.attach(Topic::Inspection);
        hub.publish_log("line one\nline two");
        assert_eq!(observer.recv().await.unwrap(), "line one\nline two");
    }

    #[tokio::test]
    async fn topics_are_independent() {
        let hub = hub(4);
        let mut context = hub.attach(Topic::Context);
        hub.publish_log("trace only");
        hub.publish_context(&[Message::user("hi")]);

        let frame = context.recv().await.unwrap();
        assert!(frame.starts_with("[{"));
        assert!(frame.contains("\"role\":\"user\""));
        assert!(context.try_recv().is_none());
    }

    #[tokio::test]
    async fn event_published_as_json_text() {
        let hub = hub(4);
        let mut observer = hub.attach(Topic::Inspection);
        let event = InspectionEvent::trace("Final answer").with_child(TraceLabel::Content, "done");
        hub.publish_event(&event);

        let frame = observer.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["label"], "Final answer");
        assert_eq!(value["children"][0]["data"], "done");
    }

    #[tokio::test]
    async fn log_event_published_as_plain_text() {
        let hub = hub(4);
        let mut observer = hub.attach(Topic::Inspection);
        hub.publish_event(&InspectionEvent::log("Context cleared"));
        assert_eq!(observer.recv().await.unwrap(), "Context cleared");
    }

    #[tokio::test]
    async fn last_attach_wins() {
        let hub = hub(4);
        let mut first = hub.attach(Topic::Inspection);
        let mut second = hub.attach(Topic::Inspection);

        hub.publish_log("to second");
        assert!(first.recv().await.is_none());
        assert_eq!(second.recv().await.unwrap(), "to second");
    }

    #[test]
    fn stale_detach_keeps_new_observer() {
        let hub = hub(4);
        let first = hub.attach(Topic::Context);
        let first_id = first.id();
        let _second = hub.attach(Topic::Context);

        assert!(!hub.detach(Topic::Context, first_id));
        drop(first);
        assert!(hub.is_attached(Topic::Context));
    }

    #[test]
    fn dropping_observer_releases_slot() {
        let hub = hub(4);
        let observer = hub.attach(Topic::Usage);
        assert!(hub.is_attached(Topic::Usage));
        drop(observer);
        assert!(!hub.is_attached(Topic::Usage));
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let hub = hub(1);
        let mut observer = hub.attach(Topic::Inspection);
        hub.publish_log("first");
        hub.publish_log("second");
        hub.publish_log("third");

        assert_eq!(observer.recv().await.unwrap(), "first");
        assert!(observer.try_recv().is_none());
        assert!(hub.is_attached(Topic::Inspection));
    }
}
