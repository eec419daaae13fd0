//! Domain events emitted after successful transitions.
//!
//! The engine emits one event per successful state change so callers can
//! subscribe instead of re-fetching and diffing. Payloads are serialized as
//! JSON strings; listeners receive the raw string and deserialize the payload
//! they care about.

use std::sync::Mutex;

use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};

use crate::model::{Counts, ItemState, Polarity, RequestStatus};

pub const REACTION_SET: &str = "ReactionSet";
pub const REACTION_CLEARED: &str = "ReactionCleared";
pub const REQUEST_CREATED: &str = "RequestCreated";
pub const REQUEST_ACCEPTED: &str = "RequestAccepted";
pub const REQUEST_REJECTED: &str = "RequestRejected";
pub const ITEM_RETURNED: &str = "ItemReturned";
pub const ITEM_LISTED: &str = "ItemListed";
pub const ITEM_UPDATED: &str = "ItemUpdated";
pub const ITEM_REMOVED: &str = "ItemRemoved";
pub const COMMENT_ADDED: &str = "CommentAdded";
pub const REPLY_ADDED: &str = "ReplyAdded";

/// Payload for `ReactionSet` and `ReactionCleared`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionChanged {
    pub reader_id: String,
    pub item_id: String,
    pub polarity: Option<Polarity>,
    pub counts: Counts,
}

/// Payload for the borrow-request lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestTransitioned {
    pub request_id: String,
    pub item_id: String,
    pub reader_id: String,
    pub status: RequestStatus,
    pub item_state: ItemState,
}

/// Payload for the item catalog events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemChanged {
    pub item_id: String,
    pub owner_id: String,
    pub state: ItemState,
}

/// Payload for `CommentAdded` and `ReplyAdded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentPosted {
    pub comment_id: String,
    pub item_id: String,
    pub author_id: String,
}

/// Subscription channel over the engine's domain events.
pub struct EventChannel {
    emitter: Mutex<EventEmitter>,
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        EventChannel {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener for `event`. The listener receives the JSON payload.
    pub fn on<F>(&self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut emitter = match self.emitter.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        emitter.on(event, listener);
    }

    /// Emit `event` with a serializable payload. Serialization failures are
    /// swallowed: events are notifications, never part of the transition.
    ///
    /// Returns after every listener has run. The emitter delivers each
    /// listener on its own thread; the handles are joined (outside the
    /// channel lock, so listeners may subscribe or emit themselves) so a
    /// subscriber always observes the event before the mutating call returns.
    pub fn emit<P: Serialize>(&self, event: &str, payload: &P) {
        let data = match serde_json::to_string(payload) {
            Ok(data) => data,
            Err(_) => return,
        };
        let handles = {
            let mut emitter = match self.emitter.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            emitter.emit(event, data)
        };
        for handle in handles {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn listener_receives_payload() {
        let channel = EventChannel::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        channel.on(REACTION_SET, move |data: String| {
            let payload: ReactionChanged = serde_json::from_str(&data).unwrap();
            assert_eq!(payload.item_id, "item-1");
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        channel.emit(
            REACTION_SET,
            &ReactionChanged {
                reader_id: "reader-1".into(),
                item_id: "item-1".into(),
                polarity: Some(Polarity::Like),
                counts: Counts { likes: 1, dislikes: 0 },
            },
        );

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn emit_returns_after_listeners_run() {
        let channel = EventChannel::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        channel.on(REQUEST_CREATED, move |_data: String| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        // no wait between emit and assert: delivery completes inside emit
        for expected in 1..=5 {
            channel.emit(
                REQUEST_CREATED,
                &CommentPosted {
                    comment_id: "comment-1".into(),
                    item_id: "item-1".into(),
                    author_id: "reader-1".into(),
                },
            );
            assert_eq!(seen.load(Ordering::SeqCst), expected);
        }
    }

    #[test]
    fn unrelated_events_do_not_fire() {
        let channel = EventChannel::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        channel.on(REQUEST_CREATED, move |_data: String| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        });

        channel.emit(
            COMMENT_ADDED,
            &CommentPosted {
                comment_id: "comment-1".into(),
                item_id: "item-1".into(),
                author_id: "reader-1".into(),
            },
        );

        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
