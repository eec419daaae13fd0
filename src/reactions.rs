//! ReactionLedger - at most one like/dislike per (reader, item), with
//! aggregate counters that never drift from the reaction set.
//!
//! Counter updates and reaction writes for an item happen under the item's
//! key lock, so a flip is one atomic decrement-old/increment-new step from the
//! caller's perspective.

use std::sync::Arc;

use crate::error::EngineError;
use crate::event::{self, EventChannel, ReactionChanged};
use crate::lock::KeyedLock;
use crate::model::{Counts, Item, Polarity, Reaction, ReactionTally};
use crate::store::{Record, RecordStore};
use crate::validate::ValidationPolicy;

/// Result of a `set_reaction` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The reaction was inserted or flipped.
    Applied(Counts),
    /// The reader already had this polarity; nothing changed.
    AlreadySet(Counts),
}

impl SetOutcome {
    /// The item's counters after the call, whichever branch was taken.
    pub fn counts(&self) -> Counts {
        match self {
            SetOutcome::Applied(counts) | SetOutcome::AlreadySet(counts) => *counts,
        }
    }
}

pub struct ReactionLedger<S: RecordStore> {
    store: Arc<S>,
    locks: Arc<KeyedLock>,
    events: Arc<EventChannel>,
    policy: ValidationPolicy,
}

impl<S: RecordStore> ReactionLedger<S> {
    pub(crate) fn new(store: Arc<S>, locks: Arc<KeyedLock>, events: Arc<EventChannel>) -> Self {
        ReactionLedger {
            store,
            locks,
            events,
            policy: ValidationPolicy,
        }
    }

    /// Set the reader's reaction on an item.
    ///
    /// First reaction inserts and increments the matching counter. Repeating
    /// the same polarity is an idempotent no-op reported as `AlreadySet`.
    /// The opposite polarity flips: old counter down, new counter up, stored
    /// polarity replaced.
    pub fn set_reaction(
        &self,
        reader_id: &str,
        item_id: &str,
        polarity: Polarity,
    ) -> Result<SetOutcome, EngineError> {
        self.policy.require_id("reader_id", reader_id)?;
        self.policy.require_id("item_id", item_id)?;

        let _guard = self.locks.acquire(item_id)?;
        self.require_item(item_id)?;

        let key = Reaction::key_for(reader_id, item_id);
        let existing = self.store.get::<Reaction>(&key)?;
        let mut tally = self.load_tally(item_id)?;

        let outcome = match existing {
            None => {
                let reaction = Reaction::new(reader_id, item_id, polarity);
                self.store.insert(&reaction)?;
                tally.bump(polarity);
                self.store.save(&tally)?;
                SetOutcome::Applied(tally.counts)
            }
            Some(versioned) if versioned.data.polarity == polarity => {
                SetOutcome::AlreadySet(tally.counts)
            }
            Some(versioned) => {
                let old_polarity = versioned.data.polarity;
                let flipped = Reaction::new(reader_id, item_id, polarity);
                self.store.update(&flipped, versioned.version)?;
                tally.drop_one(old_polarity);
                tally.bump(polarity);
                self.store.save(&tally)?;
                SetOutcome::Applied(tally.counts)
            }
        };

        if let SetOutcome::Applied(counts) = outcome {
            self.events.emit(
                event::REACTION_SET,
                &ReactionChanged {
                    reader_id: reader_id.to_string(),
                    item_id: item_id.to_string(),
                    polarity: Some(polarity),
                    counts,
                },
            );
        }

        Ok(outcome)
    }

    /// Remove the reader's reaction if present. Absent reactions are a
    /// successful no-op.
    pub fn clear_reaction(&self, reader_id: &str, item_id: &str) -> Result<Counts, EngineError> {
        self.policy.require_id("reader_id", reader_id)?;
        self.policy.require_id("item_id", item_id)?;

        let _guard = self.locks.acquire(item_id)?;

        let key = Reaction::key_for(reader_id, item_id);
        let mut tally = self.load_tally(item_id)?;

        if let Some(versioned) = self.store.get::<Reaction>(&key)? {
            self.store.delete::<Reaction>(&key)?;
            tally.drop_one(versioned.data.polarity);
            self.store.save(&tally)?;

            self.events.emit(
                event::REACTION_CLEARED,
                &ReactionChanged {
                    reader_id: reader_id.to_string(),
                    item_id: item_id.to_string(),
                    polarity: None,
                    counts: tally.counts,
                },
            );
        }

        Ok(tally.counts)
    }

    /// The reader's current polarity on an item, if any.
    pub fn get_reaction(
        &self,
        reader_id: &str,
        item_id: &str,
    ) -> Result<Option<Polarity>, EngineError> {
        let key = Reaction::key_for(reader_id, item_id);
        Ok(self
            .store
            .get::<Reaction>(&key)?
            .map(|versioned| versioned.data.polarity))
    }

    /// Current like/dislike counters for an item.
    pub fn tally(&self, item_id: &str) -> Result<Counts, EngineError> {
        Ok(self.load_tally(item_id)?.counts)
    }

    fn load_tally(&self, item_id: &str) -> Result<ReactionTally, EngineError> {
        Ok(self
            .store
            .get::<ReactionTally>(item_id)?
            .map(|versioned| versioned.data)
            .unwrap_or_else(|| ReactionTally::empty(item_id)))
    }

    fn require_item(&self, item_id: &str) -> Result<Item, EngineError> {
        self.store
            .get::<Item>(item_id)?
            .map(|versioned| versioned.data)
            .ok_or_else(|| EngineError::NotFound {
                collection: Item::COLLECTION.to_string(),
                id: item_id.to_string(),
            })
    }
}
