use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Polarity of a reader's reaction on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Like,
    Dislike,
}

/// A single reader's reaction on a single item.
///
/// At most one exists per (reader, item) pair; polarity may flip but a second
/// row is never created for the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub reader_id: String,
    pub item_id: String,
    pub polarity: Polarity,
    key: String,
}

impl Reaction {
    pub fn new(reader_id: impl Into<String>, item_id: impl Into<String>, polarity: Polarity) -> Self {
        let reader_id = reader_id.into();
        let item_id = item_id.into();
        let key = Self::key_for(&reader_id, &item_id);
        Reaction {
            reader_id,
            item_id,
            polarity,
            key,
        }
    }

    /// Storage key for a (reader, item) pair.
    pub fn key_for(reader_id: &str, item_id: &str) -> String {
        format!("{}@{}", reader_id, item_id)
    }
}

impl Record for Reaction {
    const COLLECTION: &'static str = "reactions";

    fn id(&self) -> &str {
        &self.key
    }
}

/// Aggregate like/dislike counters for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub likes: u64,
    pub dislikes: u64,
}

/// Stored per-item tally, kept consistent with the reaction set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTally {
    pub item_id: String,
    pub counts: Counts,
}

impl ReactionTally {
    pub fn empty(item_id: impl Into<String>) -> Self {
        ReactionTally {
            item_id: item_id.into(),
            counts: Counts::default(),
        }
    }

    pub fn bump(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Like => self.counts.likes += 1,
            Polarity::Dislike => self.counts.dislikes += 1,
        }
    }

    pub fn drop_one(&mut self, polarity: Polarity) {
        match polarity {
            Polarity::Like => self.counts.likes = self.counts.likes.saturating_sub(1),
            Polarity::Dislike => self.counts.dislikes = self.counts.dislikes.saturating_sub(1),
        }
    }
}

impl Record for ReactionTally {
    const COLLECTION: &'static str = "reaction_tallies";

    fn id(&self) -> &str {
        &self.item_id
    }
}
