use serde::{Deserialize, Serialize};

use crate::store::Record;

/// A reply under a comment. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub author_id: String,
    pub body: String,
}

/// An annotation on an item with its thread of replies.
///
/// Belongs to exactly one item and one author. Append-only; no edit or delete
/// semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub item_id: String,
    pub author_id: String,
    pub body: String,
    pub replies: Vec<Reply>,
}

impl Record for Comment {
    const COLLECTION: &'static str = "comments";

    fn id(&self) -> &str {
        &self.id
    }
}
