use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Lifecycle state of a lendable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemState {
    /// Listed but not yet visible to readers.
    Draft,
    /// Visible and requestable.
    Published,
    /// Out on an accepted borrow.
    Borrowed,
    /// Past its availability window or withdrawn.
    Unavailable,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Draft => "Draft",
            ItemState::Published => "Published",
            ItemState::Borrowed => "Borrowed",
            ItemState::Unavailable => "Unavailable",
        }
    }
}

/// A lendable book posting. Owned by exactly one owner actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub language: String,
    pub description: String,
    pub price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub state: ItemState,
}

impl Item {
    /// Whether `date` falls inside the availability window (inclusive).
    pub fn window_contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

impl Record for Item {
    const COLLECTION: &'static str = "items";

    fn id(&self) -> &str {
        &self.id
    }
}
