#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use lending_engine::{Actor, FixedClock, Item, LendingStateEngine, NewItem};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Engine pinned to 2025-06-15, mid-way through the default item window.
pub fn engine() -> LendingStateEngine {
    LendingStateEngine::with_clock(Arc::new(FixedClock(day(2025, 6, 15))))
}

pub fn engine_at(date: NaiveDate) -> LendingStateEngine {
    LendingStateEngine::with_clock(Arc::new(FixedClock(date)))
}

pub fn new_item(title: &str) -> NewItem {
    NewItem {
        title: title.into(),
        author: "Frank Herbert".into(),
        genre: "Sci-Fi".into(),
        language: "English".into(),
        description: "A lendable copy.".into(),
        price: 5.0,
        start_date: day(2025, 6, 1),
        end_date: day(2025, 6, 30),
    }
}

/// Publish an item owned by `owner_id` and return it.
pub fn published_item(engine: &LendingStateEngine, owner_id: &str, title: &str) -> Item {
    engine
        .catalog()
        .list_item(&Actor::owner(owner_id), new_item(title), true)
        .unwrap()
}
