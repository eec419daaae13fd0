//! CatalogIndex - item lifecycle owned by owners, plus the availability and
//! search queries the UI layer needs.
//!
//! Queries read the current store snapshot without locking; a write from
//! another session may not be visible to an immediately following read.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::context::{Actor, Role};
use crate::error::EngineError;
use crate::event::{self, EventChannel, ItemChanged};
use crate::lock::KeyedLock;
use crate::model::{Item, ItemState};
use crate::store::{Record, RecordStore, Versioned};
use crate::validate::ValidationPolicy;

/// Fields for a new item listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub language: String,
    pub description: String,
    pub price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Owner edits to an existing listing. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Search filter. Empty filter matches the full catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub max_price: Option<f64>,
}

pub struct CatalogIndex<S: RecordStore> {
    store: Arc<S>,
    locks: Arc<KeyedLock>,
    events: Arc<EventChannel>,
    clock: Arc<dyn Clock>,
    policy: ValidationPolicy,
    next_id: AtomicU64,
}

impl<S: RecordStore> CatalogIndex<S> {
    pub(crate) fn new(
        store: Arc<S>,
        locks: Arc<KeyedLock>,
        events: Arc<EventChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        CatalogIndex {
            store,
            locks,
            events,
            clock,
            policy: ValidationPolicy,
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a listing owned by the actor. Owner accounts only; `publish`
    /// controls whether it goes straight to `Published` or stays a `Draft`
    /// invisible to readers.
    pub fn list_item(
        &self,
        actor: &Actor,
        fields: NewItem,
        publish: bool,
    ) -> Result<Item, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        if actor.role != Role::Owner {
            return Err(EngineError::Authorization(
                "only owner accounts may list items".into(),
            ));
        }
        self.policy.require_text("title", &fields.title)?;
        self.policy.require_price(fields.price)?;
        self.policy.require_window(fields.start_date, fields.end_date)?;

        let item = Item {
            id: format!("item-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
            owner_id: actor.id.clone(),
            title: fields.title,
            author: fields.author,
            genre: fields.genre,
            language: fields.language,
            description: fields.description,
            price: fields.price,
            start_date: fields.start_date,
            end_date: fields.end_date,
            state: if publish {
                ItemState::Published
            } else {
                ItemState::Draft
            },
        };
        self.store.insert(&item)?;

        self.emit(event::ITEM_LISTED, &item);
        Ok(item)
    }

    /// Apply owner edits. Not allowed while the item is out on a borrow.
    pub fn update_item(
        &self,
        actor: &Actor,
        item_id: &str,
        update: ItemUpdate,
    ) -> Result<Item, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("item_id", item_id)?;

        let _guard = self.locks.acquire(item_id)?;
        let current = self.require_item(item_id)?;
        self.require_owner(actor, &current.data)?;

        if current.data.state == ItemState::Borrowed {
            return Err(EngineError::InvalidState {
                expected: "not Borrowed".into(),
                actual: current.data.state.as_str().into(),
            });
        }

        let mut item = current.data.clone();
        if let Some(title) = update.title {
            self.policy.require_text("title", &title)?;
            item.title = title;
        }
        if let Some(author) = update.author {
            item.author = author;
        }
        if let Some(genre) = update.genre {
            item.genre = genre;
        }
        if let Some(language) = update.language {
            item.language = language;
        }
        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(price) = update.price {
            self.policy.require_price(price)?;
            item.price = price;
        }
        if let Some(start_date) = update.start_date {
            item.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            item.end_date = end_date;
        }
        self.policy.require_window(item.start_date, item.end_date)?;

        self.store.update(&item, current.version)?;

        self.emit(event::ITEM_UPDATED, &item);
        Ok(item)
    }

    /// Move a `Draft` listing to `Published`.
    pub fn publish_item(&self, actor: &Actor, item_id: &str) -> Result<Item, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("item_id", item_id)?;

        let _guard = self.locks.acquire(item_id)?;
        let current = self.require_item(item_id)?;
        self.require_owner(actor, &current.data)?;

        if current.data.state != ItemState::Draft {
            return Err(EngineError::InvalidState {
                expected: ItemState::Draft.as_str().into(),
                actual: current.data.state.as_str().into(),
            });
        }

        let mut item = current.data.clone();
        item.state = ItemState::Published;
        self.store.update(&item, current.version)?;

        self.emit(event::ITEM_UPDATED, &item);
        Ok(item)
    }

    /// Delete a listing. Not allowed while the item is out on a borrow.
    pub fn remove_item(&self, actor: &Actor, item_id: &str) -> Result<(), EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("item_id", item_id)?;

        let _guard = self.locks.acquire(item_id)?;
        let current = self.require_item(item_id)?;
        self.require_owner(actor, &current.data)?;

        if current.data.state == ItemState::Borrowed {
            return Err(EngineError::InvalidState {
                expected: "not Borrowed".into(),
                actual: current.data.state.as_str().into(),
            });
        }

        self.store.delete::<Item>(item_id)?;

        self.emit(event::ITEM_REMOVED, &current.data);
        Ok(())
    }

    /// Look up an item by id.
    pub fn item(&self, item_id: &str) -> Result<Option<Item>, EngineError> {
        Ok(self.store.get::<Item>(item_id)?.map(|v| v.data))
    }

    /// True iff the item is `Published` and today falls inside its
    /// availability window.
    pub fn is_available(&self, item_id: &str) -> Result<bool, EngineError> {
        let item = self.require_item(item_id)?.data;
        Ok(item.state == ItemState::Published && item.window_contains(self.clock.today()))
    }

    /// Search the catalog.
    ///
    /// Case-insensitive substring match on the text fields, `<=` on price.
    /// Drafts are invisible. The iterator walks a snapshot taken at call time;
    /// calling again restarts over fresh state.
    pub fn search(&self, filter: &SearchFilter) -> Result<impl Iterator<Item = Item>, EngineError> {
        let title = filter.title.as_ref().map(|s| s.to_lowercase());
        let genre = filter.genre.as_ref().map(|s| s.to_lowercase());
        let language = filter.language.as_ref().map(|s| s.to_lowercase());
        let max_price = filter.max_price;

        let mut matches: Vec<Item> = self
            .store
            .find::<Item>(&|item| {
                if item.state == ItemState::Draft {
                    return false;
                }
                if let Some(ref needle) = title {
                    if !item.title.to_lowercase().contains(needle) {
                        return false;
                    }
                }
                if let Some(ref needle) = genre {
                    if !item.genre.to_lowercase().contains(needle) {
                        return false;
                    }
                }
                if let Some(ref needle) = language {
                    if !item.language.to_lowercase().contains(needle) {
                        return false;
                    }
                }
                if let Some(max) = max_price {
                    if item.price > max {
                        return false;
                    }
                }
                true
            })?
            .into_iter()
            .map(|versioned| versioned.data)
            .collect();

        matches.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)));
        Ok(matches.into_iter())
    }

    fn require_item(&self, item_id: &str) -> Result<Versioned<Item>, EngineError> {
        self.store
            .get::<Item>(item_id)?
            .ok_or_else(|| EngineError::NotFound {
                collection: Item::COLLECTION.to_string(),
                id: item_id.to_string(),
            })
    }

    fn require_owner(&self, actor: &Actor, item: &Item) -> Result<(), EngineError> {
        if actor.id != item.owner_id {
            return Err(EngineError::Authorization(format!(
                "only the owner may modify item {}",
                item.id
            )));
        }
        Ok(())
    }

    fn emit(&self, name: &str, item: &Item) {
        self.events.emit(
            name,
            &ItemChanged {
                item_id: item.id.clone(),
                owner_id: item.owner_id.clone(),
                state: item.state,
            },
        );
    }
}
