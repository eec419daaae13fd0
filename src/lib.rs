mod borrow;
mod catalog;
mod clock;
mod comments;
mod context;
mod engine;
mod error;
mod event;
mod lock;
mod model;
mod reactions;
mod store;
mod validate;

pub use borrow::BorrowLifecycle;
pub use catalog::{CatalogIndex, ItemUpdate, NewItem, SearchFilter};
pub use clock::{Clock, FixedClock, SystemClock};
pub use comments::CommentThreads;
pub use context::{Actor, Role};
pub use engine::LendingStateEngine;
pub use error::EngineError;
pub use event::{
    CommentPosted, EventChannel, ItemChanged, ReactionChanged, RequestTransitioned,
    COMMENT_ADDED, ITEM_LISTED, ITEM_REMOVED, ITEM_RETURNED, ITEM_UPDATED, REACTION_CLEARED,
    REACTION_SET, REPLY_ADDED, REQUEST_ACCEPTED, REQUEST_CREATED, REQUEST_REJECTED,
};
pub use lock::{KeyGuard, KeyedLock};
pub use model::{
    BorrowRequest, Comment, Counts, Item, ItemState, Polarity, Reaction, ReactionTally, Reply,
    RequestStatus,
};
pub use reactions::{ReactionLedger, SetOutcome};
pub use store::{InMemoryRecordStore, Record, RecordStore, StoreError, Versioned};
pub use validate::ValidationPolicy;
