//! LendingStateEngine - the composition root.
//!
//! Wires one store, one per-key lock table, one clock, and one event channel
//! through the component modules. Callers go through the component accessors;
//! every mutating call carries an explicit `Actor`.

use std::sync::Arc;

use crate::borrow::BorrowLifecycle;
use crate::catalog::CatalogIndex;
use crate::clock::{Clock, SystemClock};
use crate::comments::CommentThreads;
use crate::event::EventChannel;
use crate::lock::KeyedLock;
use crate::reactions::ReactionLedger;
use crate::store::{InMemoryRecordStore, RecordStore};

pub struct LendingStateEngine<S: RecordStore = InMemoryRecordStore> {
    events: Arc<EventChannel>,
    reactions: ReactionLedger<S>,
    borrows: BorrowLifecycle<S>,
    catalog: CatalogIndex<S>,
    comments: CommentThreads<S>,
}

impl LendingStateEngine<InMemoryRecordStore> {
    /// Engine over the in-memory store and the wall clock.
    pub fn new() -> Self {
        Self::with_store(InMemoryRecordStore::new(), Arc::new(SystemClock))
    }

    /// Engine over the in-memory store with an injected clock, for
    /// deterministic availability-window behavior in tests.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_store(InMemoryRecordStore::new(), clock)
    }
}

impl Default for LendingStateEngine<InMemoryRecordStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RecordStore> LendingStateEngine<S> {
    /// Engine over a caller-supplied store. The store owns durable
    /// persistence; the engine owns the invariants.
    pub fn with_store(store: S, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(store);
        let locks = Arc::new(KeyedLock::new());
        let events = Arc::new(EventChannel::new());

        LendingStateEngine {
            reactions: ReactionLedger::new(store.clone(), locks.clone(), events.clone()),
            borrows: BorrowLifecycle::new(
                store.clone(),
                locks.clone(),
                events.clone(),
                clock.clone(),
            ),
            catalog: CatalogIndex::new(store.clone(), locks.clone(), events.clone(), clock),
            comments: CommentThreads::new(store, events.clone()),
            events,
        }
    }

    /// Like/dislike ledger.
    pub fn reactions(&self) -> &ReactionLedger<S> {
        &self.reactions
    }

    /// Borrow-request state machine.
    pub fn borrows(&self) -> &BorrowLifecycle<S> {
        &self.borrows
    }

    /// Item lifecycle and search.
    pub fn catalog(&self) -> &CatalogIndex<S> {
        &self.catalog
    }

    /// Comment threads.
    pub fn comments(&self) -> &CommentThreads<S> {
        &self.comments
    }

    /// Domain event channel; subscribe here instead of polling.
    pub fn events(&self) -> &EventChannel {
        &self.events
    }
}
