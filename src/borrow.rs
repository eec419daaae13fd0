//! BorrowLifecycle - the borrow-request state machine.
//!
//! `Pending -> {Accepted, Rejected}`, `Accepted -> Returned`. Exclusivity: at
//! most one `Accepted` request per item at any time, and at most one
//! non-terminal request per (reader, item) pair. Racing accepts resolve
//! first-writer-wins; the loser sees `Conflict` and must refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::clock::Clock;
use crate::context::Actor;
use crate::error::EngineError;
use crate::event::{self, EventChannel, RequestTransitioned};
use crate::lock::KeyedLock;
use crate::model::{BorrowRequest, Item, ItemState, RequestStatus};
use crate::store::{Record, RecordStore, Versioned};
use crate::validate::ValidationPolicy;

pub struct BorrowLifecycle<S: RecordStore> {
    store: Arc<S>,
    locks: Arc<KeyedLock>,
    events: Arc<EventChannel>,
    clock: Arc<dyn Clock>,
    policy: ValidationPolicy,
    next_id: AtomicU64,
}

impl<S: RecordStore> BorrowLifecycle<S> {
    pub(crate) fn new(
        store: Arc<S>,
        locks: Arc<KeyedLock>,
        events: Arc<EventChannel>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        BorrowLifecycle {
            store,
            locks,
            events,
            clock,
            policy: ValidationPolicy,
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a `Pending` request for the reader on an item.
    ///
    /// Requires the item to be `Published`. Fails with `Conflict` if the item
    /// already has an `Accepted` request from any reader, or if this reader
    /// already has a non-terminal request for this item. No item-state side
    /// effect; the item stays `Published` until acceptance.
    pub fn create_request(
        &self,
        actor: &Actor,
        item_id: &str,
    ) -> Result<BorrowRequest, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("item_id", item_id)?;

        let _guard = self.locks.acquire(item_id)?;
        let item = self.require_item(item_id)?.data;

        if actor.id == item.owner_id {
            return Err(EngineError::Authorization(
                "owners cannot request their own items".into(),
            ));
        }
        let siblings = self.requests_for_item(item_id)?;
        if siblings.iter().any(|r| r.status == RequestStatus::Accepted) {
            return Err(EngineError::Conflict(format!(
                "item {} is already out on an accepted request",
                item_id
            )));
        }
        if item.state != ItemState::Published {
            return Err(EngineError::InvalidState {
                expected: ItemState::Published.as_str().into(),
                actual: item.state.as_str().into(),
            });
        }
        if siblings
            .iter()
            .any(|r| r.reader_id == actor.id && !r.status.is_terminal())
        {
            return Err(EngineError::Conflict(format!(
                "reader {} already has an open request for item {}",
                actor.id, item_id
            )));
        }

        let request = BorrowRequest {
            id: format!("req-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
            item_id: item_id.to_string(),
            reader_id: actor.id.clone(),
            status: RequestStatus::Pending,
        };
        self.store.insert(&request)?;

        self.emit(event::REQUEST_CREATED, &request, item.state);
        Ok(request)
    }

    /// Accept a pending request. Owner only.
    ///
    /// First accept wins: a second accept for another pending request on the
    /// same item fails with `Conflict` instead of overwriting. Sibling
    /// `Pending` requests are left untouched; rejecting them stays an explicit
    /// owner action. On success the item becomes `Borrowed`.
    pub fn accept(&self, actor: &Actor, request_id: &str) -> Result<BorrowRequest, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("request_id", request_id)?;

        // Find the item key first, then re-read under the item lock.
        let item_id = self.require_request(request_id)?.data.item_id;
        let _guard = self.locks.acquire(&item_id)?;

        let request = self.require_request(request_id)?;
        let item = self.require_item(&request.data.item_id)?;

        if actor.id != item.data.owner_id {
            return Err(EngineError::Authorization(format!(
                "only the owner of item {} may accept requests",
                item.data.id
            )));
        }
        self.require_status(&request.data, RequestStatus::Pending)?;

        let accepted_elsewhere = self
            .requests_for_item(&request.data.item_id)?
            .iter()
            .any(|r| r.status == RequestStatus::Accepted && r.id != request.data.id);
        if accepted_elsewhere || item.data.state == ItemState::Borrowed {
            return Err(EngineError::Conflict(format!(
                "item {} already has an accepted request",
                item.data.id
            )));
        }

        let mut updated = request.data.clone();
        updated.status = RequestStatus::Accepted;
        self.store.update(&updated, request.version)?;

        let mut borrowed = item.data.clone();
        borrowed.state = ItemState::Borrowed;
        self.store.update(&borrowed, item.version)?;

        self.emit(event::REQUEST_ACCEPTED, &updated, borrowed.state);
        Ok(updated)
    }

    /// Reject a pending request. Owner only; no item-state side effect.
    pub fn reject(&self, actor: &Actor, request_id: &str) -> Result<BorrowRequest, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("request_id", request_id)?;

        let item_id = self.require_request(request_id)?.data.item_id;
        let _guard = self.locks.acquire(&item_id)?;

        let request = self.require_request(request_id)?;
        let item = self.require_item(&request.data.item_id)?;

        if actor.id != item.data.owner_id {
            return Err(EngineError::Authorization(format!(
                "only the owner of item {} may reject requests",
                item.data.id
            )));
        }
        self.require_status(&request.data, RequestStatus::Pending)?;

        let mut updated = request.data.clone();
        updated.status = RequestStatus::Rejected;
        self.store.update(&updated, request.version)?;

        self.emit(event::REQUEST_REJECTED, &updated, item.data.state);
        Ok(updated)
    }

    /// Record the return of an accepted borrow.
    ///
    /// Allowed for the item's owner or the requesting reader. The item becomes
    /// `Published` again if today is still inside its availability window,
    /// `Unavailable` otherwise.
    pub fn return_item(
        &self,
        actor: &Actor,
        request_id: &str,
    ) -> Result<BorrowRequest, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("request_id", request_id)?;

        let item_id = self.require_request(request_id)?.data.item_id;
        let _guard = self.locks.acquire(&item_id)?;

        let request = self.require_request(request_id)?;
        let item = self.require_item(&request.data.item_id)?;

        if actor.id != item.data.owner_id && actor.id != request.data.reader_id {
            return Err(EngineError::Authorization(format!(
                "only the owner or the requesting reader may return item {}",
                item.data.id
            )));
        }
        self.require_status(&request.data, RequestStatus::Accepted)?;

        let mut updated = request.data.clone();
        updated.status = RequestStatus::Returned;
        self.store.update(&updated, request.version)?;

        let mut returned = item.data.clone();
        returned.state = if returned.window_contains(self.clock.today()) {
            ItemState::Published
        } else {
            ItemState::Unavailable
        };
        self.store.update(&returned, item.version)?;

        self.emit(event::ITEM_RETURNED, &updated, returned.state);
        Ok(updated)
    }

    /// Look up a request by id.
    pub fn get(&self, request_id: &str) -> Result<Option<BorrowRequest>, EngineError> {
        Ok(self
            .store
            .get::<BorrowRequest>(request_id)?
            .map(|versioned| versioned.data))
    }

    /// All requests for an item, any status.
    pub fn requests_for_item(&self, item_id: &str) -> Result<Vec<BorrowRequest>, EngineError> {
        let mut requests: Vec<BorrowRequest> = self
            .store
            .find::<BorrowRequest>(&|r| r.item_id == item_id)?
            .into_iter()
            .map(|versioned| versioned.data)
            .collect();
        requests.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)));
        Ok(requests)
    }

    /// All requests made by a reader, any status.
    pub fn requests_by_reader(&self, reader_id: &str) -> Result<Vec<BorrowRequest>, EngineError> {
        let mut requests: Vec<BorrowRequest> = self
            .store
            .find::<BorrowRequest>(&|r| r.reader_id == reader_id)?
            .into_iter()
            .map(|versioned| versioned.data)
            .collect();
        requests.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)));
        Ok(requests)
    }

    fn require_request(&self, request_id: &str) -> Result<Versioned<BorrowRequest>, EngineError> {
        self.store
            .get::<BorrowRequest>(request_id)?
            .ok_or_else(|| EngineError::NotFound {
                collection: BorrowRequest::COLLECTION.to_string(),
                id: request_id.to_string(),
            })
    }

    fn require_item(&self, item_id: &str) -> Result<Versioned<Item>, EngineError> {
        self.store
            .get::<Item>(item_id)?
            .ok_or_else(|| EngineError::NotFound {
                collection: Item::COLLECTION.to_string(),
                id: item_id.to_string(),
            })
    }

    fn require_status(
        &self,
        request: &BorrowRequest,
        expected: RequestStatus,
    ) -> Result<(), EngineError> {
        if request.status != expected {
            return Err(EngineError::InvalidState {
                expected: expected.as_str().into(),
                actual: request.status.as_str().into(),
            });
        }
        Ok(())
    }

    fn emit(&self, name: &str, request: &BorrowRequest, item_state: ItemState) {
        self.events.emit(
            name,
            &RequestTransitioned {
                request_id: request.id.clone(),
                item_id: request.item_id.clone(),
                reader_id: request.reader_id.clone(),
                status: request.status,
                item_state,
            },
        );
    }
}
