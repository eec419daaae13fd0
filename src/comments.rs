//! CommentThreads - append-only comments and replies on items.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::context::Actor;
use crate::error::EngineError;
use crate::event::{self, CommentPosted, EventChannel};
use crate::model::{Comment, Item, Reply};
use crate::store::{Record, RecordStore};
use crate::validate::ValidationPolicy;

pub struct CommentThreads<S: RecordStore> {
    store: Arc<S>,
    events: Arc<EventChannel>,
    policy: ValidationPolicy,
    next_id: AtomicU64,
}

impl<S: RecordStore> CommentThreads<S> {
    pub(crate) fn new(store: Arc<S>, events: Arc<EventChannel>) -> Self {
        CommentThreads {
            store,
            events,
            policy: ValidationPolicy,
            next_id: AtomicU64::new(1),
        }
    }

    /// Post a comment on an item.
    pub fn add_comment(
        &self,
        actor: &Actor,
        item_id: &str,
        body: &str,
    ) -> Result<Comment, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("item_id", item_id)?;
        self.policy.require_text("comment body", body)?;

        if self.store.get::<Item>(item_id)?.is_none() {
            return Err(EngineError::NotFound {
                collection: Item::COLLECTION.to_string(),
                id: item_id.to_string(),
            });
        }

        let comment = Comment {
            id: format!("comment-{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
            item_id: item_id.to_string(),
            author_id: actor.id.clone(),
            body: body.trim().to_string(),
            replies: Vec::new(),
        };
        self.store.insert(&comment)?;

        self.events.emit(
            event::COMMENT_ADDED,
            &CommentPosted {
                comment_id: comment.id.clone(),
                item_id: comment.item_id.clone(),
                author_id: comment.author_id.clone(),
            },
        );
        Ok(comment)
    }

    /// Append a reply under an existing comment.
    pub fn add_reply(
        &self,
        actor: &Actor,
        comment_id: &str,
        body: &str,
    ) -> Result<Comment, EngineError> {
        self.policy.require_id("actor_id", &actor.id)?;
        self.policy.require_id("comment_id", comment_id)?;
        self.policy.require_text("reply body", body)?;

        let current = self
            .store
            .get::<Comment>(comment_id)?
            .ok_or_else(|| EngineError::NotFound {
                collection: Comment::COLLECTION.to_string(),
                id: comment_id.to_string(),
            })?;

        let mut comment = current.data.clone();
        comment.replies.push(Reply {
            author_id: actor.id.clone(),
            body: body.trim().to_string(),
        });
        self.store.update(&comment, current.version)?;

        self.events.emit(
            event::REPLY_ADDED,
            &CommentPosted {
                comment_id: comment.id.clone(),
                item_id: comment.item_id.clone(),
                author_id: actor.id.clone(),
            },
        );
        Ok(comment)
    }

    /// All comments on an item, oldest first.
    pub fn comments_for_item(&self, item_id: &str) -> Result<Vec<Comment>, EngineError> {
        let mut comments: Vec<Comment> = self
            .store
            .find::<Comment>(&|c| c.item_id == item_id)?
            .into_iter()
            .map(|versioned| versioned.data)
            .collect();
        comments.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)));
        Ok(comments)
    }
}
