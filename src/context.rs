//! Explicit call context supplied by the identity collaborator.
//!
//! Every mutating engine call carries the acting identity; nothing is read
//! from ambient session state. The engine authorizes actions against this
//! identity and never authenticates credentials itself.

use serde::{Deserialize, Serialize};

/// The role the identity collaborator resolved for the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Reader,
    Owner,
    Admin,
}

/// The acting identity for a single engine call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            role,
        }
    }

    pub fn reader(id: impl Into<String>) -> Self {
        Self::new(id, Role::Reader)
    }

    pub fn owner(id: impl Into<String>) -> Self {
        Self::new(id, Role::Owner)
    }
}
