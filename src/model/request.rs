use serde::{Deserialize, Serialize};

use crate::store::Record;

/// Status of a borrow request.
///
/// Transitions: `Pending -> {Accepted, Rejected}`, `Accepted -> Returned`.
/// `Rejected` and `Returned` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Returned,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Returned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Accepted => "Accepted",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Returned => "Returned",
        }
    }
}

/// A reader's intent to borrow an item from its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub id: String,
    pub item_id: String,
    pub reader_id: String,
    pub status: RequestStatus,
}

impl Record for BorrowRequest {
    const COLLECTION: &'static str = "borrow_requests";

    fn id(&self) -> &str {
        &self.id
    }
}
