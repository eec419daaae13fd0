//! Domain data types for the lending catalog.

mod comment;
mod item;
mod reaction;
mod request;

pub use comment::{Comment, Reply};
pub use item::{Item, ItemState};
pub use reaction::{Counts, Polarity, Reaction, ReactionTally};
pub use request::{BorrowRequest, RequestStatus};
