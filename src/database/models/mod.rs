pub mod contact;
pub mod deal;
pub mod user;

use serde::{Deserialize, Serialize};

pub use contact::{Contact, ContactChanges, ContactQuery, NewContact};
pub use deal::{Deal, NewDeal, Stage, StageChange};
pub use user::{NewUser, Profile, User};

/// Id of the authenticated user that every contact/deal query is scoped to.
///
/// Only the auth layer and trusted tooling can mint one, so a repository call
/// cannot be made without naming the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(i64);

impl Owner {
    pub(crate) fn new(user_id: i64) -> Self {
        Owner(user_id)
    }

    pub fn id(&self) -> i64 {
        self.0
    }
}

/// Paginated listing envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// `{id}` body returned by create endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Created {
    pub id: i64,
}
