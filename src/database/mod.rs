pub mod contacts;
pub mod deals;
pub mod manager;
pub mod models;
pub mod users;

pub use manager::{Database, DatabaseError};
