pub mod auth;
pub mod contacts;
pub mod db;
pub mod deals;
pub mod server;
