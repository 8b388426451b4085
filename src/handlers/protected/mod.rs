// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `middleware::require_auth`, so handlers can
// take `AuthUser` and must scope their queries with `auth_user.owner()`.
//
// Middleware order: rate limit → require_auth → Validated<T> → handler

pub mod auth;
pub mod contacts;
pub mod deals;

pub use auth::whoami as auth_whoami;

pub use contacts::create as contacts_create;
pub use contacts::delete as contacts_delete;
pub use contacts::list as contacts_list;
pub use contacts::list_paged as contacts_list_paged;
pub use contacts::update as contacts_update;

pub use deals::create as deals_create;
pub use deals::list as deals_list;
pub use deals::stage as deals_stage;
