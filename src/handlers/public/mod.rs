// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and liveness. Every input is validated through a
// `RequestContract` since there is no trusted caller.

pub mod auth;
pub mod health;

pub use auth::login as auth_login;
pub use auth::register as auth_register;
pub use health::get as health_get;
