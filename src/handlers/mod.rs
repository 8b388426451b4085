// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token, routes wrapped by require_auth)
//
// Each tier is mounted both at the root and under /api in app.rs.
pub mod protected;
pub mod public;
