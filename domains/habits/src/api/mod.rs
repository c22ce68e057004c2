//! API layer for the habits domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::HabitsState;
pub use routes::routes;
