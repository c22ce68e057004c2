//! Habits domain: boards, check-ins, API key management and session endpoints

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::*;
pub use repository::{ApiKeyRepository, BoardRepository, CheckInRepository, HabitsRepositories};

// Re-export API types
pub use api::routes;
pub use api::HabitsState;
