//! Repository implementations for the habits domain
//!
//! Every query goes through a `DbScope` and filters on its owner.

pub mod api_keys;
pub mod boards;
pub mod check_ins;

use sqlx::PgPool;

pub use api_keys::ApiKeyRepository;
pub use boards::BoardRepository;
pub use check_ins::CheckInRepository;

/// Combined repository access for the habits domain
#[derive(Clone)]
pub struct HabitsRepositories {
    pub boards: BoardRepository,
    pub check_ins: CheckInRepository,
    pub api_keys: ApiKeyRepository,
}

impl HabitsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            boards: BoardRepository::new(pool.clone()),
            check_ins: CheckInRepository::new(pool.clone()),
            api_keys: ApiKeyRepository::new(pool),
        }
    }
}
