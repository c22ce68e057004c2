//! Habits domain state and auth backend integration

use crate::HabitsRepositories;
use axum::extract::FromRef;
use habitrack_auth::AuthBackend;

/// Application state for the habits domain
#[derive(Clone)]
pub struct HabitsState {
    pub repos: HabitsRepositories,
    pub auth: AuthBackend,
}

impl FromRef<HabitsState> for AuthBackend {
    fn from_ref(state: &HabitsState) -> Self {
        state.auth.clone()
    }
}
