//! In-memory auth store and identity provider
//!
//! Used by unit tests here and by router tests in other crates. Both fakes
//! count their calls so tests can assert which collaborators a request
//! touched.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use habitrack_common::hash_api_key;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::provider::{IdentityProvider, ProviderError, ProviderSession, ProviderUser};
use crate::store::{ApiKeyRecord, AuthStore, StoreError};
use crate::types::{AuthApiKey, AuthIdentity};

/// Secret for tokens minted by [`mint_token`]. Nothing ever checks it.
const MOCK_SIGNING_SECRET: &[u8] = b"habitrack-mock-signing-secret";

#[derive(Debug, Clone)]
struct StoredKey {
    key_hash: String,
    key: AuthApiKey,
}

/// Pending rendezvous that holds `find_user` callers until all have looked up.
struct ProvisioningRace {
    barrier: Arc<Barrier>,
    remaining: usize,
}

/// In-memory [`AuthStore`].
pub struct MemoryAuthStore {
    users: Mutex<HashMap<Uuid, String>>,
    keys: Mutex<Vec<StoredKey>>,
    race: Mutex<Option<ProvisioningRace>>,
    lookups: AtomicUsize,
    touches: AtomicUsize,
    conflicts: AtomicUsize,
    fail_touch: AtomicBool,
    fail_lookup: AtomicBool,
    return_revoked: AtomicBool,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            keys: Mutex::new(Vec::new()),
            race: Mutex::new(None),
            lookups: AtomicUsize::new(0),
            touches: AtomicUsize::new(0),
            conflicts: AtomicUsize::new(0),
            fail_touch: AtomicBool::new(false),
            fail_lookup: AtomicBool::new(false),
            return_revoked: AtomicBool::new(false),
        }
    }

    pub fn add_user(&self, id: Uuid, email: &str) {
        self.users.lock().unwrap().insert(id, email.to_string());
    }

    /// Store a key for `user_id` the way key generation does: digest only.
    pub fn add_api_key(&self, user_id: Uuid, raw_key: &str, label: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.keys.lock().unwrap().push(StoredKey {
            key_hash: hash_api_key(raw_key),
            key: AuthApiKey {
                id,
                user_id,
                label: label.to_string(),
                created_at: Utc::now(),
                last_used_at: None,
                revoked_at: None,
            },
        });
        id
    }

    pub fn revoke(&self, id: Uuid) {
        let mut keys = self.keys.lock().unwrap();
        if let Some(stored) = keys.iter_mut().find(|k| k.key.id == id) {
            stored.key.revoked_at.get_or_insert_with(Utc::now);
        }
    }

    pub fn api_key(&self, id: Uuid) -> Option<AuthApiKey> {
        self.keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.key.id == id)
            .map(|k| k.key.clone())
    }

    pub fn user_email(&self, id: Uuid) -> Option<String> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Number of `find_active_api_key` calls.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of `touch_api_key` calls, failed ones included.
    pub fn touch_count(&self) -> usize {
        self.touches.load(Ordering::SeqCst)
    }

    /// Number of `insert_user` calls that hit an existing row.
    pub fn conflict_count(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }

    pub fn set_touch_failure(&self, fail: bool) {
        self.fail_touch.store(fail, Ordering::SeqCst);
    }

    pub fn set_lookup_failure(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    /// Make `find_active_api_key` skip its `revoked_at IS NULL` filter.
    pub fn set_return_revoked(&self, enabled: bool) {
        self.return_revoked.store(enabled, Ordering::SeqCst);
    }

    /// Hold the next `callers` `find_user` calls until all of them have
    /// finished their lookup, so every one of them sees the same snapshot.
    pub fn race_next_user_lookups(&self, callers: usize) {
        *self.race.lock().unwrap() = Some(ProvisioningRace {
            barrier: Arc::new(Barrier::new(callers)),
            remaining: callers,
        });
    }

    /// Wait until at least `count` touches have run. Touches are detached tasks.
    pub async fn wait_for_touches(&self, count: usize) {
        for _ in 0..200 {
            if self.touch_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn take_race_slot(&self) -> Option<Arc<Barrier>> {
        let mut race = self.race.lock().unwrap();
        let pending = race.as_mut()?;
        let barrier = Arc::clone(&pending.barrier);
        pending.remaining -= 1;
        if pending.remaining == 0 {
            *race = None;
        }
        Some(barrier)
    }

    fn database_error() -> StoreError {
        StoreError::Database(sqlx::Error::PoolTimedOut)
    }
}

impl Default for MemoryAuthStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn find_active_api_key(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Self::database_error());
        }

        let include_revoked = self.return_revoked.load(Ordering::SeqCst);
        let found = self
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.key_hash == key_hash && (include_revoked || k.key.revoked_at.is_none()))
            .map(|k| k.key.clone());

        Ok(found.map(|key| ApiKeyRecord {
            user_email: self.user_email(key.user_id),
            id: key.id,
            user_id: key.user_id,
            label: key.label,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
            revoked_at: key.revoked_at,
        }))
    }

    async fn touch_api_key(&self, id: Uuid) -> Result<(), StoreError> {
        let result = if self.fail_touch.load(Ordering::SeqCst) {
            Err(Self::database_error())
        } else {
            let mut keys = self.keys.lock().unwrap();
            if let Some(stored) = keys.iter_mut().find(|k| k.key.id == id) {
                stored.key.last_used_at = Some(advance(stored.key.last_used_at));
            }
            Ok(())
        };

        self.touches.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, StoreError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Self::database_error());
        }

        let found = self
            .user_email(id)
            .map(|email| AuthIdentity { id, email });

        if let Some(barrier) = self.take_race_slot() {
            barrier.wait().await;
        }

        Ok(found)
    }

    async fn insert_user(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&id) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(StoreError::Conflict);
        }
        users.insert(id, email.to_string());
        Ok(())
    }
}

/// Strictly later than `previous`, even within one clock tick.
fn advance(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if prev >= now => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}

/// Scripted [`IdentityProvider`]: knows a fixed set of tokens.
pub struct MockIdentityProvider {
    users: Mutex<HashMap<String, ProviderUser>>,
    sessions: Mutex<HashMap<String, ProviderSession>>,
    verify_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            verify_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Accept `access_token` as belonging to `user`.
    pub fn with_user(self, access_token: &str, user: ProviderUser) -> Self {
        self.add_user(access_token, user);
        self
    }

    /// Accept `refresh_token` in exchange for `session`.
    pub fn with_session(self, refresh_token: &str, session: ProviderSession) -> Self {
        self.add_session(refresh_token, session);
        self
    }

    pub fn add_user(&self, access_token: &str, user: ProviderUser) {
        self.users
            .lock()
            .unwrap()
            .insert(access_token.to_string(), user);
    }

    pub fn add_session(&self, refresh_token: &str, session: ProviderSession) {
        self.sessions
            .lock()
            .unwrap()
            .insert(refresh_token.to_string(), session);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify(&self, access_token: &str) -> Result<ProviderUser, ProviderError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        self.users
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected {
                status: 401,
                message: "invalid JWT".to_string(),
            })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        self.sessions
            .lock()
            .unwrap()
            .get(refresh_token)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected {
                status: 400,
                message: "Invalid Refresh Token: Refresh Token Not Found".to_string(),
            })
    }
}

/// Provider user with a confirmed email.
pub fn provider_user(email: &str) -> ProviderUser {
    ProviderUser {
        id: Uuid::new_v4(),
        email: Some(email.to_string()),
        email_confirmed_at: Some(Utc::now()),
    }
}

/// Mint a Supabase-shaped access token for `user`, valid for `expires_in` seconds.
pub fn mint_token(
    user: &ProviderUser,
    expires_in: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": user.id.to_string(),
        "email": user.email,
        "aud": "authenticated",
        "role": "authenticated",
        "iat": now,
        "exp": now + expires_in,
    });

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(MOCK_SIGNING_SECRET),
    )
}
