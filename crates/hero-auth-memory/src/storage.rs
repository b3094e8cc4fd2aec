use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hero_auth::storage::{
    AuthStorage, ClientStorage, GrantStorage, SessionStorage, TokenStorage, UserStorage,
};
use hero_auth::types::{Client, Grant, Profile, Session, Token, User};
use hero_auth::{AuthError, AuthResult};

/// Process-local storage for users, clients, grants, tokens and sessions.
///
/// Identifiers are assigned from per-entity counters starting at 1.
/// Secondary indexes (username, email, client UUID, token code) enforce
/// uniqueness through `DashMap` entries, so concurrent inserts of the same
/// natural key see exactly one winner.
#[derive(Debug)]
pub struct MemoryStorage {
    users: DashMap<i64, User>,
    usernames: DashMap<String, i64>,
    emails: DashMap<String, i64>,
    profiles: DashMap<i64, Profile>,
    clients: DashMap<i64, Client>,
    client_uuids: DashMap<String, i64>,
    grants: DashMap<i64, Grant>,
    tokens: DashMap<i64, Token>,
    token_codes: DashMap<String, i64>,
    sessions: DashMap<String, Session>,
    user_ids: AtomicI64,
    profile_ids: AtomicI64,
    client_ids: AtomicI64,
    grant_ids: AtomicI64,
    token_ids: AtomicI64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            emails: DashMap::new(),
            profiles: DashMap::new(),
            clients: DashMap::new(),
            client_uuids: DashMap::new(),
            grants: DashMap::new(),
            tokens: DashMap::new(),
            token_codes: DashMap::new(),
            sessions: DashMap::new(),
            user_ids: AtomicI64::new(1),
            profile_ids: AtomicI64::new(1),
            client_ids: AtomicI64::new(1),
            grant_ids: AtomicI64::new(1),
            token_ids: AtomicI64::new(1),
        }
    }

    /// Bundles this storage behind every capability of [`AuthStorage`].
    pub fn auth_storage(self: Arc<Self>) -> AuthStorage {
        AuthStorage::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self,
        )
    }

    /// Number of stored grants.
    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    /// Number of stored tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn next(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn create(&self, mut user: User) -> AuthResult<User> {
        let Entry::Vacant(name_slot) = self.usernames.entry(user.username.clone()) else {
            return Err(AuthError::conflict(format!(
                "username '{}' is already taken",
                user.username
            )));
        };
        let Entry::Vacant(email_slot) = self.emails.entry(user.email.clone()) else {
            return Err(AuthError::conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        };

        user.id = Self::next(&self.user_ids);
        email_slot.insert(user.id);
        name_slot.insert(user.id);
        self.users.insert(user.id, user.clone());
        tracing::debug!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let id = self.usernames.get(username).map(|id| *id);
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let id = self.emails.get(email).map(|id| *id);
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn profile(&self, user_id: i64) -> AuthResult<Option<Profile>> {
        Ok(self.profiles.get(&user_id).map(|p| p.clone()))
    }

    async fn save_profile(&self, mut profile: Profile) -> AuthResult<Profile> {
        if !self.users.contains_key(&profile.user_id) {
            return Err(AuthError::storage(format!(
                "no user {} for profile",
                profile.user_id
            )));
        }
        if profile.id == 0 {
            profile.id = match self.profiles.get(&profile.user_id) {
                Some(existing) => existing.id,
                None => Self::next(&self.profile_ids),
            };
        }
        self.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn create(&self, mut client: Client) -> AuthResult<Client> {
        let Entry::Vacant(slot) = self.client_uuids.entry(client.uuid.clone()) else {
            return Err(AuthError::conflict(format!(
                "client '{}' already exists",
                client.uuid
            )));
        };

        client.id = Self::next(&self.client_ids);
        slot.insert(client.id);
        self.clients.insert(client.id, client.clone());
        tracing::debug!(client_id = %client.uuid, owner = client.user_id, "client created");
        Ok(client)
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<Client>> {
        Ok(self.clients.get(&id).map(|c| c.clone()))
    }

    async fn find_by_uuid(&self, uuid: &str) -> AuthResult<Option<Client>> {
        let id = self.client_uuids.get(uuid).map(|id| *id);
        Ok(id.and_then(|id| self.clients.get(&id).map(|c| c.clone())))
    }

    async fn list_by_owner(&self, user_id: i64) -> AuthResult<Vec<Client>> {
        let mut clients: Vec<Client> = self
            .clients
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.clone())
            .collect();
        clients.sort_by_key(|c| c.id);
        Ok(clients)
    }

    async fn delete(&self, id: i64) -> AuthResult<bool> {
        match self.clients.remove(&id) {
            Some((_, client)) => {
                self.client_uuids.remove(&client.uuid);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl GrantStorage for MemoryStorage {
    async fn create(&self, mut grant: Grant) -> AuthResult<Grant> {
        grant.id = Self::next(&self.grant_ids);
        self.grants.insert(grant.id, grant.clone());
        Ok(grant)
    }

    async fn find_by_client_code(&self, client_id: i64, code: &str) -> AuthResult<Option<Grant>> {
        if code.is_empty() {
            return Ok(None);
        }
        Ok(self
            .grants
            .iter()
            .find(|g| g.client_id == client_id && g.code == code)
            .map(|g| g.clone()))
    }

    async fn find_by_access_token(&self, token_id: i64) -> AuthResult<Option<Grant>> {
        if token_id == 0 {
            return Ok(None);
        }
        Ok(self
            .grants
            .iter()
            .find(|g| g.access_token_id == token_id)
            .map(|g| g.clone()))
    }

    async fn find_by_refresh_token(&self, token_id: i64) -> AuthResult<Option<Grant>> {
        if token_id == 0 {
            return Ok(None);
        }
        Ok(self
            .grants
            .iter()
            .find(|g| g.refresh_token_id == token_id)
            .map(|g| g.clone()))
    }

    async fn remove(&self, id: i64) -> AuthResult<bool> {
        Ok(self.grants.remove(&id).is_some())
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    async fn create(&self, mut token: Token) -> AuthResult<Token> {
        let Entry::Vacant(slot) = self.token_codes.entry(token.code.clone()) else {
            return Err(AuthError::conflict("token code collision"));
        };

        token.id = Self::next(&self.token_ids);
        slot.insert(token.id);
        self.tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_by_id(&self, id: i64) -> AuthResult<Option<Token>> {
        Ok(self.tokens.get(&id).map(|t| t.clone()))
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<Token>> {
        let id = self.token_codes.get(code).map(|id| *id);
        Ok(id.and_then(|id| self.tokens.get(&id).map(|t| t.clone())))
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn find(&self, key: &str) -> AuthResult<Option<Session>> {
        let session = self.sessions.get(key).map(|s| s.clone());
        match session {
            Some(session) if session.is_expired() => {
                self.sessions.remove(key);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn save(&self, session: Session) -> AuthResult<()> {
        self.sessions.insert(session.key.clone(), session);
        Ok(())
    }

    async fn delete(&self, key: &str) -> AuthResult<bool> {
        Ok(self.sessions.remove(key).is_some())
    }
}
