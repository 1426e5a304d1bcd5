use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::errors::AuthError;
use crate::auth::ports::RefreshSessionStore;
use crate::domain::auth::models::RefreshSession;
use crate::domain::auth::models::RefreshSessionId;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Process-local refresh session store for tests and local runs.
///
/// Applies the same conditional update as the Postgres store.
#[derive(Default)]
pub struct InMemoryRefreshSessionStore {
    sessions: RwLock<HashMap<RefreshSessionId, RefreshSession>>,
}

impl InMemoryRefreshSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshSessionStore for InMemoryRefreshSessionStore {
    async fn get(&self, id: &RefreshSessionId) -> Result<RefreshSession, AuthError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(AuthError::RefreshSessionNotFound)
    }

    async fn insert(&self, session: RefreshSession) -> Result<RefreshSession, AuthError> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(&session.id) {
            return Err(AuthError::Database(format!(
                "refresh session {} already exists",
                session.id
            )));
        }

        sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update(&self, session: RefreshSession) -> Result<(), AuthError> {
        let mut sessions = self.sessions.write().await;

        let stored = sessions
            .get_mut(&session.id)
            .ok_or(AuthError::RefreshSessionNotFound)?;

        if stored.used {
            return Err(AuthError::RefreshTokenUsed);
        }

        *stored = session;
        Ok(())
    }
}

/// Process-local user repository for tests and local runs.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }
}
