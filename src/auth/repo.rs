use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::auth::repo_types::UserRecord;
use crate::error::AppError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already registered")]
    EmailTaken,
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::EmailTaken => AppError::Conflict("User already exists".into()),
        }
    }
}

/// Where user records live. Handlers only see this trait through `AppState`.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<UserRecord>;

    /// Inserts `user` under `email`. An existing record is left untouched and
    /// the call fails with [`RepoError::EmailTaken`].
    async fn create(&self, email: &str, user: UserRecord) -> Result<UserRecord, RepoError>;
}

/// Process-lifetime store; everything is gone on restart.
#[derive(Default)]
pub struct MemoryUsers {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        self.users.read().await.get(email).cloned()
    }

    async fn create(&self, email: &str, user: UserRecord) -> Result<UserRecord, RepoError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(RepoError::EmailTaken);
        }
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }
}
