use time::OffsetDateTime;
use uuid::Uuid;

/// Registered user, keyed by email in the store.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,                   // only used to correlate log lines
    pub name: String,
    pub password_hash: String,      // argon2 PHC string, never the plaintext
    pub role: String,
    pub created_at: OffsetDateTime,
}

impl UserRecord {
    pub fn new(name: String, password_hash: String, role: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            password_hash,
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
