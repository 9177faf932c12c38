//! Argon2 password hashing, kept off the async workers.
//!
//! A single hash with default parameters takes ~19 MiB and tens of
//! milliseconds, so both operations run on tokio's blocking pool.

use anyhow::Context;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

fn hash_blocking(plain: &[u8]) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain, &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hashing failed");
            anyhow::anyhow!("hash password: {e}")
        })
}

fn verify_blocking(plain: &[u8], stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is not a PHC string");
        anyhow::anyhow!("parse stored hash: {e}")
    })?;
    match Argon2::default().verify_password(plain, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "argon2 verification failed");
            Err(anyhow::anyhow!("verify password: {e}"))
        }
    }
}

/// Hashes `plain` with a fresh random salt. The PHC result embeds the salt
/// and the argon2 parameters.
pub async fn hash_password(plain: &str) -> anyhow::Result<String> {
    let plain = plain.as_bytes().to_vec();
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await
        .context("password hashing task panicked")?
}

/// `Ok(false)` on a mismatch; `Err` only when `stored` is unusable.
pub async fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let plain = plain.as_bytes().to_vec();
    let stored = stored.to_string();
    tokio::task::spawn_blocking(move || verify_blocking(&plain, &stored))
        .await
        .context("password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_hash_never_contains_plaintext() {
        let hash = hash_password("Secur3P@ssw0rd!").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Secur3P@ssw0rd!"));
        assert!(verify_password("Secur3P@ssw0rd!", &hash).await.unwrap());
        assert!(!verify_password("secur3p@ssw0rd!", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let (a, b) = tokio::join!(hash_password("hunter2"), hash_password("hunter2"));
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a, b);
        assert!(verify_password("hunter2", &a).await.unwrap());
        assert!(verify_password("hunter2", &b).await.unwrap());
    }

    #[tokio::test]
    async fn unusable_stored_hash_is_an_error() {
        assert!(verify_password("anything", "plaintext-in-the-db").await.is_err());
    }

    // On a single-threaded runtime an inline hash would complete during the
    // first poll; offloaded, the task is still waiting after one yield.
    #[tokio::test(flavor = "current_thread")]
    async fn hashing_leaves_the_runtime_responsive() {
        let hashing = tokio::spawn(async { hash_password("pw").await });
        tokio::task::yield_now().await;
        assert!(!hashing.is_finished());
        assert!(hashing.await.unwrap().is_ok());
    }
}
