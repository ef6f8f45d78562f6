//! Session token lifecycle.
//!
//! The token is process-wide state with one owner: set on successful
//! login/signup, read by the authenticated-request path, and cleared
//! exactly once on logout or on an authentication-rejected response.
//! It is persisted under the config home so the desktop shell can
//! restart without forcing a fresh login.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

/// Single owner of the session token. Components borrow the token per
/// call instead of keeping copies that could drift.
#[derive(Debug)]
pub struct Session {
    token: Option<String>,
    path: PathBuf,
}

impl Session {
    /// Create a session backed by the given token file.
    pub fn new(path: PathBuf) -> Self {
        Self { token: None, path }
    }

    /// Load a persisted token from disk, if one exists.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let token = match fs::read_to_string(&path).await {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(_) => None,
        };

        Ok(Self { token, path })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Store a new token and persist it.
    pub async fn set(&mut self, token: String) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, &token)
            .await
            .with_context(|| format!("Failed to persist token: {}", self.path.display()))?;

        self.token = Some(token);
        debug!("session token stored");
        Ok(())
    }

    /// Clear the token from memory and disk. Idempotent: clearing an
    /// already-cleared session is a no-op.
    pub async fn clear(&mut self) -> Result<()> {
        if self.token.take().is_none() {
            return Ok(());
        }

        if self.path.exists() {
            fs::remove_file(&self.path)
                .await
                .with_context(|| format!("Failed to remove token: {}", self.path.display()))?;
        }
        debug!("session token cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("token");

        let mut session = Session::new(path.clone());
        session.set("tok-123".to_string()).await.unwrap();
        assert_eq!(session.token(), Some("tok-123"));

        let reloaded = Session::load(path).await.unwrap();
        assert_eq!(reloaded.token(), Some("tok-123"));
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("token");

        let mut session = Session::new(path.clone());
        session.set("tok".to_string()).await.unwrap();

        session.clear().await.unwrap();
        assert!(!session.is_authenticated());
        assert!(!path.exists());

        // Second clear: no-op, no error.
        session.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file_is_unauthenticated() {
        let temp = TempDir::new().unwrap();
        let session = Session::load(temp.path().join("nope")).await.unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_blank_token_file_is_unauthenticated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("token");
        tokio::fs::write(&path, "  \n").await.unwrap();

        let session = Session::load(path).await.unwrap();
        assert!(!session.is_authenticated());
    }
}
