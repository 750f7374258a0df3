//! Session access for the OAuth handlers.
//!
//! Handlers only need string values under a handful of keys, so they talk to a
//! small store interface instead of a concrete session type.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use tower_sessions::Session;

use crate::error::Result;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`, returning the value it held.
    async fn delete(&self, key: &str) -> Result<Option<String>>;

    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

#[async_trait]
impl SessionStore for Session {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(Session::get::<String>(self, key).await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        Ok(self.insert(key, value).await?)
    }

    async fn delete(&self, key: &str) -> Result<Option<String>> {
        Ok(self.remove::<String>(key).await?)
    }
}

/// Session kept in process memory, for callers without a cookie layer and for tests.
#[derive(Debug, Default)]
pub struct MemorySession {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values().remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn test_memory_session_round_trip() {
        let session = MemorySession::new();
        assert_eq!(session.get("k").await.unwrap(), None);

        session.set("k", "v".to_string()).await.unwrap();
        assert!(session.contains("k").await.unwrap());
        assert_eq!(session.delete("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(session.delete("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tower_session_implements_store() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        SessionStore::set(&session, "jira_auth_redirect", "/foo".to_string())
            .await
            .unwrap();
        assert_eq!(
            SessionStore::get(&session, "jira_auth_redirect").await.unwrap(),
            Some("/foo".to_string())
        );
        assert_eq!(
            SessionStore::delete(&session, "jira_auth_redirect").await.unwrap(),
            Some("/foo".to_string())
        );
        assert!(!SessionStore::contains(&session, "jira_auth_redirect").await.unwrap());
    }
}
