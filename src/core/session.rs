use crate::domain::model::{Session, User};
use crate::domain::ports::StateStore;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

pub const SESSION_KEY: &str = "user-store-tour-admin.json";

/// Authentication state shared by the transport and the commands.
///
/// Created with [`SessionContext::hydrate`] from persisted storage; every
/// mutation is written back immediately so the next process sees it.
pub struct SessionContext<S: StateStore> {
    store: Arc<S>,
    state: Arc<RwLock<Session>>,
}

impl<S: StateStore> Clone for SessionContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: StateStore> SessionContext<S> {
    pub async fn hydrate(store: S) -> Result<Self> {
        let session = match store.read_state(SESSION_KEY).await? {
            Some(bytes) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!("⚠️ Ignoring unreadable session state: {}", e);
                    Session::default()
                }
            },
            None => Session::default(),
        };

        tracing::debug!(
            "Session hydrated (authenticated: {})",
            session.is_authenticated()
        );

        Ok(Self {
            store: Arc::new(store),
            state: Arc::new(RwLock::new(session)),
        })
    }

    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh_token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn set_user(
        &self,
        access_token: String,
        refresh_token: String,
        user: Option<User>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        *state = Session {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            user,
        };
        self.persist(&state).await
    }

    pub async fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        let mut state = self.state.write().await;
        state.access_token = Some(access_token);
        state.refresh_token = Some(refresh_token);
        self.persist(&state).await
    }

    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;
        *state = Session::default();
        self.store.remove_state(SESSION_KEY).await
    }

    async fn persist(&self, session: &Session) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(session)?;
        self.store.write_state(SESSION_KEY, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStateStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_hydrate_without_state_is_anonymous() {
        let dir = TempDir::new().unwrap();
        let session = SessionContext::hydrate(LocalStateStore::new(dir.path()))
            .await
            .unwrap();
        assert!(!session.is_authenticated().await);
        assert_eq!(session.refresh_token().await, None);
    }

    #[tokio::test]
    async fn test_set_user_persists_across_hydrations() {
        let dir = TempDir::new().unwrap();
        let session = SessionContext::hydrate(LocalStateStore::new(dir.path()))
            .await
            .unwrap();
        session
            .set_user(
                "access-1".to_string(),
                "refresh-1".to_string(),
                Some(User {
                    id: "42".to_string(),
                    name: None,
                }),
            )
            .await
            .unwrap();

        let reloaded = SessionContext::hydrate(LocalStateStore::new(dir.path()))
            .await
            .unwrap();
        let snapshot = reloaded.snapshot().await;
        assert_eq!(snapshot.access_token.as_deref(), Some("access-1"));
        assert_eq!(snapshot.user.unwrap().id, "42");
    }

    #[tokio::test]
    async fn test_update_tokens_keeps_user() {
        let dir = TempDir::new().unwrap();
        let session = SessionContext::hydrate(LocalStateStore::new(dir.path()))
            .await
            .unwrap();
        let user = User {
            id: "1".to_string(),
            name: Some("admin".to_string()),
        };
        session
            .set_user("a".to_string(), "r".to_string(), Some(user.clone()))
            .await
            .unwrap();
        session
            .update_tokens("a2".to_string(), "r2".to_string())
            .await
            .unwrap();

        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.access_token.as_deref(), Some("a2"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("r2"));
        assert_eq!(snapshot.user, Some(user));
    }

    #[tokio::test]
    async fn test_clear_and_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let store = LocalStateStore::new(dir.path());
        store.write_state(SESSION_KEY, b"not json").await.unwrap();

        let session = SessionContext::hydrate(store.clone()).await.unwrap();
        assert!(!session.is_authenticated().await);

        session
            .set_user("a".to_string(), "r".to_string(), None)
            .await
            .unwrap();
        session.clear().await.unwrap();

        let reloaded = SessionContext::hydrate(store).await.unwrap();
        assert_eq!(reloaded.snapshot().await, Session::default());
    }
}
