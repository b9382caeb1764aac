use crate::core::session::SessionContext;
use crate::domain::http::{ApiRequest, ApiResponse};
use crate::domain::model::{TokenPair, User};
use crate::domain::ports::{StateStore, Transport};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::validate_min_length;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Transport decorator that authenticates every request with the session's
/// bearer token.
///
/// A 401 triggers a single refresh through `/auth/refresh-token`; on success
/// the tokens are stored and the original request is replayed exactly once,
/// and whatever the replay returns is final. If the refresh fails the
/// session is cleared and [`AdminError::SessionExpired`] is returned.
pub struct AuthenticatedTransport<S: StateStore> {
    inner: Arc<dyn Transport>,
    session: SessionContext<S>,
}

impl<S: StateStore> AuthenticatedTransport<S> {
    pub fn new(inner: Arc<dyn Transport>, session: SessionContext<S>) -> Self {
        Self { inner, session }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<(String, String)> {
        let request =
            ApiRequest::post(REFRESH_PATH).json(json!({ "refresh_token": refresh_token }));
        let body = self.inner.send(request).await?.into_result()?;
        let tokens: TokenPair = serde_json::from_value(body)?;
        tokens.into_tokens().ok_or_else(|| AdminError::ApiError {
            status: 200,
            message: "refresh response did not include both tokens".to_string(),
        })
    }
}

#[async_trait]
impl<S: StateStore + 'static> Transport for AuthenticatedTransport<S> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let token = self.session.access_token().await;
        let response = self
            .inner
            .send(request.clone().with_bearer(token))
            .await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        let Some(refresh_token) = self.session.refresh_token().await else {
            tracing::warn!("No refresh token available for {} {}", request.method, request.path);
            return Err(AdminError::Unauthenticated);
        };

        tracing::info!("🔄 Access token rejected, refreshing session");
        match self.refresh(&refresh_token).await {
            Ok((access_token, refresh_token)) => {
                self.session
                    .update_tokens(access_token.clone(), refresh_token)
                    .await?;
                tracing::debug!("Replaying {} {} with refreshed token", request.method, request.path);
                self.inner
                    .send(request.with_bearer(Some(access_token)))
                    .await
            }
            Err(e) => {
                tracing::error!("❌ Token refresh failed: {}", e);
                if let Err(e) = self.session.clear().await {
                    tracing::warn!("⚠️ Could not remove stored session: {}", e);
                }
                Err(AdminError::SessionExpired)
            }
        }
    }
}

/// Exchange credentials for a token pair and start a session.
///
/// Sent without a bearer token; a 400 from the API means the credentials
/// were rejected.
pub async fn login<S: StateStore>(
    transport: &dyn Transport,
    session: &SessionContext<S>,
    login: &str,
    password: &str,
) -> Result<User> {
    validate_min_length("login", login, 3)?;
    validate_min_length("password", password, 3)?;

    let request = ApiRequest::post(LOGIN_PATH).json(json!({
        "login": login,
        "password": password,
    }));
    let response = transport.send(request).await?;
    if response.status == 400 || response.status == 401 {
        return Err(AdminError::InvalidCredentials);
    }
    let body = response.into_result()?;
    let tokens: TokenPair = serde_json::from_value(body)?;

    let user = User {
        id: match &tokens.id {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => login.to_string(),
        },
        name: Some(login.to_string()),
    };
    let (access_token, refresh_token) =
        tokens.into_tokens().ok_or_else(|| AdminError::ApiError {
            status: 200,
            message: "login response did not include both tokens".to_string(),
        })?;

    session
        .set_user(access_token, refresh_token, Some(user.clone()))
        .await?;
    tracing::info!("✅ Logged in as {}", login);
    Ok(user)
}

pub async fn logout<S: StateStore>(session: &SessionContext<S>) -> Result<()> {
    session.clear().await?;
    tracing::info!("👋 Session cleared");
    Ok(())
}

/// Guard for commands that need a logged-in user.
pub async fn require_session<S: StateStore>(session: &SessionContext<S>) -> Result<()> {
    if session.is_authenticated().await {
        Ok(())
    } else {
        Err(AdminError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::HttpTransport;
    use crate::adapters::storage::LocalStateStore;
    use httpmock::prelude::*;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        session: SessionContext<LocalStateStore>,
        transport: AuthenticatedTransport<LocalStateStore>,
    }

    async fn fixture(server: &MockServer, tokens: Option<(&str, &str)>) -> Fixture {
        let dir = TempDir::new().unwrap();
        let session = SessionContext::hydrate(LocalStateStore::new(dir.path()))
            .await
            .unwrap();
        if let Some((access, refresh)) = tokens {
            session
                .set_user(access.to_string(), refresh.to_string(), None)
                .await
                .unwrap();
        }
        let http = HttpTransport::new(&server.base_url(), Duration::from_secs(5)).unwrap();
        let transport = AuthenticatedTransport::new(Arc::new(http), session.clone());
        Fixture {
            _dir: dir,
            session,
            transport,
        }
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/levels").header("Authorization", "Bearer a1");
                then.status(200).json_body(json!({"data": {"items": []}}));
            })
            .await;

        let fx = fixture(&server, Some(("a1", "r1"))).await;
        let response = fx.transport.send(ApiRequest::get("/levels")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_refreshes_once_and_replays_request() {
        let server = MockServer::start_async().await;
        let expired = server
            .mock_async(|when, then| {
                when.method(GET).path("/days").header("Authorization", "Bearer old");
                then.status(401).json_body(json!({"message": "Unauthorized"}));
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(REFRESH_PATH)
                    .json_body(json!({"refresh_token": "r-old"}));
                then.status(201)
                    .json_body(json!({"access_token": "new", "refresh_token": "r-new"}));
            })
            .await;
        let replay = server
            .mock_async(|when, then| {
                when.method(GET).path("/days").header("Authorization", "Bearer new");
                then.status(200)
                    .json_body(json!({"data": {"items": [{"id": "d1"}], "total": 1}}));
            })
            .await;

        let fx = fixture(&server, Some(("old", "r-old"))).await;
        let response = fx.transport.send(ApiRequest::get("/days")).await.unwrap();

        expired.assert_async().await;
        refresh.assert_async().await;
        replay.assert_async().await;
        assert_eq!(response.status, 200);

        let snapshot = fx.session.snapshot().await;
        assert_eq!(snapshot.access_token.as_deref(), Some("new"));
        assert_eq!(snapshot.refresh_token.as_deref(), Some("r-new"));
    }

    #[tokio::test]
    async fn test_replay_result_is_final() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/reviews").header("Authorization", "Bearer old");
                then.status(401);
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_PATH);
                then.status(200)
                    .json_body(json!({"access_token": "new", "refresh_token": "r2"}));
            })
            .await;
        let replay = server
            .mock_async(|when, then| {
                when.method(GET).path("/reviews").header("Authorization", "Bearer new");
                then.status(401);
            })
            .await;

        let fx = fixture(&server, Some(("old", "r1"))).await;
        let response = fx.transport.send(ApiRequest::get("/reviews")).await.unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(refresh.hits_async().await, 1);
        assert_eq!(replay.hits_async().await, 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/operators");
                then.status(401);
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_PATH);
                then.status(403).json_body(json!({"message": "refresh token revoked"}));
            })
            .await;

        let fx = fixture(&server, Some(("old", "revoked"))).await;
        let result = fx.transport.send(ApiRequest::get("/operators")).await;

        assert!(matches!(result, Err(AdminError::SessionExpired)));
        refresh.assert_async().await;
        assert!(!fx.session.is_authenticated().await);
        assert_eq!(fx.session.refresh_token().await, None);
    }

    /// Keeps the session in memory only and fails every removal.
    struct StickyStore;

    impl StateStore for StickyStore {
        async fn read_state(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }

        async fn write_state(&self, _key: &str, _data: &[u8]) -> Result<()> {
            Ok(())
        }

        async fn remove_state(&self, _key: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_expires_even_if_state_cannot_be_removed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/levels");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_PATH);
                then.status(401);
            })
            .await;

        let session = SessionContext::hydrate(StickyStore).await.unwrap();
        session
            .set_user("old".to_string(), "r1".to_string(), None)
            .await
            .unwrap();
        let http = HttpTransport::new(&server.base_url(), Duration::from_secs(5)).unwrap();
        let transport = AuthenticatedTransport::new(Arc::new(http), session.clone());

        let result = transport.send(ApiRequest::get("/levels")).await;

        assert!(matches!(result, Err(AdminError::SessionExpired)));
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_without_tokens_clears_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/services");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_PATH);
                then.status(200).json_body(json!({"access_token": "only-access"}));
            })
            .await;

        let fx = fixture(&server, Some(("old", "r1"))).await;
        let result = fx.transport.send(ApiRequest::get("/services")).await;

        assert!(matches!(result, Err(AdminError::SessionExpired)));
        assert!(!fx.session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_unauthorized_without_refresh_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/articles");
                then.status(401);
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST).path(REFRESH_PATH);
                then.status(200);
            })
            .await;

        let fx = fixture(&server, None).await;
        let result = fx.transport.send(ApiRequest::get("/articles")).await;

        assert!(matches!(result, Err(AdminError::Unauthenticated)));
        assert_eq!(refresh.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_login_stores_tokens_and_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(LOGIN_PATH)
                    .json_body(json!({"login": "admin1234", "password": "secret"}));
                then.status(201).json_body(json!({
                    "access_token": "acc",
                    "refresh_token": "ref",
                    "id": 12
                }));
            })
            .await;

        let fx = fixture(&server, None).await;
        let http = HttpTransport::new(&server.base_url(), Duration::from_secs(5)).unwrap();
        let user = login(&http, &fx.session, "admin1234", "secret").await.unwrap();

        mock.assert_async().await;
        assert_eq!(user.id, "12");
        assert!(fx.session.is_authenticated().await);
        assert_eq!(fx.session.refresh_token().await.as_deref(), Some("ref"));

        logout(&fx.session).await.unwrap();
        assert!(require_session(&fx.session).await.is_err());
    }

    #[tokio::test]
    async fn test_login_rejected_credentials() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(LOGIN_PATH);
                then.status(400).json_body(json!({"message": "Invalid credentials"}));
            })
            .await;

        let fx = fixture(&server, None).await;
        let http = HttpTransport::new(&server.base_url(), Duration::from_secs(5)).unwrap();

        let result = login(&http, &fx.session, "admin", "wrong").await;
        assert!(matches!(result, Err(AdminError::InvalidCredentials)));

        let too_short = login(&http, &fx.session, "ad", "wrong").await;
        assert!(matches!(
            too_short,
            Err(AdminError::FieldValidationError { .. })
        ));
    }
}
