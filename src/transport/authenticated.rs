use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{
    application::services::auth_client::{AuthApi, AuthClient},
    error::{AppError, AuthError},
    storage::tokens::TokenStore,
    transport::http_client::{FileUpload, HttpClient},
    transport::single_flight::SingleFlight,
};

const REFRESH_FLIGHT_KEY: &str = "token-refresh";

/// Authorized request path: attaches the stored access token to every
/// request and recovers from a 401 by refreshing the token and retrying
/// the request exactly once.
///
/// All concurrent requests that hit a 401 share one refresh network call;
/// a backend that invalidates the old refresh token on use therefore
/// cannot be raced by parallel refreshers.
pub struct AuthenticatedClient<C: HttpClient> {
    client: Arc<C>,
    auth: AuthClient<C>,
    store: Arc<dyn TokenStore>,
    refresh_flight: SingleFlight<&'static str, Result<String, Arc<AuthError>>>,
}

impl<C: HttpClient + 'static> AuthenticatedClient<C> {
    pub fn new(client: Arc<C>, store: Arc<dyn TokenStore>) -> Self {
        let auth = AuthClient::new(Arc::clone(&client));
        Self {
            client,
            auth,
            store,
            refresh_flight: SingleFlight::new(),
        }
    }

    pub fn store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.store)
    }

    /// Sends an authorized JSON request, refreshing the access token and
    /// retrying once if the first attempt comes back 401. A 401 on the
    /// retried request is surfaced as-is rather than retried again.
    #[instrument(skip(self, body))]
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, AppError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let access = self.store.access_token();
        match self
            .client
            .request(method.clone(), path, access.as_deref(), body)
            .await
        {
            Err(AppError::Unauthorized) => {
                debug!("Access token rejected for {} {}, refreshing", method, path);
                let access = self.refresh_access().await.map_err(AppError::from)?;
                self.client
                    .request(method, path, Some(access.as_str()), body)
                    .await
            }
            result => result,
        }
    }

    /// Multipart variant of [`send`](Self::send); the form is rebuilt from
    /// the owned upload bytes for the post-refresh retry.
    #[instrument(skip(self, upload))]
    pub async fn send_multipart<T>(
        &self,
        method: Method,
        path: &str,
        upload: &FileUpload,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let access = self.store.access_token();
        match self
            .client
            .request_multipart(method.clone(), path, access.as_deref(), upload)
            .await
        {
            Err(AppError::Unauthorized) => {
                debug!("Access token rejected for {} {}, refreshing", method, path);
                let access = self.refresh_access().await.map_err(AppError::from)?;
                self.client
                    .request_multipart(method, path, Some(access.as_str()), upload)
                    .await
            }
            result => result,
        }
    }

    /// Obtains a fresh access token, deduplicating concurrent callers onto
    /// a single refresh network call. On refresh failure the store is
    /// cleared: the session cannot be recovered locally and the user has
    /// to log in again.
    async fn refresh_access(&self) -> Result<String, AuthError> {
        let Some(refresh_token) = self.store.refresh_token() else {
            warn!("401 received with no refresh token stored, forcing logout");
            self.store.clear();
            return Err(AuthError::MissingRefreshToken);
        };

        let auth = self.auth.clone();
        let store = Arc::clone(&self.store);
        let flight = async move {
            match auth.refresh(&refresh_token).await {
                Ok(refreshed) => {
                    store.update_access(&refreshed.access);
                    if let Some(rotated) = &refreshed.refresh {
                        store.update_refresh(rotated);
                    }
                    debug!("Access token refreshed");
                    Ok(refreshed.access)
                }
                Err(e) => {
                    warn!("Token refresh failed, clearing session: {}", e);
                    store.clear();
                    let e = match e {
                        AppError::Unauthorized => AuthError::SessionExpired,
                        other => AuthError::from(other),
                    };
                    Err(Arc::new(e))
                }
            }
        };

        self.refresh_flight
            .run(REFRESH_FLIGHT_KEY, flight)
            .await
            .map_err(|shared| AuthError::from_shared(&shared))
    }
}

#[cfg(test)]
mod tests_authenticated_client {
    use super::*;
    use crate::application::models::auth::TokenPair;
    use crate::storage::tokens::MemoryTokenStore;
    use crate::transport::http_client::ReqwestClient;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn seeded_store(access: &str, refresh: &str) -> Arc<dyn TokenStore> {
        let store = MemoryTokenStore::new();
        store.save(&TokenPair {
            access: access.to_string(),
            refresh: refresh.to_string(),
        });
        Arc::new(store)
    }

    fn create_client(server: &Server, store: Arc<dyn TokenStore>) -> Arc<AuthenticatedClient<ReqwestClient>> {
        let transport = Arc::new(ReqwestClient::new(&server.url(), 30).unwrap());
        Arc::new(AuthenticatedClient::new(transport, store))
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        setup_logger();
        let mut server = Server::new_async().await;

        let expired = server
            .mock("GET", "/bookings")
            .match_header("authorization", "Bearer a1")
            .with_status(401)
            .with_body(r#"{"detail": "token expired"}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .match_body(Matcher::Json(json!({"refresh": "r1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "a2"}"#)
            .expect(1)
            .create_async()
            .await;

        let retried = server
            .mock("GET", "/bookings")
            .match_header("authorization", "Bearer a2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .expect(2)
            .create_async()
            .await;

        let store = seeded_store("a1", "r1");
        let client = create_client(&server, Arc::clone(&store));

        let first = client.send::<(), serde_json::Value>(Method::GET, "/bookings", None);
        let second = client.send::<(), serde_json::Value>(Method::GET, "/bookings", None);
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap()["items"], json!([]));
        assert_eq!(second.unwrap()["items"], json!([]));
        assert_eq!(store.access_token(), Some("a2".to_string()));
        assert_eq!(store.refresh_token(), Some("r1".to_string()));

        expired.assert_async().await;
        refresh.assert_async().await;
        retried.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_failure_rejects_all_and_clears_tokens() {
        setup_logger();
        let mut server = Server::new_async().await;

        let _expired = server
            .mock("GET", "/bookings")
            .with_status(401)
            .with_body(r#"{"detail": "token expired"}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let _refresh = server
            .mock("POST", "/auth/token/refresh/")
            .with_status(401)
            .with_body(r#"{"detail": "refresh token blacklisted"}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let store = seeded_store("a1", "r1");
        let client = create_client(&server, Arc::clone(&store));

        let first = client.send::<(), serde_json::Value>(Method::GET, "/bookings", None);
        let second = client.send::<(), serde_json::Value>(Method::GET, "/bookings", None);
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first, Err(AppError::SessionExpired)));
        assert!(matches!(second, Err(AppError::SessionExpired)));
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
    }

    #[tokio::test]
    async fn test_second_401_is_not_retried_again() {
        setup_logger();
        let mut server = Server::new_async().await;

        let expired = server
            .mock("GET", "/schedule")
            .match_header("authorization", "Bearer a1")
            .with_status(401)
            .with_body(r#"{"detail": "token expired"}"#)
            .expect(1)
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "a2"}"#)
            .expect(1)
            .create_async()
            .await;

        let still_rejected = server
            .mock("GET", "/schedule")
            .match_header("authorization", "Bearer a2")
            .with_status(401)
            .with_body(r#"{"detail": "account disabled"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = seeded_store("a1", "r1");
        let client = create_client(&server, store);

        let result = client
            .send::<(), serde_json::Value>(Method::GET, "/schedule", None)
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
        expired.assert_async().await;
        refresh.assert_async().await;
        still_rejected.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_refresh_token_forces_logout() {
        setup_logger();
        let mut server = Server::new_async().await;

        let _expired = server
            .mock("GET", "/bookings")
            .with_status(401)
            .with_body(r#"{"detail": "token expired"}"#)
            .create_async()
            .await;

        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        store.update_access("a1");
        let client = create_client(&server, Arc::clone(&store));

        let result = client
            .send::<(), serde_json::Value>(Method::GET, "/bookings", None)
            .await;

        assert!(matches!(result, Err(AppError::SessionExpired)));
        assert_eq!(store.access_token(), None);
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        setup_logger();
        let mut server = Server::new_async().await;

        let _expired = server
            .mock("GET", "/bookings")
            .match_header("authorization", "Bearer a1")
            .with_status(401)
            .with_body(r#"{"detail": "token expired"}"#)
            .create_async()
            .await;

        let _refresh = server
            .mock("POST", "/auth/token/refresh/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "a2", "refresh": "r2"}"#)
            .create_async()
            .await;

        let _retried = server
            .mock("GET", "/bookings")
            .match_header("authorization", "Bearer a2")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": []}"#)
            .create_async()
            .await;

        let store = seeded_store("a1", "r1");
        let client = create_client(&server, Arc::clone(&store));

        client
            .send::<(), serde_json::Value>(Method::GET, "/bookings", None)
            .await
            .unwrap();

        assert_eq!(store.access_token(), Some("a2".to_string()));
        assert_eq!(store.refresh_token(), Some("r2".to_string()));
    }

    #[tokio::test]
    async fn test_non_401_errors_pass_through_unchanged() {
        setup_logger();
        let mut server = Server::new_async().await;

        let _boom = server
            .mock("GET", "/bookings")
            .with_status(500)
            .with_body(r#"{"detail": "server error"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = seeded_store("a1", "r1");
        let client = create_client(&server, Arc::clone(&store));

        let result = client
            .send::<(), serde_json::Value>(Method::GET, "/bookings", None)
            .await;

        match result {
            Err(AppError::Api { status, detail }) => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(detail, "server error");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        // Tokens are untouched: only auth failures tear the session down.
        assert_eq!(store.access_token(), Some("a1".to_string()));
    }
}
