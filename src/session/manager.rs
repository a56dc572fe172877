use reqwest::Method;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::models::auth::Credentials,
    application::models::profile::Profile,
    application::models::user::User,
    application::services::auth_client::{AuthApi, AuthClient, CURRENT_USER_PATH},
    application::services::profile_client::{ProfileApi, ProfileClient},
    config::Config,
    error::{AppError, AuthError},
    session::state::SessionState,
    storage::tokens::{FileTokenStore, TokenStore},
    transport::authenticated::AuthenticatedClient,
    transport::http_client::{HttpClient, ReqwestClient},
};

/// Owns the whole session: token store, raw auth endpoints, the authorized
/// request path and the in-memory state. Application code holds one of
/// these at its root and passes it down; there is no module-level mutable
/// state anywhere in the crate.
pub struct SessionManager<C: HttpClient> {
    auth: AuthClient<C>,
    profiles: ProfileClient<C>,
    http: Arc<AuthenticatedClient<C>>,
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl SessionManager<ReqwestClient> {
    /// Production wiring: `reqwest` transport and a file-backed token store.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = Arc::new(ReqwestClient::from_config(config)?);
        let store: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::new(&config.storage.token_path));
        Ok(Self::new(client, store))
    }
}

impl<C: HttpClient + 'static> SessionManager<C> {
    pub fn new(client: Arc<C>, store: Arc<dyn TokenStore>) -> Self {
        let auth = AuthClient::new(Arc::clone(&client));
        let http = Arc::new(AuthenticatedClient::new(client, Arc::clone(&store)));
        let profiles = ProfileClient::new(Arc::clone(&http));
        Self {
            auth,
            profiles,
            http,
            store,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// The authorized request path, for service wrappers layered on top of
    /// the session (bookings, schedules, ...).
    pub fn http(&self) -> Arc<AuthenticatedClient<C>> {
        Arc::clone(&self.http)
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_state(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }

    /// Rebuilds the session from persisted tokens. Called once on startup.
    /// A missing refresh token simply yields a logged-out state; any
    /// failure while fetching the user or profile forces full logout and
    /// propagates.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<SessionState, AuthError> {
        if self.store.refresh_token().is_none() {
            debug!("No persisted refresh token, starting logged out");
            self.with_state(SessionState::reset);
            return Ok(self.snapshot());
        }

        match self.load_identity().await {
            Ok((user, profile)) => {
                info!("Session restored for {}", user.email);
                self.with_state(|s| s.establish(user, profile));
                Ok(self.snapshot())
            }
            Err(e) => {
                warn!("Hydration failed, forcing logout: {}", e);
                self.force_logout_local();
                Err(e)
            }
        }
    }

    /// Submits credentials and, on success, runs the same user+profile
    /// sequence hydration uses. Errors propagate to the caller for inline
    /// display.
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionState, AuthError> {
        self.with_state(|s| s.is_logging_in = true);
        let result = self.login_inner(credentials).await;
        self.with_state(|s| s.is_logging_in = false);
        result
    }

    async fn login_inner(&self, credentials: &Credentials) -> Result<SessionState, AuthError> {
        let pair = self.auth.login(credentials).await?;
        self.store.save(&pair);
        info!("Logged in {}", credentials.email);

        match self.load_identity().await {
            Ok((user, profile)) => {
                self.with_state(|s| s.establish(user, profile));
                Ok(self.snapshot())
            }
            Err(e) => {
                warn!("Post-login identity fetch failed: {}", e);
                self.force_logout_local();
                Err(e)
            }
        }
    }

    /// Tells the backend to drop the refresh token, then clears local
    /// state unconditionally. The remote call is best-effort: a dead
    /// backend must not keep a user logged in.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> SessionState {
        self.with_state(|s| s.is_logging_out = true);

        if let Some(refresh_token) = self.store.refresh_token() {
            if let Err(e) = self.auth.logout(&refresh_token).await {
                warn!("Remote logout failed, clearing local session anyway: {}", e);
            }
        }

        self.force_logout_local();
        self.snapshot()
    }

    async fn load_identity(&self) -> Result<(User, Profile), AuthError> {
        let user: User = self
            .http
            .send::<(), User>(Method::GET, CURRENT_USER_PATH, None)
            .await
            .map_err(AuthError::from)?;

        self.with_state(|s| s.is_fetching_profile = true);
        let profile = self.profiles.fetch(user.role).await;
        self.with_state(|s| s.is_fetching_profile = false);

        Ok((user, profile.map_err(AuthError::from)?))
    }

    fn force_logout_local(&self) {
        self.store.clear();
        self.with_state(SessionState::reset);
    }
}
