use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::{
    application::models::auth::{
        BarberRegistration, ClientRegistration, Credentials, Detail, PasswordResetConfirm,
        PasswordResetRequest, RefreshRequest, RefreshResponse, TokenPair,
    },
    application::models::user::User,
    error::AppError,
    transport::http_client::HttpClient,
};

const LOGIN_PATH: &str = "/auth/login/";
const LOGOUT_PATH: &str = "/auth/logout/";
const REFRESH_PATH: &str = "/auth/token/refresh/";
const REGISTER_CLIENT_PATH: &str = "/auth/register/client/";
const REGISTER_BARBER_PATH: &str = "/auth/register/barber/";
const PASSWORD_RESET_PATH: &str = "/auth/password-reset/";
const PASSWORD_RESET_CONFIRM_PATH: &str = "/auth/password-reset/confirm/";
pub(crate) const CURRENT_USER_PATH: &str = "/auth/users/me/";

/// The `/auth/` surface of the backend. Endpoints here manage tokens
/// explicitly, so they talk to the raw transport rather than the
/// authorized request path.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchanges credentials for a token pair.
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AppError>;

    /// Exchanges the refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError>;

    /// Invalidates the refresh token server side.
    async fn logout(&self, refresh_token: &str) -> Result<(), AppError>;

    async fn register_client(&self, registration: &ClientRegistration) -> Result<User, AppError>;

    async fn register_barber(&self, registration: &BarberRegistration) -> Result<User, AppError>;

    async fn request_password_reset(&self, email: &str) -> Result<Detail, AppError>;

    async fn confirm_password_reset(
        &self,
        confirmation: &PasswordResetConfirm,
    ) -> Result<Detail, AppError>;

    /// Confirms the address behind an emailed verification token.
    async fn verify_email(&self, token: &str) -> Result<Detail, AppError>;
}

pub struct AuthClient<C: HttpClient> {
    client: Arc<C>,
}

impl<C: HttpClient> AuthClient<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

impl<C: HttpClient> Clone for AuthClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

#[async_trait]
impl<C: HttpClient + 'static> AuthApi for AuthClient<C> {
    #[instrument(skip(self, credentials))]
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair, AppError> {
        credentials.validate()?;
        info!("Logging in {}", credentials.email);

        self.client
            .request(Method::POST, LOGIN_PATH, None, Some(credentials))
            .await
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        debug!("Exchanging refresh token for a new access token");
        let body = RefreshRequest {
            refresh: refresh_token.to_string(),
        };

        self.client
            .request(Method::POST, REFRESH_PATH, None, Some(&body))
            .await
    }

    #[instrument(skip(self, refresh_token))]
    async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let body = RefreshRequest {
            refresh: refresh_token.to_string(),
        };

        self.client
            .request(Method::POST, LOGOUT_PATH, None, Some(&body))
            .await
    }

    #[instrument(skip(self, registration))]
    async fn register_client(&self, registration: &ClientRegistration) -> Result<User, AppError> {
        registration.validate()?;
        info!("Registering client {}", registration.email);

        self.client
            .request(Method::POST, REGISTER_CLIENT_PATH, None, Some(registration))
            .await
    }

    #[instrument(skip(self, registration))]
    async fn register_barber(&self, registration: &BarberRegistration) -> Result<User, AppError> {
        registration.validate()?;
        info!("Registering barber {}", registration.email);

        self.client
            .request(Method::POST, REGISTER_BARBER_PATH, None, Some(registration))
            .await
    }

    #[instrument(skip(self, email))]
    async fn request_password_reset(&self, email: &str) -> Result<Detail, AppError> {
        let body = PasswordResetRequest {
            email: email.to_string(),
        };

        self.client
            .request(Method::POST, PASSWORD_RESET_PATH, None, Some(&body))
            .await
    }

    #[instrument(skip(self, confirmation))]
    async fn confirm_password_reset(
        &self,
        confirmation: &PasswordResetConfirm,
    ) -> Result<Detail, AppError> {
        confirmation.validate()?;

        self.client
            .request(
                Method::POST,
                PASSWORD_RESET_CONFIRM_PATH,
                None,
                Some(confirmation),
            )
            .await
    }

    #[instrument(skip(self, token))]
    async fn verify_email(&self, token: &str) -> Result<Detail, AppError> {
        let path = format!("/auth/verify-email/{token}/");

        self.client
            .request::<(), _>(Method::GET, &path, None, None)
            .await
    }
}
