use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    application::models::profile::{AdminProfile, BarberProfile, ClientProfile, Profile},
    application::models::user::Role,
    error::AppError,
    transport::authenticated::AuthenticatedClient,
    transport::http_client::{FileUpload, HttpClient},
};

/// Role-specific profile surface. Each role has its own endpoint; the
/// dispatch is a closed match over [`Role`] so a new role cannot be added
/// without the compiler pointing here.
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn fetch(&self, role: Role) -> Result<Profile, AppError>;

    /// Replaces the profile image (`multipart/form-data`) and returns the
    /// updated profile.
    async fn upload_image(&self, role: Role, upload: &FileUpload) -> Result<Profile, AppError>;
}

pub struct ProfileClient<C: HttpClient> {
    http: Arc<AuthenticatedClient<C>>,
}

impl<C: HttpClient + 'static> ProfileClient<C> {
    pub fn new(http: Arc<AuthenticatedClient<C>>) -> Self {
        Self { http }
    }

    fn image_path(role: Role) -> String {
        format!("{}image/", role.profile_path())
    }
}

#[async_trait]
impl<C: HttpClient + 'static> ProfileApi for ProfileClient<C> {
    #[instrument(skip(self))]
    async fn fetch(&self, role: Role) -> Result<Profile, AppError> {
        debug!("Fetching {} profile", role);
        let path = role.profile_path();

        match role {
            Role::Admin => self
                .http
                .send::<(), AdminProfile>(Method::GET, path, None)
                .await
                .map(Profile::Admin),
            Role::Barber => self
                .http
                .send::<(), BarberProfile>(Method::GET, path, None)
                .await
                .map(Profile::Barber),
            Role::Client => self
                .http
                .send::<(), ClientProfile>(Method::GET, path, None)
                .await
                .map(Profile::Client),
        }
    }

    #[instrument(skip(self, upload))]
    async fn upload_image(&self, role: Role, upload: &FileUpload) -> Result<Profile, AppError> {
        debug!("Uploading {} profile image ({})", role, upload.file_name);
        let path = Self::image_path(role);

        match role {
            Role::Admin => self
                .http
                .send_multipart::<AdminProfile>(Method::POST, &path, upload)
                .await
                .map(Profile::Admin),
            Role::Barber => self
                .http
                .send_multipart::<BarberProfile>(Method::POST, &path, upload)
                .await
                .map(Profile::Barber),
            Role::Client => self
                .http
                .send_multipart::<ClientProfile>(Method::POST, &path, upload)
                .await
                .map(Profile::Client),
        }
    }
}
