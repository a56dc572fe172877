pub mod auth_client;
pub mod profile_client;
