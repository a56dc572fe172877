pub(crate) const ACCESS_TOKEN_KEY: &str = "access_token";
pub(crate) const REFRESH_TOKEN_KEY: &str = "refresh_token";

pub(crate) const DEFAULT_REST_TIMEOUT: u64 = 30;
