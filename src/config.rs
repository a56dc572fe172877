use crate::constants::DEFAULT_REST_TIMEOUT;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub rest_api: RestApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestApiConfig {
    pub base_url: String,
    pub timeout: u64,
}

/// Where the persisted token pair lives on disk.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub token_path: String,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"rest_api\":{},\"storage\":{}}}",
            self.rest_api, self.storage
        )
    }
}

impl fmt::Display for RestApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{}}}",
            self.base_url, self.timeout
        )
    }
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"token_path\":\"{}\"}}", self.token_path)
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            rest_api: RestApiConfig {
                base_url: get_env_or_default(
                    "BARBERSHOP_API_BASE_URL",
                    String::from("http://localhost:8000/api"),
                ),
                timeout: get_env_or_default("BARBERSHOP_REST_TIMEOUT", DEFAULT_REST_TIMEOUT),
            },
            storage: StorageConfig {
                token_path: get_env_or_default(
                    "BARBERSHOP_TOKEN_PATH",
                    String::from(".barbershop_tokens.json"),
                ),
            },
        }
    }
}
