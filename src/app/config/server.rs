use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base URL of the library server
    #[serde(default = "ServerConfig::default_base_url")]
    pub base_url: String,
    /// Token sent as `access_token`; may be left empty when logging in
    #[serde(default)]
    pub access_token: String,
    /// Account used to obtain a session key when no token is set
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Per-request timeout in seconds
    #[serde(default = "ServerConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    fn default_base_url() -> String {
        "http://127.0.0.1:8000".to_string()
    }

    fn default_timeout_secs() -> u64 {
        60
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Credentials are only used when no access token is configured.
    pub fn should_login(&self) -> bool {
        self.access_token.is_empty() && !self.email.is_empty() && !self.password.is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            access_token: String::new(),
            email: String::new(),
            password: String::new(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}
