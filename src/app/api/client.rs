use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app::api::transport::{HttpTransport, Transport, TransportResponse};
use crate::app::cache::ResourceKind;
use crate::app::config::ServerConfig;
use crate::app::error::ClientError;
use crate::app::song::LibraryResponse;

pub const ENDPOINT_FULL_LIBRARY: &str = "get_full_library";
pub const ENDPOINT_COVER_ART: &str = "get_cover_art";
pub const ENDPOINT_SONG_FILE: &str = "get_song_file";
pub const ENDPOINT_LOGIN: &str = "login";

/// Largest cover edge the server accepts
pub const MAX_COVER_SIZE: u32 = 1000;

/// Transcoding parameters sent with `get_song_file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeOptions {
    pub transcode: bool,
    pub format: String,
    pub bitrate: u32,
    /// Loudness target in LUFS, 0 disables normalisation
    pub target_lufs: f32,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            transcode: false,
            format: "mp3".to_string(),
            bitrate: 192,
            target_lufs: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub username: String,
    pub session_key: String,
}

/// Binary body of a cover or audio response.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPayload {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl From<TransportResponse> for MediaPayload {
    fn from(response: TransportResponse) -> Self {
        Self {
            data: response.body,
            content_type: response.content_type,
        }
    }
}

/// Typed wrapper around the library server's REST endpoints.
///
/// The access token travels in every request body as `access_token`.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    access_token: String,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, access_token: impl Into<String>) -> Self {
        Self {
            transport,
            access_token: access_token.into(),
        }
    }

    /// Build a client for the configured server, logging in first when only
    /// credentials are configured.
    pub async fn connect(server: &ServerConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&server.base_url, server.timeout())?;
        Self::connect_with(Arc::new(transport), server).await
    }

    pub async fn connect_with(
        transport: Arc<dyn Transport>,
        server: &ServerConfig,
    ) -> Result<Self, ClientError> {
        if server.should_login() {
            let login = Self::login(transport.as_ref(), &server.email, &server.password).await?;
            log::info!("Logged in to {} as {}", server.base_url, login.username);
            return Ok(Self::new(transport, login.session_key));
        }
        if server.access_token.is_empty() {
            log::warn!("No access token configured for {}", server.base_url);
        }
        Ok(Self::new(transport, server.access_token.clone()))
    }

    /// Exchange credentials for a session key usable as access token.
    pub async fn login(
        transport: &dyn Transport,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let body = json!({ "email": email, "password": password });
        let response = transport.post_json(ENDPOINT_LOGIN, &[], body).await?;
        let response = check_status(ENDPOINT_LOGIN, response)?;
        decode_json(ENDPOINT_LOGIN, &response)
    }

    pub async fn full_library(&self) -> Result<LibraryResponse, ClientError> {
        let body = json!({ "access_token": self.access_token });
        let response = self
            .transport
            .post_json(ENDPOINT_FULL_LIBRARY, &[], body)
            .await?;
        let response = check_status(ENDPOINT_FULL_LIBRARY, response)?;
        decode_json(ENDPOINT_FULL_LIBRARY, &response)
    }

    /// Fetch cover art scaled to fit `size` pixels (clamped to `1..=1000`).
    pub async fn cover_art(&self, song_hash: &str, size: u32) -> Result<MediaPayload, ClientError> {
        let size = size.clamp(1, MAX_COVER_SIZE);
        let body = json!({ "song_hash": song_hash, "access_token": self.access_token });
        let response = self
            .transport
            .post_json(ENDPOINT_COVER_ART, &[("size", size.to_string())], body)
            .await?;
        check_media(ResourceKind::Cover, song_hash, response)
    }

    pub async fn song_file(
        &self,
        song_hash: &str,
        options: &TranscodeOptions,
    ) -> Result<MediaPayload, ClientError> {
        let body = json!({
            "song_hash": song_hash,
            "access_token": self.access_token,
            "transcode": options.transcode,
            "format": options.format,
            "bitrate": options.bitrate,
            "target_lufs": options.target_lufs,
        });
        let response = self
            .transport
            .post_json(ENDPOINT_SONG_FILE, &[], body)
            .await?;
        check_media(ResourceKind::Audio, song_hash, response)
    }
}

fn check_status(
    endpoint: &'static str,
    response: TransportResponse,
) -> Result<TransportResponse, ClientError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(ClientError::from_auth_status(response.status).unwrap_or(ClientError::Unexpected {
        endpoint,
        status: response.status,
    }))
}

fn check_media(
    kind: ResourceKind,
    song_hash: &str,
    response: TransportResponse,
) -> Result<MediaPayload, ClientError> {
    if response.is_success() {
        return Ok(response.into());
    }
    Err(ClientError::from_auth_status(response.status).unwrap_or_else(|| {
        ClientError::Resolution {
            kind,
            hash: song_hash.to_string(),
            status: response.status,
        }
    }))
}

fn decode_json<T: for<'de> Deserialize<'de>>(
    endpoint: &'static str,
    response: &TransportResponse,
) -> Result<T, ClientError> {
    serde_json::from_slice(&response.body).map_err(|e| ClientError::Decode {
        endpoint,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::api::transport::mock::MockTransport;

    #[tokio::test]
    async fn test_full_library_sends_token_in_body() {
        let transport = MockTransport::new(|_, _, _| {
            Ok(TransportResponse::json(json!({"songs": [], "albums": [], "artists": []})))
        });
        let client = ApiClient::new(transport.clone(), "secret");

        client.full_library().await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].endpoint, ENDPOINT_FULL_LIBRARY);
        assert_eq!(calls[0].body, json!({"access_token": "secret"}));
    }

    #[tokio::test]
    async fn test_full_library_maps_401_to_auth() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(401)));
        let client = ApiClient::new(transport, "bad");
        assert!(matches!(
            client.full_library().await,
            Err(ClientError::Auth { status: 401 })
        ));
    }

    #[tokio::test]
    async fn test_full_library_rejects_malformed_json() {
        let transport =
            MockTransport::new(|_, _, _| {
                Ok(TransportResponse::bytes(b"<html>".to_vec(), "text/html"))
            });
        let client = ApiClient::new(transport, "token");
        assert!(matches!(
            client.full_library().await,
            Err(ClientError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_cover_request_carries_clamped_size() {
        let transport =
            MockTransport::new(|_, _, _| {
                Ok(TransportResponse::bytes(vec![0xFF, 0xD8], "image/jpeg"))
            });
        let client = ApiClient::new(transport.clone(), "token");

        let payload = client.cover_art("abc", 5000).await.unwrap();

        assert_eq!(payload.data, vec![0xFF, 0xD8]);
        assert_eq!(payload.content_type.as_deref(), Some("image/jpeg"));
        let call = &transport.calls()[0];
        assert_eq!(call.query, vec![("size", "1000".to_string())]);
        assert_eq!(call.body["song_hash"], "abc");
    }

    #[tokio::test]
    async fn test_missing_cover_is_resolution_error() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(404)));
        let client = ApiClient::new(transport, "token");
        assert!(matches!(
            client.cover_art("abc", 300).await,
            Err(ClientError::Resolution {
                kind: ResourceKind::Cover,
                status: 404,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_song_file_sends_transcode_options() {
        let transport =
            MockTransport::new(|_, _, _| Ok(TransportResponse::bytes(vec![1, 2, 3], "audio/aac")));
        let client = ApiClient::new(transport.clone(), "token");
        let options = TranscodeOptions {
            transcode: true,
            format: "aac".to_string(),
            bitrate: 256,
            target_lufs: -14.0,
        };

        client.song_file("abc", &options).await.unwrap();

        let body = &transport.calls()[0].body;
        assert_eq!(body["transcode"], true);
        assert_eq!(body["format"], "aac");
        assert_eq!(body["bitrate"], 256);
        assert_eq!(body["target_lufs"], -14.0);
    }

    #[tokio::test]
    async fn test_login_returns_session_key() {
        let transport = MockTransport::new(|endpoint, _, body| {
            assert_eq!(endpoint, ENDPOINT_LOGIN);
            assert_eq!(body["email"], "me@example.com");
            Ok(TransportResponse::json(
                json!({"username": "me", "session_key": "sess-123"}),
            ))
        });
        let login = ApiClient::login(transport.as_ref(), "me@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(login.session_key, "sess-123");
        assert_eq!(login.username, "me");
    }

    #[tokio::test]
    async fn test_connect_uses_session_key_from_login() {
        let transport = MockTransport::new(|endpoint, _, _| match endpoint {
            ENDPOINT_LOGIN => Ok(TransportResponse::json(json!({"session_key": "sess"}))),
            _ => Ok(TransportResponse::json(json!({}))),
        });
        let server = ServerConfig {
            email: "me@example.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };

        let client = ApiClient::connect_with(transport.clone(), &server).await.unwrap();
        client.full_library().await.unwrap();

        assert_eq!(transport.calls()[0].endpoint, ENDPOINT_LOGIN);
        assert_eq!(transport.calls()[1].body["access_token"], "sess");
    }

    #[tokio::test]
    async fn test_connect_prefers_configured_token() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(200)));
        let server = ServerConfig {
            access_token: "configured".to_string(),
            email: "me@example.com".to_string(),
            password: "pw".to_string(),
            ..Default::default()
        };

        let client = ApiClient::connect_with(transport.clone(), &server).await.unwrap();
        assert_eq!(transport.call_count(), 0);

        let _ = client.full_library().await;
        assert_eq!(transport.calls()[0].body["access_token"], "configured");
    }

    #[tokio::test]
    async fn test_connect_rejected_login_is_auth_error() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(401)));
        let server = ServerConfig {
            email: "me@example.com".to_string(),
            password: "wrong".to_string(),
            ..Default::default()
        };
        let err = ApiClient::connect_with(transport, &server).await.unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn test_debug_redacts_token() {
        let transport = MockTransport::new(|_, _, _| Ok(TransportResponse::status(200)));
        let client = ApiClient::new(transport, "super-secret");
        assert!(!format!("{:?}", client).contains("super-secret"));
    }
}
