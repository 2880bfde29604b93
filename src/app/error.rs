use crate::app::cache::ResourceKind;

/// Errors raised while talking to the library server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the access token (HTTP 401/403).
    #[error("access token rejected by server (HTTP {status})")]
    Auth { status: u16 },
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// Cover or audio endpoint answered with a non-success status.
    #[error("could not resolve {kind} for song {hash} (HTTP {status})")]
    Resolution {
        kind: ResourceKind,
        hash: String,
        status: u16,
    },
    #[error("malformed response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
    #[error("unexpected HTTP {status} from {endpoint}")]
    Unexpected { endpoint: &'static str, status: u16 },
}

impl ClientError {
    /// Map an auth-related status code, if it is one.
    pub fn from_auth_status(status: u16) -> Option<Self> {
        matches!(status, 401 | 403).then_some(Self::Auth { status })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_status_mapping() {
        assert!(ClientError::from_auth_status(401).is_some_and(|e| e.is_auth()));
        assert!(ClientError::from_auth_status(403).is_some());
        assert!(ClientError::from_auth_status(404).is_none());
        assert!(ClientError::from_auth_status(500).is_none());
    }

    #[test]
    fn test_resolution_message_names_resource() {
        let err = ClientError::Resolution {
            kind: ResourceKind::Audio,
            hash: "abc".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "could not resolve audio for song abc (HTTP 404)"
        );
    }
}
