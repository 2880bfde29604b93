use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::app::error::ClientError;

/// Raw HTTP answer: status, content type and body bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the API client and the network.
///
/// Every endpoint of the library server is a JSON `POST`, optionally with
/// query parameters, so that is the only operation a transport offers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
        body: serde_json::Value,
    ) -> Result<TransportResponse, ClientError>;
}

/// reqwest-backed transport talking to a real server.
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
        body: serde_json::Value,
    ) -> Result<TransportResponse, ClientError> {
        let url = self.url(endpoint);
        log::debug!("POST {} {:?}", url, query);

        let response = self
            .http
            .post(&url)
            .query(query)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?
            .to_vec();

        crate::app::logging::log_server_request(endpoint, status, body.len());

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
impl TransportResponse {
    /// Empty response with the given status
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// 200 response carrying a JSON document
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: value.to_string().into_bytes(),
        }
    }

    /// 200 response carrying binary media
    pub fn bytes(body: impl Into<Vec<u8>>, content_type: &str) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.to_string()),
            body: body.into(),
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Query = [(&'static str, String)];
    type Reply = Result<TransportResponse, ClientError>;
    type Handler = Box<dyn Fn(&str, &Query, &serde_json::Value) -> Reply + Send + Sync>;

    /// A request seen by [`MockTransport`].
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub endpoint: String,
        pub query: Vec<(&'static str, String)>,
        pub body: serde_json::Value,
    }

    /// In-memory transport that answers through a closure and records calls.
    pub struct MockTransport {
        handler: Mutex<Handler>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockTransport {
        pub fn new(
            handler: impl Fn(&str, &Query, &serde_json::Value) -> Reply + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                handler: Mutex::new(Box::new(handler)),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn set_handler(
            &self,
            handler: impl Fn(&str, &Query, &serde_json::Value) -> Reply + Send + Sync + 'static,
        ) {
            *self.handler.lock().unwrap() = Box::new(handler);
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls_to(&self, endpoint: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.endpoint == endpoint)
                .count()
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_json(
            &self,
            endpoint: &str,
            query: &[(&'static str, String)],
            body: serde_json::Value,
        ) -> Result<TransportResponse, ClientError> {
            self.calls.lock().unwrap().push(RecordedCall {
                endpoint: endpoint.to_string(),
                query: query.to_vec(),
                body: body.clone(),
            });
            let handler = self.handler.lock().unwrap();
            handler(endpoint, query, &body)
        }
    }
}
