#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method};
use serde_json::Value;

use super::config::CloudflareConfig;
use super::error::{ApiErrorEnvelope, CfError};

/// Raw access to the upstream API. Paths are relative to the configured base
/// URL; responses are the decoded JSON body, or `Value::Null` when empty.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, CfError>;
    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, CfError>;
    async fn put(&self, path: &str, body: Value) -> Result<Value, CfError>;
    async fn delete(&self, path: &str) -> Result<Value, CfError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
    api_token: String,
}

impl HttpTransport {
    pub fn new(cfg: &CloudflareConfig) -> Result<Self, CfError> {
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(CfError::from_reqwest)?;
        let api_token = cfg
            .api_token
            .clone()
            .ok_or(CfError::MissingConfig(vec!["CF_API_TOKEN"]))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, CfError> {
        let mut request = self
            .http
            .request(method, self.endpoint(path))
            .bearer_auth(&self.api_token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(CfError::from_reqwest)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(CfError::from_reqwest)?;

        if !status.is_success() {
            let errors = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .map(|env| env.errors)
                .unwrap_or_default();
            return Err(CfError::Api { status, errors });
        }
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(CfError::Decode)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, CfError> {
        self.send(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, CfError> {
        self.send(Method::POST, path, &[], body).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, CfError> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value, CfError> {
        self.send(Method::DELETE, path, &[], None).await
    }
}

#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[cfg(test)]
/// Scripted transport: answers calls from a FIFO queue and records every request.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value, CfError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, resp: Result<Value, CfError>) {
        self.responses.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_with(&self, method: Method) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.method == method).collect()
    }

    fn answer(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, CfError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CfError::MockQueueEmpty))
    }
}

#[cfg(test)]
#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, CfError> {
        self.answer(Method::GET, path, query, None)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, CfError> {
        self.answer(Method::POST, path, &[], body)
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, CfError> {
        self.answer(Method::PUT, path, &[], Some(body))
    }

    async fn delete(&self, path: &str) -> Result<Value, CfError> {
        self.answer(Method::DELETE, path, &[], None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_joins_base_and_path_without_double_slash() {
        let cfg = CloudflareConfig {
            api_token: Some("tok".into()),
            base_url: "http://localhost:9000/client/v4/".into(),
            ..CloudflareConfig::default()
        };
        let transport = HttpTransport::new(&cfg).unwrap();
        assert_eq!(
            transport.endpoint("/zones/z/email/routing/rules"),
            "http://localhost:9000/client/v4/zones/z/email/routing/rules"
        );
    }

    #[test]
    fn http_transport_requires_a_token() {
        let cfg = CloudflareConfig::default();
        assert!(matches!(
            HttpTransport::new(&cfg),
            Err(CfError::MissingConfig(names)) if names == vec!["CF_API_TOKEN"]
        ));
    }

    #[tokio::test]
    async fn mock_transport_replays_queue_and_records_calls() {
        let mock = MockTransport::new();
        mock.push_response(Ok(json!({"success": true})));

        let out = mock.put("/rules/a", json!({"enabled": true})).await.unwrap();
        assert_eq!(out, json!({"success": true}));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::PUT);
        assert_eq!(calls[0].body, Some(json!({"enabled": true})));

        let err = mock.delete("/rules/a").await.unwrap_err();
        assert!(matches!(err, CfError::MockQueueEmpty));
        assert!(!err.is_retryable());
    }
}
