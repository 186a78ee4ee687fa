use std::{sync::Arc, time::Duration};

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::ApiError;

/// Supplies the bearer token attached to outgoing requests.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `https://host/api`; endpoint paths
    /// are appended to it. Without `timeout` requests wait indefinitely.
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build().map_err(ApiError::Transport)?,
            base_url: parsed.as_str().trim_end_matches('/').to_owned(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?)
    }

    /// Sends one request and returns the decoded JSON body (`Null` when the
    /// body is empty). Failed requests are never retried.
    #[tracing::instrument(skip(self, method, query, body), fields(method = %method))]
    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let mut request = self.http.request(method, self.url(path)?);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(token) = self.tokens.bearer_token() {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            tracing::error!(err = %err, "request failed before a response arrived");
            ApiError::Transport(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::Transport)?;

        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "request succeeded");

            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }

            return Ok(serde_json::from_slice(&bytes)?);
        }

        let err = ApiError::from_response(status, &bytes);
        if err.is_unauthenticated() {
            tracing::warn!("request rejected as unauthenticated");
        } else {
            tracing::warn!(status = status.as_u16(), err = %err, "request failed");
        }

        Err(err)
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send::<()>(Method::GET, path, &[], None).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send::<()>(Method::DELETE, path, &[], None).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        self.send(Method::POST, path, &[], body).await
    }

    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }
}

pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
