use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use super::Tracker;
use crate::config::ApiSettings;
use crate::error::{BootstrapError, BootstrapResult};
use crate::model::entity::EntityKind;
use crate::model::record::RemoteRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TOKEN_HEADER: &str = "Shortcut-Token";

/// REST client for the Shortcut v3 API.
pub struct ShortcutClient {
    settings: ApiSettings,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl ShortcutClient {
    pub fn new(settings: ApiSettings) -> BootstrapResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BootstrapError::http("build HTTP client", e))?;
        Ok(Self {
            settings,
            retry: RetryPolicy::default(),
            client,
        })
    }

    #[cfg(test)]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.base_url)
    }

    /// Send one logical request, retrying transient statuses. Whatever the
    /// last attempt returned is handed back, successful or not.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        context: &str,
    ) -> BootstrapResult<Response> {
        let url = self.url(path);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let mut request = self
                .client
                .request(method.clone(), &url)
                .header(TOKEN_HEADER, &self.settings.token)
                .header(CONTENT_TYPE, "application/json");
            if let Some(json) = body {
                request = request.json(json);
            }

            debug!(method = %method, url = %url, attempt, "Sending request");
            let resp = request
                .send()
                .await
                .map_err(|e| BootstrapError::http(context, e))?;
            let status = resp.status();
            debug!(url = %url, status = %status, attempt, "Received response");

            if self.retry.is_retryable(status) && attempt < self.retry.max_attempts {
                let wait = self.retry.backoff(attempt);
                warn!(
                    url = %url,
                    status = %status,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "Transient error, retrying with backoff"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            return Ok(resp);
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        context: &str,
    ) -> BootstrapResult<T> {
        let resp = self.send(method, path, body, context).await?;
        decode(resp, context).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response, context: &str) -> BootstrapResult<T> {
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| BootstrapError::http(context, e))?;
    if !status.is_success() {
        return Err(BootstrapError::Api {
            context: context.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl Tracker for ShortcutClient {
    async fn list(&self, kind: EntityKind) -> BootstrapResult<Vec<RemoteRecord>> {
        let context = format!("list {}", kind.plural());
        self.call(Method::GET, kind.collection_path(), None, &context)
            .await
    }

    async fn create(&self, kind: EntityKind, payload: &Value) -> BootstrapResult<RemoteRecord> {
        let context = format!("create {kind}");
        self.call(Method::POST, kind.collection_path(), Some(payload), &context)
            .await
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: i64,
        payload: &Value,
    ) -> BootstrapResult<RemoteRecord> {
        let context = format!("update {kind}");
        let path = format!("{}/{id}", kind.collection_path());
        self.call(Method::PUT, &path, Some(payload), &context).await
    }
}
