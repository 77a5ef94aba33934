//! Minimal HTTP seam shared by the weather provider and the chat backends.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can perform a GET or a JSON POST.
///
/// An `Err` means no HTTP status was obtained at all (DNS, refused, timeout, ...).
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply>;

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpReply>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        Ok(HttpReply { status, body })
    }

    async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpReply> {
        let mut req = self.http.post(url).json(body);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let res = req
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        Ok(HttpReply { status, body })
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Answers requests whose URL ends with a registered suffix.
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        routes: Vec<(String, std::result::Result<HttpReply, String>)>,
        pub calls: Mutex<Vec<String>>,
        /// Query pairs of each GET, in call order.
        pub queries: Mutex<Vec<Vec<(String, String)>>>,
        pub posted: Mutex<Vec<serde_json::Value>>,
    }

    impl ScriptedTransport {
        pub fn reply(mut self, suffix: &str, status: u16, body: impl Into<String>) -> Self {
            self.routes
                .push((suffix.to_string(), Ok(HttpReply { status, body: body.into() })));
            self
        }

        pub fn fail(mut self, suffix: &str, message: &str) -> Self {
            self.routes.push((suffix.to_string(), Err(message.to_string())));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn answer(&self, url: &str) -> Result<HttpReply> {
            self.calls.lock().unwrap().push(url.to_string());

            match self.routes.iter().find(|(suffix, _)| url.ends_with(suffix.as_str())) {
                Some((_, Ok(reply))) => Ok(reply.clone()),
                Some((_, Err(message))) => Err(anyhow::anyhow!(message.clone())),
                None => Err(anyhow::anyhow!("no scripted route for {url}")),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpReply> {
            self.queries
                .lock()
                .unwrap()
                .push(query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect());
            self.answer(url)
        }

        async fn post_json(
            &self,
            url: &str,
            _headers: &[(&str, &str)],
            body: &serde_json::Value,
        ) -> Result<HttpReply> {
            self.posted.lock().unwrap().push(body.clone());
            self.answer(url)
        }
    }
}
