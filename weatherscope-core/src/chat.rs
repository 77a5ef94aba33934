//! Weather assistant chat: a stateless relay plus the caller-side message log.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::{fmt::Debug, sync::Arc, time::Instant};
use tracing::{debug, warn};

use crate::{
    config::ChatConfig,
    model::{ChatMessage, ChatRole},
    provider::http::{HttpTransport, truncate_body},
};

pub const SYSTEM_PROMPT: &str = "You are a friendly weather assistant chatbot. \
    Answer questions about weather based on city names. \
    If you are unsure, respond helpfully and politely.";

/// Returned whenever no usable reply could be obtained.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't reach the weather assistant right now. Please try again later.";

pub const GREETING: &str = "Hi! Ask me about any city's weather.";

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// One upstream round trip. `Ok(None)` means the provider answered with no content.
#[async_trait]
pub trait ChatBackend: Send + Sync + Debug {
    async fn complete(&self, message: &str) -> Result<Option<String>>;
}

/// Posts `{ "message": .. }` to a relay endpoint and reads `{ "reply": .. }`.
#[derive(Debug, Clone)]
pub struct EndpointChat {
    endpoint: String,
    http: Arc<dyn HttpTransport>,
}

impl EndpointChat {
    pub fn new(endpoint: String, http: Arc<dyn HttpTransport>) -> Self {
        Self { endpoint, http }
    }
}

#[async_trait]
impl ChatBackend for EndpointChat {
    async fn complete(&self, message: &str) -> Result<Option<String>> {
        #[derive(Deserialize)]
        struct RelayResponse {
            reply: Option<String>,
        }

        let start = Instant::now();
        let res = self
            .http
            .post_json(&self.endpoint, &[], &json!({ "message": message }))
            .await?;

        debug!(
            "Chat relay response - status={}, duration={:.2}s",
            res.status,
            start.elapsed().as_secs_f32()
        );

        if !res.is_success() {
            return Err(anyhow!(
                "Chat relay failed with status {}: {}",
                res.status,
                truncate_body(&res.body)
            ));
        }

        let parsed: RelayResponse =
            serde_json::from_str(&res.body).context("Failed to parse chat relay JSON")?;
        Ok(parsed.reply)
    }
}

/// Calls an OpenAI-style chat completion endpoint on OpenRouter.
#[derive(Debug, Clone)]
pub struct OpenRouterChat {
    api_key: String,
    model: String,
    max_tokens: u32,
    url: String,
    http: Arc<dyn HttpTransport>,
}

impl OpenRouterChat {
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: u32,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            api_key,
            model,
            max_tokens,
            url: OPENROUTER_URL.to_string(),
            http,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl ChatBackend for OpenRouterChat {
    async fn complete(&self, message: &str) -> Result<Option<String>> {
        #[derive(Deserialize)]
        struct CompletionMessage {
            content: Option<String>,
        }

        #[derive(Deserialize)]
        struct CompletionChoice {
            message: Option<CompletionMessage>,
        }

        #[derive(Deserialize)]
        struct CompletionResponse {
            #[serde(default)]
            choices: Vec<CompletionChoice>,
        }

        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": message },
            ],
        });
        let auth = format!("Bearer {}", self.api_key);
        let start = Instant::now();

        let res = self
            .http
            .post_json(
                &self.url,
                &[("Authorization", auth.as_str()), ("X-Title", "WeatherScope AI Chatbot")],
                &body,
            )
            .await?;

        debug!(
            "OpenRouter response - model={}, status={}, duration={:.2}s",
            self.model,
            res.status,
            start.elapsed().as_secs_f32()
        );

        if !res.is_success() {
            return Err(anyhow!(
                "OpenRouter request failed with status {}: {}",
                res.status,
                truncate_body(&res.body)
            ));
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&res.body).context("Failed to parse OpenRouter JSON")?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content))
    }
}

/// Pick a backend from config: relay endpoint first, then OpenRouter.
pub fn backend_from_config(
    config: &ChatConfig,
    http: Arc<dyn HttpTransport>,
) -> Result<Box<dyn ChatBackend>> {
    if let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
        return Ok(Box::new(EndpointChat::new(endpoint.to_string(), http)));
    }

    if let Some(key) = config.openrouter_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        return Ok(Box::new(OpenRouterChat::new(
            key.to_string(),
            config.model.clone(),
            config.max_tokens,
            http,
        )));
    }

    Err(anyhow!(
        "No chat backend configured.\n\
         Hint: run `weatherscope configure` and enter a chat endpoint or an OpenRouter API key."
    ))
}

/// Never fails: every problem becomes [`FALLBACK_REPLY`].
#[derive(Debug)]
pub struct ChatRelay {
    backend: Box<dyn ChatBackend>,
}

impl ChatRelay {
    pub fn new(backend: Box<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    pub async fn send_message(&self, text: &str) -> String {
        match self.backend.complete(text).await {
            Ok(Some(reply)) if !reply.trim().is_empty() => {
                debug!("Chat reply received - chars={}", reply.len());
                reply.trim().to_string()
            }
            Ok(_) => {
                warn!("Chat backend returned no content");
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                warn!("Chat backend failed - error={e:#}");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

/// Append-only conversation as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage { role: ChatRole::Bot, text: GREETING.to_string() }],
        }
    }
}

impl ChatLog {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, role: ChatRole, text: impl Into<String>) {
        self.messages.push(ChatMessage { role, text: text.into() });
    }

    /// Log the user's line, relay it, log the answer. Blank input is ignored.
    pub async fn ask(&mut self, relay: &ChatRelay, input: &str) -> Option<&ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        self.push(ChatRole::User, text);
        let reply = relay.send_message(text).await;
        self.push(ChatRole::Bot, reply);
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::http::testing::ScriptedTransport;

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl ChatBackend for Failing {
        async fn complete(&self, _message: &str) -> Result<Option<String>> {
            Err(anyhow!("connection reset"))
        }
    }

    #[derive(Debug)]
    struct Canned(Option<&'static str>);

    #[async_trait]
    impl ChatBackend for Canned {
        async fn complete(&self, _message: &str) -> Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn relay_swallows_errors() {
        let relay = ChatRelay::new(Box::new(Failing));
        assert_eq!(relay.send_message("Is it raining in Oslo?").await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn relay_maps_empty_content_to_fallback() {
        for canned in [None, Some(""), Some("   \n")] {
            let relay = ChatRelay::new(Box::new(Canned(canned)));
            assert_eq!(relay.send_message("hi").await, FALLBACK_REPLY);
        }
    }

    #[tokio::test]
    async fn relay_trims_reply() {
        let relay = ChatRelay::new(Box::new(Canned(Some("  Sunny in Rome.\n"))));
        assert_eq!(relay.send_message("Rome?").await, "Sunny in Rome.");
    }

    #[tokio::test]
    async fn endpoint_chat_posts_message_only() {
        let transport = Arc::new(
            ScriptedTransport::default().reply("/api/ai-chat", 200, r#"{"reply":"Cold."}"#),
        );
        let relay = ChatRelay::new(Box::new(EndpointChat::new(
            "http://localhost:3000/api/ai-chat".into(),
            transport.clone(),
        )));

        assert_eq!(relay.send_message("Oslo?").await, "Cold.");
        assert_eq!(relay.send_message("And Rome?").await, "Cold.");

        let posted = transport.posted.lock().unwrap().clone();
        assert_eq!(posted, vec![json!({ "message": "Oslo?" }), json!({ "message": "And Rome?" })]);
    }

    #[tokio::test]
    async fn endpoint_error_status_falls_back() {
        let transport =
            Arc::new(ScriptedTransport::default().reply("/api/ai-chat", 500, r#"{"reply":"x"}"#));
        let relay = ChatRelay::new(Box::new(EndpointChat::new(
            "http://localhost:3000/api/ai-chat".into(),
            transport,
        )));

        assert_eq!(relay.send_message("Oslo?").await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn openrouter_sends_system_prompt_and_reads_first_choice() {
        let transport = Arc::new(ScriptedTransport::default().reply(
            "/chat/completions",
            200,
            r#"{"choices":[{"message":{"content":" Bring an umbrella. "}}]}"#,
        ));
        let backend = OpenRouterChat::new("KEY".into(), "m".into(), 512, transport.clone())
            .with_url("https://router.test/api/v1/chat/completions");
        let relay = ChatRelay::new(Box::new(backend));

        assert_eq!(relay.send_message("London?").await, "Bring an umbrella.");

        let posted = transport.posted.lock().unwrap().clone();
        assert_eq!(posted[0]["max_tokens"], 512);
        assert_eq!(posted[0]["messages"][0]["role"], "system");
        assert_eq!(posted[0]["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(posted[0]["messages"][1]["content"], "London?");
        assert_eq!(posted[0]["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn openrouter_without_choices_falls_back() {
        let transport =
            Arc::new(ScriptedTransport::default().reply("/chat/completions", 200, r#"{}"#));
        let backend = OpenRouterChat::new("KEY".into(), "m".into(), 512, transport);
        let relay = ChatRelay::new(Box::new(backend));

        assert_eq!(relay.send_message("London?").await, FALLBACK_REPLY);
    }

    #[test]
    fn backend_selection() {
        let http: Arc<dyn HttpTransport> = Arc::new(ScriptedTransport::default());

        let err = backend_from_config(&ChatConfig::default(), http.clone()).unwrap_err();
        assert!(err.to_string().contains("No chat backend configured"));

        let cfg = ChatConfig { openrouter_api_key: Some("k".into()), ..ChatConfig::default() };
        assert!(backend_from_config(&cfg, http).is_ok());
    }

    #[tokio::test]
    async fn log_is_append_only() {
        let relay = ChatRelay::new(Box::new(Failing));
        let mut log = ChatLog::default();

        assert!(log.ask(&relay, "   ").await.is_none());
        assert_eq!(log.messages().len(), 1);

        let reply = log.ask(&relay, " Paris? ").await.cloned().unwrap();
        assert_eq!(reply.role, ChatRole::Bot);
        assert_eq!(reply.text, FALLBACK_REPLY);

        let roles: Vec<_> = log.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, [ChatRole::Bot, ChatRole::User, ChatRole::Bot]);
        assert_eq!(log.messages()[0].text, GREETING);
        assert_eq!(log.messages()[1].text, "Paris?");
    }
}
