pub mod cohere;
pub mod openrouter;

use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::Serialize;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::{ LlmConfig, LlmType };
use self::cohere::CohereChatClient;
use self::openrouter::OpenRouterChatClient;
use crate::models::chat::{ ChatMessage, Conversation, Role };

/// Why a single provider call did not yield an answer.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Success carries the answer text; failure carries the cause.
pub type ProviderResponse = Result<String, ProviderError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: Option<f64>,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { temperature: Some(0.7), max_tokens: 300 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// Every turn before the one being answered.
    pub history: Vec<ChatMessage>,
    pub message: String,
    pub latest_role: Role,
    pub instruction: Option<String>,
    pub params: GenerationParams,
}

impl ProviderRequest {
    pub fn from_conversation(
        conversation: &Conversation,
        instruction: Option<String>,
        params: GenerationParams
    ) -> Option<Self> {
        let (history, latest) = conversation.split_latest()?;
        Some(Self {
            history: history.to_vec(),
            message: latest.content.clone(),
            latest_role: latest.role,
            instruction,
            params,
        })
    }

    /// The conversation exactly as the client sent it.
    pub fn full_conversation(&self) -> Vec<ChatMessage> {
        let mut messages = self.history.clone();
        messages.push(ChatMessage { role: self.latest_role, content: self.message.clone() });
        messages
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn call(&self, request: &ProviderRequest) -> ProviderResponse;

    fn model(&self) -> &str;

    fn llm_type(&self) -> LlmType;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Cohere => {
            let specific_client = CohereChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenRouter => {
            let specific_client = OpenRouterChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

pub(crate) fn build_http_client(
    api_key: &str,
    timeout: Duration,
    extra_headers: &[(HeaderName, Option<String>)]
) -> Result<HttpClient, Box<dyn StdError + Send + Sync>> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| format!("Invalid API key format: {}", e))?
    );
    for (name, value) in extra_headers {
        if let Some(value) = value {
            headers.insert(
                name.clone(),
                HeaderValue::from_str(value)
                    .map_err(|e| format!("Invalid value for header {}: {}", name, e))?
            );
        }
    }

    let http = HttpClient::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;
    Ok(http)
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::Transport(err.to_string())
    }
}

/// Posts `payload` and returns the raw body of a 2xx reply.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    http: &HttpClient,
    url: &str,
    payload: &T,
    timeout: Duration
) -> Result<String, ProviderError> {
    let resp = http
        .post(url)
        .json(payload)
        .send().await
        .map_err(|e| map_reqwest_error(e, timeout))?;

    let status = resp.status();
    let body = resp.text().await.map_err(|e| map_reqwest_error(e, timeout))?;
    debug!("{} replied {} ({} bytes)", url, status, body.len());

    if !status.is_success() {
        return Err(ProviderError::Status { status: status.as_u16(), body });
    }
    Ok(body)
}

pub(crate) fn join_url(base_url: &str, route: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), route)
}
