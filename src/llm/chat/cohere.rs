use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use std::time::Duration;

use super::{ build_http_client, join_url, post_json, ChatClient, ProviderError, ProviderRequest, ProviderResponse };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::{ ChatMessage, Role };

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const CHAT_ROUTE: &str = "/v1/chat";

pub struct CohereChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize, Debug, PartialEq)]
struct CohereMessage {
    role: &'static str,
    message: String,
}

#[derive(Serialize, Debug)]
struct CohereChatRequest {
    chat_history: Vec<CohereMessage>,
    message: String,
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    preamble: Option<String>,
}

#[derive(Deserialize)]
struct CohereResponse {
    text: Option<String>,
}

fn cohere_role(role: Role) -> &'static str {
    match role {
        Role::User => "USER",
        Role::Assistant => "CHATBOT",
    }
}

fn to_cohere_history(history: &[ChatMessage]) -> Vec<CohereMessage> {
    history
        .iter()
        .map(|m| CohereMessage { role: cohere_role(m.role), message: m.content.clone() })
        .collect()
}

fn parse_response(body: &str) -> ProviderResponse {
    let parsed: CohereResponse = serde_json
        ::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("undecodable body: {}", e)))?;
    parsed.text.ok_or_else(|| ProviderError::Malformed("missing 'text' field".to_string()))
}

impl CohereChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| "command-light".to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let http = build_http_client(&api_key, timeout, &[])?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
            timeout,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| "Cohere API key is required".to_string())?;

        Self::new(api_key, config.completion_model.clone(), config.base_url.clone(), config.timeout)
    }

    fn build_request(&self, request: &ProviderRequest) -> CohereChatRequest {
        CohereChatRequest {
            chat_history: to_cohere_history(&request.history),
            message: request.message.clone(),
            model: self.model.clone(),
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            preamble: request.instruction.clone(),
        }
    }
}

#[async_trait]
impl ChatClient for CohereChatClient {
    async fn call(&self, request: &ProviderRequest) -> ProviderResponse {
        let url = join_url(&self.base_url, CHAT_ROUTE);
        let req = self.build_request(request);
        info!(
            "Cohere request: model={}, history_len={}, preamble={}",
            self.model,
            req.chat_history.len(),
            req.preamble.is_some()
        );
        let body = post_json(&self.http, &url, &req, self.timeout).await?;
        parse_response(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Cohere
    }
}
