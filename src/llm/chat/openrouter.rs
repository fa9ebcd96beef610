use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use reqwest::header::HeaderName;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use std::time::Duration;

use super::{ build_http_client, join_url, post_json, ChatClient, ProviderError, ProviderRequest, ProviderResponse };
use crate::llm::{ LlmConfig, LlmType };

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api";
const CHAT_ROUTE: &str = "/v1/chat/completions";

pub struct OpenRouterChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct OpenRouterMessage {
    role: String,
    content: String,
}

#[derive(Serialize, Debug)]
struct OpenRouterRequest {
    model: String,
    messages: Vec<OpenRouterMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Deserialize)]
struct OpenRouterResponse {
    choices: Option<Vec<OpenRouterChoice>>,
}

#[derive(Deserialize)]
struct OpenRouterChoice {
    message: Option<OpenRouterReply>,
}

#[derive(Deserialize)]
struct OpenRouterReply {
    content: Option<String>,
}

fn parse_response(body: &str) -> ProviderResponse {
    let parsed: OpenRouterResponse = serde_json
        ::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("undecodable body: {}", e)))?;
    parsed.choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| ProviderError::Malformed("missing 'choices[0].message.content'".to_string()))
}

impl OpenRouterChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
        referer: Option<String>,
        app_title: Option<String>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| "mistralai/mistral-7b-instruct:free".to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let http = build_http_client(
            &api_key,
            timeout,
            &[
                (HeaderName::from_static("http-referer"), referer),
                (HeaderName::from_static("x-title"), app_title),
            ]
        )?;

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
            .ok_or_else(|| "OpenRouter API key is required".to_string())?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.timeout,
            config.referer.clone(),
            config.app_title.clone(),
        )
    }

    fn build_request(&self, request: &ProviderRequest) -> OpenRouterRequest {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        if let Some(instruction) = &request.instruction {
            messages.push(OpenRouterMessage { role: "system".to_string(), content: instruction.clone() });
        }
        messages.extend(
            request
                .full_conversation()
                .into_iter()
                .map(|m| OpenRouterMessage { role: m.role.as_str().to_string(), content: m.content })
        );

        OpenRouterRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.params.max_tokens,
            temperature: request.params.temperature,
        }
    }
}

#[async_trait]
impl ChatClient for OpenRouterChatClient {
    async fn call(&self, request: &ProviderRequest) -> ProviderResponse {
        let url = join_url(&self.base_url, CHAT_ROUTE);
        let req = self.build_request(request);
        info!("OpenRouter request: model={}, messages={}", self.model, req.messages.len());
        let body = post_json(&self.http, &url, &req, self.timeout).await?;
        parse_response(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn llm_type(&self) -> LlmType {
        LlmType::OpenRouter
    }
}
