use crate::citation::{ CitationRecord, CitationTable };
use crate::cli::Args;
use crate::config::prompt::{ self, PromptConfig };
use crate::decision_log::{ initialize_decision_log, DecisionLog, DecisionLogEntry, CRISIS_CHECK_MODEL, NO_MODEL };
use crate::llm::{ LlmConfig, LlmType };
use crate::llm::chat::{ new_client as new_chat_client, ChatClient, GenerationParams, ProviderError, ProviderRequest };
use crate::matcher::is_crisis;
use crate::models::chat::{ ChatMessage, ChatRequest, ChatResponse, Conversation };

use log::{ debug, error, info, warn };
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Reasons a conversation is not answered by the primary model.
///
/// None of these reach the client: each maps to a fixed reply.
#[derive(Debug, ThisError)]
pub enum RelayError {
    #[error("conversation has no messages")]
    EmptyConversation,
    #[error("latest message has {length} characters, limit is {limit}")]
    InputTooLong {
        length: usize,
        limit: usize,
    },
    #[error("primary provider failed: {0}")]
    PrimaryFailed(#[source] ProviderError),
    #[error("all providers exhausted (primary: {primary}; secondary: {secondary})")]
    AllProvidersExhausted {
        primary: ProviderError,
        secondary: ProviderError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub max_message_chars: usize,
    pub primary_params: GenerationParams,
    /// Token cap for the fallback; temperature is left to the provider.
    pub fallback_params: GenerationParams,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_message_chars: 500,
            primary_params: GenerationParams::default(),
            fallback_params: GenerationParams { temperature: None, max_tokens: 300 },
        }
    }
}

/// A primary-provider answer together with the instruction that produced it.
struct PrimaryAnswer {
    text: String,
    instruction: String,
}

/// Runs one chat request through the safety pipeline.
///
/// Holds no per-request state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct RelayAgent {
    primary: Arc<dyn ChatClient>,
    secondary: Arc<dyn ChatClient>,
    citations: Arc<CitationTable>,
    prompt_config: Arc<PromptConfig>,
    decision_log: Arc<dyn DecisionLog>,
    settings: PipelineSettings,
}

impl RelayAgent {
    fn initialize_llm_clients(
        args: &Args
    ) -> Result<(Arc<dyn ChatClient>, Arc<dyn ChatClient>), Box<dyn Error + Send + Sync>> {
        let timeout = Duration::from_secs(args.provider_timeout_secs);

        let primary_config = LlmConfig {
            llm_type: args.primary_llm_type.parse::<LlmType>()?,
            api_key: Some(args.primary_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: args.primary_model.clone(),
            base_url: args.primary_base_url.clone(),
            timeout,
            referer: None,
            app_title: None,
        };
        let primary = new_chat_client(&primary_config)?;
        info!(
            "Primary client configured: Type={}, Model={}, BaseURL={:?}",
            primary_config.llm_type,
            primary.model(),
            primary_config.base_url.as_deref().unwrap_or("adapter default")
        );

        let secondary_config = LlmConfig {
            llm_type: args.secondary_llm_type.parse::<LlmType>()?,
            api_key: Some(args.secondary_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: args.secondary_model.clone(),
            base_url: args.secondary_base_url.clone(),
            timeout,
            referer: args.secondary_referer.clone(),
            app_title: Some(args.secondary_title.clone()).filter(|t| !t.is_empty()),
        };
        let secondary = new_chat_client(&secondary_config)?;
        info!(
            "Secondary client configured: Type={}, Model={}, BaseURL={:?}",
            secondary_config.llm_type,
            secondary.model(),
            secondary_config.base_url.as_deref().unwrap_or("adapter default")
        );

        Ok((primary, secondary))
    }

    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let (primary, secondary) = Self::initialize_llm_clients(args)?;
        let prompt_config = prompt::load_prompts_or_default(args.prompts_path.as_deref())?;
        let citations = CitationTable::from_optional_path(args.citations_path.as_deref())?;
        info!("Citation table ready with {} topic groups", citations.len());
        let decision_log = initialize_decision_log(args)?;

        let settings = PipelineSettings {
            max_message_chars: args.max_message_chars,
            primary_params: GenerationParams {
                temperature: Some(args.temperature),
                max_tokens: args.max_tokens,
            },
            fallback_params: GenerationParams { temperature: None, max_tokens: args.max_tokens },
        };

        Ok(
            Self::from_parts(
                primary,
                secondary,
                Arc::new(citations),
                prompt_config,
                decision_log,
                settings
            )
        )
    }

    pub fn from_parts(
        primary: Arc<dyn ChatClient>,
        secondary: Arc<dyn ChatClient>,
        citations: Arc<CitationTable>,
        prompt_config: Arc<PromptConfig>,
        decision_log: Arc<dyn DecisionLog>,
        settings: PipelineSettings
    ) -> Self {
        Self { primary, secondary, citations, prompt_config, decision_log, settings }
    }

    fn validate<'a>(&self, conversation: &'a Conversation) -> Result<&'a ChatMessage, RelayError> {
        let latest = conversation.latest().ok_or(RelayError::EmptyConversation)?;
        let length = latest.content.chars().count();
        if length > self.settings.max_message_chars {
            return Err(RelayError::InputTooLong { length, limit: self.settings.max_message_chars });
        }
        Ok(latest)
    }

    async fn log_decision(&self, entry: DecisionLogEntry) {
        if let Err(e) = self.decision_log.record(&entry).await {
            warn!("Decision log write failed (request {}): {}", entry.request_id, e);
        }
    }

    /// General pass, then a grounded pass when a trusted source exists.
    /// The first pass's text is discarded in the grounded case.
    async fn primary_answer(
        &self,
        conversation: &Conversation,
        citation: Option<&CitationRecord>
    ) -> Result<PrimaryAnswer, RelayError> {
        let general = self.prompt_config.general_preamble.clone();
        let request = ProviderRequest::from_conversation(
            conversation,
            Some(general.clone()),
            self.settings.primary_params
        ).ok_or(RelayError::EmptyConversation)?;

        let first = self.primary.call(&request).await.map_err(RelayError::PrimaryFailed)?;

        let Some(source) = citation else {
            return Ok(PrimaryAnswer { text: first, instruction: general });
        };

        debug!("Discarding general answer ({} chars) for source '{}'", first.len(), source.title);
        let grounded = prompt::get_grounded_preamble(&self.prompt_config, source);
        let grounded_request = ProviderRequest {
            instruction: Some(grounded.clone()),
            ..request
        };
        let text = self.primary.call(&grounded_request).await.map_err(RelayError::PrimaryFailed)?;
        info!("Answer grounded on '{}' ({})", source.title, source.provider);
        Ok(PrimaryAnswer { text, instruction: grounded })
    }

    /// Unmodified conversation, no system instruction.
    async fn fallback_answer(&self, conversation: &Conversation) -> Result<String, ProviderError> {
        match
            ProviderRequest::from_conversation(conversation, None, self.settings.fallback_params)
        {
            Some(request) => self.secondary.call(&request).await,
            None => Err(ProviderError::Malformed("empty conversation".to_string())),
        }
    }

    pub async fn process_message(&self, request: ChatRequest) -> ChatResponse {
        let ChatRequest { messages, user_id } = request;

        let latest = match self.validate(&messages) {
            Ok(latest) => latest,
            Err(RelayError::EmptyConversation) => {
                warn!("Rejected request with an empty conversation");
                return ChatResponse::notice(self.prompt_config.empty_message.clone());
            }
            Err(e) => {
                info!("Rejected request: {}", e);
                return ChatResponse::notice(self.prompt_config.too_long_message.clone());
            }
        };
        let input = latest.content.clone();

        if is_crisis(&input) {
            warn!("Crisis language detected; returning safety message without calling a provider");
            let reply = self.prompt_config.crisis_message.clone();
            self.log_decision(
                DecisionLogEntry::new(input, CRISIS_CHECK_MODEL, "", reply.clone()).with_user(user_id)
            ).await;
            return ChatResponse::crisis(reply);
        }

        let citation = self.citations.lookup(&input);

        let primary_failure = match self.primary_answer(&messages, citation.as_ref()).await {
            Ok(answer) => {
                let text = prompt::with_disclaimer(&self.prompt_config, &answer.text);
                self.log_decision(
                    DecisionLogEntry::new(
                        input,
                        self.primary.model(),
                        answer.instruction,
                        text.clone()
                    ).with_user(user_id)
                ).await;
                return ChatResponse::answer(text, citation);
            }
            Err(RelayError::PrimaryFailed(e)) => e,
            Err(e) => ProviderError::Malformed(e.to_string()),
        };
        warn!("Primary provider ({}) failed, falling back: {}", self.primary.model(), primary_failure);

        match self.fallback_answer(&messages).await {
            Ok(answer) => {
                let text = prompt::with_disclaimer(&self.prompt_config, &answer);
                self.log_decision(
                    DecisionLogEntry::new(input, self.secondary.model(), "", text.clone()).with_user(
                        user_id
                    )
                ).await;
                ChatResponse::answer(text, citation)
            }
            Err(secondary_failure) => {
                let exhausted = RelayError::AllProvidersExhausted {
                    primary: primary_failure,
                    secondary: secondary_failure,
                };
                error!("{}", exhausted);
                let reply = self.prompt_config.failure_message.clone();
                self.log_decision(
                    DecisionLogEntry::new(input, NO_MODEL, "", reply.clone()).with_user(user_id)
                ).await;
                ChatResponse::notice(reply)
            }
        }
    }
}
