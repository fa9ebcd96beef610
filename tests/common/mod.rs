#![allow(dead_code)]

use async_trait::async_trait;
use std::error::Error;
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use wellbeing_relay::agent::{ PipelineSettings, RelayAgent };
use wellbeing_relay::citation::CitationTable;
use wellbeing_relay::config::prompt::PromptConfig;
use wellbeing_relay::decision_log::{ DecisionLog, DecisionLogEntry, MemoryDecisionLog };
use wellbeing_relay::llm::LlmType;
use wellbeing_relay::llm::chat::{ ChatClient, ProviderError, ProviderRequest, ProviderResponse };
use wellbeing_relay::models::chat::{ ChatMessage, ChatRequest, Conversation };

/// What a mock provider does on one call.
#[derive(Clone, Debug)]
pub enum Step {
    Reply(String),
    /// Replies `"<text> #<call number>"`, starting at 1.
    Numbered(String),
    Echo,
    Transport,
    Malformed,
    Timeout,
}

/// Provider double that follows a script and records every request.
/// The last step repeats once the script runs out.
pub struct MockClient {
    model: String,
    script: Vec<Step>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockClient {
    pub fn new(model: &str, script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            model: model.to_string(),
            script,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(model: &str, text: &str) -> Arc<Self> {
        Self::new(model, vec![Step::Reply(text.to_string())])
    }

    pub fn failing(model: &str, step: Step) -> Arc<Self> {
        Self::new(model, vec![step])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn call(&self, request: &ProviderRequest) -> ProviderResponse {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let step = self.script.get(n).or_else(|| self.script.last()).cloned().unwrap_or(Step::Transport);
        match step {
            Step::Reply(text) => Ok(text),
            Step::Numbered(text) => Ok(format!("{} #{}", text, n + 1)),
            Step::Echo => Ok(format!("echo: {}", request.message)),
            Step::Transport => Err(ProviderError::Transport("connection refused".into())),
            Step::Malformed => Err(ProviderError::Malformed("missing 'text' field".into())),
            Step::Timeout => Err(ProviderError::Timeout(Duration::from_secs(30))),
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn llm_type(&self) -> LlmType {
        LlmType::Cohere
    }
}

pub struct FailingLog;

#[async_trait]
impl DecisionLog for FailingLog {
    async fn record(&self, _entry: &DecisionLogEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("disk full".into())
    }
}

pub struct Harness {
    pub agent: RelayAgent,
    pub primary: Arc<MockClient>,
    pub secondary: Arc<MockClient>,
    pub log: Arc<MemoryDecisionLog>,
}

pub fn harness(primary: Arc<MockClient>, secondary: Arc<MockClient>) -> Harness {
    let log = Arc::new(MemoryDecisionLog::new());
    let agent = RelayAgent::from_parts(
        primary.clone(),
        secondary.clone(),
        Arc::new(CitationTable::builtin()),
        Arc::new(PromptConfig::default()),
        log.clone(),
        PipelineSettings::default()
    );
    Harness { agent, primary, secondary, log }
}

pub fn request(messages: Vec<ChatMessage>) -> ChatRequest {
    ChatRequest { messages: Conversation::new(messages), user_id: None }
}

pub fn single(text: &str) -> ChatRequest {
    request(vec![ChatMessage::user(text)])
}
