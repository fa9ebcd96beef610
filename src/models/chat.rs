use serde::{ Serialize, Deserialize };
use crate::citation::CitationRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Ordered turns of one request. The last message is the one being answered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn latest(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Splits into (history, latest). `None` for an empty conversation.
    pub fn split_latest(&self) -> Option<(&[ChatMessage], &ChatMessage)> {
        self.messages.split_last().map(|(latest, history)| (history, latest))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Conversation,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Body of a `/chat` reply. The three shapes are distinguished by which
/// keys are present.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Answer {
        response: String,
        source: Option<CitationRecord>,
    },
    Crisis {
        response: String,
        crisis: bool,
    },
    Notice {
        response: String,
    },
}

impl ChatResponse {
    pub fn answer(response: String, source: Option<CitationRecord>) -> Self {
        ChatResponse::Answer { response, source }
    }

    pub fn crisis(response: impl Into<String>) -> Self {
        ChatResponse::Crisis { response: response.into(), crisis: true }
    }

    pub fn notice(response: impl Into<String>) -> Self {
        ChatResponse::Notice { response: response.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            ChatResponse::Answer { response, .. } => response,
            ChatResponse::Crisis { response, .. } => response,
            ChatResponse::Notice { response } => response,
        }
    }
}
