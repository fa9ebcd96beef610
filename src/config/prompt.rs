use crate::citation::CitationRecord;
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use log::info;

pub const DEFAULT_GENERAL_PREAMBLE: &str =
    "You are a strict mental health assistant. \
Your purpose is to support users with emotional and mental well-being. \
If a user asks about anything unrelated (like facts, jokes, news, or trivia) respond with: \
'I'm here to support your mental and emotional well-being. I can't help with that topic.' \
Do not answer questions unrelated to mental health.";

pub const DEFAULT_GROUNDED_PREAMBLE: &str =
    "You are a strict mental health assistant. \
Answer only using guidance consistent with the trusted source '{title}' published by {provider} ({url}). \
Do not add facts that the source would not support, do not diagnose, and refuse topics unrelated to mental health.";

pub const DEFAULT_DISCLAIMER: &str =
    "\n\nThis assistant is not a substitute for professional medical advice, diagnosis, or treatment.";

pub const DEFAULT_CRISIS_MESSAGE: &str =
    "It sounds like you are going through a lot right now, and you deserve support. \
If you are in immediate danger, please call your local emergency number. \
You can also call or text 988 (Suicide & Crisis Lifeline, US) or find a helpline near you at https://findahelpline.com.";

pub const DEFAULT_TOO_LONG_MESSAGE: &str = "Please keep messages under 500 characters.";

pub const DEFAULT_FAILURE_MESSAGE: &str = "Sorry, something went wrong.";

pub const DEFAULT_EMPTY_MESSAGE: &str = "Please send a message so I can help.";

#[derive(Debug)]
pub enum PromptError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    MissingPlaceholder(&'static str),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
            PromptError::MissingPlaceholder(key) =>
                write!(f, "grounded_preamble must contain the '{}' placeholder", key),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// Fixed texts used by the pipeline. Any field missing from a prompts file
/// keeps its built-in default.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub general_preamble: String,
    /// Template with `{title}`, `{provider}` and `{url}` placeholders.
    pub grounded_preamble: String,
    pub disclaimer: String,
    pub crisis_message: String,
    pub too_long_message: String,
    pub failure_message: String,
    pub empty_message: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            general_preamble: DEFAULT_GENERAL_PREAMBLE.to_string(),
            grounded_preamble: DEFAULT_GROUNDED_PREAMBLE.to_string(),
            disclaimer: DEFAULT_DISCLAIMER.to_string(),
            crisis_message: DEFAULT_CRISIS_MESSAGE.to_string(),
            too_long_message: DEFAULT_TOO_LONG_MESSAGE.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if !self.grounded_preamble.contains("{title}") {
            return Err(PromptError::MissingPlaceholder("{title}"));
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(json: &str) -> Result<PromptConfig, PromptError> {
    let config: PromptConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    let file_content = fs
        ::read_to_string(path)
        .map_err(|e| format!("Failed to read prompts file '{}': {}", path, e))?;
    let config = load_prompts_from_str(&file_content).map_err(|e|
        format!("Failed to parse prompts file '{}': {}", path, e)
    )?;
    info!("Loaded prompt texts from {}", path);
    Ok(Arc::new(config))
}

/// Built-in texts unless a prompts file is configured.
pub fn load_prompts_or_default(
    path: Option<&str>
) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    match path {
        Some(p) if !p.trim().is_empty() => load_prompts(p),
        _ => Ok(Arc::new(PromptConfig::default())),
    }
}

pub fn get_grounded_preamble(config: &PromptConfig, source: &CitationRecord) -> String {
    config.grounded_preamble
        .replace("{title}", &source.title)
        .replace("{provider}", &source.provider)
        .replace("{url}", &source.url)
}

pub fn with_disclaimer(config: &PromptConfig, answer: &str) -> String {
    format!("{}{}", answer, config.disclaimer)
}
