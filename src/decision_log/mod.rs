mod jsonl;
mod memory;

pub use jsonl::JsonlDecisionLog;
pub use memory::MemoryDecisionLog;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use log::info;
use serde::{ Deserialize, Serialize };
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::Args;

pub const DECISION_LOG_FILE: &str = "decisions.jsonl";

/// Model identifier recorded when the crisis check answered.
pub const CRISIS_CHECK_MODEL: &str = "crisis-check";
/// Model identifier recorded when no provider produced an answer.
pub const NO_MODEL: &str = "none";

/// One audited decision. Entries are only ever appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub input: String,
    pub model: String,
    pub instruction: String,
    pub output: String,
}

impl DecisionLogEntry {
    pub fn new(
        input: impl Into<String>,
        model: impl Into<String>,
        instruction: impl Into<String>,
        output: impl Into<String>
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: Uuid::new_v4(),
            user_id: None,
            input: input.into(),
            model: model.into(),
            instruction: instruction.into(),
            output: output.into(),
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }
}

#[async_trait]
pub trait DecisionLog: Send + Sync {
    async fn record(&self, entry: &DecisionLogEntry) -> Result<(), Box<dyn Error + Send + Sync>>;
}

pub fn create_decision_log(
    args: &Args
) -> Result<Arc<dyn DecisionLog>, Box<dyn Error + Send + Sync>> {
    match args.decision_log.to_lowercase().as_str() {
        "file" => {
            let store = JsonlDecisionLog::create(Path::new(&args.log_dir))?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryDecisionLog::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported decision log type: {}", args.decision_log)
                    )
                )
            ),
    }
}

pub fn initialize_decision_log(
    args: &Args
) -> Result<Arc<dyn DecisionLog>, Box<dyn Error + Send + Sync>> {
    info!("Decisions will be logged to: {} at {}", args.decision_log, args.log_dir);
    create_decision_log(args)
}
