use async_trait::async_trait;
use std::error::Error;
use tokio::sync::Mutex;

use super::{ DecisionLog, DecisionLogEntry };

#[derive(Default)]
pub struct MemoryDecisionLog {
    entries: Mutex<Vec<DecisionLogEntry>>,
}

impl MemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<DecisionLogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl DecisionLog for MemoryDecisionLog {
    async fn record(&self, entry: &DecisionLogEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}
