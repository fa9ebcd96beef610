use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::path::{ Path, PathBuf };
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{ DecisionLog, DecisionLogEntry, DECISION_LOG_FILE };

/// Line-delimited JSON file opened in append mode for every entry.
pub struct JsonlDecisionLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlDecisionLog {
    /// Creates the log directory if needed. Called once at startup.
    pub fn create(dir: &Path) -> Result<Self, Box<dyn Error + Send + Sync>> {
        std::fs
            ::create_dir_all(dir)
            .map_err(|e| format!("Failed to create log directory '{}': {}", dir.display(), e))?;
        let path = dir.join(DECISION_LOG_FILE);
        info!("Decision log file: {}", path.display());
        Ok(Self { path, write_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DecisionLog for JsonlDecisionLog {
    async fn record(&self, entry: &DecisionLogEntry) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
