use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use shared::domain::RecordedSubmission;
use tokio::{
    fs::{self, File, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::{info, warn};

/// Destination for accepted submissions. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait RecordingSink: Send + Sync {
    async fn record(&self, submission: &RecordedSubmission) -> Result<()>;
}

pub struct TracingSink;

#[async_trait]
impl RecordingSink for TracingSink {
    async fn record(&self, submission: &RecordedSubmission) -> Result<()> {
        info!(
            submission_id = %submission.id,
            received_at = %submission.received_at,
            name = %submission.name,
            email = %submission.email,
            body = %submission.message,
            "new contact form submission"
        );
        Ok(())
    }
}

/// Appends one JSON line per submission to a file.
pub struct AppendLogSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl AppendLogSink {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.with_context(|| {
                format!(
                    "failed to create parent directory '{}' for record log '{}'",
                    parent.display(),
                    path.display()
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open record log '{}'", path.display()))?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordingSink for AppendLogSink {
    async fn record(&self, submission: &RecordedSubmission) -> Result<()> {
        let mut line = serde_json::to_vec(submission)?;
        line.push(b'\n');

        // One write per line under the lock keeps concurrent records from interleaving.
        let mut file = self.file.lock().await;
        file.write_all(&line)
            .await
            .with_context(|| format!("failed to append to '{}'", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<RecordedSubmission>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<RecordedSubmission> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordingSink for MemorySink {
    async fn record(&self, submission: &RecordedSubmission) -> Result<()> {
        self.records.lock().await.push(submission.clone());
        Ok(())
    }
}

/// Forwards every submission to each inner sink, even when an earlier one fails.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn RecordingSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn RecordingSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl RecordingSink for FanoutSink {
    async fn record(&self, submission: &RecordedSubmission) -> Result<()> {
        let mut failures = 0usize;
        for sink in &self.sinks {
            if let Err(error) = sink.record(submission).await {
                warn!(submission_id = %submission.id, %error, "recording sink failed");
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(anyhow!(
                "{failures} of {} recording sinks failed",
                self.sinks.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/sink_tests.rs"]
mod tests;
