//! Audit log for batch submissions
//!
//! Wraps a [`BatchSubmitter`] and appends one JSON line per batch, whether
//! the gateway accepted it or not.

use crate::config::Scenario;
use crate::ledger::{BatchReceipt, BatchSubmitter};
use crate::transaction::Transaction;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Entry in the audit log
#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    timestamp: DateTime<Utc>,
    run_id: &'a str,
    scenario: Scenario,
    submitter: &'static str,
    batch_index: usize,
    batch_size: usize,
    first_nonce: Option<u64>,
    sent: Option<usize>,
    hashes: &'a [String],
    error: Option<String>,
    duration_ms: u64,
    status: &'static str,
}

/// Writer for audit log entries
struct AuditLogWriter {
    path: PathBuf,
}

impl AuditLogWriter {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write(&self, entry: &AuditEntry<'_>) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

/// Submitter that records every batch to a JSONL file
pub struct AuditedSubmitter {
    inner: Arc<dyn BatchSubmitter>,
    writer: Mutex<AuditLogWriter>,
    run_id: String,
    scenario: Scenario,
    batch_index: AtomicUsize,
}

impl AuditedSubmitter {
    /// Wrap `inner`, logging to `log_path` under a fresh run ID
    pub fn new(
        inner: Arc<dyn BatchSubmitter>,
        log_path: impl Into<PathBuf>,
        scenario: Scenario,
    ) -> Self {
        Self {
            inner,
            writer: Mutex::new(AuditLogWriter::new(log_path.into())),
            run_id: Uuid::new_v4().to_string(),
            scenario,
            batch_index: AtomicUsize::new(0),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

/// Submitter for one campaign run
///
/// Batches are audited when a log path is set. Dry runs submit nothing, so
/// they always get the bare submitter and leave the log untouched.
pub fn campaign_submitter(
    inner: Arc<dyn BatchSubmitter>,
    audit_log_path: Option<&str>,
    scenario: Scenario,
    dry_run: bool,
) -> Arc<dyn BatchSubmitter> {
    match audit_log_path {
        Some(path) if !dry_run => {
            let audited = AuditedSubmitter::new(inner, path, scenario);
            tracing::info!(path = %path, run_id = audited.run_id(), "Audit log enabled");
            Arc::new(audited)
        }
        _ => inner,
    }
}

#[async_trait]
impl BatchSubmitter for AuditedSubmitter {
    async fn send_batch(&self, transactions: &[Transaction]) -> Result<BatchReceipt> {
        let batch_index = self.batch_index.fetch_add(1, Ordering::SeqCst);
        let start = Instant::now();
        let result = self.inner.send_batch(transactions).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let (sent, hashes, error, status) = match &result {
            Ok(receipt) => (Some(receipt.sent), receipt.hashes.as_slice(), None, "success"),
            Err(e) => (None, &[][..], Some(e.to_string()), "error"),
        };

        let entry = AuditEntry {
            timestamp: Utc::now(),
            run_id: &self.run_id,
            scenario: self.scenario,
            submitter: self.inner.name(),
            batch_index,
            batch_size: transactions.len(),
            first_nonce: transactions.first().map(|tx| tx.args().nonce),
            sent,
            hashes,
            error,
            duration_ms,
            status,
        };

        let writer = self.writer.lock().await;
        if let Err(e) = writer.write(&entry) {
            // Audit logging never blocks submission
            tracing::warn!(error = %e, "Failed to write audit log entry");
        }

        result
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
