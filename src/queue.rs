//! A durable FIFO of job identifiers.
//!
//! Producers push ids; the single worker loop pops them with a bounded
//! blocking wait. FIFO ordering across pushes is the only guarantee: there
//! is no priority, no deduplication, and a popped id is gone for good. There
//! is also no transactional coupling with the status store, so a crash
//! between pop and the `processing` status update loses that id permanently.
//! That window is inherited from the original design and documented rather
//! than fixed.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::prelude::*;

/// How often the filesystem queue re-checks its spool while blocked.
const SPOOL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tie-breaker for entries pushed within the same microsecond.
static PUSH_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A FIFO channel of job ids shared between producers and the worker.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Append a job id at the tail.
    async fn push(&self, job_id: &str) -> Result<()>;

    /// Remove and return the head, waiting up to `timeout` when empty.
    ///
    /// `Ok(None)` means the timeout elapsed with no work, which is the
    /// worker's idle poll, not an error. A returned id is already removed
    /// and cannot be requeued through this interface.
    async fn pop_blocking(&self, timeout: Duration) -> Result<Option<String>>;
}

/// A [`JobQueue`] backed by a spool directory, one file per entry.
///
/// Entry names start with a zero-padded timestamp plus a process-local
/// counter, so lexical filename order equals push order. The file body holds
/// the job id. Entries survive process restarts, and pushes from concurrent
/// producers are atomic because each lands via write-then-rename.
pub struct FsQueue {
    dir: PathBuf,
}

impl FsQueue {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn next_entry_name() -> String {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_micros();
        let counter = PUSH_COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("{:020}-{:010}.job", micros, counter)
    }

    /// Take the lexically smallest entry, if any.
    async fn try_pop(&self) -> Result<Option<String>> {
        let mut entries = vec![];
        let mut dir = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("failed to read queue spool {:?}", self.dir))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .with_context(|| format!("failed to list queue spool {:?}", self.dir))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "job") {
                entries.push(path);
            }
        }
        entries.sort();

        let Some(path) = entries.into_iter().next() else {
            return Ok(None);
        };
        let job_id = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read queue entry {:?}", path))?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("failed to remove queue entry {:?}", path))?;
        Ok(Some(job_id.trim().to_owned()))
    }
}

#[async_trait]
impl JobQueue for FsQueue {
    async fn push(&self, job_id: &str) -> Result<()> {
        let path = self.dir.join(Self::next_entry_name());
        let scratch = path.with_extension("tmp");
        tokio::fs::write(&scratch, job_id)
            .await
            .with_context(|| format!("failed to write queue entry {:?}", scratch))?;
        tokio::fs::rename(&scratch, &path)
            .await
            .with_context(|| format!("failed to publish queue entry {:?}", path))?;
        Ok(())
    }

    async fn pop_blocking(&self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(job_id) = self.try_pop().await? {
                return Ok(Some(job_id));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep_until(deadline.min(now + SPOOL_POLL_INTERVAL)).await;
        }
    }
}

/// In-memory [`JobQueue`] double for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryQueue {
    entries: std::sync::Mutex<std::collections::VecDeque<String>>,
    notify: tokio::sync::Notify,
}

#[cfg(test)]
#[async_trait]
impl JobQueue for MemoryQueue {
    async fn push(&self, job_id: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("lock poisoned")
            .push_back(job_id.to_owned());
        self.notify.notify_one();
        Ok(())
    }

    async fn pop_blocking(&self, timeout: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(job_id) = self.entries.lock().expect("lock poisoned").pop_front() {
                return Ok(Some(job_id));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            let _ = tokio::time::timeout_at(deadline, self.notify.notified()).await;
        }
    }
}
