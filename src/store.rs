//! Per-job status records.
//!
//! One record per job id, created as `queued` by the submission side and
//! mutated only by the worker afterwards. Records are never deleted by the
//! core; retention is somebody else's problem.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Lifecycle state of a job.
///
/// Strictly forward-moving: `queued → processing → {completed | failed}`.
/// There is no transition back to `queued` and no redelivery.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// One job's metadata and current lifecycle state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct JobRecord {
    /// The job's unique id, minted at submission time.
    pub id: String,

    /// Original filename, as uploaded. Kept for display and download.
    pub filename: String,

    /// Where the uploaded file lives on disk.
    pub stored_path: PathBuf,

    pub status: JobStatus,

    /// Human-readable failure description, present once a job fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JobRecord {
    /// A fresh `queued` record for a newly stored upload.
    pub fn new(id: String, filename: String, stored_path: PathBuf) -> Self {
        Self {
            id,
            filename,
            stored_path,
            status: JobStatus::Queued,
            message: None,
        }
    }
}

/// Key-value store of [`JobRecord`]s, shared by submission and the worker.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Write the initial record for a new job.
    async fn create(&self, record: &JobRecord) -> Result<()>;

    /// Overwrite the status field and, when given, the message field,
    /// leaving everything else untouched. Idempotent: repeating a call with
    /// the same arguments leaves the stored record identical.
    async fn set_status(
        &self,
        job_id: &str,
        status: JobStatus,
        message: Option<&str>,
    ) -> Result<()>;

    /// Fetch the full record, or `None` for an unknown id.
    async fn get(&self, job_id: &str) -> Result<Option<JobRecord>>;
}

/// A [`StatusStore`] keeping one JSON file per job.
pub struct FsStatusStore {
    dir: PathBuf,
}

impl FsStatusStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, job_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", job_id))
    }

    /// Replace the record via write-then-rename, so concurrent readers
    /// never observe a half-written record.
    async fn write_record(&self, record: &JobRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record)
            .context("failed to serialize status record")?;
        let scratch = self.dir.join(format!("{}.json.tmp", record.id));
        tokio::fs::write(&scratch, &json)
            .await
            .with_context(|| format!("failed to write status record {:?}", scratch))?;
        tokio::fs::rename(&scratch, self.record_path(&record.id))
            .await
            .with_context(|| {
                format!("failed to publish status record for job {}", record.id)
            })?;
        Ok(())
    }
}

#[async_trait]
impl StatusStore for FsStatusStore {
    async fn create(&self, record: &JobRecord) -> Result<()> {
        self.write_record(record).await
    }

    async fn set_status(
        &self,
        job_id: &str,
        status: JobStatus,
        message: Option<&str>,
    ) -> Result<()> {
        let mut record = self
            .get(job_id)
            .await?
            .with_context(|| format!("no status record for job {}", job_id))?;
        record.status = status;
        if let Some(message) = message {
            record.message = Some(message.to_owned());
        }
        self.write_record(&record).await
    }

    async fn get(&self, job_id: &str) -> Result<Option<JobRecord>> {
        let path = self.record_path(job_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes).with_context(|| {
                    format!("failed to parse status record {:?}", path)
                })?;
                Ok(Some(record))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("failed to read status record {:?}", path)),
        }
    }
}

/// In-memory [`StatusStore`] double for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStatusStore {
    records: std::sync::Mutex<std::collections::HashMap<String, JobRecord>>,
}

#[cfg(test)]
#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn create(&self, record: &JobRecord) -> Result<()> {
        self.records
            .lock()
            .expect("lock poisoned")
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn set_status(
        &self,
        job_id: &str,
        status: JobStatus,
        message: Option<&str>,
    ) -> Result<()> {
        let mut records = self.records.lock().expect("lock poisoned");
        let record = records
            .get_mut(job_id)
            .with_context(|| format!("no status record for job {}", job_id))?;
        record.status = status;
        if let Some(message) = message {
            record.message = Some(message.to_owned());
        }
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<JobRecord>> {
        Ok(self
            .records
            .lock()
            .expect("lock poisoned")
            .get(job_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> FsStatusStore {
        FsStatusStore::new(dir)
    }

    fn sample_record(id: &str) -> JobRecord {
        JobRecord::new(
            id.to_owned(),
            "scan.pdf".to_owned(),
            PathBuf::from(format!("/uploads/{}_scan.pdf", id)),
        )
    }

    #[tokio::test]
    async fn create_then_get_round_trips() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let store = store_in(tmp.path());
        let record = sample_record("job-1");
        store.create(&record).await?;
        assert_eq!(store.get("job-1").await?, Some(record));
        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        assert_eq!(store_in(tmp.path()).get("nope").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn set_status_updates_only_status_and_message() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let store = store_in(tmp.path());
        store.create(&sample_record("job-2")).await?;

        store
            .set_status("job-2", JobStatus::Failed, Some("tesseract failed"))
            .await?;
        let record = store.get("job-2").await?.unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.message.as_deref(), Some("tesseract failed"));
        assert_eq!(record.filename, "scan.pdf");
        Ok(())
    }

    #[tokio::test]
    async fn set_status_without_message_keeps_old_message() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let store = store_in(tmp.path());
        store.create(&sample_record("job-3")).await?;
        store
            .set_status("job-3", JobStatus::Failed, Some("first failure"))
            .await?;
        store.set_status("job-3", JobStatus::Failed, None).await?;
        let record = store.get("job-3").await?.unwrap();
        assert_eq!(record.message.as_deref(), Some("first failure"));
        Ok(())
    }

    #[tokio::test]
    async fn set_status_is_idempotent_on_disk() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let store = store_in(tmp.path());
        store.create(&sample_record("job-4")).await?;

        store
            .set_status("job-4", JobStatus::Failed, Some("boom"))
            .await?;
        let first = std::fs::read(tmp.path().join("job-4.json"))?;
        store
            .set_status("job-4", JobStatus::Failed, Some("boom"))
            .await?;
        let second = std::fs::read(tmp.path().join("job-4.json"))?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn set_status_on_unknown_id_is_an_error() -> Result<()> {
        let tmp = tempfile::TempDir::new()?;
        let result = store_in(tmp.path())
            .set_status("ghost", JobStatus::Processing, None)
            .await;
        assert!(result.is_err());
        Ok(())
    }
}
