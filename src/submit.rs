//! Admission of new jobs: store the file, record it, then enqueue it.

use anyhow::anyhow;
use uuid::Uuid;

use crate::{
    config::Context,
    prelude::*,
    queue::JobQueue,
    store::{JobRecord, StatusStore},
};

/// Admit one file as a new job and return the minted job id.
///
/// Ordering matters here: the stored file lands first and the record second,
/// so by the time the id becomes visible on the queue both already exist.
/// The stored name carries the job id as a prefix to avoid collisions
/// between uploads that share a filename.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn submit_file(
    ctx: &Context,
    queue: &dyn JobQueue,
    store: &dyn StatusStore,
    path: &Path,
) -> Result<String> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("cannot determine a filename for {:?}", path))?
        .to_owned();

    let job_id = Uuid::new_v4().to_string();
    let stored_path = ctx
        .storage
        .upload_dir
        .join(format!("{}_{}", job_id, filename));
    tokio::fs::copy(path, &stored_path)
        .await
        .with_context(|| format!("failed to store {:?} for processing", path))?;

    let record = JobRecord::new(job_id.clone(), filename, stored_path);
    store.create(&record).await?;
    queue.push(&job_id).await?;
    info!(job_id = %job_id, "job submitted");
    Ok(job_id)
}
