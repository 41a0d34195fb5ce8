//! The `status` subcommand.

use clap::Args;

use crate::{
    config::{Context, StorageOpts},
    error::JobError,
    prelude::*,
    store::{FsStatusStore, JobStatus, StatusStore as _},
};

/// Options for the `status` subcommand.
#[derive(Args, Debug)]
pub struct StatusOpts {
    #[clap(flatten)]
    pub storage: StorageOpts,

    /// Job id printed by `submit`.
    pub job_id: String,

    /// Also print the extracted text once the job has completed.
    #[clap(long)]
    pub with_text: bool,
}

/// Print a job's status record as JSON, and optionally its result text.
///
/// This is a read-only view; it never mutates the queue or the store.
#[instrument(level = "debug", skip_all, fields(job_id = %opts.job_id))]
pub async fn cmd_status(opts: &StatusOpts) -> Result<()> {
    let ctx = Context::new(opts.storage.clone())?;
    let store = FsStatusStore::new(&ctx.storage.status_dir);

    let Some(record) = store.get(&opts.job_id).await? else {
        return Err(JobError::JobNotFound(opts.job_id.clone()).into());
    };
    println!("{}", serde_json::to_string_pretty(&record)?);

    if opts.with_text && record.status == JobStatus::Completed {
        let result_path = ctx.result_path(&opts.job_id);
        let text = tokio::fs::read_to_string(&result_path)
            .await
            .with_context(|| format!("failed to read result {:?}", result_path))?;
        println!("{}", text);
    }
    Ok(())
}
