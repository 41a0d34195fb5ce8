//! The worker loop: pops jobs, routes them, records outcomes.
//!
//! One sequential loop processes one job at a time to completion. A job's
//! failure is recorded in the status store and never escapes the loop; only
//! queue/store outages bubble up, and those are retried with backoff rather
//! than crashing the worker. Nothing is ever retried at the job level: a
//! failed job stays `failed`, and a fresh submission is the only way to
//! reprocess a document.

use std::sync::Arc;

use crate::{
    aggregate::aggregate_pages,
    config::Context,
    engine::OcrEngine,
    error::JobError,
    prelude::*,
    queue::JobQueue,
    rasterize::PdfRasterizer,
    router::{self, DocumentKind},
    store::{JobRecord, JobStatus, StatusStore},
};

/// Upper bound for the backoff applied after queue or store failures.
const MAX_INFRA_BACKOFF: Duration = Duration::from_secs(60);

/// The top-level driver for OCR jobs.
pub struct Worker {
    ctx: Context,
    poll_timeout: Duration,
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn StatusStore>,
    rasterizer: Arc<dyn PdfRasterizer>,
    engine: Arc<dyn OcrEngine>,
}

impl Worker {
    pub fn new(
        ctx: Context,
        poll_timeout: Duration,
        queue: Arc<dyn JobQueue>,
        store: Arc<dyn StatusStore>,
        rasterizer: Arc<dyn PdfRasterizer>,
        engine: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            ctx,
            poll_timeout,
            queue,
            store,
            rasterizer,
            engine,
        }
    }

    /// Run until the surrounding task is cancelled.
    ///
    /// Queue or store failures are logged and retried with exponential
    /// backoff, so a transient outage stalls the worker instead of killing
    /// it. A crash between pop and the `processing` status update loses the
    /// popped id permanently; see the module docs in [`crate::queue`].
    pub async fn run(&self) -> Result<()> {
        let mut consecutive_failures = 0u32;
        loop {
            match self.poll_once().await {
                Ok(_) => consecutive_failures = 0,
                Err(err) => {
                    consecutive_failures += 1;
                    let backoff = infra_backoff(consecutive_failures);
                    warn!(
                        error = %format!("{:#}", err),
                        backoff_secs = backoff.as_secs(),
                        "queue or status store unavailable, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// Pop and process at most one job. Returns whether a job id was seen.
    ///
    /// Errors returned here are infrastructure failures. Job-level failures
    /// are recorded as a `failed` status and absorbed.
    pub async fn poll_once(&self) -> Result<bool> {
        let Some(job_id) = self.queue.pop_blocking(self.poll_timeout).await? else {
            // Idle poll, not an error.
            return Ok(false);
        };
        self.process_job(&job_id).await?;
        Ok(true)
    }

    /// Drive one popped job to a terminal status.
    #[instrument(level = "info", skip_all, fields(job_id = %job_id))]
    async fn process_job(&self, job_id: &str) -> Result<()> {
        let Some(record) = self.store.get(job_id).await? else {
            // No record means no status we could update. Drop the id.
            warn!("popped job id has no status record, dropping");
            return Ok(());
        };

        self.store
            .set_status(job_id, JobStatus::Processing, None)
            .await?;

        match self.process_document(&record).await {
            Ok(()) => {
                self.store
                    .set_status(job_id, JobStatus::Completed, None)
                    .await?;
                info!("job completed");
            }
            Err(err) => {
                self.store
                    .set_status(job_id, JobStatus::Failed, Some(&err.to_string()))
                    .await?;
                warn!(error = %err, "job failed");
            }
        }
        Ok(())
    }

    /// Extract and persist text for one job. Any error fails the job.
    async fn process_document(&self, record: &JobRecord) -> Result<(), JobError> {
        if !record.stored_path.exists() {
            return Err(JobError::InputFileMissing(record.stored_path.clone()));
        }

        let pages = match router::classify(&record.stored_path)? {
            DocumentKind::Image => {
                vec![self.engine.recognize(&record.stored_path).await?]
            }
            DocumentKind::Pdf => self.process_pdf(record).await?,
        };

        let text = aggregate_pages(&pages).ok_or(JobError::EmptyResult)?;
        let result_path = self.ctx.result_path(&record.id);
        tokio::fs::write(&result_path, &text)
            .await
            .with_context(|| format!("failed to write result {:?}", result_path))?;

        // The upload is only deleted once the result is durably in place.
        // Failed jobs keep their input around for inspection.
        if let Err(err) = tokio::fs::remove_file(&record.stored_path).await {
            warn!(
                path = ?record.stored_path,
                error = %err,
                "could not delete processed upload"
            );
        }
        Ok(())
    }

    /// Rasterize a PDF and OCR each page, in page order.
    ///
    /// The scratch directory lives under the result directory and is removed
    /// on every exit path by the [`tempfile::TempDir`] guard; each page image
    /// is additionally deleted as soon as its OCR pass finishes.
    async fn process_pdf(&self, record: &JobRecord) -> Result<Vec<String>, JobError> {
        let work_dir = tempfile::TempDir::with_prefix_in(
            format!("job-{}-", record.id),
            &self.ctx.storage.result_dir,
        )
        .context("failed to create rasterization work directory")?;

        let page_images = self
            .rasterizer
            .rasterize(&record.stored_path, work_dir.path())
            .await?;
        if page_images.is_empty() {
            return Err(JobError::ToolFailure {
                tool: "pdftoppm",
                message: "produced no page images".to_owned(),
            });
        }

        let mut pages = Vec::with_capacity(page_images.len());
        for page_image in &page_images {
            // A page that fails to OCR contributes no text, same as a blank
            // page; the job only fails if every page comes back blank.
            let text = match self.engine.recognize(&page_image.path).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(page = page_image.page, error = %err, "page could not be recognized");
                    String::new()
                }
            };
            pages.push(text);
            if let Err(err) = tokio::fs::remove_file(&page_image.path).await {
                debug!(path = ?page_image.path, error = %err, "could not delete page image");
            }
        }
        Ok(pages)
    }
}

/// Exponential backoff with a cap, starting at one second.
fn infra_backoff(consecutive_failures: u32) -> Duration {
    let exponent = consecutive_failures.saturating_sub(1).min(6);
    MAX_INFRA_BACKOFF.min(Duration::from_secs(1 << exponent))
}
