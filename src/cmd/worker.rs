//! The `worker` subcommand.

use std::sync::Arc;

use clap::Args;

use crate::{
    config::{Context, OcrOpts, StorageOpts},
    engine::{OcrEngine, TesseractEngine},
    prelude::*,
    queue::{FsQueue, JobQueue},
    rasterize::{PdfRasterizer, PdftoppmRasterizer},
    store::{FsStatusStore, StatusStore},
    worker::Worker,
};

/// Options for the `worker` subcommand.
#[derive(Args, Debug)]
pub struct WorkerOpts {
    #[clap(flatten)]
    pub storage: StorageOpts,

    #[clap(flatten)]
    pub ocr: OcrOpts,

    /// How many seconds one blocking queue pop may wait before the idle
    /// loop checks again. Governs how quickly an idle worker notices new
    /// work after a restart.
    #[clap(long, default_value = "2")]
    pub poll_timeout_secs: u64,
}

/// Run the worker loop until interrupted.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_worker(opts: &WorkerOpts) -> Result<()> {
    // Failing to set up the directories here is fatal; without them no job
    // can be processed at all.
    let ctx = Context::new(opts.storage.clone())?;

    let queue: Arc<dyn JobQueue> = Arc::new(FsQueue::new(&ctx.storage.queue_dir));
    let store: Arc<dyn StatusStore> =
        Arc::new(FsStatusStore::new(&ctx.storage.status_dir));
    let rasterizer: Arc<dyn PdfRasterizer> =
        Arc::new(PdftoppmRasterizer::new(opts.ocr.dpi));
    let engine: Arc<dyn OcrEngine> = Arc::new(TesseractEngine::new(&opts.ocr));

    info!(
        upload_dir = ?ctx.storage.upload_dir,
        result_dir = ?ctx.storage.result_dir,
        languages = %opts.ocr.languages,
        "OCR worker started"
    );
    let worker = Worker::new(
        ctx,
        Duration::from_secs(opts.poll_timeout_secs),
        queue,
        store,
        rasterizer,
        engine,
    );
    worker.run().await
}
