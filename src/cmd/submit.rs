//! The `submit` subcommand.

use clap::Args;

use crate::{
    config::{Context, StorageOpts},
    prelude::*,
    queue::FsQueue,
    store::FsStatusStore,
    submit::submit_file,
};

/// Options for the `submit` subcommand.
#[derive(Args, Debug)]
pub struct SubmitOpts {
    #[clap(flatten)]
    pub storage: StorageOpts,

    /// Files to submit for OCR.
    #[clap(required = true)]
    pub files: Vec<PathBuf>,
}

/// Store each file, enqueue it, and print the minted job ids.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_submit(opts: &SubmitOpts) -> Result<()> {
    let ctx = Context::new(opts.storage.clone())?;
    let queue = FsQueue::new(&ctx.storage.queue_dir);
    let store = FsStatusStore::new(&ctx.storage.status_dir);

    for file in &opts.files {
        let job_id = submit_file(&ctx, &queue, &store, file).await?;
        println!("{}", job_id);
    }
    Ok(())
}
