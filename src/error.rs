//! The job failure taxonomy.
//!
//! Every way a single job can fail is an explicit variant here, returned as a
//! value from the component that detected it. The worker loop maps any of
//! these to a `failed` status with the variant's `Display` text and moves on
//! to the next job. Only queue/store outages hit at the loop level escape
//! this type, as plain [`anyhow::Error`]s.

use thiserror::Error;

use crate::prelude::*;

/// Why one job could not be completed.
#[derive(Debug, Error)]
pub enum JobError {
    /// The popped id has no record in the status store.
    #[error("no status record for job {0}")]
    JobNotFound(String),

    /// The uploaded file vanished before processing. Terminal, never retried.
    #[error("stored file {0:?} is missing")]
    InputFileMissing(PathBuf),

    /// The stored file's extension is not one we know how to process.
    #[error("unsupported file format {0:?} (supported: png, jpg, jpeg, tif, tiff, bmp, gif, webp, pdf)")]
    UnsupportedFormat(String),

    /// An external tool exited non-zero or produced unusable output.
    #[error("{tool} failed: {message}")]
    ToolFailure {
        tool: &'static str,
        message: String,
    },

    /// Every page came back blank after trimming.
    #[error("no text could be extracted from any page")]
    EmptyResult,

    /// A filesystem or backend operation failed mid-job. Fails this job
    /// only; the worker keeps polling.
    #[error("storage failure: {0:#}")]
    Infra(anyhow::Error),
}

impl From<anyhow::Error> for JobError {
    fn from(err: anyhow::Error) -> Self {
        JobError::Infra(err)
    }
}
