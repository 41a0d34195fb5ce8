//! Startup configuration, resolved once and passed into every component.
//!
//! There are no global clients or hardwired paths anywhere else in the crate;
//! tests construct a [`Context`] over a temporary directory and in-memory
//! queue/store doubles.

use clap::Args;

use crate::prelude::*;

/// Where uploads, results, status records and the queue spool live.
#[derive(Args, Clone, Debug)]
pub struct StorageOpts {
    /// Directory holding uploaded input files.
    #[clap(long, default_value = "data/uploads")]
    pub upload_dir: PathBuf,

    /// Directory holding result text files. Per-job rasterization scratch
    /// directories are created underneath it while a PDF job runs.
    #[clap(long, default_value = "data/results")]
    pub result_dir: PathBuf,

    /// Spool directory backing the durable job queue.
    #[clap(long, default_value = "data/queue")]
    pub queue_dir: PathBuf,

    /// Directory holding one status record per job.
    #[clap(long, default_value = "data/status")]
    pub status_dir: PathBuf,
}

/// Settings forwarded to the external OCR tools.
#[derive(Args, Clone, Debug)]
pub struct OcrOpts {
    /// Languages to recognize, in tesseract `-l` syntax.
    #[clap(long, default_value = "eng+spa")]
    pub languages: String,

    /// Tesseract OCR engine mode (`--oem`).
    #[clap(long, default_value = "3")]
    pub oem: u32,

    /// Tesseract page segmentation mode (`--psm`).
    #[clap(long, default_value = "3")]
    pub psm: u32,

    /// Resolution for rasterized PDF pages, in DPI.
    #[clap(long, default_value = "300")]
    pub dpi: u32,
}

/// Shared context for one process: directory layout, created at startup.
///
/// Failure to create the directories is fatal, because no job can be
/// admitted or processed without them.
#[derive(Clone, Debug)]
pub struct Context {
    pub storage: StorageOpts,
}

impl Context {
    pub fn new(storage: StorageOpts) -> Result<Self> {
        for dir in [
            &storage.upload_dir,
            &storage.result_dir,
            &storage.queue_dir,
            &storage.status_dir,
        ] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {:?}", dir))?;
        }
        Ok(Self { storage })
    }

    /// Where the result blob for `job_id` lives once the job completes.
    pub fn result_path(&self, job_id: &str) -> PathBuf {
        self.storage.result_dir.join(format!("{}.txt", job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_creates_missing_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = StorageOpts {
            upload_dir: tmp.path().join("a/uploads"),
            result_dir: tmp.path().join("a/results"),
            queue_dir: tmp.path().join("b/queue"),
            status_dir: tmp.path().join("b/status"),
        };
        let ctx = Context::new(storage).unwrap();
        assert!(ctx.storage.upload_dir.is_dir());
        assert!(ctx.storage.status_dir.is_dir());
    }

    #[test]
    fn result_path_is_keyed_by_job_id() {
        let tmp = tempfile::TempDir::new().unwrap();
        let storage = StorageOpts {
            upload_dir: tmp.path().join("uploads"),
            result_dir: tmp.path().join("results"),
            queue_dir: tmp.path().join("queue"),
            status_dir: tmp.path().join("status"),
        };
        let ctx = Context::new(storage).unwrap();
        assert_eq!(
            ctx.result_path("abc-123"),
            tmp.path().join("results/abc-123.txt")
        );
    }
}
