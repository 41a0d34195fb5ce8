//! Text recognition via the `tesseract` CLI.

use async_trait::async_trait;
use tokio::process::Command;

use crate::{config::OcrOpts, error::JobError, prelude::*, subprocess::check_tool_output};

/// External-process boundary performing text recognition on one image.
///
/// Each invocation is independent; there is no shared state between calls.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract text from one image. Empty text is a valid result (a blank
    /// page); a non-zero exit from the recognizer is not.
    async fn recognize(&self, image: &Path) -> Result<String, JobError>;
}

/// An [`OcrEngine`] wrapping the `tesseract` CLI tool.
pub struct TesseractEngine {
    languages: String,
    oem: u32,
    psm: u32,
}

impl TesseractEngine {
    pub fn new(opts: &OcrOpts) -> Self {
        Self {
            languages: opts.languages.clone(),
            oem: opts.oem,
            psm: opts.psm,
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    #[instrument(level = "debug", skip_all, fields(image = %image.display()))]
    async fn recognize(&self, image: &Path) -> Result<String, JobError> {
        // tesseract writes `<base>.txt`; keep the base in a scratch dir so
        // nothing lands next to the input file.
        let scratch = tempfile::TempDir::with_prefix("tesseract")
            .context("failed to create tesseract scratch directory")?;
        let out_base = scratch.path().join("output");

        let output = Command::new("tesseract")
            .arg(image)
            .arg(&out_base)
            .arg("-l")
            .arg(&self.languages)
            .arg("--oem")
            .arg(self.oem.to_string())
            .arg("--psm")
            .arg(self.psm.to_string())
            .output()
            .await
            .map_err(|err| JobError::ToolFailure {
                tool: "tesseract",
                message: format!("failed to launch: {}", err),
            })?;
        check_tool_output("tesseract", &output, None)?;

        let text = tokio::fs::read_to_string(out_base.with_extension("txt"))
            .await
            .context("failed to read tesseract output file")?;
        Ok(text)
    }
}
