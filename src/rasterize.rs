//! PDF page rasterization via Poppler's `pdftoppm`.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::{error::JobError, prelude::*, subprocess::check_tool_output};

/// Matches the page number `pdftoppm` appends to its output prefix.
static PAGE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^page-0*(\d+)\.png$").expect("failed to compile regex"));

/// `pdftoppm` sometimes exits zero while printing errors for damaged PDFs.
static PDF_ERROR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)syntax error|command line error").expect("failed to compile regex"));

/// One rasterized page, valid only while the owning job's work dir exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page number within the source document.
    pub page: usize,
    pub path: PathBuf,
}

/// External-process boundary for turning a PDF into per-page images.
#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    /// Convert every page of `pdf` into an image under `work_dir`, returned
    /// in page order. An empty result means the document produced no usable
    /// pages; the caller treats that as total job failure.
    async fn rasterize(
        &self,
        pdf: &Path,
        work_dir: &Path,
    ) -> Result<Vec<PageImage>, JobError>;
}

/// A [`PdfRasterizer`] shelling out to `pdftoppm` at a fixed resolution.
pub struct PdftoppmRasterizer {
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

#[async_trait]
impl PdfRasterizer for PdftoppmRasterizer {
    #[instrument(level = "debug", skip_all, fields(pdf = %pdf.display(), dpi = self.dpi))]
    async fn rasterize(
        &self,
        pdf: &Path,
        work_dir: &Path,
    ) -> Result<Vec<PageImage>, JobError> {
        let prefix = work_dir.join("page");
        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf)
            .arg(&prefix)
            .output()
            .await
            .map_err(|err| JobError::ToolFailure {
                tool: "pdftoppm",
                message: format!("failed to launch: {}", err),
            })?;
        check_tool_output("pdftoppm", &output, Some(&PDF_ERROR_REGEX))?;
        collect_page_images(work_dir)
    }
}

/// List the page images in a work directory, ordered by page number.
///
/// The page number is parsed out of each filename and sorted numerically, so
/// documents long enough to mix zero-padding widths still come back in page
/// order rather than lexical filename order.
pub fn collect_page_images(work_dir: &Path) -> Result<Vec<PageImage>, JobError> {
    let entries = work_dir
        .read_dir()
        .with_context(|| format!("failed to read work directory {:?}", work_dir))?;

    let mut pages = vec![];
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to list work directory {:?}", work_dir))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if let Some(captures) = PAGE_NUMBER_REGEX.captures(name) {
            let page = captures[1]
                .parse::<usize>()
                .with_context(|| format!("unparseable page number in {:?}", name))?;
            pages.push(PageImage { page, path });
        }
    }
    pages.sort_by_key(|page_image| page_image.page);
    Ok(pages)
}
