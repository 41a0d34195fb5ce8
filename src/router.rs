//! Routes a stored file to the right processing path by extension.

use crate::{error::JobError, prelude::*};

/// Extensions handled by direct OCR, lowercase.
const IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp"];

/// How a stored file should be processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// OCR the file directly.
    Image,
    /// Rasterize to one image per page, then OCR each page.
    Pdf,
}

/// Decide how to process a stored file, without touching its contents.
///
/// The extension match is case-insensitive. Anything outside the recognized
/// set is [`JobError::UnsupportedFormat`], reported before any external tool
/// is invoked.
pub fn classify(path: &Path) -> Result<DocumentKind, JobError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if extension == "pdf" {
        Ok(DocumentKind::Pdf)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(DocumentKind::Image)
    } else {
        Err(JobError::UnsupportedFormat(extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_route_to_direct_ocr() {
        for name in ["a.png", "b.jpg", "c.jpeg", "d.tiff", "e.webp", "f.bmp"] {
            assert_eq!(classify(Path::new(name)).unwrap(), DocumentKind::Image);
        }
    }

    #[test]
    fn pdf_routes_to_rasterization() {
        assert_eq!(classify(Path::new("scan.pdf")).unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(classify(Path::new("SCAN.PDF")).unwrap(), DocumentKind::Pdf);
        assert_eq!(classify(Path::new("photo.PNG")).unwrap(), DocumentKind::Image);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = classify(Path::new("report.docx")).unwrap_err();
        assert!(matches!(err, JobError::UnsupportedFormat(ext) if ext == "docx"));
    }

    #[test]
    fn missing_extension_is_unsupported() {
        assert!(matches!(
            classify(Path::new("no_extension")),
            Err(JobError::UnsupportedFormat(_))
        ));
    }
}
