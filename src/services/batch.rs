//! Batch export: filename derivation and the archive collaborator seam.

use std::sync::Arc;

use crate::models::OutputFormat;

/// Derive the export filename for a converted item: strip the source
/// extension, append the target format's canonical extension.
pub fn export_filename(source_name: &str, format: OutputFormat) -> String {
    let stem = match source_name.rfind('.') {
        // a leading dot is a hidden-file name, not an extension
        Some(pos) if pos > 0 => &source_name[..pos],
        _ => source_name,
    };
    format!("{stem}.{}", format.canonical_extension())
}

/// Archive bundling is an external collaborator; the controller only needs
/// something that takes named blobs and produces one archive blob.
pub trait ArchiveWriter {
    fn bundle(&self, entries: &[(String, Arc<Vec<u8>>)]) -> std::io::Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_source_extension() {
        assert_eq!(export_filename("photo.png", OutputFormat::Gif), "photo.gif");
        assert_eq!(export_filename("scan.tiff", OutputFormat::Png), "scan.png");
    }

    #[test]
    fn jpeg_gets_the_jpg_extension() {
        assert_eq!(export_filename("photo.png", OutputFormat::Jpeg), "photo.jpg");
    }

    #[test]
    fn extensionless_and_hidden_names() {
        assert_eq!(export_filename("photo", OutputFormat::Webp), "photo.webp");
        assert_eq!(export_filename(".hidden", OutputFormat::Png), ".hidden.png");
    }

    #[test]
    fn only_the_last_extension_is_stripped() {
        assert_eq!(
            export_filename("archive.tar.png", OutputFormat::Gif),
            "archive.tar.gif"
        );
    }
}
