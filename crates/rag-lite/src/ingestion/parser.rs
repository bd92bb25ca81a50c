//! Text extraction for the supported upload formats

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::FileType;

/// Multi-format file parser
///
/// Only a missing file is an error. Any other extraction failure is logged
/// and yields an empty string; the caller decides whether that is fatal.
pub struct FileParser;

impl FileParser {
    /// Extract the text of `path`, interpreting it as `file_type`
    pub fn parse_file(path: &Path, file_type: FileType) -> Result<String> {
        tracing::info!("Parsing document: {} ({})", path.display(), file_type);

        if !path.exists() {
            tracing::error!("File not found at {}", path.display());
            return Err(Error::NotFound(path.display().to_string()));
        }

        let text = match file_type {
            FileType::Txt | FileType::Markdown => Self::parse_text(path)?,
            FileType::Pdf => Self::parse_pdf(path),
        };

        tracing::info!("Parsed document, text length: {}", text.chars().count());
        Ok(text)
    }

    /// Read a UTF-8 text or markdown file
    fn parse_text(path: &Path) -> Result<String> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(path.display().to_string()));
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return Ok(String::new());
            }
        };

        match String::from_utf8(data) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!("{} is not valid UTF-8: {}", path.display(), e);
                Ok(String::new())
            }
        }
    }

    /// Extract PDF text page by page, in page order, one newline after each page
    fn parse_pdf(path: &Path) -> String {
        let doc = match lopdf::Document::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Failed to load PDF {}: {}", path.display(), e);
                return String::new();
            }
        };

        let mut text = String::new();
        // BTreeMap keys are page numbers, so iteration is already in page order
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(page_text) => {
                    let page_text = page_text.replace('\0', "");
                    if !page_text.trim().is_empty() {
                        text.push_str(&page_text);
                        text.push('\n');
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to extract page {} of {}: {}",
                        page_number,
                        path.display(),
                        e
                    );
                    return String::new();
                }
            }
        }

        text
    }
}
