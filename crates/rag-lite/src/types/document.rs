//! Document and chunk types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// PDF document
    Pdf,
}

impl FileType {
    /// Every supported type, in display order
    pub const ALL: [FileType; 3] = [FileType::Txt, FileType::Pdf, FileType::Markdown];

    /// Detect file type from an extension (with or without the leading dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "txt" => Some(Self::Txt),
            "md" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect file type from a filename
    pub fn from_filename(filename: &str) -> Option<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension, including the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => ".txt",
            Self::Markdown => ".md",
            Self::Pdf => ".pdf",
        }
    }

    /// Comma-separated list of supported extensions, for error messages
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Metadata persisted with every stored record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source filename as uploaded
    pub filename: String,
    /// Position of the chunk within its document
    pub chunk_index: usize,
}

impl ChunkMetadata {
    /// Create metadata for one chunk
    pub fn new(filename: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            filename: filename.into(),
            chunk_index,
        }
    }

    /// Deterministic record id; re-adding the same chunk overwrites it
    pub fn record_id(&self) -> String {
        format!("{}_chunk{}", self.filename, self.chunk_index)
    }
}

/// A contiguous piece of a document's extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source filename
    pub filename: String,
    /// Ordinal within the document
    pub index: usize,
    /// Chunk text
    pub content: String,
}

impl Chunk {
    /// Number each piece of `pieces` as a chunk of `filename`
    pub fn from_texts(filename: &str, pieces: Vec<String>) -> Vec<Self> {
        pieces
            .into_iter()
            .enumerate()
            .map(|(index, content)| Self {
                filename: filename.to_string(),
                index,
                content,
            })
            .collect()
    }

    /// Metadata for storage
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata::new(&self.filename, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_is_case_insensitive() {
        assert_eq!(FileType::from_filename("notes.TXT"), Some(FileType::Txt));
        assert_eq!(FileType::from_filename("README.Md"), Some(FileType::Markdown));
        assert_eq!(FileType::from_filename("paper.pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_extension(".PDF"), Some(FileType::Pdf));
        assert_eq!(FileType::from_filename("report.docx"), None);
        assert_eq!(FileType::from_filename("no_extension"), None);
    }

    #[test]
    fn test_record_id() {
        let chunks = Chunk::from_texts("notes.txt", vec!["a".into(), "b".into()]);
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[1].metadata().record_id(), "notes.txt_chunk1");
    }
}
