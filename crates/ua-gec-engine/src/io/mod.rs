use crate::{AnnotatedText, AnnotationError};
use regex::Regex;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extension of annotated corpus documents.
pub const ANNOTATED_EXTENSION: &str = "ann";

static DOCUMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)\.a(\d+)\.ann$").expect("document name pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid corpus directory: {0}")]
    InvalidCorpusDir(String),
    #[error("Invalid document file name: {0}")]
    InvalidFileName(String),
    #[error("Failed to read markup in {path}: {source}")]
    Markup {
        path: PathBuf,
        source: AnnotationError,
    },
}

/// Identity of a corpus document, taken from its `{doc_id}.a{annotator_id}.ann`
/// file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentName {
    pub doc_id: String,
    pub annotator_id: u32,
}

impl DocumentName {
    pub fn parse(file_name: &str) -> Result<Self, IoError> {
        let invalid = || IoError::InvalidFileName(file_name.to_string());
        let caps = DOCUMENT_NAME.captures(file_name).ok_or_else(invalid)?;
        let annotator_id = caps[2].parse().map_err(|_| invalid())?;
        Ok(Self {
            doc_id: caps[1].to_string(),
            annotator_id,
        })
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}.a{}.{ANNOTATED_EXTENSION}",
            self.doc_id, self.annotator_id
        )
    }
}

/// One annotated document loaded from a corpus directory.
#[derive(Debug, Clone)]
pub struct CorpusDocument {
    pub name: DocumentName,
    /// Path relative to the corpus root.
    pub path: RelativePathBuf,
    pub annotated: AnnotatedText,
}

impl CorpusDocument {
    /// The original, uncorrected text.
    pub fn source(&self) -> String {
        self.annotated.original_text()
    }

    /// The text with top-ranked corrections applied.
    pub fn target(&self) -> String {
        self.annotated.corrected_text(0)
    }
}

/// Read an annotated document
pub fn read_annotated(
    relative_path: &RelativePath,
    corpus_root: &Path,
) -> Result<AnnotatedText, IoError> {
    let absolute_path = relative_path.to_path(corpus_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    let bytes = fs::read(&absolute_path).map_err(IoError::Io)?;
    AnnotatedText::from_bytes(&bytes).map_err(|source| IoError::Markup {
        path: absolute_path,
        source,
    })
}

/// Write an annotated document as markup, metadata included
pub fn write_annotated(
    relative_path: &RelativePath,
    corpus_root: &Path,
    text: &AnnotatedText,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(corpus_root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, text.annotated_text(true)).map_err(IoError::Io)
}

/// Scan for annotated documents in the corpus directory
pub fn scan_annotated_files(corpus_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_corpus_dir(corpus_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(corpus_root, &mut files)?;
    files.sort();
    Ok(files)
}

/// Load every well-named annotated document under the corpus directory.
///
/// Files whose names do not follow `{doc_id}.a{annotator_id}.ann` are skipped.
pub fn load_documents(corpus_root: &Path) -> Result<Vec<CorpusDocument>, IoError> {
    let mut documents = Vec::new();

    for path in scan_annotated_files(corpus_root)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            log::warn!("Skipping non UTF-8 file name: {}", path.display());
            continue;
        };
        let name = match DocumentName::parse(file_name) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };
        let relative = match path
            .strip_prefix(corpus_root)
            .ok()
            .and_then(|p| RelativePathBuf::from_path(p).ok())
        {
            Some(relative) => relative,
            None => {
                log::warn!("Skipping {}: not under corpus root", path.display());
                continue;
            }
        };

        let annotated = read_annotated(&relative, corpus_root)?;
        documents.push(CorpusDocument {
            name,
            path: relative,
            annotated,
        });
    }

    log::debug!(
        "loaded {} documents from {}",
        documents.len(),
        corpus_root.display()
    );
    Ok(documents)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == ANNOTATED_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_corpus_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidCorpusDir(format!(
            "corpus directory not found: {}",
            path.display()
        )));
    }

    Ok(())
}
