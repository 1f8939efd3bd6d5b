//! Loading a knowledge-base file into a paged [`Document`].
//!
//! PDFs are read page by page with `pdf-extract`. Plain-text files (`.txt`,
//! `.md`) become one page per form-feed separated section.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Document;

pub const PAGE_BREAK: char = '\u{c}';

pub fn load_document(path: &Path) -> Result<Document> {
    if !path.is_file() {
        return Err(Error::document_load(path, "file not found"));
    }
    let extension = path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
    let document = match extension.as_deref() {
        Some("pdf") => load_pdf(path)?,
        Some("txt" | "md" | "text") => load_text(path)?,
        other => {
            return Err(Error::document_load(
                path,
                format!("unsupported file type '{}'", other.unwrap_or("")),
            ))
        }
    };
    tracing::info!(path = %path.display(), pages = document.page_count(), "loaded document");
    Ok(document)
}

fn load_pdf(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).map_err(|e| Error::document_load(path, e))?;
    // pdf-extract panics on some malformed inputs
    let pages = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(&bytes)))
        .map_err(|_| Error::document_load(path, "PDF parser aborted"))?
        .map_err(|e| Error::document_load(path, format!("PDF extraction error: {e}")))?;
    Ok(Document::from_pages(pages))
}

fn load_text(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).map_err(|e| Error::document_load(path, e))?;
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    Ok(Document::from_pages(content.split(PAGE_BREAK)))
}
