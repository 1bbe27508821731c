// src/parsers/pdf.rs

//! PDF text extraction.

use lopdf::Document;

use crate::error::Result;

/// Extract per-page text tokens from a PDF byte buffer.
///
/// Pages come out in document order; within a page, tokens follow the
/// layout engine's native text order with no reordering. Later stages
/// reorder within a page as their grammar requires.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let doc = Document::load_mem(bytes)?;

    let mut pages = Vec::new();
    for &page_no in doc.get_pages().keys() {
        let text = doc.extract_text(&[page_no])?;
        let tokens = text.lines().map(str::to_string).collect();
        pages.push(tokens);
    }
    Ok(pages)
}
