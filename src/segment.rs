//! Document segmentation: raw text into pages, pages into sections.
//!
//! Text documents carry no physical page boundaries, so pages are synthesized
//! by accumulating blank-line-delimited paragraphs until a page exceeds a
//! fixed character budget. Section headings inside a page are recognized by
//! their dotted numeric prefix (`"2.1 Related Work"`).

use regex::Regex;
use std::sync::LazyLock;

/// Character budget after which an accumulating page is closed.
pub const PAGE_CHAR_LIMIT: usize = 2000;

/// Title given to body text that precedes the first detected heading.
pub const IMPLICIT_SECTION_TITLE: &str = "Introduction";

static HEADING_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)\s+(.+)$").expect("valid heading regex"));

/// A single synthesized page of document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 1-indexed page number.
    pub number: usize,
    /// Raw page text, paragraphs joined by blank lines.
    pub text: String,
}

/// A detected section within one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading title without its numeric prefix, or the implicit title.
    pub title: String,
    /// Trimmed body lines joined by newlines.
    pub body: String,
}

/// Split raw text into at most `max_pages` pages.
///
/// Paragraphs are accumulated into the current page until the joined text
/// exceeds [`PAGE_CHAR_LIMIT`] characters; the page is then closed and a new
/// one started. Text beyond the page limit is silently dropped. A trailing
/// partial page is kept.
pub fn segment(text: &str, max_pages: usize) -> Vec<PageText> {
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let mut paragraph_count = 0usize;
    let mut page_number = 1usize;

    for paragraph in text.split("\n\n") {
        if paragraph_count > 0 {
            current.push_str("\n\n");
            current_chars += 2;
        }
        current.push_str(paragraph);
        current_chars += paragraph.chars().count();
        paragraph_count += 1;

        if current_chars > PAGE_CHAR_LIMIT {
            pages.push(PageText {
                number: page_number,
                text: std::mem::take(&mut current),
            });
            current_chars = 0;
            paragraph_count = 0;
            page_number += 1;
            if page_number > max_pages {
                break;
            }
        }
    }

    if paragraph_count > 0 && page_number <= max_pages {
        pages.push(PageText {
            number: page_number,
            text: current,
        });
    }

    pages
}

/// Detect numbered section headings in a page's text.
///
/// Lines are trimmed and blank lines skipped. A line matching the dotted
/// numeric heading pattern starts a new section; accumulated non-heading
/// lines form the current section's body. Body text seen before any heading
/// is attributed to a synthetic [`IMPLICIT_SECTION_TITLE`] section. Sections
/// without any body text are not emitted.
pub fn detect_headings(page_text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current_title = IMPLICIT_SECTION_TITLE.to_string();
    let mut buffer: Vec<&str> = Vec::new();

    for line in page_text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        if let Some(caps) = HEADING_PATTERN.captures(stripped) {
            if !buffer.is_empty() {
                sections.push(Section {
                    title: current_title.clone(),
                    body: buffer.join("\n"),
                });
                buffer.clear();
            }
            current_title = caps[2].to_string();
        } else {
            buffer.push(stripped);
        }
    }

    if !buffer.is_empty() {
        sections.push(Section {
            title: current_title,
            body: buffer.join("\n"),
        });
    }

    sections
}
