//! Splitting long guides into headed sections and pages for display.

use serde::Serialize;

pub const DEFAULT_SECTIONS_PER_PAGE: usize = 3;
pub const DEFAULT_CHARS_PER_PAGE: usize = 6000;

const HEADING_PREFIX: &str = "## ";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

impl Section {
    fn char_len(&self) -> usize {
        self.title.chars().count() + self.content.chars().count()
    }
}

/// Split markdown into sections, one per `## ` heading line.
///
/// Text before the first heading is dropped. Text with no heading at all
/// becomes a single untitled section.
pub fn split_markdown_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in markdown.split('\n') {
        if line.starts_with(HEADING_PREFIX) {
            if let Some((title, body)) = current.take() {
                sections.push(finish(title, &body));
            }
            current = Some((line.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((title, body)) = current {
        sections.push(finish(title, &body));
    }

    if sections.is_empty() && !markdown.trim().is_empty() {
        sections.push(Section {
            title: String::new(),
            content: markdown.trim().to_string(),
        });
    }

    sections
}

fn finish(title: String, body: &[&str]) -> Section {
    Section {
        title,
        content: body.join("\n").trim().to_string(),
    }
}

/// Group consecutive sections into pages of at most `max_sections_per_page`.
///
/// A page closes early when the next section would push it past
/// `max_chars_per_page`, but every page holds at least one section.
pub fn paginate_sections(
    sections: &[Section],
    max_sections_per_page: usize,
    max_chars_per_page: usize,
) -> Vec<Vec<Section>> {
    let per_page = max_sections_per_page.max(1);
    let mut pages = Vec::new();
    let mut start = 0;

    while start < sections.len() {
        let mut page: Vec<Section> = Vec::new();
        let mut chars = 0;

        for section in sections[start..].iter().take(per_page) {
            let len = section.char_len();
            if !page.is_empty() && chars + len > max_chars_per_page {
                break;
            }
            page.push(section.clone());
            chars += len;
        }

        start += page.len();
        pages.push(page);
    }

    pages
}
