//! Markdown to HTML rendering.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::util::AnchorAllocator;

/// Heading attributes carry member anchors; the rest is the GFM set.
const PARSER_OPTIONS: Options = Options::ENABLE_HEADING_ATTRIBUTES
    .union(Options::ENABLE_TABLES)
    .union(Options::ENABLE_STRIKETHROUGH)
    .union(Options::ENABLE_TASKLISTS)
    .union(Options::ENABLE_FOOTNOTES);

/// Result of rendering markdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Title extracted from the first H1 heading (if title extraction was enabled).
    pub title: Option<String>,
}

/// Markdown renderer producing HTML with an `id` on every heading.
///
/// Explicit `{#id}` heading attributes are kept verbatim. Other headings get
/// the slug of their text, made unique within the page in document order
/// without colliding with any explicit id. Tables, strikethrough, task
/// lists and footnotes are always on.
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    extract_title: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extract_title: false,
        }
    }

    /// Enable title extraction from the first H1 heading.
    ///
    /// The heading is still rendered.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Render markdown text to HTML.
    pub fn render(&self, markdown: &str) -> RenderResult {
        let mut events: Vec<Event<'_>> =
            Parser::new_ext(markdown, PARSER_OPTIONS).collect();

        let mut anchors = AnchorAllocator::new();
        for event in &events {
            if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
                anchors.reserve(id);
            }
        }

        let mut title = None;
        for index in 0..events.len() {
            let Event::Start(Tag::Heading { level, id, .. }) = &events[index] else {
                continue;
            };
            let level = *level;
            let has_id = id.is_some();
            let text = heading_text(&events[index + 1..]);

            if self.extract_title && level == HeadingLevel::H1 && title.is_none() {
                title = Some(text.trim().to_owned());
            }
            if !has_id {
                let anchor = anchors.allocate(&text);
                if let Event::Start(Tag::Heading { id, .. }) = &mut events[index] {
                    *id = Some(CowStr::from(anchor));
                }
            }
        }

        let mut output = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut output, events.into_iter());

        RenderResult {
            html: output,
            title,
        }
    }
}

/// Collect the plain text of a heading from the events that follow its start.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}
