//! Shared utility functions for anchors and escaping.

use std::collections::HashSet;

/// Fallback slug for text without any word characters.
const EMPTY_SLUG: &str = "item";

/// Convert text to an anchor slug.
///
/// Lowercases the text, collapses every run of non-word characters into a
/// single dash and trims dashes from both ends. Word characters are Unicode
/// letters, digits and `_`, so non-Latin headings keep their text.
///
/// # Examples
///
/// ```
/// use docpack_renderer::slugify;
///
/// assert_eq!(slugify("Get Name"), "get-name");
/// assert_eq!(slugify("bar()"), "bar");
/// assert_eq!(slugify("!!!"), "item");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if result.is_empty() {
        EMPTY_SLUG.to_owned()
    } else {
        result
    }
}

/// Hands out page-unique anchors in document order.
///
/// Explicit anchors are taken verbatim and reserved. Generated anchors are
/// the slug of the text, suffixed `-2`, `-3`, ... until unused.
#[derive(Debug, Default)]
pub struct AnchorAllocator {
    used: HashSet<String>,
}

impl AnchorAllocator {
    /// Create an allocator with no anchors in use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an explicit anchor as used and return it unchanged.
    pub fn reserve(&mut self, anchor: &str) -> String {
        self.used.insert(anchor.to_owned());
        anchor.to_owned()
    }

    /// Generate a unique anchor for heading text.
    pub fn allocate(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut anchor = base.clone();
        let mut counter = 2;
        while self.used.contains(&anchor) {
            anchor = format!("{base}-{counter}");
            counter += 1;
        }
        self.used.insert(anchor.clone());
        anchor
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
