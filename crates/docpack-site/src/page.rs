//! Build output records.
//!
//! The serialized forms use the short keys the client runtime reads:
//! pages `{s, t, l, c, f?}`, navigation members `{i, t}` and search entries
//! `{s, i, p, l}`.

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::discover::PageKind;

/// A member block extracted from a class page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Member {
    #[serde(rename = "i")]
    pub anchor_id: String,
    #[serde(rename = "t")]
    pub title: String,
    #[serde(skip)]
    pub signature: String,
    #[serde(skip)]
    pub synopsis: String,
}

/// A compiled page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    #[serde(rename = "s")]
    pub slug: String,
    #[serde(rename = "t")]
    pub title: String,
    #[serde(rename = "l")]
    pub label: String,
    /// Rendered HTML, raw-deflated and base64 encoded.
    #[serde(rename = "c")]
    pub content: String,
    #[serde(rename = "f", skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
    #[serde(skip)]
    pub kind: PageKind,
}

/// Searchable member of the primary language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchIndexEntry {
    #[serde(rename = "s")]
    pub signature: String,
    #[serde(rename = "i")]
    pub anchor_id: String,
    #[serde(rename = "p")]
    pub page_slug: String,
    #[serde(rename = "l")]
    pub page_label: String,
}

impl SearchIndexEntry {
    /// Only declaration-like signatures are searchable.
    #[must_use]
    pub fn is_searchable(signature: &str) -> bool {
        signature.contains('(') || signature.contains("::")
    }
}

/// Pages of every language, in build order.
///
/// Serializes as a JSON object whose keys keep the build order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    languages: Vec<(String, Vec<Page>)>,
}

impl Corpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a language. A language added twice keeps its first pages.
    pub fn insert(&mut self, lang: impl Into<String>, pages: Vec<Page>) {
        let lang = lang.into();
        if !self.contains_language(&lang) {
            self.languages.push((lang, pages));
        }
    }

    #[must_use]
    pub fn contains_language(&self, lang: &str) -> bool {
        self.languages.iter().any(|(code, _)| code == lang)
    }

    /// Language codes in build order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|(code, _)| code.as_str())
    }

    /// Pages of `lang`, `None` for an unknown language.
    #[must_use]
    pub fn pages(&self, lang: &str) -> Option<&[Page]> {
        self.languages
            .iter()
            .find(|(code, _)| code == lang)
            .map(|(_, pages)| pages.as_slice())
    }

    #[must_use]
    pub fn page(&self, lang: &str, slug: &str) -> Option<&Page> {
        self.pages(lang)?.iter().find(|page| page.slug == slug)
    }

    /// Total number of pages across languages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.languages.iter().map(|(_, pages)| pages.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl Serialize for Corpus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.languages.len()))?;
        for (lang, pages) in &self.languages {
            map.serialize_entry(lang, pages)?;
        }
        map.end()
    }
}
