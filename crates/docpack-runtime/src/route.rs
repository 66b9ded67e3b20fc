//! Location fragment routes: `#/<lang>/<slug>` or `#/<lang>/<slug>/<anchor>`.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped in route segments, matching `encodeURIComponent`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A client-side location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Route {
    pub lang: String,
    pub slug: String,
    pub anchor: Option<String>,
}

impl Route {
    /// Create a route. An empty anchor is treated as no anchor.
    pub fn new(lang: impl Into<String>, slug: impl Into<String>, anchor: Option<&str>) -> Self {
        Self {
            lang: lang.into(),
            slug: slug.into(),
            anchor: anchor.filter(|a| !a.is_empty()).map(str::to_owned),
        }
    }

    /// Parse a location fragment.
    ///
    /// Accepts `#/lang/slug` and `#/lang/slug/anchor`, with one optional
    /// trailing `/`. Segments are percent-decoded. Anything else, including
    /// empty segments, is "no route".
    pub fn parse(fragment: &str) -> Option<Self> {
        let body = fragment.strip_prefix("#/")?;
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments = Vec::with_capacity(3);
        for raw in body.split('/') {
            if raw.is_empty() || segments.len() == 3 {
                return None;
            }
            segments.push(percent_decode_str(raw).decode_utf8().ok()?.into_owned());
        }

        let mut segments = segments.into_iter();
        let lang = segments.next()?;
        let slug = segments.next()?;
        Some(Self {
            lang,
            slug,
            anchor: segments.next(),
        })
    }

    /// Location fragment for this route.
    #[must_use]
    pub fn to_fragment(&self) -> String {
        let mut fragment = format!(
            "#/{}/{}",
            utf8_percent_encode(&self.lang, SEGMENT),
            utf8_percent_encode(&self.slug, SEGMENT)
        );
        if let Some(anchor) = &self.anchor {
            fragment.push('/');
            fragment.extend(utf8_percent_encode(anchor, SEGMENT));
        }
        fragment
    }

    /// Same page, ignoring the anchor.
    #[must_use]
    pub fn same_page(&self, other: &Route) -> bool {
        self.lang == other.lang && self.slug == other.slug
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fragment())
    }
}
