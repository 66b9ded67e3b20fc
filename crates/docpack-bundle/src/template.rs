//! Slot template for the bundle shell.
//!
//! The shell marks each slot with a `__NAME__` placeholder. A template is
//! valid only if every known placeholder appears exactly once and no
//! unknown `__NAME__` token is present. Rendering splices the values in a
//! single pass, so a value containing placeholder text is never expanded.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__[A-Z][A-Z_]*[A-Z]__").unwrap());

/// Error returned when a template or its context is malformed.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Placeholder {0} is missing from the template")]
    MissingPlaceholder(&'static str),
    #[error("Placeholder {0} appears more than once in the template")]
    DuplicatePlaceholder(&'static str),
    #[error("Unknown slot {0}")]
    UnknownSlot(String),
    #[error("No value provided for slot {0}")]
    MissingValue(&'static str),
}

/// A named value position in the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Title,
    Subtitle,
    BrandLink,
    Style,
    Docs,
    LangMap,
    SearchIndex,
    StartLang,
    SearchLimit,
    App,
}

impl Slot {
    pub const ALL: [Slot; 10] = [
        Slot::Title,
        Slot::Subtitle,
        Slot::BrandLink,
        Slot::Style,
        Slot::Docs,
        Slot::LangMap,
        Slot::SearchIndex,
        Slot::StartLang,
        Slot::SearchLimit,
        Slot::App,
    ];

    /// Placeholder text marking this slot in the shell.
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Slot::Title => "__TITLE__",
            Slot::Subtitle => "__SUBTITLE__",
            Slot::BrandLink => "__BRAND_LINK__",
            Slot::Style => "__STYLE__",
            Slot::Docs => "__DOCS__",
            Slot::LangMap => "__LANG_MAP__",
            Slot::SearchIndex => "__SEARCH_INDEX__",
            Slot::StartLang => "__START_LANG__",
            Slot::SearchLimit => "__SEARCH_LIMIT__",
            Slot::App => "__APP__",
        }
    }

    /// Look up a slot by its placeholder text.
    #[must_use]
    pub fn from_placeholder(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.placeholder() == text)
    }
}

/// Values for every slot of a template.
#[derive(Debug, Default)]
pub struct BuildContext {
    values: HashMap<Slot, String>,
}

impl BuildContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a slot value, replacing any earlier one.
    pub fn set(&mut self, slot: Slot, value: impl Into<String>) -> &mut Self {
        self.values.insert(slot, value.into());
        self
    }

    /// Set a slot by placeholder text.
    pub fn set_named(&mut self, placeholder: &str, value: impl Into<String>) -> Result<&mut Self, TemplateError> {
        let slot = Slot::from_placeholder(placeholder)
            .ok_or_else(|| TemplateError::UnknownSlot(placeholder.to_owned()))?;
        Ok(self.set(slot, value))
    }

    fn get(&self, slot: Slot) -> Result<&str, TemplateError> {
        self.values
            .get(&slot)
            .map(String::as_str)
            .ok_or(TemplateError::MissingValue(slot.placeholder()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Slot(Slot),
}

/// A validated shell, split into literal text and slots.
#[derive(Clone, Debug)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse and validate a shell.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut found: Vec<(usize, usize, Slot)> = Vec::new();
        for m in PLACEHOLDER_RE.find_iter(text) {
            let slot = Slot::from_placeholder(m.as_str())
                .ok_or_else(|| TemplateError::UnknownSlot(m.as_str().to_owned()))?;
            if found.iter().any(|(_, _, seen)| *seen == slot) {
                return Err(TemplateError::DuplicatePlaceholder(slot.placeholder()));
            }
            found.push((m.start(), m.end(), slot));
        }
        if let Some(missing) = Slot::ALL
            .into_iter()
            .find(|slot| found.iter().all(|(_, _, seen)| seen != slot))
        {
            return Err(TemplateError::MissingPlaceholder(missing.placeholder()));
        }

        let mut pieces = Vec::with_capacity(found.len() * 2 + 1);
        let mut cursor = 0;
        for (start, end, slot) in found {
            pieces.push(Piece::Literal(text[cursor..start].to_owned()));
            pieces.push(Piece::Slot(slot));
            cursor = end;
        }
        pieces.push(Piece::Literal(text[cursor..].to_owned()));
        Ok(Self { pieces })
    }

    /// Splice context values into the template.
    pub fn render(&self, context: &BuildContext) -> Result<String, TemplateError> {
        let mut values = Vec::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            values.push(match piece {
                Piece::Literal(text) => text.as_str(),
                Piece::Slot(slot) => context.get(*slot)?,
            });
        }
        Ok(values.concat())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn full_shell() -> String {
        Slot::ALL
            .iter()
            .map(|slot| format!("<{}>", slot.placeholder()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn full_context() -> BuildContext {
        let mut context = BuildContext::new();
        for slot in Slot::ALL {
            context.set(slot, format!("{slot:?}"));
        }
        context
    }

    #[test]
    fn test_render_fills_every_slot() {
        let template = Template::parse(&full_shell()).unwrap();
        let html = template.render(&full_context()).unwrap();
        assert!(html.starts_with("<Title>\n<Subtitle>\n<BrandLink>"));
        assert!(html.ends_with("<App>"));
        assert!(!html.contains("__"));
    }

    #[test]
    fn test_values_are_not_resubstituted() {
        let template = Template::parse(&full_shell()).unwrap();
        let mut context = full_context();
        context.set(Slot::Docs, "__APP__");
        let html = template.render(&context).unwrap();
        assert!(html.contains("<__APP__>"));
        assert_eq!(html.matches("<App>").count(), 1);
    }

    #[test]
    fn test_missing_placeholder() {
        let shell = full_shell().replace("<__STYLE__>", "");
        let err = Template::parse(&shell).unwrap_err();
        assert!(matches!(err, TemplateError::MissingPlaceholder("__STYLE__")));
    }

    #[test]
    fn test_duplicate_placeholder() {
        let shell = format!("{}__DOCS__", full_shell());
        let err = Template::parse(&shell).unwrap_err();
        assert!(matches!(err, TemplateError::DuplicatePlaceholder("__DOCS__")));
    }

    #[test]
    fn test_unknown_placeholder_in_shell() {
        let shell = format!("{}__FUNCTION_INDEX__", full_shell());
        let err = Template::parse(&shell).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownSlot(name) if name == "__FUNCTION_INDEX__"));
    }

    #[test]
    fn test_unknown_slot_in_context() {
        let mut context = BuildContext::new();
        assert!(context.set_named("__DOCS__", "{}").is_ok());
        let err = context.set_named("__NOPE__", "x").unwrap_err();
        assert!(matches!(err, TemplateError::UnknownSlot(_)));
    }

    #[test]
    fn test_missing_value() {
        let template = Template::parse(&full_shell()).unwrap();
        let mut context = BuildContext::new();
        context.set(Slot::Title, "t");
        let err = template.render(&context).unwrap_err();
        assert!(matches!(err, TemplateError::MissingValue("__SUBTITLE__")));
    }

    #[test]
    fn test_dunder_in_identifiers_is_not_a_placeholder() {
        let shell = format!("{}\nlet __proto__ = 1; x__y__z", full_shell());
        assert!(Template::parse(&shell).is_ok());
    }
}
