//! Relative path to page slug lookup for one language.

use std::collections::HashMap;

use crate::discover::{PAGE_FILE, PageSource};

/// Maps every alias of a page's relative path to its slug.
///
/// Keys are `/`-separated paths relative to the language directory. The
/// first page registering a key owns it.
#[derive(Clone, Debug, Default)]
pub struct SlugMap {
    entries: HashMap<String, String>,
}

impl SlugMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for a language's pages in corpus order.
    #[must_use]
    pub fn from_sources(sources: &[PageSource]) -> Self {
        let mut map = Self::new();
        for source in sources {
            map.register(&source.rel_path, &source.slug);
        }
        map
    }

    /// Register all aliases of `rel_path` for `slug`.
    pub fn register(&mut self, rel_path: &str, slug: &str) {
        for key in alias_forms(rel_path) {
            self.entries
                .entry(key)
                .or_insert_with(|| slug.to_owned());
        }
    }

    /// Exact key lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Look up a normalized relative path through its candidate forms:
    /// as given, the parent of a `README.md`, and with the extension removed.
    #[must_use]
    pub fn resolve(&self, rel_path: &str) -> Option<&str> {
        let rel = rel_path.trim_end_matches('/');
        let mut candidates = vec![rel.to_owned()];
        if names_page_file(rel) {
            candidates.push(parent_of(rel).to_owned());
        }
        candidates.push(strip_extension(rel).to_owned());
        candidates.iter().find_map(|candidate| self.get(candidate))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All keys under which a page at `rel_path` is reachable.
fn alias_forms(rel_path: &str) -> Vec<String> {
    let raw = rel_path.trim_start_matches("./");
    let mut forms = vec![raw.to_owned()];

    let trimmed = raw.trim_end_matches('/');
    if trimmed != raw {
        forms.push(trimmed.to_owned());
    }

    if names_page_file(trimmed) {
        let parent = parent_of(trimmed);
        forms.push(parent.to_owned());
        if !parent.is_empty() {
            forms.push(format!("{parent}/"));
        }
    }

    forms.push(strip_extension(trimmed).to_owned());
    forms.dedup();
    forms
}

/// Whether the last component of `path` is the page file, in any case.
fn names_page_file(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.eq_ignore_ascii_case(PAGE_FILE)
}

/// Parent directory of a `/`-separated path, `""` at the top level.
fn parent_of(path: &str) -> &str {
    path.rfind('/').map_or("", |index| &path[..index])
}

/// Drop the extension of the final path component, if any.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |index| index + 1);
    match path[name_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..name_start + dot],
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_map() -> SlugMap {
        let mut map = SlugMap::new();
        map.register("README.md", "home");
        map.register("getting-started/README.md", "getting-started");
        map.register("api/README.md", "api-index");
        map.register("api/Foo/README.md", "api-Foo");
        map.register("api/Bar/README.md", "api-Bar");
        map
    }

    #[test]
    fn test_every_alias_resolves_to_same_slug() {
        let map = sample_map();
        for key in [
            "api/Foo/README.md",
            "api/Foo/README",
            "api/Foo",
            "api/Foo/",
        ] {
            assert_eq!(map.get(key), Some("api-Foo"), "key {key}");
        }
    }

    #[test]
    fn test_root_readme_registers_empty_parent() {
        let map = sample_map();
        assert_eq!(map.get(""), Some("home"));
        assert_eq!(map.get("README"), Some("home"));
        assert_eq!(map.get("/"), None);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut map = SlugMap::new();
        map.register("api/README.md", "api-index");
        map.register("api/README.md", "other");
        assert_eq!(map.get("api"), Some("api-index"));
    }

    #[test]
    fn test_resolve_candidates() {
        let map = sample_map();
        assert_eq!(map.resolve("api/Bar/README.md"), Some("api-Bar"));
        assert_eq!(map.resolve("api/Bar/"), Some("api-Bar"));
        assert_eq!(map.resolve("getting-started"), Some("getting-started"));
        assert_eq!(map.resolve("api/README.md"), Some("api-index"));
        assert_eq!(map.resolve(""), Some("home"));
        assert_eq!(map.resolve("api/Missing/README.md"), None);
    }

    #[test]
    fn test_page_file_name_case_insensitive() {
        let mut map = SlugMap::new();
        map.register("api/Foo/README.MD", "api-Foo");
        assert_eq!(map.get("api/Foo"), Some("api-Foo"));
        assert_eq!(map.resolve("api/Foo/readme.md"), Some("api-Foo"));

        let map = sample_map();
        assert_eq!(map.resolve("api/Bar/Readme.md"), Some("api-Bar"));
        assert_eq!(map.resolve("api/BarREADME.md"), None);
    }

    #[test]
    fn test_resolve_other_markdown_name_by_stem() {
        let mut map = SlugMap::new();
        map.register("tutorial/README.md", "tutorial");
        assert_eq!(map.resolve("tutorial/README.markdown"), Some("tutorial"));
    }

    #[test]
    fn test_from_sources_uses_rel_paths() {
        let sources = vec![PageSource {
            slug: "api-Foo".to_owned(),
            path: "/docs/en/api/Foo/README.md".into(),
            rel_path: "api/Foo/README.md".to_owned(),
            fallback_label: "Foo".to_owned(),
            kind: crate::discover::PageKind::Class,
        }];
        let map = SlugMap::from_sources(&sources);
        assert_eq!(map.resolve("api/Foo"), Some("api-Foo"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("api/Foo/README.md"), "api/Foo/README");
        assert_eq!(strip_extension("api/v1.2/page"), "api/v1.2/page");
        assert_eq!(strip_extension(".hidden"), ".hidden");
    }
}
