//! Rewriting of intra-corpus markdown links into client routes.
//!
//! `[label](target)` links are rewritten as follows:
//! - `scheme://…` and `mailto:` targets are left alone;
//! - `#anchor` becomes `#/<lang>/<current slug>/<anchor>`;
//! - a relative path, optionally with `#anchor`, is resolved against the
//!   current file's directory and looked up in the [`SlugMap`].
//!
//! Images, fenced code and inline code spans are copied unchanged. Targets
//! that resolve to no page are left as written and reported.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::members::FenceTracker;
use crate::slug_map::SlugMap;

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?P<label>[^\[\]]+)\]\((?P<href>[^)\s]+)\)").unwrap()
});

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").unwrap());

/// Result of rewriting one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteResult {
    pub text: String,
    /// Link targets that matched no page, in document order.
    pub unresolved: Vec<String>,
}

/// Rewrites links of pages within one language.
pub struct LinkRewriter<'a> {
    lang: &'a str,
    slug_map: &'a SlugMap,
}

impl<'a> LinkRewriter<'a> {
    #[must_use]
    pub fn new(lang: &'a str, slug_map: &'a SlugMap) -> Self {
        Self { lang, slug_map }
    }

    /// Rewrite the links in `markdown`, a page stored at `current_rel`
    /// (relative to the language directory).
    #[must_use]
    pub fn rewrite(&self, markdown: &str, current_rel: &str) -> RewriteResult {
        let current_slug = self.slug_map.get(current_rel.trim_start_matches("./"));
        let mut result = RewriteResult {
            text: String::with_capacity(markdown.len()),
            unresolved: Vec::new(),
        };

        let mut fence = FenceTracker::default();
        let mut prose = String::new();
        for line in markdown.split_inclusive('\n') {
            if fence.observe(line) {
                self.rewrite_prose(&prose, current_rel, current_slug, &mut result);
                prose.clear();
                result.text.push_str(line);
            } else {
                prose.push_str(line);
            }
        }
        self.rewrite_prose(&prose, current_rel, current_slug, &mut result);
        result
    }

    /// Rewrite the links of text outside fenced code, copying inline code
    /// spans as they are.
    fn rewrite_prose(
        &self,
        prose: &str,
        current_rel: &str,
        current_slug: Option<&str>,
        result: &mut RewriteResult,
    ) {
        for (run, is_code) in split_code_spans(prose) {
            if is_code {
                result.text.push_str(run);
                continue;
            }
            let rewritten = LINK_RE.replace_all(run, |caps: &Captures<'_>| {
                let whole = &caps[0];
                if run[..caps.get(0).map_or(0, |m| m.start())].ends_with('!') {
                    return whole.to_owned();
                }
                self.rewrite_link(caps, current_rel, current_slug, &mut result.unresolved)
            });
            result.text.push_str(&rewritten);
        }
    }

    fn rewrite_link(
        &self,
        caps: &Captures<'_>,
        current_rel: &str,
        current_slug: Option<&str>,
        unresolved: &mut Vec<String>,
    ) -> String {
        let whole = &caps[0];
        let label = &caps["label"];
        let href = &caps["href"];

        if SCHEME_RE.is_match(href) || href.starts_with("mailto:") {
            return whole.to_owned();
        }

        if let Some(anchor) = href.strip_prefix('#') {
            return match current_slug {
                Some(slug) => format!("[{label}]({})", self.route(slug, anchor)),
                None => whole.to_owned(),
            };
        }

        let (path_part, anchor) = href.split_once('#').unwrap_or((href, ""));
        let slug = resolve_relative(current_rel, path_part)
            .and_then(|rel| self.slug_map.resolve(&rel));
        match slug {
            Some(slug) => format!("[{label}]({})", self.route(slug, anchor)),
            None => {
                unresolved.push(href.to_owned());
                whole.to_owned()
            }
        }
    }

    fn route(&self, slug: &str, anchor: &str) -> String {
        if anchor.is_empty() {
            format!("#/{}/{slug}", self.lang)
        } else {
            format!("#/{}/{slug}/{anchor}", self.lang)
        }
    }
}

/// Split `text` into runs, flagging inline code spans.
///
/// A span opens with a run of backticks and closes at the next run of the
/// same length within the paragraph. An unmatched run is plain text.
fn split_code_spans(text: &str) -> Vec<(&str, bool)> {
    let bytes = text.as_bytes();
    let backticks = |at: usize| bytes[at..].iter().take_while(|b| **b == b'`').count();

    let mut runs = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let width = backticks(i);
        let mut j = i + width;
        let mut close = None;
        while j < bytes.len() {
            match bytes[j] {
                b'`' => {
                    let run = backticks(j);
                    if run == width {
                        close = Some(j + run);
                        break;
                    }
                    j += run;
                }
                b'\n' if bytes.get(j + 1) == Some(&b'\n') => break,
                _ => j += 1,
            }
        }
        match close {
            Some(end) => {
                if start < i {
                    runs.push((&text[start..i], false));
                }
                runs.push((&text[i..end], true));
                start = end;
                i = end;
            }
            None => i += width,
        }
    }
    if start < text.len() {
        runs.push((&text[start..], false));
    }
    runs
}

/// Resolve `target` against the directory of `current_rel` and normalize
/// `.` and `..` segments.
///
/// Returns `None` for absolute targets and for targets escaping the
/// language directory.
fn resolve_relative(current_rel: &str, target: &str) -> Option<String> {
    if target.starts_with('/') {
        return None;
    }

    let mut segments: Vec<&str> = current_rel
        .trim_start_matches("./")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    segments.pop();

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
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
    fn test_sibling_class_link_with_anchor() {
        let map = sample_map();
        let result = LinkRewriter::new("en", &map)
            .rewrite("See [x](../Bar/README.md#y).", "api/Foo/README.md");
        assert_eq!(result.text, "See [x](#/en/api-Bar/y).");
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_directory_links() {
        let map = sample_map();
        let rewriter = LinkRewriter::new("ru", &map);
        assert_eq!(
            rewriter.rewrite("[a](../Bar/)", "api/Foo/README.md").text,
            "[a](#/ru/api-Bar)"
        );
        assert_eq!(
            rewriter.rewrite("[a](../../getting-started)", "api/Foo/README.md").text,
            "[a](#/ru/getting-started)"
        );
        assert_eq!(
            rewriter.rewrite("[a](../../)", "api/Foo/README.md").text,
            "[a](#/ru/home)"
        );
        assert_eq!(
            rewriter.rewrite("[a](api/Foo)", "README.md").text,
            "[a](#/ru/api-Foo)"
        );
    }

    #[test]
    fn test_bare_anchor_uses_current_slug() {
        let map = sample_map();
        let rewriter = LinkRewriter::new("en", &map);
        assert_eq!(
            rewriter.rewrite("[s](#size)", "api/Foo/README.md").text,
            "[s](#/en/api-Foo/size)"
        );
        assert_eq!(
            rewriter.rewrite("[top](#)", "api/Foo/README.md").text,
            "[top](#/en/api-Foo)"
        );
    }

    #[test]
    fn test_bare_anchor_without_current_slug_is_kept() {
        let map = sample_map();
        let result = LinkRewriter::new("en", &map).rewrite("[s](#size)", "other/README.md");
        assert_eq!(result.text, "[s](#size)");
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_external_links_untouched() {
        let map = sample_map();
        let rewriter = LinkRewriter::new("en", &map);
        let text = "[gh](https://github.com/x/y) [m](mailto:a@b.c) [f](ftp://host/README.md)";
        let result = rewriter.rewrite(text, "README.md");
        assert_eq!(result.text, text);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_unresolved_links_are_kept_and_reported() {
        let map = sample_map();
        let result = LinkRewriter::new("en", &map)
            .rewrite("[a](../Missing/README.md) [b](../../../outside.md)", "api/Foo/README.md");
        assert_eq!(result.text, "[a](../Missing/README.md) [b](../../../outside.md)");
        assert_eq!(
            result.unresolved,
            vec!["../Missing/README.md", "../../../outside.md"]
        );
    }

    #[test]
    fn test_images_and_code_are_not_links() {
        let map = sample_map();
        let page = "# Foo\n\n![diagram](diagram.png)\n\n```cpp\nauto f = [&](int x) { return x; };\n```\n\nCall `v[i](j)` or see [Bar](../Bar/README.md).\n";
        let result = LinkRewriter::new("en", &map).rewrite(page, "api/Foo/README.md");
        assert_eq!(result.unresolved, Vec::<String>::new());
        assert_eq!(
            result.text,
            page.replace("(../Bar/README.md)", "(#/en/api-Bar)")
        );
    }

    #[test]
    fn test_tilde_fence_and_double_backtick_span() {
        let map = sample_map();
        let page = "~~~\n[a](missing.md)\n~~~\n``x[0](1)` ``\n";
        let result = LinkRewriter::new("en", &map).rewrite(page, "README.md");
        assert_eq!(result.text, page);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_unmatched_backtick_does_not_hide_links() {
        let map = sample_map();
        let result = LinkRewriter::new("en", &map).rewrite("a ` b [x](api/Foo)\n", "README.md");
        assert_eq!(result.text, "a ` b [x](#/en/api-Foo)\n");
    }

    #[test]
    fn test_split_code_spans() {
        assert_eq!(
            split_code_spans("a `b` c"),
            vec![("a ", false), ("`b`", true), (" c", false)]
        );
        assert_eq!(split_code_spans("``a`b``"), vec![("``a`b``", true)]);
        assert_eq!(split_code_spans("`a\n\nb`"), vec![("`a\n\nb`", false)]);
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_relative("api/Foo/README.md", "../Bar/README.md").as_deref(),
            Some("api/Bar/README.md")
        );
        assert_eq!(
            resolve_relative("api/Foo/README.md", "./../../").as_deref(),
            Some("")
        );
        assert_eq!(resolve_relative("README.md", "../x.md"), None);
        assert_eq!(resolve_relative("README.md", "/etc/passwd"), None);
    }
}
