//! `docpack check` command implementation.
//!
//! Compiles the corpus in memory and replays it through the runtime model:
//! every page is opened and decompressed, every search entry is followed to
//! its page, and every member anchor is looked up in the rendered HTML.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use clap::Args;
use docpack_renderer::escape_html;
use docpack_runtime::{Navigator, RenderOutcome, Route};
use docpack_site::Site;
use futures::executor::block_on;

use super::{SourceArgs, labels};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(None)?;
        let site = self.source.build_site(&config, &output)?;

        let report = verify(&site, labels(&config, &site), config.search.limit);
        for failure in &report.failures {
            output.error(&failure.to_string());
        }
        if !report.failures.is_empty() {
            return Err(CliError::CheckFailed {
                count: report.failures.len(),
            });
        }

        output.success(&format!(
            "Checked {} pages, {} anchors and {} search entries",
            report.pages, report.anchors, report.search_entries
        ));
        Ok(())
    }
}

/// A problem found while replaying the site.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CheckFailure {
    /// The page could not be opened or its payload did not decompress.
    Page { route: Route, reason: String },
    /// A member anchor has no element with that id.
    MissingAnchor { route: Route },
    /// A search entry resolved to a different page.
    Misrouted { entry: String, landed: Option<Route> },
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { route, reason } => write!(f, "{route}: {reason}"),
            Self::MissingAnchor { route } => write!(f, "{route}: anchor not found in page"),
            Self::Misrouted { entry, landed } => match landed {
                Some(route) => write!(f, "Search entry {entry:?} opened {route}"),
                None => write!(f, "Search entry {entry:?} opened nothing"),
            },
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CheckReport {
    pub(crate) pages: usize,
    pub(crate) anchors: usize,
    pub(crate) search_entries: usize,
    pub(crate) failures: Vec<CheckFailure>,
}

/// Replay `site` through a [`Navigator`].
pub(crate) fn verify(
    site: &Site,
    labels: BTreeMap<String, String>,
    search_limit: usize,
) -> CheckReport {
    let navigator = Navigator::from_site(site, labels, search_limit);
    let mut report = CheckReport::default();
    if navigator.start("").is_none() {
        return report;
    }

    for lang in &site.languages {
        for page in site.corpus.pages(lang).unwrap_or_default() {
            report.pages += 1;
            let route = Route::new(lang.as_str(), page.slug.as_str(), None);
            let Some(html) = open(&navigator, &route, &mut report) else {
                continue;
            };
            for member in &page.members {
                report.anchors += 1;
                if !has_anchor(&html, &member.anchor_id) {
                    let anchor = Some(member.anchor_id.as_str());
                    report.failures.push(CheckFailure::MissingAnchor {
                        route: Route::new(lang.as_str(), page.slug.as_str(), anchor),
                    });
                }
            }
        }
    }

    if let Some(primary) = site.primary_language() {
        for entry in &site.search_index {
            report.search_entries += 1;
            let target = Route::new(
                primary,
                entry.page_slug.as_str(),
                Some(entry.anchor_id.as_str()),
            );
            navigator.follow_link(&target.to_fragment());
            let landed = navigator.route();
            if landed.as_ref() != Some(&target) {
                report.failures.push(CheckFailure::Misrouted {
                    entry: entry.signature.clone(),
                    landed,
                });
                continue;
            }
            if let Some(html) = open(&navigator, &target, &mut report)
                && !has_anchor(&html, &entry.anchor_id)
            {
                report
                    .failures
                    .push(CheckFailure::MissingAnchor { route: target });
            }
        }
    }

    tracing::info!(
        pages = report.pages,
        inflations = navigator.cache().inflations(),
        failures = report.failures.len(),
        "Replayed site"
    );
    report
}

/// Open `route` and wait for its HTML, recording a failure if it is not shown.
fn open(navigator: &Navigator, route: &Route, report: &mut CheckReport) -> Option<Rc<str>> {
    navigator.follow_link(&route.to_fragment());
    match block_on(navigator.render()) {
        RenderOutcome::Rendered { route: shown, html } if shown.same_page(route) => Some(html),
        RenderOutcome::Rendered { route: shown, .. } => {
            report.failures.push(CheckFailure::Page {
                route: route.clone(),
                reason: format!("opened {shown} instead"),
            });
            None
        }
        RenderOutcome::Failed { error, .. } => {
            report.failures.push(CheckFailure::Page {
                route: route.clone(),
                reason: error.to_string(),
            });
            None
        }
        RenderOutcome::Stale { .. } | RenderOutcome::NoRoute => {
            report.failures.push(CheckFailure::Page {
                route: route.clone(),
                reason: "page was not shown".to_owned(),
            });
            None
        }
    }
}

fn has_anchor(html: &str, anchor: &str) -> bool {
    html.contains(&format!("id=\"{}\"", escape_html(anchor)))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use docpack_site::{BuildOptions, SiteBuilder};
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn build(root: &Path) -> Site {
        SiteBuilder::new(BuildOptions {
            source_dir: root.to_path_buf(),
            languages: None,
            preferred: vec!["en".to_owned()],
        })
        .build()
        .unwrap()
    }

    #[test]
    fn test_clean_site_passes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "en/README.md", "# Home\n");
        write(
            dir.path(),
            "en/api/Foo/README.md",
            "# Foo\n\n### `bar()`\n\n**Signature**\n\n```cpp\nvoid bar()\n```\n\n### Get Name\n\n### Get Name\n",
        );
        write(dir.path(), "ru/README.md", "# Главная\n");

        let report = verify(&build(dir.path()), BTreeMap::new(), 8);
        assert_eq!(report.failures, Vec::new());
        assert_eq!(report.pages, 3);
        assert_eq!(report.anchors, 3);
        assert_eq!(report.search_entries, 1);
    }

    #[test]
    fn test_corrupt_payload_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "en/README.md", "# Home\n");
        let mut site = build(dir.path());
        let mut corpus = docpack_site::Corpus::new();
        let mut pages = site.corpus.pages("en").unwrap().to_vec();
        pages[0].content = "not a payload".to_owned();
        corpus.insert("en", pages);
        site.corpus = corpus;

        let report = verify(&site, BTreeMap::new(), 8);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            CheckFailure::Page { route, .. } if route.slug == "home"
        ));
    }

    #[test]
    fn test_failure_messages() {
        let failure = CheckFailure::MissingAnchor {
            route: Route::new("en", "api-Foo", Some("bar")),
        };
        assert_eq!(failure.to_string(), "#/en/api-Foo/bar: anchor not found in page");
        let failure = CheckFailure::Misrouted {
            entry: "void bar()".to_owned(),
            landed: None,
        };
        assert_eq!(failure.to_string(), "Search entry \"void bar()\" opened nothing");
    }
}
