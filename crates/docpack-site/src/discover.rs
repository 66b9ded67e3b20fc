//! Corpus discovery.
//!
//! Each language directory holds up to four front pages followed by one page
//! per subdirectory of `api/`:
//!
//! ```text
//! <root>/<lang>/README.md                  -> home
//! <root>/<lang>/getting-started/README.md  -> getting-started
//! <root>/<lang>/tutorial/README.md         -> tutorial
//! <root>/<lang>/api/README.md              -> api-index
//! <root>/<lang>/api/<Class>/README.md      -> api-<Class>
//! ```
//!
//! A class directory whose slug would equal a front page slug (`api/index`)
//! is skipped.

use std::path::{Path, PathBuf};

/// File name backing every page.
pub const PAGE_FILE: &str = "README.md";

/// Slug of the language home page.
pub const HOME_SLUG: &str = "home";

/// Prefix of member-class page slugs.
pub const CLASS_SLUG_PREFIX: &str = "api-";

const API_DIR: &str = "api";

/// Error returned when discovery cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("Language directory not found: {0}")]
    MissingLanguage(PathBuf),
    #[error("No language directories found in {0}")]
    NoLanguages(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether a page is one of the fixed front pages or a member-class page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    Front,
    Class,
}

/// A page found on disk, not yet read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSource {
    pub slug: String,
    /// Absolute path of the backing file.
    pub path: PathBuf,
    /// Path relative to the language directory, `/`-separated.
    pub rel_path: String,
    /// Label used when the page has no top-level heading.
    pub fallback_label: String,
    pub kind: PageKind,
}

struct FrontPage {
    slug: &'static str,
    dir: &'static str,
    label: &'static str,
}

const FRONT_PAGES: [FrontPage; 4] = [
    FrontPage {
        slug: HOME_SLUG,
        dir: "",
        label: "Overview",
    },
    FrontPage {
        slug: "getting-started",
        dir: "getting-started",
        label: "Getting started",
    },
    FrontPage {
        slug: "tutorial",
        dir: "tutorial",
        label: "Tutorial",
    },
    FrontPage {
        slug: "api-index",
        dir: API_DIR,
        label: "API",
    },
];

/// Slugs of the front pages in navigation order.
pub fn front_page_slugs() -> impl Iterator<Item = &'static str> {
    FRONT_PAGES.iter().map(|page| page.slug)
}

/// List the pages of one language in corpus order.
///
/// Pages whose file does not exist are omitted. Fails only when the
/// language directory itself is missing.
pub fn discover_language(root: &Path, lang: &str) -> Result<Vec<PageSource>, DiscoverError> {
    let base = root.join(lang);
    if !base.is_dir() {
        return Err(DiscoverError::MissingLanguage(base));
    }

    let mut pages = Vec::new();
    for front in &FRONT_PAGES {
        let rel_path = if front.dir.is_empty() {
            PAGE_FILE.to_owned()
        } else {
            format!("{}/{PAGE_FILE}", front.dir)
        };
        push_if_exists(
            &mut pages,
            &base,
            front.slug.to_owned(),
            rel_path,
            front.label.to_owned(),
            PageKind::Front,
        );
    }

    for class in class_dirs(&base.join(API_DIR))? {
        let slug = format!("{CLASS_SLUG_PREFIX}{class}");
        if front_page_slugs().any(|front| front == slug) {
            tracing::warn!(
                lang,
                class = %class,
                "Class directory shadows a front page, skipped"
            );
            continue;
        }
        push_if_exists(
            &mut pages,
            &base,
            slug,
            format!("{API_DIR}/{class}/{PAGE_FILE}"),
            class,
            PageKind::Class,
        );
    }

    Ok(pages)
}

fn push_if_exists(
    pages: &mut Vec<PageSource>,
    base: &Path,
    slug: String,
    rel_path: String,
    fallback_label: String,
    kind: PageKind,
) {
    let path = base.join(&rel_path);
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "Page file missing, skipped");
        return;
    }
    pages.push(PageSource {
        slug,
        path,
        rel_path,
        fallback_label,
        kind,
    });
}

/// Immediate subdirectories of `api_dir`, sorted by name.
fn class_dirs(api_dir: &Path) -> Result<Vec<String>, DiscoverError> {
    if !api_dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(api_dir).map_err(|source| DiscoverError::Io {
        path: api_dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DiscoverError::Io {
            path: api_dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Detect language directories under `root`.
///
/// A language is an immediate subdirectory holding a `README.md`. Codes in
/// `preferred` come first in that order, the rest follow sorted. Hidden
/// directories are ignored.
pub fn detect_languages(root: &Path, preferred: &[String]) -> Result<Vec<String>, DiscoverError> {
    if !root.is_dir() {
        return Err(DiscoverError::NoLanguages(root.to_path_buf()));
    }
    let entries = std::fs::read_dir(root).map_err(|source| DiscoverError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DiscoverError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().join(PAGE_FILE).is_file() {
            found.push(name);
        }
    }

    let mut languages: Vec<String> = preferred
        .iter()
        .filter(|lang| found.contains(lang))
        .cloned()
        .collect();
    let mut rest: Vec<String> = found
        .into_iter()
        .filter(|lang| !languages.contains(lang))
        .collect();
    rest.sort();
    languages.extend(rest);

    if languages.is_empty() {
        return Err(DiscoverError::NoLanguages(root.to_path_buf()));
    }
    Ok(languages)
}
