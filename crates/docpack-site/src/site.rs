//! Site building: discovery through compressed pages.

use std::path::PathBuf;

use docpack_renderer::{MarkdownRenderer, PayloadError, compress_text};

use crate::discover::{DiscoverError, PageKind, PageSource, detect_languages, discover_language};
use crate::encoding::read_text;
use crate::links::LinkRewriter;
use crate::members::extract_members;
use crate::page::{Corpus, Member, Page, SearchIndexEntry};
use crate::slug_map::SlugMap;

/// Error returned when building a site fails.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Discover(#[from] DiscoverError),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to compress {path}: {source}")]
    Payload {
        path: PathBuf,
        #[source]
        source: PayloadError,
    },
}

/// Where to read sources from and which languages to build.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Root holding one directory per language.
    pub source_dir: PathBuf,
    /// Explicit language list. Detected from `source_dir` when `None`.
    pub languages: Option<Vec<String>>,
    /// Ordering preference for detected languages.
    pub preferred: Vec<String>,
}

/// A link that resolved to no page and was left as written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkWarning {
    pub lang: String,
    /// Page path relative to the language directory.
    pub page: String,
    pub target: String,
}

impl std::fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}: unresolved link {}", self.lang, self.page, self.target)
    }
}

/// Everything the bundle needs.
#[derive(Clone, Debug)]
pub struct Site {
    pub corpus: Corpus,
    pub search_index: Vec<SearchIndexEntry>,
    /// Languages in build order; the first one is primary.
    pub languages: Vec<String>,
    pub warnings: Vec<LinkWarning>,
}

impl Site {
    /// Primary language: search index source and start language.
    #[must_use]
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(String::as_str)
    }

    /// Number of members across every page of every language.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.languages
            .iter()
            .filter_map(|lang| self.corpus.pages(lang))
            .flatten()
            .map(|page| page.members.len())
            .sum()
    }
}

/// Compiles a source tree into a [`Site`].
pub struct SiteBuilder {
    options: BuildOptions,
    renderer: MarkdownRenderer,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            renderer: MarkdownRenderer::new().with_title_extraction(),
        }
    }

    /// Languages to build, in order.
    pub fn languages(&self) -> Result<Vec<String>, DiscoverError> {
        match &self.options.languages {
            Some(explicit) if !explicit.is_empty() => {
                let mut languages: Vec<String> = Vec::with_capacity(explicit.len());
                for lang in explicit {
                    if !languages.contains(lang) {
                        languages.push(lang.clone());
                    }
                }
                Ok(languages)
            }
            _ => detect_languages(&self.options.source_dir, &self.options.preferred),
        }
    }

    /// Build every language.
    pub fn build(&self) -> Result<Site, BuildError> {
        let languages = self.languages()?;
        let mut corpus = Corpus::new();
        let mut search_index = Vec::new();
        let mut warnings = Vec::new();

        for (index, lang) in languages.iter().enumerate() {
            let sources = discover_language(&self.options.source_dir, lang)?;
            let slug_map = SlugMap::from_sources(&sources);
            let rewriter = LinkRewriter::new(lang, &slug_map);

            let mut pages = Vec::with_capacity(sources.len());
            for source in &sources {
                let (page, unresolved) = self.build_page(source, &rewriter)?;
                for target in unresolved {
                    tracing::debug!(
                        lang = %lang,
                        page = %source.rel_path,
                        target = %target,
                        "Unresolved link left as-is"
                    );
                    warnings.push(LinkWarning {
                        lang: lang.clone(),
                        page: source.rel_path.clone(),
                        target,
                    });
                }
                pages.push(page);
            }

            if index == 0 {
                search_index = index_members(&pages);
            }
            let members: usize = pages.iter().map(|page| page.members.len()).sum();
            tracing::info!(lang = %lang, pages = pages.len(), members, "Collected language");
            corpus.insert(lang.clone(), pages);
        }

        Ok(Site {
            corpus,
            search_index,
            languages,
            warnings,
        })
    }

    fn build_page(
        &self,
        source: &PageSource,
        rewriter: &LinkRewriter<'_>,
    ) -> Result<(Page, Vec<String>), BuildError> {
        let text = read_text(&source.path).map_err(|e| BuildError::Io {
            path: source.path.clone(),
            source: e,
        })?;

        let (text, members) = match source.kind {
            PageKind::Class => {
                let extraction = extract_members(&text);
                (extraction.markdown, extraction.members)
            }
            PageKind::Front => (text, Vec::new()),
        };

        let rewritten = rewriter.rewrite(&text, &source.rel_path);
        let rendered = self.renderer.render(&rewritten.text);
        let content = compress_text(&rendered.html).map_err(|e| BuildError::Payload {
            path: source.path.clone(),
            source: e,
        })?;
        let title = rendered
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| source.fallback_label.clone());

        tracing::debug!(slug = %source.slug, members = members.len(), "Rendered page");

        let page = Page {
            slug: source.slug.clone(),
            label: title.clone(),
            title,
            content,
            members,
            kind: source.kind,
        };
        Ok((page, rewritten.unresolved))
    }
}

/// Search entries for the declaration-like members of `pages`.
fn index_members(pages: &[Page]) -> Vec<SearchIndexEntry> {
    pages
        .iter()
        .flat_map(|page| page.members.iter().map(move |member| (page, member)))
        .filter(|(_, member)| SearchIndexEntry::is_searchable(&member.signature))
        .map(|(page, member): (&Page, &Member)| SearchIndexEntry {
            signature: member.signature.clone(),
            anchor_id: member.anchor_id.clone(),
            page_slug: page.slug.clone(),
            page_label: page.label.clone(),
        })
        .collect()
}
