//! Bundle assembly: serialize a [`Site`] into the HTML shell.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use docpack_renderer::escape_html;
use docpack_site::Site;
use serde::Serialize;

use crate::template::{BuildContext, Slot, Template, TemplateError};

/// Error returned when a bundle cannot be assembled or written.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Failed to serialize bundle data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Runtime asset {0} is missing")]
    MissingAsset(&'static str),
    #[error("Runtime asset {0} would terminate its enclosing tag")]
    UnsafeAsset(&'static str),
}

/// Presentation settings for a bundle.
#[derive(Clone, Debug)]
pub struct BundleOptions {
    pub title: String,
    pub subtitle: Option<String>,
    /// Repository URL linked from the top bar.
    pub repository: Option<String>,
    /// Display labels by language code. Missing codes show uppercased.
    pub labels: BTreeMap<String, String>,
    /// Maximum search results per query.
    pub search_limit: usize,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            title: "Documentation".to_owned(),
            subtitle: None,
            repository: None,
            labels: BTreeMap::new(),
            search_limit: 8,
        }
    }
}

/// Serialize `value` as JSON safe to embed inside a `<script>` element.
///
/// `<` becomes `\u003c`, so neither `</script>` nor `<!--` can appear, and
/// U+2028/U+2029 are escaped for pre-ES2019 parsers.
pub fn script_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    Ok(escaped)
}

/// Assembles sites into single-file bundles.
#[derive(Debug)]
pub struct BundleAssembler {
    template: Template,
    style: String,
    app: String,
    options: BundleOptions,
}

impl BundleAssembler {
    /// Create an assembler using the embedded runtime assets.
    pub fn new(options: BundleOptions) -> Result<Self, BundleError> {
        let asset = |name: &'static str| {
            docpack_assets::get_text(name).ok_or(BundleError::MissingAsset(name))
        };
        Self::with_assets(
            &asset(docpack_assets::SHELL)?,
            &asset(docpack_assets::STYLE)?,
            &asset(docpack_assets::APP)?,
            options,
        )
    }

    /// Create an assembler from explicit shell, stylesheet and runtime.
    pub fn with_assets(
        shell: &str,
        style: &str,
        app: &str,
        options: BundleOptions,
    ) -> Result<Self, BundleError> {
        if style.to_ascii_lowercase().contains("</style") {
            return Err(BundleError::UnsafeAsset(docpack_assets::STYLE));
        }
        if app.to_ascii_lowercase().contains("</script") {
            return Err(BundleError::UnsafeAsset(docpack_assets::APP));
        }
        Ok(Self {
            template: Template::parse(shell)?,
            style: style.to_owned(),
            app: app.to_owned(),
            options,
        })
    }

    /// Render the bundle for `site`.
    pub fn assemble(&self, site: &Site) -> Result<String, BundleError> {
        let labels: BTreeMap<&str, String> = site
            .languages
            .iter()
            .map(|lang| {
                let label = self
                    .options
                    .labels
                    .get(lang)
                    .cloned()
                    .unwrap_or_else(|| lang.to_uppercase());
                (lang.as_str(), label)
            })
            .collect();
        let start_lang = site.primary_language().unwrap_or_default();

        let mut context = BuildContext::new();
        context
            .set(Slot::Title, escape_html(&self.options.title))
            .set(
                Slot::Subtitle,
                escape_html(self.options.subtitle.as_deref().unwrap_or_default()),
            )
            .set(Slot::BrandLink, self.brand_link())
            .set(Slot::Style, self.style.as_str())
            .set(Slot::Docs, script_literal(&site.corpus)?)
            .set(Slot::LangMap, script_literal(&labels)?)
            .set(Slot::SearchIndex, script_literal(&site.search_index)?)
            .set(Slot::StartLang, script_literal(start_lang)?)
            .set(Slot::SearchLimit, self.options.search_limit.to_string())
            .set(Slot::App, self.app.as_str());

        Ok(self.template.render(&context)?)
    }

    /// Render the bundle and write it to `path`, creating parent directories.
    pub fn write(&self, site: &Site, path: &Path) -> Result<usize, BundleError> {
        let html = self.assemble(site)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| BundleError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, &html).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), bytes = html.len(), "Wrote bundle");
        Ok(html.len())
    }

    fn brand_link(&self) -> String {
        match &self.options.repository {
            Some(url) => format!(
                "<a class=\"repo-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\" aria-label=\"View source\">Source</a>",
                escape_html(url)
            ),
            None => String::new(),
        }
    }
}
