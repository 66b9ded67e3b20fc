//! `docpack.toml` as written, before expansion and path resolution.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::expand::expand_env;
use crate::{Config, ConfigError, DocsConfig, SearchConfig, SiteConfig, default_preferred};

/// Default output location, relative to the base directory.
pub(crate) const DEFAULT_OUTPUT: &str = "html/index.html";

/// Default documentation root, relative to the base directory.
pub(crate) const DEFAULT_SOURCE: &str = "docs";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RawConfig {
    docs: RawDocs,
    output: RawOutput,
    site: SiteConfig,
    labels: BTreeMap<String, String>,
    search: SearchConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawDocs {
    source_dir: Option<String>,
    languages: Option<Vec<String>>,
    preferred: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawOutput {
    path: Option<String>,
}

impl RawConfig {
    /// Expand `${VAR}` references in the fields that accept them.
    pub(crate) fn expand(mut self) -> Result<Self, ConfigError> {
        expand_field(&mut self.docs.source_dir, "docs.source_dir")?;
        expand_field(&mut self.output.path, "output.path")?;
        expand_field(&mut self.site.repository, "site.repository")?;
        Ok(self)
    }

    /// Resolve relative paths against `base`, the config file's directory.
    pub(crate) fn resolve(self, base: &Path) -> Config {
        let source = self.docs.source_dir.as_deref().unwrap_or(DEFAULT_SOURCE);
        let output = self.output.path.as_deref().unwrap_or(DEFAULT_OUTPUT);
        Config {
            docs: DocsConfig {
                source_dir: base.join(source),
                languages: self.docs.languages,
                preferred: self.docs.preferred.unwrap_or_else(default_preferred),
            },
            output_path: base.join(output),
            site: self.site,
            labels: self.labels,
            search: self.search,
            config_path: None,
        }
    }
}

fn expand_field(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(text) = value.as_deref() {
        *value = Some(expand_env(text, field)?);
    }
    Ok(())
}
