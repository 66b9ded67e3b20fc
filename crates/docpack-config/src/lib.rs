//! `docpack.toml` configuration.
//!
//! [`Config::load`] reads an explicit file, or the first `docpack.toml` found
//! walking up from the working directory, or falls back to built-in defaults
//! rooted at the working directory. Relative paths resolve against the
//! directory of the file they came from. [`CliSettings`] are applied last.
//!
//! `docs.source_dir`, `output.path` and `site.repository` accept `${VAR}` and
//! `${VAR:-default}` references.

mod expand;
mod raw;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use raw::RawConfig;

/// File name looked up by discovery.
pub const CONFIG_FILENAME: &str = "docpack.toml";

const BUILTIN_LABELS: &[(&str, &str)] = &[("en", "EN"), ("ru", "РУ"), ("zh", "中")];

const BUILTIN_PREFERRED: &[&str] = &["en", "ru", "zh"];

const MAX_SEARCH_LIMIT: usize = 100;

/// Command-line overrides. `None` keeps the configured value.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Explicit language list; disables auto-detection.
    pub languages: Option<Vec<String>>,
}

/// Resolved configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub docs: DocsConfig,
    /// Bundle file to write.
    pub output_path: PathBuf,
    pub site: SiteConfig,
    /// Configured language labels. See [`Config::label_for`].
    pub labels: BTreeMap<String, String>,
    pub search: SearchConfig,
    /// File the configuration was read from, if any.
    pub config_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocsConfig {
    /// Root holding one directory per language.
    pub source_dir: PathBuf,
    /// `None` means auto-detect.
    pub languages: Option<Vec<String>>,
    /// Ordering of auto-detected languages.
    pub preferred: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub title: String,
    pub subtitle: String,
    pub repository: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_owned(),
            subtitle: String::new(),
            repository: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Maximum results per query.
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { limit: 8 }
    }
}

/// Error returned when configuration cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid TOML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Validation(String),
    #[error("Cannot expand {field}: {message}")]
    EnvVar { field: String, message: String },
}

impl Config {
    /// Load configuration and apply CLI overrides.
    ///
    /// With `config_path`, that file must exist. Without it, discovery walks
    /// up from the working directory; if nothing is found, defaults apply.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) if !path.is_file() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => Self::from_file(path)?,
            None => {
                let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
                    path: PathBuf::from("."),
                    source,
                })?;
                match discover(&cwd) {
                    Some(found) => Self::from_file(&found)?,
                    None => Self::defaults(&cwd),
                }
            }
        };

        if let Some(settings) = cli_settings {
            config.apply(settings);
        }
        config.validate()?;
        Ok(config)
    }

    /// Built-in configuration rooted at `base`.
    #[must_use]
    pub fn defaults(base: &Path) -> Self {
        RawConfig::default().resolve(base)
    }

    /// Read, expand and resolve one config file. Not validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        let mut config = raw.expand()?.resolve(base);
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Display label for a language code: configured, built-in, or the code
    /// uppercased.
    #[must_use]
    pub fn label_for(&self, lang: &str) -> String {
        self.labels
            .get(lang)
            .map(String::as_str)
            .or_else(|| {
                BUILTIN_LABELS
                    .iter()
                    .find_map(|&(code, label)| (code == lang).then_some(label))
            })
            .map_or_else(|| lang.to_uppercase(), str::to_owned)
    }

    /// Check every constraint, reporting all violations at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.site.title.trim().is_empty() {
            problems.push("site.title must not be empty".to_owned());
        }
        if let Some(url) = &self.site.repository
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            problems.push(format!("site.repository must be an http(s) URL, got {url:?}"));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&self.search.limit) {
            problems.push(format!(
                "search.limit must be in 1..={MAX_SEARCH_LIMIT}, got {}",
                self.search.limit
            ));
        }
        match &self.docs.languages {
            Some(languages) if languages.is_empty() => {
                problems.push("docs.languages must list at least one language".to_owned());
            }
            Some(languages) => {
                for lang in languages {
                    let invalid =
                        lang.trim().is_empty() || lang == ".." || lang.contains(['/', '\\', '#']);
                    if invalid {
                        problems.push(format!(
                            "docs.languages entry {lang:?} is not a directory name"
                        ));
                    }
                }
            }
            None => {}
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems.join("; ")))
        }
    }

    fn apply(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.source_dir {
            self.docs.source_dir.clone_from(dir);
        }
        if let Some(output) = &settings.output {
            self.output_path.clone_from(output);
        }
        if let Some(languages) = &settings.languages {
            self.docs.languages = Some(languages.clone());
        }
    }
}

/// First `docpack.toml` in `start` or one of its ancestors.
fn discover(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

pub(crate) fn default_preferred() -> Vec<String> {
    BUILTIN_PREFERRED.iter().map(|&lang| lang.to_owned()).collect()
}
