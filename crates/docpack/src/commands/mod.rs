//! CLI command implementations.

mod build;
mod check;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use docpack_config::{CliSettings, Config};
use docpack_site::{BuildOptions, Site, SiteBuilder};

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

use crate::error::CliError;
use crate::output::Output;

/// Options shared by every command that compiles the corpus.
#[derive(Args, Debug)]
pub(crate) struct SourceArgs {
    /// Path to configuration file (default: auto-discover docpack.toml).
    #[arg(short, long, env = "DOCPACK_CONFIG")]
    config: Option<PathBuf>,

    /// Documentation root holding one directory per language (overrides config).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Languages to compile, in order (default: auto-detect).
    #[arg(short, long, num_args = 1..)]
    languages: Option<Vec<String>>,

    /// Fail when a relative link cannot be resolved.
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SourceArgs {
    fn load_config(&self, output: Option<PathBuf>) -> Result<Config, CliError> {
        let settings = CliSettings {
            source_dir: self.root.clone(),
            output,
            languages: self.languages.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }

    /// Compile the corpus and report unresolved links.
    fn build_site(&self, config: &Config, output: &Output) -> Result<Site, CliError> {
        output.info(&format!(
            "Source: {}",
            config.docs.source_dir.display()
        ));
        let site = SiteBuilder::new(BuildOptions {
            source_dir: config.docs.source_dir.clone(),
            languages: config.docs.languages.clone(),
            preferred: config.docs.preferred.clone(),
        })
        .build()?;

        for lang in &site.languages {
            let pages = site.corpus.pages(lang).unwrap_or_default();
            let members: usize = pages.iter().map(|page| page.members.len()).sum();
            output.detail(&format!("{lang}: {} pages, {members} members", pages.len()));
        }

        for warning in &site.warnings {
            output.warning(&format!("Unresolved link: {warning}"));
        }
        if self.strict && !site.warnings.is_empty() {
            return Err(CliError::UnresolvedLinks {
                count: site.warnings.len(),
            });
        }
        Ok(site)
    }
}

/// Display labels for the site's languages.
fn labels(config: &Config, site: &Site) -> BTreeMap<String, String> {
    site.languages
        .iter()
        .map(|lang| (lang.clone(), config.label_for(lang)))
        .collect()
}
