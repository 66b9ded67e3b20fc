//! `docpack build` command implementation.

use std::path::PathBuf;

use clap::Args;
use docpack_bundle::{BundleAssembler, BundleOptions};

use super::{SourceArgs, labels};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,

    /// Bundle file to write (default: html/index.html).
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(self.output)?;
        let site = self.source.build_site(&config, &output)?;

        let subtitle = Some(config.site.subtitle.clone()).filter(|s| !s.is_empty());
        let assembler = BundleAssembler::new(BundleOptions {
            title: config.site.title.clone(),
            subtitle,
            repository: config.site.repository.clone(),
            labels: labels(&config, &site),
            search_limit: config.search.limit,
        })?;
        let bytes = assembler.write(&site, &config.output_path)?;

        output.success(&format!(
            "Wrote {} ({} languages, {} pages, {} search entries, {bytes} bytes)",
            config.output_path.display(),
            site.languages.len(),
            site.corpus.page_count(),
            site.search_index.len(),
        ));
        Ok(())
    }
}
