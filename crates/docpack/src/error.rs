//! CLI error types.

use docpack_bundle::BundleError;
use docpack_config::ConfigError;
use docpack_site::BuildError;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Bundle(#[from] BundleError),

    #[error("{count} unresolved link(s) with --strict")]
    UnresolvedLinks { count: usize },

    #[error("{count} check(s) failed")]
    CheckFailed { count: usize },
}
