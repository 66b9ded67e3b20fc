/// Error returned when a page cannot be shown.
///
/// Clonable so one failure can be handed to every caller awaiting the same
/// cached payload.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("Page {lang}/{slug} does not exist")]
    UnknownPage { lang: String, slug: String },
    #[error("Failed to decompress page {lang}/{slug}: {message}")]
    Decompress {
        lang: String,
        slug: String,
        message: String,
    },
}
