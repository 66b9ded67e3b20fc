//! Documentation corpus compilation for docpack.
//!
//! Turns a tree of per-language markdown sources into a [`Site`]: ordered
//! pages with compressed HTML, member summaries for class pages, and the
//! search index of the primary language.
//!
//! Per language the pipeline is discovery ([`discover_language`]), slug map
//! construction ([`SlugMap`]), then per page member extraction
//! ([`extract_members`], class pages only), link rewriting
//! ([`LinkRewriter`]), rendering and compression.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use docpack_site::{BuildOptions, SiteBuilder};
//!
//! let site = SiteBuilder::new(BuildOptions {
//!     source_dir: PathBuf::from("docs"),
//!     languages: None,
//!     preferred: vec!["en".to_owned()],
//! })
//! .build()?;
//! println!("{} pages", site.corpus.page_count());
//! # Ok::<(), docpack_site::BuildError>(())
//! ```

mod discover;
mod encoding;
mod links;
mod members;
mod page;
mod signature;
mod site;
mod slug_map;

pub use discover::{
    CLASS_SLUG_PREFIX, DiscoverError, HOME_SLUG, PAGE_FILE, PageKind, PageSource,
    detect_languages, discover_language, front_page_slugs,
};
pub use encoding::{DecodeError, TextEncoding, decode_text, read_text};
pub use links::{LinkRewriter, RewriteResult};
pub use members::{Extraction, extract_members};
pub use page::{Corpus, Member, Page, SearchIndexEntry};
pub use signature::normalize_signature;
pub use site::{BuildError, BuildOptions, LinkWarning, Site, SiteBuilder};
pub use slug_map::SlugMap;

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Site: Send, Sync, Clone);
    assert_impl_all!(SiteBuilder: Send, Sync);
    assert_impl_all!(BuildError: Send, Sync, std::error::Error);
}
