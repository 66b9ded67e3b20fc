//! Single-flight cache of decompressed page HTML.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::RuntimeError;

/// Decompressed page HTML, shared by every caller awaiting the same page.
pub type PagePayload = Shared<LocalBoxFuture<'static, Result<Rc<str>, RuntimeError>>>;

/// Cache of page payload futures keyed by `(lang, slug)`.
///
/// The first request for a page starts its decompression; later requests,
/// concurrent or not, get a clone of the same shared future. Failures are
/// cached like successes, since the payload bytes never change.
#[derive(Default)]
pub struct PageCache {
    entries: RefCell<HashMap<(String, String), PagePayload>>,
    inflations: Rc<Cell<usize>>,
}

impl PageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload of `lang`/`slug`, decompressing `content` on first request.
    ///
    /// `content` is `None` when the page does not exist.
    pub fn load(&self, lang: &str, slug: &str, content: Option<&str>) -> PagePayload {
        let key = (lang.to_owned(), slug.to_owned());
        if let Some(pending) = self.entries.borrow().get(&key) {
            return pending.clone();
        }

        let inflations = Rc::clone(&self.inflations);
        let content = content.map(str::to_owned);
        let (lang, slug) = key.clone();
        let future = async move {
            let Some(content) = content else {
                return Err(RuntimeError::UnknownPage { lang, slug });
            };
            inflations.set(inflations.get() + 1);
            tracing::debug!(lang = %lang, slug = %slug, "Inflating page");
            docpack_renderer::decompress_text(&content)
                .map(Rc::from)
                .map_err(|e| RuntimeError::Decompress {
                    lang,
                    slug,
                    message: e.to_string(),
                })
        }
        .boxed_local()
        .shared();

        self.entries.borrow_mut().insert(key, future.clone());
        future
    }

    /// Number of decompressions started so far.
    #[must_use]
    pub fn inflations(&self) -> usize {
        self.inflations.get()
    }

    /// Whether `lang`/`slug` has been requested.
    #[must_use]
    pub fn contains(&self, lang: &str, slug: &str) -> bool {
        self.entries
            .borrow()
            .contains_key(&(lang.to_owned(), slug.to_owned()))
    }
}

impl fmt::Debug for PageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageCache")
            .field("entries", &self.entries.borrow().len())
            .field("inflations", &self.inflations.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use futures::future::join;

    use super::*;

    #[test]
    fn test_concurrent_requests_share_one_inflation() {
        let cache = PageCache::new();
        let payload = docpack_renderer::compress_text("<p>hi</p>").unwrap();

        let first = cache.load("en", "home", Some(&payload));
        let second = cache.load("en", "home", Some(&payload));
        let (a, b) = block_on(join(first, second));

        assert_eq!(&*a.unwrap(), "<p>hi</p>");
        assert_eq!(&*b.unwrap(), "<p>hi</p>");
        assert_eq!(cache.inflations(), 1);

        let later = block_on(cache.load("en", "home", Some(&payload))).unwrap();
        assert_eq!(&*later, "<p>hi</p>");
        assert_eq!(cache.inflations(), 1);
    }

    #[test]
    fn test_keys_are_per_language() {
        let cache = PageCache::new();
        let payload = docpack_renderer::compress_text("<p>x</p>").unwrap();
        block_on(cache.load("en", "home", Some(&payload))).unwrap();
        block_on(cache.load("ru", "home", Some(&payload))).unwrap();
        assert_eq!(cache.inflations(), 2);
        assert!(cache.contains("ru", "home"));
        assert!(!cache.contains("zh", "home"));
    }

    #[test]
    fn test_failure_is_cached_and_isolated() {
        let cache = PageCache::new();
        let err = block_on(cache.load("en", "broken", Some("not base64!"))).unwrap_err();
        assert!(matches!(err, RuntimeError::Decompress { ref slug, .. } if slug == "broken"));
        assert!(block_on(cache.load("en", "broken", Some("not base64!"))).is_err());
        assert_eq!(cache.inflations(), 1);

        let ok = docpack_renderer::compress_text("fine").unwrap();
        assert_eq!(&*block_on(cache.load("en", "home", Some(&ok))).unwrap(), "fine");
    }

    #[test]
    fn test_missing_page() {
        let cache = PageCache::new();
        let err = block_on(cache.load("en", "nope", None)).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::UnknownPage {
                lang: "en".to_owned(),
                slug: "nope".to_owned()
            }
        );
        assert_eq!(cache.inflations(), 0);
    }
}
