//! Navigation state machine of the client runtime.
//!
//! A [`Navigator`] is either without a route (before start, or with an empty
//! corpus) or viewing `(lang, slug, anchor)`. Every transition funnels through
//! one routine that resolves the slug (requested page, else the language home,
//! else its first page) and writes the location fragment. A fragment written
//! by the navigator itself is remembered so the change notification it causes
//! is not applied a second time.
//!
//! Page content loads through the [`PageCache`]. [`Navigator::render`] reads
//! the route again once the payload is ready and reports a stale result
//! instead of showing a page the user already left. A page whose payload
//! does not decode leaves the displayed content as it was.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use docpack_site::{Corpus, HOME_SLUG, SearchIndexEntry, Site};
use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};

use crate::RuntimeError;
use crate::cache::PageCache;
use crate::nav::{LanguageButton, Navigation, language_buttons};
use crate::route::Route;
use crate::search::SearchIndex;

/// How a location fragment change was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentChange {
    /// The navigator wrote this fragment itself.
    Suppressed,
    /// The fragment named a known language and was navigated to.
    Applied,
    /// Not a route, or an unknown language.
    Ignored,
}

/// Result of rendering the current page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The page is still current; `route` is the state at completion.
    Rendered { route: Route, html: Rc<str> },
    /// The user navigated to another page while the payload loaded.
    Stale { route: Route },
    /// The payload did not load; the displayed content is unchanged.
    Failed { route: Route, error: RuntimeError },
    NoRoute,
}

#[derive(Debug, Default)]
struct ViewState {
    route: Option<Route>,
    location: String,
    pending_fragment: Option<String>,
    displayed: Option<(Route, Rc<str>)>,
}

/// Client runtime over a compiled corpus.
#[derive(Debug)]
pub struct Navigator {
    corpus: Rc<Corpus>,
    search: SearchIndex,
    labels: BTreeMap<String, String>,
    start_lang: Option<String>,
    state: Rc<RefCell<ViewState>>,
    cache: PageCache,
}

impl Navigator {
    #[must_use]
    pub fn new(
        corpus: Corpus,
        search: SearchIndex,
        labels: BTreeMap<String, String>,
        start_lang: Option<String>,
    ) -> Self {
        Self {
            corpus: Rc::new(corpus),
            search,
            labels,
            start_lang,
            state: Rc::default(),
            cache: PageCache::new(),
        }
    }

    /// Navigator over a freshly built site, starting in its primary language.
    #[must_use]
    pub fn from_site(site: &Site, labels: BTreeMap<String, String>, search_limit: usize) -> Self {
        Self::new(
            site.corpus.clone(),
            SearchIndex::new(site.search_index.clone(), search_limit),
            labels,
            site.primary_language().map(str::to_owned),
        )
    }

    /// Enter the initial route from the page's location fragment.
    ///
    /// A fragment naming a known language is honoured; otherwise the start
    /// language (or the first language) opens at its home page.
    pub fn start(&self, fragment: &str) -> Option<Route> {
        self.state.borrow_mut().location = fragment.to_owned();
        if let Some(route) = Route::parse(fragment)
            && self.corpus.contains_language(&route.lang)
        {
            self.go(&route.lang, &route.slug, route.anchor.as_deref());
            return self.route();
        }

        let lang = self
            .start_lang
            .as_deref()
            .filter(|lang| self.corpus.contains_language(lang))
            .or_else(|| self.corpus.languages().next())
            .map(str::to_owned);
        if let Some(lang) = lang {
            self.go(&lang, HOME_SLUG, None);
        }
        self.route()
    }

    /// Open `slug` in the current language, as a sidebar or search click does.
    pub fn navigate(&self, slug: &str, anchor: Option<&str>) -> bool {
        match self.route() {
            Some(current) => self.go(&current.lang, slug, anchor),
            None => false,
        }
    }

    /// Open the current language's home page.
    pub fn go_home(&self) -> bool {
        self.navigate(HOME_SLUG, None)
    }

    /// Switch language, keeping the page when the new language has it.
    ///
    /// The anchor survives only when the slug does.
    pub fn set_language(&self, lang: &str) -> bool {
        if !self.corpus.contains_language(lang) {
            return false;
        }
        let current = self.route();
        let requested = current.as_ref().map_or(HOME_SLUG, |route| route.slug.as_str());
        let slug = self.resolve_slug(lang, requested);
        let anchor = current
            .as_ref()
            .filter(|route| route.slug == slug)
            .and_then(|route| route.anchor.clone());
        self.go(lang, &slug, anchor.as_deref())
    }

    /// Handle a click on an in-content link.
    ///
    /// Returns `true` when the navigator takes over the link: `#/...` routes
    /// and bare `#anchor` links within the current page. Anything else is
    /// left to the browser.
    pub fn follow_link(&self, href: &str) -> bool {
        if href.starts_with("#/") {
            if let Some(route) = Route::parse(href) {
                self.go(&route.lang, &route.slug, route.anchor.as_deref());
            }
            return true;
        }
        if let Some(anchor) = href.strip_prefix('#').filter(|a| !a.is_empty()) {
            if let Some(current) = self.route() {
                self.go(&current.lang, &current.slug, Some(anchor));
            }
            return true;
        }
        false
    }

    /// Handle a location fragment change.
    pub fn on_fragment_change(&self, fragment: &str) -> FragmentChange {
        {
            let mut state = self.state.borrow_mut();
            state.location = fragment.to_owned();
            if state.pending_fragment.take().as_deref() == Some(fragment) {
                return FragmentChange::Suppressed;
            }
        }
        match Route::parse(fragment) {
            Some(route) if self.go(&route.lang, &route.slug, route.anchor.as_deref()) => {
                FragmentChange::Applied
            }
            _ => FragmentChange::Ignored,
        }
    }

    /// Load and return the current page's HTML.
    ///
    /// The returned future does not borrow the navigator, so transitions may
    /// happen while it is pending.
    pub fn render(&self) -> LocalBoxFuture<'static, RenderOutcome> {
        let Some(route) = self.route() else {
            return future::ready(RenderOutcome::NoRoute).boxed_local();
        };
        let content = self
            .corpus
            .page(&route.lang, &route.slug)
            .map(|page| page.content.as_str());
        if content.is_none() {
            self.state.borrow_mut().displayed = None;
        }
        let payload = self.cache.load(&route.lang, &route.slug, content);
        let state = Rc::clone(&self.state);

        async move {
            let result = payload.await;
            let current = state.borrow().route.clone();
            match current {
                Some(current) if current.same_page(&route) => match result {
                    Ok(html) => {
                        state.borrow_mut().displayed = Some((current.clone(), Rc::clone(&html)));
                        RenderOutcome::Rendered {
                            route: current,
                            html,
                        }
                    }
                    Err(error) => {
                        tracing::debug!(route = %current, error = %error, "Page failed to load");
                        RenderOutcome::Failed {
                            route: current,
                            error,
                        }
                    }
                },
                _ => RenderOutcome::Stale { route },
            }
        }
        .boxed_local()
    }

    /// Search the member index.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&SearchIndexEntry> {
        self.search.query(query)
    }

    /// Sidebar for the current route.
    #[must_use]
    pub fn navigation(&self) -> Navigation {
        self.route()
            .map(|route| Navigation::build(&self.corpus, &route))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn language_switcher(&self) -> Vec<LanguageButton> {
        let route = self.route();
        language_buttons(
            &self.corpus,
            &self.labels,
            route.as_ref().map(|r| r.lang.as_str()),
        )
    }

    #[must_use]
    pub fn route(&self) -> Option<Route> {
        self.state.borrow().route.clone()
    }

    /// Route and HTML of the page last rendered into the content pane.
    #[must_use]
    pub fn displayed(&self) -> Option<(Route, Rc<str>)> {
        self.state.borrow().displayed.clone()
    }

    /// Current location fragment.
    #[must_use]
    pub fn location(&self) -> String {
        self.state.borrow().location.clone()
    }

    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    #[must_use]
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    fn resolve_slug(&self, lang: &str, slug: &str) -> String {
        let Some(pages) = self.corpus.pages(lang) else {
            return slug.to_owned();
        };
        if pages.iter().any(|page| page.slug == slug) {
            return slug.to_owned();
        }
        if pages.iter().any(|page| page.slug == HOME_SLUG) {
            return HOME_SLUG.to_owned();
        }
        pages
            .first()
            .map_or_else(|| slug.to_owned(), |page| page.slug.clone())
    }

    fn go(&self, lang: &str, slug: &str, anchor: Option<&str>) -> bool {
        if !self.corpus.contains_language(lang) {
            tracing::debug!(lang, "Ignoring route to unknown language");
            return false;
        }
        let route = Route::new(lang, self.resolve_slug(lang, slug), anchor);
        let target = route.to_fragment();

        let mut state = self.state.borrow_mut();
        if state.location != target {
            state.pending_fragment = Some(target.clone());
            state.location = target;
        }
        tracing::debug!(route = %route, "Navigated");
        state.route = Some(route);
        true
    }
}

#[cfg(test)]
mod tests {
    use docpack_site::{Member, Page, PageKind};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(slug: &str, html: &str, members: &[&str]) -> Page {
        Page {
            slug: slug.to_owned(),
            title: slug.to_owned(),
            label: slug.to_owned(),
            content: docpack_renderer::compress_text(html).unwrap(),
            members: members
                .iter()
                .map(|anchor| Member {
                    anchor_id: (*anchor).to_owned(),
                    title: (*anchor).to_owned(),
                    signature: format!("void {anchor}()"),
                    synopsis: String::new(),
                })
                .collect(),
            kind: if slug.starts_with("api-") && slug != "api-index" {
                PageKind::Class
            } else {
                PageKind::Front
            },
        }
    }

    fn navigator() -> Navigator {
        let mut corpus = Corpus::new();
        corpus.insert(
            "en",
            vec![
                page("home", "<h1>Home</h1>", &[]),
                page("api-Foo", "<h3 id=\"bar\">bar()</h3>", &["bar"]),
                page("api-Bar", "<h3 id=\"baz\">baz()</h3>", &["baz"]),
            ],
        );
        corpus.insert(
            "ru",
            vec![
                page("home", "<h1>Главная</h1>", &[]),
                page("api-Foo", "<h3 id=\"bar\">bar()</h3>", &["bar"]),
            ],
        );
        corpus.insert("zh", vec![page("tutorial", "<h1>教程</h1>", &[])]);
        let search = SearchIndex::new(
            vec![SearchIndexEntry {
                signature: "void bar()".to_owned(),
                anchor_id: "bar".to_owned(),
                page_slug: "api-Foo".to_owned(),
                page_label: "Foo".to_owned(),
            }],
            8,
        );
        Navigator::new(corpus, search, BTreeMap::new(), Some("en".to_owned()))
    }

    #[test]
    fn test_start_without_route_opens_start_language_home() {
        let nav = navigator();
        assert_eq!(nav.start(""), Some(Route::new("en", "home", None)));
        assert_eq!(nav.location(), "#/en/home");
    }

    #[test]
    fn test_start_with_unknown_slug_falls_back_to_home() {
        let nav = navigator();
        assert_eq!(nav.start("#/ru/unknown-slug"), Some(Route::new("ru", "home", None)));
        assert_eq!(nav.location(), "#/ru/home");
    }

    #[test]
    fn test_start_with_unknown_language_uses_start_language() {
        let nav = navigator();
        assert_eq!(nav.start("#/de/home"), Some(Route::new("en", "home", None)));
    }

    #[test]
    fn test_fallback_to_first_page_without_home() {
        let nav = navigator();
        nav.start("#/zh/api-Foo");
        assert_eq!(nav.route(), Some(Route::new("zh", "tutorial", None)));
    }

    #[test]
    fn test_empty_corpus_has_no_route() {
        let nav = Navigator::new(Corpus::new(), SearchIndex::new(Vec::new(), 8), BTreeMap::new(), None);
        assert_eq!(nav.start("#/en/home"), None);
        assert!(!nav.navigate("home", None));
        assert_eq!(block_on(nav.render()), RenderOutcome::NoRoute);
        assert_eq!(nav.navigation(), Navigation::default());
    }

    #[test]
    fn test_language_without_pages_still_routes() {
        let mut corpus = Corpus::new();
        corpus.insert("en", Vec::new());
        let nav = Navigator::new(corpus, SearchIndex::new(Vec::new(), 8), BTreeMap::new(), None);
        assert_eq!(nav.start(""), Some(Route::new("en", "home", None)));
        let outcome = block_on(nav.render());
        assert_eq!(nav.displayed(), None);
        assert!(matches!(
            outcome,
            RenderOutcome::Failed {
                error: RuntimeError::UnknownPage { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_self_written_fragment_is_suppressed() {
        let nav = navigator();
        nav.start("");
        nav.navigate("api-Foo", Some("bar"));
        assert_eq!(nav.location(), "#/en/api-Foo/bar");

        assert_eq!(nav.on_fragment_change("#/en/api-Foo/bar"), FragmentChange::Suppressed);
        assert_eq!(nav.on_fragment_change("#/en/api-Bar"), FragmentChange::Applied);
        assert_eq!(nav.route(), Some(Route::new("en", "api-Bar", None)));
    }

    #[test]
    fn test_external_fragment_changes() {
        let nav = navigator();
        nav.start("#/en/home");
        assert_eq!(nav.on_fragment_change("#/de/home"), FragmentChange::Ignored);
        assert_eq!(nav.on_fragment_change("#nothing"), FragmentChange::Ignored);
        assert_eq!(nav.route(), Some(Route::new("en", "home", None)));

        assert_eq!(nav.on_fragment_change("#/ru/api-Foo/bar"), FragmentChange::Applied);
        assert_eq!(nav.route(), Some(Route::new("ru", "api-Foo", Some("bar"))));
    }

    #[test]
    fn test_navigating_to_current_location_writes_nothing() {
        let nav = navigator();
        nav.start("#/en/home");
        // The location already matched, so an external change is not swallowed.
        assert_eq!(nav.on_fragment_change("#/en/api-Foo"), FragmentChange::Applied);
    }

    #[test]
    fn test_set_language_keeps_anchor_only_with_slug() {
        let nav = navigator();
        nav.start("#/en/api-Foo/bar");
        assert!(nav.set_language("ru"));
        assert_eq!(nav.route(), Some(Route::new("ru", "api-Foo", Some("bar"))));

        nav.start("#/en/api-Bar/baz");
        assert!(nav.set_language("ru"));
        assert_eq!(nav.route(), Some(Route::new("ru", "home", None)));

        assert!(!nav.set_language("de"));
        assert_eq!(nav.route(), Some(Route::new("ru", "home", None)));
    }

    #[test]
    fn test_follow_link() {
        let nav = navigator();
        nav.start("#/en/home");
        assert!(nav.follow_link("#/en/api-Foo/bar"));
        assert_eq!(nav.route(), Some(Route::new("en", "api-Foo", Some("bar"))));

        assert!(nav.follow_link("#details"));
        assert_eq!(nav.route(), Some(Route::new("en", "api-Foo", Some("details"))));

        assert!(nav.follow_link("#/broken"));
        assert!(!nav.follow_link("https://example.com"));
        assert!(!nav.follow_link("#"));
        assert_eq!(nav.route(), Some(Route::new("en", "api-Foo", Some("details"))));
    }

    #[test]
    fn test_render_current_page() {
        let nav = navigator();
        nav.start("#/en/api-Foo/bar");
        let outcome = block_on(nav.render());
        assert_eq!(
            outcome,
            RenderOutcome::Rendered {
                route: Route::new("en", "api-Foo", Some("bar")),
                html: Rc::from("<h3 id=\"bar\">bar()</h3>"),
            }
        );
    }

    #[test]
    fn test_render_is_stale_after_navigating_away() {
        let nav = navigator();
        nav.start("#/en/home");
        let pending = nav.render();
        nav.navigate("api-Foo", None);

        assert_eq!(
            block_on(pending),
            RenderOutcome::Stale {
                route: Route::new("en", "home", None)
            }
        );
        assert!(nav.cache().contains("en", "home"));

        let outcome = block_on(nav.render());
        assert!(matches!(outcome, RenderOutcome::Rendered { ref route, .. } if route.slug == "api-Foo"));
    }

    #[test]
    fn test_anchor_change_does_not_make_render_stale() {
        let nav = navigator();
        nav.start("#/en/api-Foo");
        let pending = nav.render();
        nav.navigate("api-Foo", Some("bar"));
        let outcome = block_on(pending);
        assert!(matches!(
            outcome,
            RenderOutcome::Rendered { ref route, .. } if route.anchor.as_deref() == Some("bar")
        ));
    }

    #[test]
    fn test_failed_page_leaves_content_unchanged() {
        let mut corpus = Corpus::new();
        let mut broken = page("api-Foo", "", &[]);
        broken.content = "not a payload".to_owned();
        corpus.insert("en", vec![page("home", "<h1>Home</h1>", &[]), broken]);
        let nav = Navigator::new(corpus, SearchIndex::new(Vec::new(), 8), BTreeMap::new(), None);

        nav.start("#/en/home");
        block_on(nav.render());
        nav.navigate("api-Foo", None);
        let outcome = block_on(nav.render());
        assert!(matches!(
            outcome,
            RenderOutcome::Failed {
                error: RuntimeError::Decompress { .. },
                ..
            }
        ));
        assert_eq!(
            nav.displayed(),
            Some((Route::new("en", "home", None), Rc::from("<h1>Home</h1>")))
        );
        assert_eq!(nav.route(), Some(Route::new("en", "api-Foo", None)));
    }

    #[test]
    fn test_stale_render_does_not_replace_content() {
        let nav = navigator();
        nav.start("#/en/home");
        let pending = nav.render();
        nav.navigate("api-Foo", None);
        block_on(pending);
        assert_eq!(nav.displayed(), None);
    }

    #[test]
    fn test_revisits_hit_the_cache() {
        let nav = navigator();
        nav.start("#/en/home");
        let first = nav.render();
        let second = nav.render();
        block_on(first);
        block_on(second);
        nav.navigate("api-Foo", None);
        block_on(nav.render());
        nav.go_home();
        block_on(nav.render());
        assert_eq!(nav.cache().inflations(), 2);
    }

    #[test]
    fn test_navigation_and_switcher_follow_route() {
        let nav = navigator();
        nav.start("#/ru/api-Foo/bar");
        let sidebar = nav.navigation();
        assert_eq!(sidebar.active().map(|i| i.slug.as_str()), Some("api-Foo"));
        assert_eq!(sidebar.classes[0].members.len(), 1);

        let switcher = nav.language_switcher();
        let active: Vec<&str> = switcher
            .iter()
            .filter(|b| b.active)
            .map(|b| b.lang.as_str())
            .collect();
        assert_eq!(active, vec!["ru"]);
    }

    #[test]
    fn test_search_result_navigates_to_member() {
        let nav = navigator();
        nav.start("");
        let hits = nav.search("BAR(");
        assert_eq!(hits.len(), 1);
        let (slug, anchor) = (hits[0].page_slug.clone(), hits[0].anchor_id.clone());
        assert!(nav.navigate(&slug, Some(anchor.as_str())));
        assert_eq!(nav.location(), "#/en/api-Foo/bar");
    }
}
