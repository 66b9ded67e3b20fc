//! Sidebar and language switcher models.

use std::collections::BTreeMap;

use docpack_site::{Corpus, Page, PageKind, front_page_slugs};

use crate::route::Route;

/// A page entry in the sidebar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub slug: String,
    pub label: String,
    pub active: bool,
}

/// A member entry under the active class page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavMember {
    pub anchor: String,
    pub title: String,
    pub active: bool,
}

/// A class page with its member sub-list.
///
/// `members` is empty unless the class page is the active one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavClass {
    pub item: NavItem,
    pub members: Vec<NavMember>,
}

/// Sidebar contents for one language.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigation {
    /// Front pages in fixed order, skipping absent ones.
    pub front: Vec<NavItem>,
    /// Class pages in corpus order.
    pub classes: Vec<NavClass>,
}

impl Navigation {
    /// Build the sidebar for `route.lang` with `route` highlighted.
    #[must_use]
    pub fn build(corpus: &Corpus, route: &Route) -> Self {
        let Some(pages) = corpus.pages(&route.lang) else {
            return Self::default();
        };
        let item = |page: &Page| NavItem {
            slug: page.slug.clone(),
            label: page.label.clone(),
            active: page.slug == route.slug,
        };

        let front = front_page_slugs()
            .filter_map(|slug| pages.iter().find(|page| page.slug == slug))
            .map(item)
            .collect();

        let classes = pages
            .iter()
            .filter(|page| page.kind == PageKind::Class)
            .map(|page| {
                let item = item(page);
                let members = if item.active {
                    page.members
                        .iter()
                        .map(|member| NavMember {
                            anchor: member.anchor_id.clone(),
                            title: member.title.clone(),
                            active: route.anchor.as_deref() == Some(member.anchor_id.as_str()),
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                NavClass { item, members }
            })
            .collect();

        Self { front, classes }
    }

    /// Active page entry, if any.
    #[must_use]
    pub fn active(&self) -> Option<&NavItem> {
        self.front
            .iter()
            .chain(self.classes.iter().map(|class| &class.item))
            .find(|item| item.active)
    }
}

/// A language switcher button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageButton {
    pub lang: String,
    pub label: String,
    pub active: bool,
}

/// One button per corpus language, in corpus order.
///
/// Languages without a configured label show their code uppercased.
#[must_use]
pub fn language_buttons(
    corpus: &Corpus,
    labels: &BTreeMap<String, String>,
    current: Option<&str>,
) -> Vec<LanguageButton> {
    corpus
        .languages()
        .map(|lang| LanguageButton {
            lang: lang.to_owned(),
            label: labels
                .get(lang)
                .cloned()
                .unwrap_or_else(|| lang.to_uppercase()),
            active: current == Some(lang),
        })
        .collect()
}
