//! Rust model of the docpack client runtime.
//!
//! The bundle's JavaScript drives navigation in the browser; this crate
//! implements the same behaviour so it can be tested and used to verify a
//! built site:
//!
//! - [`Route`]: `#/<lang>/<slug>[/<anchor>]` fragments;
//! - [`Navigator`]: the navigation state machine with slug fallback and
//!   self-write suppression;
//! - [`Navigation`] and [`LanguageButton`]: sidebar and switcher models;
//! - [`SearchIndex`]: bounded member search;
//! - [`PageCache`]: single-flight page decompression.
//!
//! The runtime is single-threaded, as in the browser.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//!
//! use docpack_runtime::{Navigator, RenderOutcome};
//! # fn site() -> docpack_site::Site { unimplemented!() }
//!
//! let navigator = Navigator::from_site(&site(), BTreeMap::new(), 8);
//! navigator.start("#/en/api-Foo/bar");
//! if let RenderOutcome::Rendered { html, .. } = futures::executor::block_on(navigator.render()) {
//!     println!("{html}");
//! }
//! ```

mod cache;
mod error;
mod nav;
mod navigator;
mod route;
mod search;

pub use cache::{PageCache, PagePayload};
pub use error::RuntimeError;
pub use nav::{LanguageButton, NavClass, NavItem, NavMember, Navigation, language_buttons};
pub use navigator::{FragmentChange, Navigator, RenderOutcome};
pub use route::Route;
pub use search::SearchIndex;
