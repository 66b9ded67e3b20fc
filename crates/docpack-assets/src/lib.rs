//! Client runtime assets for docpack bundles.
//!
//! The HTML shell, stylesheet and JavaScript runtime live in `assets/` and
//! are compiled into the binary via `rust-embed`, so a bundle can be built
//! from any working directory.

use std::borrow::Cow;

/// HTML shell holding the bundle placeholders.
pub const SHELL: &str = "index.html";

/// Stylesheet inlined into the shell.
pub const STYLE: &str = "style.css";

/// Client runtime inlined into the shell.
pub const APP: &str = "app.js";

#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
struct Assets;

/// Get an asset by path (relative to `assets/`).
pub fn get(path: &str) -> Option<Cow<'static, [u8]>> {
    Assets::get(path).map(|file| file.data)
}

/// Get a text asset by path. `None` if missing or not UTF-8.
pub fn get_text(path: &str) -> Option<Cow<'static, str>> {
    match get(path)? {
        Cow::Borrowed(bytes) => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
        Cow::Owned(bytes) => String::from_utf8(bytes).ok().map(Cow::Owned),
    }
}

/// Iterate all asset paths.
pub fn iter() -> impl Iterator<Item = Cow<'static, str>> {
    Assets::iter()
}
