//! Markdown rendering and payload compression for docpack.
//!
//! This crate provides:
//! - [`MarkdownRenderer`]: markdown to HTML with stable heading ids and
//!   title extraction
//! - [`compress_text`] / [`decompress_text`]: raw deflate + base64 payloads
//!   that the client runtime inflates on demand
//! - [`slugify`] and [`AnchorAllocator`]: the anchor rules shared by the
//!   renderer and the member extractor
//!
//! # Example
//!
//! ```
//! use docpack_renderer::{MarkdownRenderer, compress_text, decompress_text};
//!
//! let result = MarkdownRenderer::new()
//!     .with_title_extraction()
//!     .render("# Hello\n\n**Bold** text");
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//!
//! let payload = compress_text(&result.html).unwrap();
//! assert_eq!(decompress_text(&payload).unwrap(), result.html);
//! ```

mod payload;
mod renderer;
mod util;

pub use payload::{PayloadError, compress_text, decompress_text};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use util::{AnchorAllocator, escape_html, slugify};
