//! Single-file bundle assembly for docpack.
//!
//! A bundle is one HTML document: the shell from `docpack-assets` with the
//! stylesheet, the serialized corpus, language labels, search index, start
//! language and the client runtime spliced into its slots.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use docpack_bundle::{BundleAssembler, BundleOptions};
//! # fn site() -> docpack_site::Site { unimplemented!() }
//!
//! let assembler = BundleAssembler::new(BundleOptions::default())?;
//! assembler.write(&site(), Path::new("html/index.html"))?;
//! # Ok::<(), docpack_bundle::BundleError>(())
//! ```

mod assembler;
mod template;

pub use assembler::{BundleAssembler, BundleError, BundleOptions, script_literal};
pub use template::{BuildContext, Slot, Template, TemplateError};
