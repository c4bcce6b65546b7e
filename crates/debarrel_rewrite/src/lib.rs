//! Barrel import rewriting for JavaScript/TypeScript projects.
//!
//! Imports that go through re-exporting ("barrel") modules are rewritten to
//! import each binding from the module that defines it, following re-export
//! chains across any number of files.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use debarrel_rewrite::{Config, run_rewrite};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::for_root("/path/to/project");
//! let result = run_rewrite(cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! if result.rewrites.is_empty() {
//!     debarrel_rewrite::print_no_changes_message(&mut stdout, result.files_analyzed)?;
//! } else {
//!     debarrel_rewrite::print_rewrite_tree(&mut stdout, &result)?;
//! }
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Rewriting a single file
//!
//! ```no_run
//! use debarrel_core::{ExportIndex, ResolveOptions, Resolver};
//! use debarrel_rewrite::{NamedExportsTransform, RewriteEngine, RewriteOptions};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let resolver = Resolver::new(ResolveOptions::new("/path/to/project"));
//! let exports = ExportIndex::new();
//! let engine = RewriteEngine::new(&resolver, &exports, RewriteOptions::default());
//!
//! let rewrite = NamedExportsTransform::new(engine)
//!     .transform_file(Path::new("/path/to/project/src/app.tsx"))?;
//! println!("{}", rewrite.output);
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod engine;
mod origin;
mod reporter;
mod runner;
mod specifiers;
mod transform;
mod types;

// Re-export public API
pub use builder::{ImportBuilder, SourceTextBuilder};
pub use config::{Config, UnresolvedPolicy};
pub use engine::{RewriteEngine, RewriteOptions};
pub use origin::resolve_origin;
pub use reporter::{print_no_changes_message, print_rewrite_tree};
pub use runner::run_rewrite;
pub use specifiers::extract_import_specifiers;
pub use transform::{NamedExportsTransform, PLUGIN_NAME};
pub use types::{
    FileFailure, FileRewrite, ImportSpecifier, ImportTarget, NamedBinding, Resolution,
    ResolvedOrigin, Rewrite, RunResult, SpecifierKind, StatementRewrite, UnresolvedReason,
};
