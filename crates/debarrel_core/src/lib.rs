//! Core utilities for debarrel.
//!
//! This crate provides the static analysis the import rewrite is built on:
//! - Parsing JS/TS files with oxc
//! - Resolving module requests the way the project's bundler does
//!   (aliases, extension inference, index fallback, tsconfig paths)
//! - Indexing the export surface of a module, including re-exports
//! - Configuration utilities (git root, tsconfig, bundler config)
//! - Collecting the source files of a project

mod bundler;
mod collector;
mod config;
mod constants;
mod exports;
mod parser;
mod paths;
mod resolver;
mod types;

// Re-export public API
pub use bundler::{BundlerConfig, ResolveSection, load_bundler_config};
pub use collector::{CollectorConfig, collect_sources};
pub use config::{find_git_root, find_git_root_from, read_tsconfig_paths};
pub use constants::{DEFAULT_BUNDLER_CONFIG, JS_TS_EXTENSIONS, RESOLVE_EXTENSIONS};
pub use exports::ExportIndex;
pub use parser::{parse_file, parse_source, source_type_for};
pub use paths::{import_request_for, is_external, make_relative, strip_extension};
pub use resolver::{ResolveOptions, Resolver};
pub use types::{
    Alias, AliasTarget, ExportDescriptor, ExportKind, Forward, ModuleExports, ModuleTarget,
};
