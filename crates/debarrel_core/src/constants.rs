//! Constants for file extensions and module resolution defaults.
//!
//! This module centralizes all file extension handling to ensure consistency
//! across parsing, resolution, and collection of JavaScript/TypeScript files.
//! The resolution defaults mirror what a bundler does when its configuration
//! leaves the corresponding `resolve` option unset.
//!
//! ## Supported Extensions
//!
//! - **TypeScript**: `.ts`, `.tsx`, `.mts` (ES module), `.cts` (CommonJS)
//! - **JavaScript**: `.js`, `.jsx`, `.mjs` (ES module), `.cjs` (CommonJS)

/// File extensions for JavaScript/TypeScript files that can be transformed
pub const JS_TS_EXTENSIONS: &[&str] = &[
    "ts",  // TypeScript
    "tsx", // TypeScript with JSX
    "mts", // TypeScript module
    "cts", // TypeScript CommonJS
    "js",  // JavaScript
    "jsx", // JavaScript with JSX
    "mjs", // JavaScript module
    "cjs", // JavaScript CommonJS
];

/// Extensions to try when resolving module imports (in priority order)
pub const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// File stems tried when a request points at a directory
pub const MAIN_FILES: &[&str] = &["index"];

/// `package.json` fields consulted after `exports`, in order
pub const MAIN_FIELDS: &[&str] = &["module", "main"];

/// Directory names searched hierarchically for bare requests
pub const MODULE_DIRS: &[&str] = &["node_modules"];

/// Path component marking files owned by the package manager
pub const NODE_MODULES: &str = "node_modules";

/// Bundler configuration looked up when none is given
pub const DEFAULT_BUNDLER_CONFIG: &str = "./webpack.config.js";
