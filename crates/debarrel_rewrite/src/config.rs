use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use debarrel_core::{
    Alias, BundlerConfig, DEFAULT_BUNDLER_CONFIG, ResolveOptions, find_git_root,
    load_bundler_config, read_tsconfig_paths,
};
use log::{debug, info};
use std::path::PathBuf;

use crate::engine::RewriteOptions;

/// What to do with a statement when one of its named bindings cannot be traced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UnresolvedPolicy {
    /// Leave the binding on an import from the original module and rewrite the rest
    #[default]
    Keep,
    /// Leave the whole statement untouched
    Abort,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "rewrite")]
#[command(about = "Rewrite barrel imports to import from the module that defines each binding")]
pub struct Config {
    /// Root directory of the project (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Bundler configuration to read resolve options from, relative to the root
    #[arg(long, default_value = DEFAULT_BUNDLER_CONFIG)]
    pub bundler_config: PathBuf,

    /// Entry to use when the bundler configuration exports an array
    #[arg(long, default_value = "0")]
    pub bundler_config_index: usize,

    /// Glob pattern to restrict the files that are rewritten
    #[arg(long)]
    pub entry_glob: Option<String>,

    /// Handling of named imports whose origin cannot be found
    #[arg(long, value_enum, default_value_t = UnresolvedPolicy::Keep)]
    pub on_unresolved: UnresolvedPolicy,

    /// Trace default imports through `export { default } from` chains
    #[arg(long)]
    pub follow_default_reexports: bool,

    /// Write the rewritten files instead of only reporting them
    #[arg(long)]
    pub write: bool,

    #[clap(skip)]
    pub tsconfig_aliases: Vec<Alias>,

    #[clap(skip)]
    pub bundler: Option<BundlerConfig>,
}

impl Config {
    /// Configuration for `root` with every option at its default.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Config {
            root: Some(root.into()),
            bundler_config: PathBuf::from(DEFAULT_BUNDLER_CONFIG),
            bundler_config_index: 0,
            entry_glob: None,
            on_unresolved: UnresolvedPolicy::default(),
            follow_default_reexports: false,
            write: false,
            tsconfig_aliases: Vec::new(),
            bundler: None,
        }
    }

    /// Initialize the config by resolving the root directory and loading
    /// tsconfig paths and the bundler configuration
    pub fn initialize(&mut self) -> Result<()> {
        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            r.canonicalize().unwrap_or(r)
        } else {
            debug!("No root provided, searching for git root");
            find_git_root()?
        };
        info!("Using root directory: {}", root.display());

        debug!("Reading tsconfig paths");
        self.tsconfig_aliases = read_tsconfig_paths(&root);
        debug!("Found {} tsconfig path aliases", self.tsconfig_aliases.len());

        self.root = Some(root);

        let bundler_path = self.bundler_config_path()?;
        debug!("Loading bundler config from {}", bundler_path.display());
        self.bundler = load_bundler_config(&bundler_path, self.bundler_config_index)?;
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    pub fn bundler_config_path(&self) -> Result<PathBuf> {
        if self.bundler_config.is_absolute() {
            return Ok(self.bundler_config.clone());
        }
        Ok(self.root()?.join(&self.bundler_config))
    }

    /// Resolver options: bundler settings first, tsconfig paths as lower-priority aliases.
    pub fn resolve_options(&self) -> Result<ResolveOptions> {
        let root = self.root()?;
        let mut options = ResolveOptions::new(root.clone());
        if let Some(bundler) = &self.bundler {
            let bundler_path = self.bundler_config_path()?;
            let config_dir = bundler_path.parent().unwrap_or(root.as_path());
            options = options.with_bundler_config(bundler, config_dir);
        }
        Ok(options.with_aliases(self.tsconfig_aliases.iter().cloned()))
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            on_unresolved: self.on_unresolved,
            follow_default_reexports: self.follow_default_reexports,
        }
    }
}
