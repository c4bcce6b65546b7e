use dashmap::DashMap;
use log::{debug, trace};
use path_clean::clean;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    bundler::BundlerConfig,
    constants::{MAIN_FIELDS, MAIN_FILES, MODULE_DIRS, RESOLVE_EXTENSIONS},
    types::{Alias, AliasTarget},
};

/// Bounds alias-to-alias rewriting
const MAX_ALIAS_HOPS: usize = 8;

/// Module resolution rules, defaulting to what a bundler does without configuration.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub root: PathBuf,
    /// Sorted longest key first
    pub aliases: Vec<Alias>,
    /// Without leading dots, in priority order
    pub extensions: Vec<String>,
    pub main_files: Vec<String>,
    pub main_fields: Vec<String>,
    pub modules: Vec<String>,
}

impl ResolveOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ResolveOptions {
            root: root.into(),
            aliases: Vec::new(),
            extensions: owned(RESOLVE_EXTENSIONS),
            main_files: owned(MAIN_FILES),
            main_fields: owned(MAIN_FIELDS),
            modules: owned(MODULE_DIRS),
        }
    }

    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = Alias>) -> Self {
        self.aliases.extend(aliases);
        // Stable, so earlier sources win between equal keys
        self.aliases.sort_by(|a, b| b.key.len().cmp(&a.key.len()));
        self
    }

    /// Applies the `resolve` section of a bundler config; unset options keep their defaults.
    pub fn with_bundler_config(mut self, config: &BundlerConfig, config_dir: &Path) -> Self {
        let resolve = &config.resolve;
        if let Some(extensions) = &resolve.extensions {
            self.extensions = extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }
        if let Some(modules) = &resolve.modules {
            self.modules = modules.clone();
        }
        if let Some(fields) = &resolve.main_fields {
            self.main_fields = fields.clone();
        }
        if let Some(files) = &resolve.main_files {
            self.main_files = files.clone();
        }
        self.with_aliases(config.aliases(config_dir))
    }
}

/// Maps module requests to files on disk. Results are memoized per
/// `(from_file, request)` and the resolver can be shared across threads.
#[derive(Debug)]
pub struct Resolver {
    options: ResolveOptions,
    cache: DashMap<(PathBuf, String), Option<PathBuf>>,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Resolver { options, cache: DashMap::new() }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Resolves `request` as imported from `from_file`. `None` is the normal
    /// outcome for anything that isn't on disk (virtual modules, ignored aliases, typos).
    pub fn resolve(&self, from_file: &Path, request: &str) -> Option<PathBuf> {
        let key = (from_file.to_path_buf(), request.to_string());
        if let Some(v) = self.cache.get(&key) {
            trace!("Cache hit for resolve: '{}' from {}", request, from_file.display());
            return v.clone();
        }
        trace!("Resolving: '{}' from {}", request, from_file.display());

        let resolved = self.resolve_request(from_file, request, 0);
        if let Some(path) = &resolved {
            debug!("Resolved '{}' from {} to {}", request, from_file.display(), path.display());
        } else {
            debug!("Could not resolve '{}' from {}", request, from_file.display());
        }

        self.cache.insert(key, resolved.clone());
        resolved
    }

    fn resolve_request(&self, from_file: &Path, request: &str, hops: usize) -> Option<PathBuf> {
        if let Some(alias) = self.options.aliases.iter().find(|a| a.strip(request).is_some()) {
            if hops >= MAX_ALIAS_HOPS {
                debug!("Alias chain too long while resolving '{}'", request);
                return None;
            }
            let remainder = alias.strip(request).unwrap_or_default();
            trace!("Matched alias '{}' for request '{}'", alias.key, request);
            return alias
                .targets
                .iter()
                .find_map(|target| self.resolve_alias_target(from_file, target, remainder, hops));
        }

        let base = from_file.parent().unwrap_or(self.options.root.as_path());
        if request.starts_with("./")
            || request.starts_with("../")
            || request == "."
            || request == ".."
            || Path::new(request).is_absolute()
        {
            trace!("Resolving as relative import: '{}'", request);
            return self.resolve_path(&clean(base.join(request)));
        }

        trace!("Resolving as module: '{}'", request);
        self.resolve_in_module_dirs(base, request)
    }

    fn resolve_alias_target(
        &self,
        from_file: &Path,
        target: &AliasTarget,
        remainder: &str,
        hops: usize,
    ) -> Option<PathBuf> {
        match target {
            AliasTarget::Ignore => None,
            AliasTarget::Path(dir) => {
                let candidate = if remainder.is_empty() { dir.clone() } else { dir.join(remainder) };
                self.resolve_path(&clean(candidate))
            }
            AliasTarget::Request(to) => {
                let next =
                    if remainder.is_empty() { to.clone() } else { format!("{}/{}", to, remainder) };
                self.resolve_request(from_file, &next, hops + 1)
            }
        }
    }

    /// Exact file, then with each extension, then the directory's main files.
    fn resolve_path(&self, p: &Path) -> Option<PathBuf> {
        if p.is_file() {
            return Some(canonical(p.to_path_buf()));
        }

        for ext in &self.options.extensions {
            let candidate = PathBuf::from(format!("{}.{}", p.display(), ext));
            if candidate.is_file() {
                return Some(canonical(candidate));
            }
        }

        if p.is_dir() {
            for main_file in &self.options.main_files {
                for ext in &self.options.extensions {
                    let candidate = p.join(format!("{}.{}", main_file, ext));
                    if candidate.is_file() {
                        return Some(canonical(candidate));
                    }
                }
            }
        }

        None
    }

    fn resolve_in_module_dirs(&self, start_dir: &Path, request: &str) -> Option<PathBuf> {
        for module_dir in &self.options.modules {
            let module_dir = Path::new(module_dir);
            let result = if module_dir.is_absolute() {
                self.resolve_in_dir(module_dir, request)
            } else {
                self.resolve_walking_up(start_dir, module_dir, request)
            };
            if result.is_some() {
                return result;
            }
        }
        None
    }

    fn resolve_walking_up(&self, start_dir: &Path, dir_name: &Path, request: &str) -> Option<PathBuf> {
        trace!("Walking up from {:?} to find {:?} for '{}'", start_dir, dir_name, request);
        let mut current_dir = start_dir;

        loop {
            let result = self.resolve_in_dir(&current_dir.join(dir_name), request);
            if result.is_some() {
                return result;
            }

            // Stop at workspace root
            if current_dir == self.options.root {
                break;
            }

            current_dir = current_dir.parent()?;
        }

        None
    }

    fn resolve_in_dir(&self, dir: &Path, request: &str) -> Option<PathBuf> {
        let candidate = dir.join(request);
        if candidate.join("package.json").is_file()
            && let Some(entry) = self.resolve_package(&candidate)
        {
            return Some(entry);
        }
        self.resolve_path(&candidate)
    }

    fn resolve_package(&self, pkg_dir: &Path) -> Option<PathBuf> {
        trace!("Checking package at: {:?}", pkg_dir);
        let txt = fs::read_to_string(pkg_dir.join("package.json")).ok()?;
        let v = serde_json::from_str::<serde_json::Value>(&txt).ok()?;

        // Try exports field first (modern packages)
        if let Some(exports) = v.get("exports") {
            let dot_export = exports.as_object().and_then(|obj| obj.get(".")).unwrap_or(exports);
            if let Some(s) = dot_export.as_str()
                && let Some(resolved) = self.resolve_path(&pkg_dir.join(s.trim_start_matches("./")))
            {
                return Some(resolved);
            }
            // Conditional exports like { ".": { "import": "./dist/index.js" } }
            if let Some(conditions) = dot_export.as_object() {
                for key in ["import", "require", "default"] {
                    if let Some(s) = conditions.get(key).and_then(|x| x.as_str())
                        && let Some(resolved) =
                            self.resolve_path(&pkg_dir.join(s.trim_start_matches("./")))
                    {
                        return Some(resolved);
                    }
                }
            }
        }

        for field in &self.options.main_fields {
            if let Some(s) = v.get(field).and_then(|x| x.as_str())
                && let Some(resolved) = self.resolve_path(&pkg_dir.join(s))
            {
                return Some(resolved);
            }
        }

        None
    }
}

fn canonical(p: PathBuf) -> PathBuf {
    p.canonicalize().unwrap_or(p)
}
