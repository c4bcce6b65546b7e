use std::path::{Path, PathBuf};

use crate::paths::is_external;

/// One module alias, from a bundler `resolve.alias` entry or a tsconfig `paths` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub key: String,
    /// Only the bare key matches, never `key/…`
    pub exact: bool,
    pub targets: Vec<AliasTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// Absolute location on disk, the request remainder is joined onto it
    Path(PathBuf),
    /// Another request, resolved again from the importing file
    Request(String),
    /// `false` in the bundler config: the module resolves to nothing
    Ignore,
}

impl Alias {
    /// Returns the part of `request` after the alias key, or `None` if the alias doesn't apply.
    pub fn strip<'r>(&self, request: &'r str) -> Option<&'r str> {
        let rest = request.strip_prefix(self.key.as_str())?;
        if rest.is_empty() {
            return Some(rest);
        }
        if self.exact {
            return None;
        }
        rest.strip_prefix('/')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    Default,
    Named,
}

impl ExportKind {
    pub fn for_name(name: &str) -> Self {
        if name == "default" { ExportKind::Default } else { ExportKind::Named }
    }
}

/// A module request as written in an export statement, plus where it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTarget {
    pub request: String,
    pub resolved: Option<PathBuf>,
}

impl ModuleTarget {
    /// The resolved file, if it is inside the local source tree.
    pub fn local(&self) -> Option<&Path> {
        self.resolved.as_deref().filter(|p| !is_external(p))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forward {
    pub target: ModuleTarget,
    /// Name of the binding inside the target module
    pub imported_name: String,
}

/// One exported binding of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDescriptor {
    pub file_path: PathBuf,
    pub kind: ExportKind,
    pub exported_name: String,
    pub forwards_to: Option<Forward>,
}

/// The export surface of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleExports {
    pub path: PathBuf,
    pub descriptors: Vec<ExportDescriptor>,
    /// `export * from '…'` targets, in source order
    pub star_exports: Vec<ModuleTarget>,
}

impl ModuleExports {
    pub fn empty(path: &Path) -> Self {
        ModuleExports { path: path.to_path_buf(), ..Default::default() }
    }

    pub fn find(&self, exported_name: &str) -> Option<&ExportDescriptor> {
        self.descriptors.iter().find(|d| d.exported_name == exported_name)
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty() && self.star_exports.is_empty()
    }
}
