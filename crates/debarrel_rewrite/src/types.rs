use debarrel_core::ExportKind;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    Default,
    Named,
}

/// One binding of a static import statement, together with where its module resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub kind: SpecifierKind,
    pub local_name: String,
    /// `"default"` for default specifiers
    pub imported_name: String,
    /// `import { type Foo }`
    pub is_type: bool,
    /// The module request as written in the statement
    pub request: String,
    /// `None` when the request could not be resolved
    pub module_path: Option<PathBuf>,
}

/// A binding inside an `import { … }` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBinding {
    pub imported: String,
    pub local: String,
    pub is_type: bool,
}

impl NamedBinding {
    pub fn new(imported: impl Into<String>, local: impl Into<String>) -> Self {
        NamedBinding { imported: imported.into(), local: local.into(), is_type: false }
    }
}

/// The module an emitted import statement points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// The module the original statement imported from, written with its original request
    Original,
    File(PathBuf),
}

/// The module that actually defines a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrigin {
    pub file_path: PathBuf,
    pub kind: ExportKind,
    pub exported_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The import request does not resolve to a file
    ModuleNotFound,
    /// The module lives in `node_modules`
    ExternalModule,
    /// No module on the re-export chain exports the name
    ExportNotFound,
    /// The re-export chain loops back on itself
    ForwardingCycle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Origin(ResolvedOrigin),
    Unresolved(UnresolvedReason),
}

/// Outcome of rewriting one import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite<T> {
    NoChange,
    Replace(Vec<T>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRewrite {
    /// 1-based line of the replaced statement
    pub line: usize,
    pub original: String,
    pub replacements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
    pub path: PathBuf,
    /// Full file contents after applying every statement rewrite
    pub output: String,
    pub statements: Vec<StatementRewrite>,
}

impl FileRewrite {
    pub fn is_changed(&self) -> bool {
        !self.statements.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    /// Files with at least one rewritten statement, sorted by path
    pub rewrites: Vec<FileRewrite>,
    pub failures: Vec<FileFailure>,
    pub files_analyzed: usize,
    /// Modules parsed for their exports
    pub modules_indexed: usize,
    pub written: bool,
}

impl RunResult {
    pub fn statements_rewritten(&self) -> usize {
        self.rewrites.iter().map(|r| r.statements.len()).sum()
    }
}
