//! Decides, per import statement, which module each binding should be imported from.

use debarrel_core::{
    ExportIndex, ExportKind, Resolver, import_request_for, is_external, strip_extension,
};
use log::{debug, trace};
use oxc_ast::ast::ImportDeclaration;
use std::path::Path;

use crate::{
    builder::ImportBuilder,
    config::UnresolvedPolicy,
    origin::resolve_origin,
    specifiers::{extract_import_specifiers, has_namespace_specifier},
    types::{
        ImportSpecifier, ImportTarget, NamedBinding, Resolution, ResolvedOrigin, Rewrite,
        SpecifierKind, UnresolvedReason,
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    pub on_unresolved: UnresolvedPolicy,
    /// Walk default imports through re-export chains like named ones
    pub follow_default_reexports: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Default(String),
    Named(NamedBinding),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    Default(String),
    Named(Vec<NamedBinding>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedImport {
    target: ImportTarget,
    clause: Clause,
}

/// Rewrites import statements so each binding is imported from the module defining it.
///
/// The engine is `Sync` and meant to be shared by every file of a run: the
/// resolver and export index it borrows memoize across files.
pub struct RewriteEngine<'a> {
    resolver: &'a Resolver,
    exports: &'a ExportIndex,
    options: RewriteOptions,
}

impl<'a> RewriteEngine<'a> {
    pub fn new(resolver: &'a Resolver, exports: &'a ExportIndex, options: RewriteOptions) -> Self {
        RewriteEngine { resolver, exports, options }
    }

    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    /// Rewrites `decl`, found in the file at `source_path` (absolute).
    pub fn rewrite<B: ImportBuilder>(
        &self,
        decl: &ImportDeclaration<'_>,
        source_path: &Path,
        builder: &mut B,
    ) -> Rewrite<B::Output> {
        if let Some(reason) = skip_reason(decl) {
            trace!("Keeping {} of '{}' in {}", reason, decl.source.value, source_path.display());
            return Rewrite::NoChange;
        }

        let specifiers =
            extract_import_specifiers(decl, |request| self.resolver.resolve(source_path, request));
        self.rewrite_specifiers(&specifiers, source_path, builder)
    }

    /// Same as [`RewriteEngine::rewrite`] for specifiers that were already extracted.
    pub fn rewrite_specifiers<B: ImportBuilder>(
        &self,
        specifiers: &[ImportSpecifier],
        source_path: &Path,
        builder: &mut B,
    ) -> Rewrite<B::Output> {
        let Some(first) = specifiers.first() else {
            return Rewrite::NoChange;
        };
        let Some(plan) = self.plan(specifiers) else {
            return Rewrite::NoChange;
        };

        debug!(
            "Rewriting import of '{}' in {} into {} statements",
            first.request,
            source_path.display(),
            plan.len()
        );

        let statements = plan
            .into_iter()
            .map(|import| {
                let source = match &import.target {
                    ImportTarget::Original => first.request.clone(),
                    ImportTarget::File(file) => self.request_for(source_path, file),
                };
                match &import.clause {
                    Clause::Default(local) => builder.default_import(local, &source),
                    Clause::Named(bindings) => builder.named_import(bindings, &source),
                }
            })
            .collect();
        Rewrite::Replace(statements)
    }

    /// Groups the specifiers into the statements to emit, or `None` when the
    /// statement should stay as written.
    fn plan(&self, specifiers: &[ImportSpecifier]) -> Option<Vec<PlannedImport>> {
        if let [only] = specifiers
            && only.kind == SpecifierKind::Default
            && !self.options.follow_default_reexports
        {
            trace!("Keeping bare default import of '{}'", only.request);
            return None;
        }

        let mut defaults: Vec<PlannedImport> = Vec::new();
        let mut named: Vec<(ImportTarget, Vec<NamedBinding>)> = Vec::new();

        for spec in specifiers {
            let (target, binding) = if spec.kind == SpecifierKind::Default
                && !self.options.follow_default_reexports
            {
                (ImportTarget::Original, Binding::Default(spec.local_name.clone()))
            } else {
                match self.locate(spec) {
                    Resolution::Origin(origin) => place(spec, origin),
                    Resolution::Unresolved(reason) => {
                        log_unresolved(spec, reason);
                        match self.options.on_unresolved {
                            UnresolvedPolicy::Keep => keep(spec),
                            UnresolvedPolicy::Abort => return None,
                        }
                    }
                }
            };

            match binding {
                Binding::Default(local) => {
                    defaults.push(PlannedImport { target, clause: Clause::Default(local) })
                }
                Binding::Named(binding) => {
                    match named.iter_mut().find(|(existing, _)| *existing == target) {
                        Some((_, bindings)) => bindings.push(binding),
                        None => named.push((target, vec![binding])),
                    }
                }
            }
        }

        let unchanged = defaults.iter().all(|d| d.target == ImportTarget::Original)
            && named.iter().all(|(target, _)| *target == ImportTarget::Original);
        if unchanged {
            trace!("Every binding of '{}' is already imported from its origin", specifiers[0].request);
            return None;
        }

        defaults.extend(named.into_iter().map(|(target, bindings)| PlannedImport {
            target,
            clause: Clause::Named(bindings),
        }));
        Some(defaults)
    }

    fn locate(&self, spec: &ImportSpecifier) -> Resolution {
        let Some(module) = spec.module_path.as_deref() else {
            return Resolution::Unresolved(UnresolvedReason::ModuleNotFound);
        };
        if is_external(module) {
            return Resolution::Unresolved(UnresolvedReason::ExternalModule);
        }
        resolve_origin(self.exports, self.resolver, module, &spec.imported_name)
    }

    /// Relative request for `target`, as short as still resolves to it.
    fn request_for(&self, from_file: &Path, target: &Path) -> String {
        let request = import_request_for(from_file, target);
        let Some(stem) = strip_extension(&request) else {
            return request;
        };

        if let Some(dir) = stem.strip_suffix("/index")
            && dir.contains('/')
            && self.resolves_to(from_file, dir, target)
        {
            return dir.to_string();
        }
        if self.resolves_to(from_file, stem, target) {
            return stem.to_string();
        }
        request
    }

    fn resolves_to(&self, from_file: &Path, request: &str, target: &Path) -> bool {
        self.resolver.resolve(from_file, request).as_deref() == Some(target)
    }
}

fn skip_reason(decl: &ImportDeclaration<'_>) -> Option<&'static str> {
    if decl.import_kind.is_type() {
        return Some("type-only import");
    }
    if decl.phase.is_some() {
        return Some("phased import");
    }
    if decl.specifiers.as_ref().is_none_or(|specs| specs.is_empty()) {
        return Some("side-effect import");
    }
    if has_namespace_specifier(decl) {
        return Some("namespace import");
    }
    None
}

fn place(spec: &ImportSpecifier, origin: ResolvedOrigin) -> (ImportTarget, Binding) {
    let target = if spec.module_path.as_deref() == Some(origin.file_path.as_path()) {
        ImportTarget::Original
    } else {
        ImportTarget::File(origin.file_path)
    };

    let binding = if origin.kind == ExportKind::Default && !spec.is_type {
        Binding::Default(spec.local_name.clone())
    } else {
        Binding::Named(NamedBinding {
            imported: origin.exported_name,
            local: spec.local_name.clone(),
            is_type: spec.is_type,
        })
    };
    (target, binding)
}

fn keep(spec: &ImportSpecifier) -> (ImportTarget, Binding) {
    let binding = match spec.kind {
        SpecifierKind::Default => Binding::Default(spec.local_name.clone()),
        SpecifierKind::Named => Binding::Named(NamedBinding {
            imported: spec.imported_name.clone(),
            local: spec.local_name.clone(),
            is_type: spec.is_type,
        }),
    };
    (ImportTarget::Original, binding)
}

fn log_unresolved(spec: &ImportSpecifier, reason: UnresolvedReason) {
    match reason {
        UnresolvedReason::ModuleNotFound | UnresolvedReason::ExternalModule => {
            trace!("'{}' from '{}' is not traced: {:?}", spec.imported_name, spec.request, reason)
        }
        UnresolvedReason::ExportNotFound | UnresolvedReason::ForwardingCycle => {
            debug!("'{}' from '{}' is not traced: {:?}", spec.imported_name, spec.request, reason)
        }
    }
}
