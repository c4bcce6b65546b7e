//! Export surface extraction.
//!
//! [`ExportIndex`] parses a module once per run and records, for every binding
//! it exports, whether the binding is defined there or forwarded from another
//! module. Lookups never fail: a file that cannot be read or parsed simply
//! exports nothing.

use dashmap::DashMap;
use log::{debug, trace, warn};
use oxc_ast::ast::*;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    parser::parse_file,
    resolver::Resolver,
    types::{ExportDescriptor, ExportKind, Forward, ModuleExports, ModuleTarget},
};

type ExportCell = Arc<OnceLock<Arc<ModuleExports>>>;

/// Per-run cache of module export surfaces, keyed by resolved absolute path.
///
/// Each path is parsed at most once, also when the index is shared between
/// threads: the map only hands out a per-path cell, and the parse runs inside
/// that cell's initializer without holding the map lock.
#[derive(Debug, Default)]
pub struct ExportIndex {
    cache: DashMap<PathBuf, ExportCell>,
    parses: AtomicUsize,
}

impl ExportIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exports_of(&self, file: &Path, resolver: &Resolver) -> Arc<ModuleExports> {
        let cell: ExportCell = Arc::clone(&*self.cache.entry(file.to_path_buf()).or_default());
        if let Some(exports) = cell.get() {
            trace!("Cache hit for exports: {}", file.display());
            return Arc::clone(exports);
        }

        let exports = cell.get_or_init(|| {
            self.parses.fetch_add(1, Ordering::Relaxed);
            Arc::new(build_exports(file, resolver))
        });
        Arc::clone(exports)
    }

    /// Number of files parsed so far.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

fn build_exports(file: &Path, resolver: &Resolver) -> ModuleExports {
    trace!("Parsing file for exports: {}", file.display());
    match parse_file(file, |program| collect_exports(file, program, resolver)) {
        Ok(exports) => {
            debug!(
                "Found {} exports and {} wildcard re-exports in {}",
                exports.descriptors.len(),
                exports.star_exports.len(),
                file.display()
            );
            exports
        }
        Err(e) => {
            warn!("Treating {} as exporting nothing: {:#}", file.display(), e);
            ModuleExports::empty(file)
        }
    }
}

/// A top-level import binding that an `export { … }` clause may re-publish.
struct ImportedBinding {
    request: String,
    /// `None` for namespace imports
    imported_name: Option<String>,
}

fn collect_exports(file: &Path, program: &Program<'_>, resolver: &Resolver) -> ModuleExports {
    let mut exports = ModuleExports::empty(file);
    let imported = imported_bindings(program);
    let target_for = |request: &str| ModuleTarget {
        request: request.to_string(),
        resolved: resolver.resolve(file, request),
    };

    for stmt in &program.body {
        match stmt {
            Statement::ExportDefaultDeclaration(_) => {
                trace!("Found default export in {}", file.display());
                exports.push_local(ExportKind::Default, "default");
            }
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(declaration) = &decl.declaration {
                    for name in declared_names(declaration) {
                        exports.push_local(ExportKind::Named, &name);
                    }
                }

                for spec in &decl.specifiers {
                    let local = spec.local.name().to_string();
                    let exported = spec.exported.name().to_string();

                    let forward = match &decl.source {
                        // export { a as b } from './mod'
                        Some(source) => Some(Forward {
                            target: target_for(source.value.as_str()),
                            imported_name: local,
                        }),
                        // import { a } from './mod'; export { a as b }
                        None => match imported.get(&local) {
                            Some(ImportedBinding { request, imported_name: Some(name) }) => {
                                Some(Forward {
                                    target: target_for(request.as_str()),
                                    imported_name: name.clone(),
                                })
                            }
                            _ => None,
                        },
                    };

                    trace!("Found export '{}' in {} (forwards: {:?})", exported, file.display(), forward);
                    exports.descriptors.push(ExportDescriptor {
                        file_path: file.to_path_buf(),
                        kind: ExportKind::for_name(&exported),
                        exported_name: exported,
                        forwards_to: forward,
                    });
                }
            }
            Statement::ExportAllDeclaration(decl) => match &decl.exported {
                // export * as ns from './mod' defines a new namespace binding here
                Some(name) => exports.push_local(ExportKind::Named, name.name().as_str()),
                None => {
                    trace!("Found wildcard re-export of '{}' in {}", decl.source.value, file.display());
                    exports.star_exports.push(target_for(decl.source.value.as_str()));
                }
            },
            _ => {}
        }
    }

    exports
}

impl ModuleExports {
    fn push_local(&mut self, kind: ExportKind, name: &str) {
        self.descriptors.push(ExportDescriptor {
            file_path: self.path.clone(),
            kind,
            exported_name: name.to_string(),
            forwards_to: None,
        });
    }
}

fn imported_bindings(program: &Program<'_>) -> HashMap<String, ImportedBinding> {
    let mut bindings = HashMap::new();
    for stmt in &program.body {
        let Statement::ImportDeclaration(decl) = stmt else { continue };
        let Some(specifiers) = &decl.specifiers else { continue };
        let request = decl.source.value.to_string();

        for spec in specifiers {
            let (local, imported_name) = match spec {
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    (s.local.name.to_string(), Some(s.imported.name().to_string()))
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    (s.local.name.to_string(), Some("default".to_string()))
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    (s.local.name.to_string(), None)
                }
            };
            bindings.insert(local, ImportedBinding { request: request.clone(), imported_name });
        }
    }
    bindings
}

fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(vd) => vd
            .declarations
            .iter()
            .flat_map(|d| d.id.get_binding_identifiers())
            .map(|ident| ident.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(f) => {
            f.id.iter().map(|ident| ident.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(c) => {
            c.id.iter().map(|ident| ident.name.to_string()).collect()
        }
        Declaration::TSTypeAliasDeclaration(t) => vec![t.id.name.to_string()],
        Declaration::TSInterfaceDeclaration(i) => vec![i.id.name.to_string()],
        Declaration::TSEnumDeclaration(e) => vec![e.id.name.to_string()],
        // `export namespace Utils {}`; ambient `declare module 'x'` binds nothing
        Declaration::TSModuleDeclaration(m) => match &m.id {
            TSModuleDeclarationName::Identifier(ident) => vec![ident.name.to_string()],
            TSModuleDeclarationName::StringLiteral(_) => Vec::new(),
        },
        // `export import Alias = Other.Name`
        Declaration::TSImportEqualsDeclaration(i) => vec![i.id.name.to_string()],
        _ => Vec::new(),
    }
}
