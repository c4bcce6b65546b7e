use oxc_ast::ast::{ImportDeclaration, ImportDeclarationSpecifier};
use std::path::PathBuf;

use crate::types::{ImportSpecifier, SpecifierKind};

/// Lists the default and named bindings of `decl` in source order.
///
/// `resolve` maps the statement's module request to a file; its result is
/// shared by every returned specifier. Namespace bindings are not listed.
pub fn extract_import_specifiers(
    decl: &ImportDeclaration<'_>,
    resolve: impl FnOnce(&str) -> Option<PathBuf>,
) -> Vec<ImportSpecifier> {
    let Some(specifiers) = &decl.specifiers else {
        return Vec::new();
    };

    let request = decl.source.value.to_string();
    let module_path = resolve(&request);

    specifiers
        .iter()
        .filter_map(|spec| match spec {
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => Some(ImportSpecifier {
                kind: SpecifierKind::Default,
                local_name: s.local.name.to_string(),
                imported_name: "default".to_string(),
                is_type: false,
                request: request.clone(),
                module_path: module_path.clone(),
            }),
            ImportDeclarationSpecifier::ImportSpecifier(s) => Some(ImportSpecifier {
                kind: SpecifierKind::Named,
                local_name: s.local.name.to_string(),
                imported_name: s.imported.name().to_string(),
                is_type: s.import_kind.is_type(),
                request: request.clone(),
                module_path: module_path.clone(),
            }),
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => None,
        })
        .collect()
}

/// Whether `decl` binds a namespace object (`import * as ns`).
pub fn has_namespace_specifier(decl: &ImportDeclaration<'_>) -> bool {
    decl.specifiers.as_ref().is_some_and(|specs| {
        specs.iter().any(|s| matches!(s, ImportDeclarationSpecifier::ImportNamespaceSpecifier(_)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use debarrel_core::parse_source;
    use oxc_ast::ast::Statement;
    use std::path::Path;

    fn extract(src: &str) -> Vec<ImportSpecifier> {
        parse_source(Path::new("/repo/src/app.tsx"), src, |program| {
            program
                .body
                .iter()
                .filter_map(|stmt| match stmt {
                    Statement::ImportDeclaration(decl) => Some(decl),
                    _ => None,
                })
                .flat_map(|decl| {
                    extract_import_specifiers(decl, |request| {
                        request.starts_with('.').then(|| PathBuf::from("/repo/src/resolved.ts"))
                    })
                })
                .collect()
        })
        .unwrap()
    }

    #[test]
    fn test_default_and_named_in_source_order() {
        let specs = extract("import Foo, { a, b as c } from './mod';");
        assert_eq!(specs.len(), 3);

        assert_eq!(specs[0].kind, SpecifierKind::Default);
        assert_eq!(specs[0].local_name, "Foo");
        assert_eq!(specs[0].imported_name, "default");

        assert_eq!(specs[1].kind, SpecifierKind::Named);
        assert_eq!((specs[1].imported_name.as_str(), specs[1].local_name.as_str()), ("a", "a"));
        assert_eq!((specs[2].imported_name.as_str(), specs[2].local_name.as_str()), ("b", "c"));

        assert!(specs.iter().all(|s| s.request == "./mod"));
        assert!(specs.iter().all(|s| s.module_path == Some(PathBuf::from("/repo/src/resolved.ts"))));
    }

    #[test]
    fn test_single_default() {
        let specs = extract("import Foo from './mod';");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].kind, SpecifierKind::Default);
    }

    #[test]
    fn test_unresolved_module() {
        let specs = extract("import { useState } from 'react';");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].module_path, None);
    }

    #[test]
    fn test_inline_type_and_string_names() {
        let specs = extract(r#"import { type Props, "my-name" as myName } from './mod';"#);
        assert!(specs[0].is_type);
        assert!(!specs[1].is_type);
        assert_eq!(specs[1].imported_name, "my-name");
        assert_eq!(specs[1].local_name, "myName");
    }

    #[test]
    fn test_namespace_and_side_effect() {
        assert!(extract("import * as all from './mod';").is_empty());
        assert!(extract("import './styles.css';").is_empty());

        let specs = extract("import Foo, * as all from './mod';");
        assert_eq!(specs.len(), 1);
    }
}
