use anyhow::{Context, Result};
use debarrel_core::parse_source;
use log::{debug, trace};
use oxc_ast::ast::{ImportDeclaration, Statement};
use std::{fs, path::Path};

use crate::{
    builder::SourceTextBuilder,
    engine::RewriteEngine,
    types::{FileRewrite, Rewrite, StatementRewrite},
};

/// Name the transform is registered under.
pub const PLUGIN_NAME: &str = "transform-named-exports";

struct Edit {
    start: usize,
    end: usize,
    replacements: Vec<String>,
}

/// Applies the [`RewriteEngine`] to every top-level import of a file and
/// splices the results into the file text.
pub struct NamedExportsTransform<'a> {
    engine: RewriteEngine<'a>,
}

impl<'a> NamedExportsTransform<'a> {
    pub fn new(engine: RewriteEngine<'a>) -> Self {
        NamedExportsTransform { engine }
    }

    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// Rewrites a single statement of `src`, keeping its quote style.
    pub fn visit_import_declaration(
        &self,
        decl: &ImportDeclaration<'_>,
        path: &Path,
        src: &str,
    ) -> Rewrite<String> {
        let quote = match src.as_bytes().get(decl.source.span.start as usize) {
            Some(b'"') => '"',
            _ => '\'',
        };
        self.engine.rewrite(decl, path, &mut SourceTextBuilder::with_quote(quote))
    }

    /// Reads and transforms the file at `path`.
    pub fn transform_file(&self, path: &Path) -> Result<FileRewrite> {
        let path = path.canonicalize().with_context(|| format!("Failed to read {}", path.display()))?;
        let src =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.transform_source(&path, &src)
    }

    /// Transforms `src` as the contents of the file at `path` (absolute).
    ///
    /// A file that does not parse is an error; nothing is rewritten in it.
    pub fn transform_source(&self, path: &Path, src: &str) -> Result<FileRewrite> {
        let edits = parse_source(path, src, |program| {
            program
                .body
                .iter()
                .filter_map(|stmt| match stmt {
                    Statement::ImportDeclaration(decl) => Some(decl),
                    _ => None,
                })
                .filter_map(|decl| match self.visit_import_declaration(decl, path, src) {
                    Rewrite::NoChange => None,
                    Rewrite::Replace(replacements) => Some(Edit {
                        start: decl.span.start as usize,
                        end: decl.span.end as usize,
                        replacements,
                    }),
                })
                .collect::<Vec<_>>()
        })?;

        let mut output = String::with_capacity(src.len());
        let mut statements = Vec::with_capacity(edits.len());
        let mut cursor = 0;
        let mut line = 1;

        for edit in edits {
            let before = &src[cursor..edit.start];
            line += before.matches('\n').count();
            output.push_str(before);

            let indent = indentation(src, edit.start);
            output.push_str(&edit.replacements.join(&format!("\n{}", indent)));

            let original = &src[edit.start..edit.end];
            trace!("Replacing line {} of {}: {}", line, path.display(), original);
            statements.push(StatementRewrite {
                line,
                original: original.to_string(),
                replacements: edit.replacements,
            });

            line += original.matches('\n').count();
            cursor = edit.end;
        }
        output.push_str(&src[cursor..]);

        debug!("Rewrote {} import statements in {}", statements.len(), path.display());
        Ok(FileRewrite { path: path.to_path_buf(), output, statements })
    }
}

/// Leading whitespace of the line containing `offset`, if nothing else precedes it.
fn indentation(src: &str, offset: usize) -> &str {
    let line_start = src[..offset].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &src[line_start..offset];
    if prefix.chars().all(|c| c == ' ' || c == '\t') { prefix } else { "" }
}
