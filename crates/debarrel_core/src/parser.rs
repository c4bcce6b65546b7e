use anyhow::{Context, Result, bail};
use log::trace;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::{fs, path::Path};

/// Parses `src` as the module at `file` and hands the syntax tree to `visit`.
///
/// The tree only lives for the duration of the callback. Any syntax error is
/// reported as an error, partially recovered trees are never visited.
pub fn parse_source<T>(
    file: &Path,
    src: &str,
    visit: impl for<'a> FnOnce(&Program<'a>) -> T,
) -> Result<T> {
    trace!("Parsing {}", file.display());
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, src, source_type_for(file)).parse();

    if panicked || !errors.is_empty() {
        match errors.first() {
            Some(first) => bail!(
                "Failed to parse {} ({} syntax errors, first: {})",
                file.display(),
                errors.len(),
                first
            ),
            None => bail!("Failed to parse {}", file.display()),
        }
    }

    Ok(visit(&program))
}

/// Reads `file` from disk, then behaves like [`parse_source`].
pub fn parse_file<T>(file: &Path, visit: impl for<'a> FnOnce(&Program<'a>) -> T) -> Result<T> {
    let src =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    parse_source(file, &src, visit)
}

pub fn source_type_for(path: &Path) -> SourceType {
    let ext = path.extension().and_then(|e| e.to_str());

    // Plain .js files routinely carry JSX in React code bases
    let mut st = SourceType::default()
        .with_jsx(matches!(ext, Some("tsx") | Some("jsx") | Some("js") | Some("mjs") | Some("cjs")))
        .with_typescript(matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts")));

    // ESM heuristic - .mjs, .mts are ES modules
    if matches!(ext, Some("mjs") | Some("mts")) {
        st = st.with_module(true);
    }

    st
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_ast::ast::Statement;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let file_path = dir.join(name);
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_parse_source_counts_statements() {
        let count = parse_source(
            Path::new("test.js"),
            "import a from './a';\nexport const b = 1;",
            |program| program.body.len(),
        )
        .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_parse_source_syntax_error() {
        let result = parse_source(Path::new("broken.js"), "export { from;", |_| ());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("broken.js"));
    }

    #[test]
    fn test_parse_typescript_and_jsx() {
        let ts = parse_source(
            Path::new("types.ts"),
            "export interface Props { name: string }\nexport type Id = string;",
            |program| program.body.len(),
        )
        .unwrap();
        assert_eq!(ts, 2);

        let jsx = parse_source(
            Path::new("Button.js"),
            "export const Button = () => <button />;",
            |program| matches!(program.body[0], Statement::ExportNamedDeclaration(_)),
        )
        .unwrap();
        assert!(jsx);
    }

    #[test]
    fn test_parse_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(parse_file(&temp_dir.path().join("missing.js"), |_| ()).is_err());
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "mod.mjs", "export default 42;");
        let is_default = parse_file(&file, |program| {
            matches!(program.body[0], Statement::ExportDefaultDeclaration(_))
        })
        .unwrap();
        assert!(is_default);
    }

    #[test]
    fn test_source_type_for() {
        assert!(source_type_for(Path::new("a.ts")).is_typescript());
        assert!(source_type_for(Path::new("a.tsx")).is_jsx());
        assert!(source_type_for(Path::new("a.js")).is_jsx());
        assert!(!source_type_for(Path::new("a.cts")).is_jsx());
        assert!(source_type_for(Path::new("a.mjs")).is_module());
    }
}
