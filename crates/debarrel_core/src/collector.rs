use anyhow::{Context, Result};
use ignore::{WalkBuilder, overrides::OverrideBuilder};
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::constants::{JS_TS_EXTENSIONS, NODE_MODULES};

pub struct CollectorConfig {
    pub root: PathBuf,
    /// Glob relative to `root`, e.g. `src/**/*.tsx`
    pub entry_glob: Option<String>,
}

/// Collects the JS/TS source files under `root` that should be transformed,
/// honoring `.gitignore`, skipping `node_modules` and declaration files.
pub fn collect_sources(cfg: &CollectorConfig) -> Result<Vec<PathBuf>> {
    debug!("Collecting source files");
    let root = &cfg.root;
    debug!("Walking directory tree from root: {}", root.display());

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(true)
        .git_ignore(true)
        .filter_entry(|e| e.file_name() != NODE_MODULES && e.file_name() != ".git");

    if let Some(glob) = &cfg.entry_glob {
        trace!("Restricting sources to glob '{}'", glob);
        let overrides = OverrideBuilder::new(root)
            .add(glob)
            .with_context(|| format!("Invalid entry glob '{}'", glob))?
            .build()
            .with_context(|| format!("Invalid entry glob '{}'", glob))?;
        builder.overrides(overrides);
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for res in builder.build() {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() || is_declaration_file(p) {
            continue;
        }

        if let Some(ext) = p.extension().and_then(|e| e.to_str())
            && JS_TS_EXTENSIONS.contains(&ext)
        {
            trace!("Found source file: {}", p.display());
            files.push(p.to_path_buf());
        }
    }

    // Deterministic processing and reporting order
    files.sort();
    debug!("Collected {} source files", files.len());
    Ok(files)
}

fn is_declaration_file(p: &Path) -> bool {
    p.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".d.ts") || n.ends_with(".d.mts") || n.ends_with(".d.cts"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collect_sources_filters_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/a.ts", "");
        create_test_file(root, "src/b.jsx", "");
        create_test_file(root, "src/types.d.ts", "");
        create_test_file(root, "src/styles.css", "");
        create_test_file(root, "node_modules/pkg/index.js", "");

        let cfg = CollectorConfig { root: root.to_path_buf(), entry_glob: None };
        let files = collect_sources(&cfg).unwrap();
        assert_eq!(relative(root, &files), vec!["src/a.ts", "src/b.jsx"]);
    }

    #[test]
    fn test_collect_sources_with_glob() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/pages/home.tsx", "");
        create_test_file(root, "src/pages/about.tsx", "");
        create_test_file(root, "src/util.ts", "");

        let cfg = CollectorConfig {
            root: root.to_path_buf(),
            entry_glob: Some("src/pages/**".to_string()),
        };
        let files = collect_sources(&cfg).unwrap();
        assert_eq!(relative(root, &files), vec!["src/pages/about.tsx", "src/pages/home.tsx"]);
    }

    #[test]
    fn test_collect_sources_invalid_glob() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = CollectorConfig {
            root: temp_dir.path().to_path_buf(),
            entry_glob: Some("src/[".to_string()),
        };
        assert!(collect_sources(&cfg).is_err());
    }
}
