use anyhow::{Context, Result, anyhow};
use debarrel_core::{CollectorConfig, ExportIndex, Resolver, collect_sources};
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::{fs, thread};

use crate::{
    config::Config,
    engine::RewriteEngine,
    transform::NamedExportsTransform,
    types::{FileFailure, FileRewrite, RunResult},
};

/// Rewrites the imports of every source file under the configured root.
///
/// Files are transformed in parallel against one shared resolver and export
/// index. Nothing is written until every file has been analyzed, so the
/// analysis always sees the files as they were before the run. A file that
/// fails to parse or write is reported in [`RunResult::failures`] and does
/// not stop the run.
pub fn run_rewrite(mut cfg: Config) -> Result<RunResult> {
    info!("Starting import rewrite");
    cfg.initialize()?;
    let root = cfg.root()?.clone();

    debug!("Collecting source files with glob: {:?}", cfg.entry_glob);
    let sources =
        collect_sources(&CollectorConfig { root: root.clone(), entry_glob: cfg.entry_glob.clone() })?;
    if sources.is_empty() {
        warn!("No source files found under {}", root.display());
        return Err(anyhow!("No source files found under {}", root.display()));
    }
    info!("Found {} source files", sources.len());

    let resolver = Resolver::new(cfg.resolve_options()?);
    let exports = ExportIndex::new();
    let transform =
        NamedExportsTransform::new(RewriteEngine::new(&resolver, &exports, cfg.rewrite_options()));

    info!("Processing {} source files in parallel", sources.len());
    let outcomes: Vec<Result<FileRewrite, FileFailure>> = sources
        .par_iter()
        .map(|file| {
            debug!("Thread {:?} processing: {}", thread::current().id(), file.display());
            transform.transform_file(file).map_err(|e| {
                warn!("Skipping {}: {:#}", file.display(), e);
                FileFailure { path: file.clone(), error: format!("{:#}", e) }
            })
        })
        .collect();

    let mut rewrites = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(rewrite) if rewrite.is_changed() => rewrites.push(rewrite),
            Ok(rewrite) => trace!("No rewrites in {}", rewrite.path.display()),
            Err(failure) => failures.push(failure),
        }
    }

    if cfg.write {
        info!("Writing {} rewritten files", rewrites.len());
        rewrites.retain(|rewrite| match write_rewrite(rewrite) {
            Ok(()) => true,
            Err(e) => {
                warn!("{:#}", e);
                failures.push(FileFailure { path: rewrite.path.clone(), error: format!("{:#}", e) });
                false
            }
        });
    }

    info!(
        "Import rewrite complete. {} files with rewrites, {} failures",
        rewrites.len(),
        failures.len()
    );
    debug!(
        "Cache statistics: exports={}, export parses={}, resolutions={}",
        exports.len(),
        exports.parse_count(),
        resolver.cache_len()
    );

    Ok(RunResult {
        rewrites,
        failures,
        files_analyzed: sources.len(),
        modules_indexed: exports.parse_count(),
        written: cfg.write,
    })
}

fn write_rewrite(rewrite: &FileRewrite) -> Result<()> {
    trace!("Writing {}", rewrite.path.display());
    fs::write(&rewrite.path, &rewrite.output)
        .with_context(|| format!("Failed to write {}", rewrite.path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnresolvedPolicy;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn project() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(root, "src/lib/format.js", "export const format = () => '';");
        create_test_file(root, "src/lib/parse.js", "export function parse() {}");
        create_test_file(
            root,
            "src/lib/index.js",
            "export * from './format';\nexport { parse } from './parse';",
        );
        create_test_file(root, "src/a.js", "import { format, parse } from '@lib';\n");
        create_test_file(root, "src/b.js", "import { parse } from './lib';\nexport const b = 1;\n");
        create_test_file(root, "src/c.js", "import { missing } from './lib';\n");
        create_test_file(
            root,
            "webpack.config.js",
            "const path = require('path');\nmodule.exports = { resolve: { alias: { '@lib': path.resolve(__dirname, 'src/lib') } } };",
        );
        temp_dir
    }

    #[test]
    fn test_check_mode_reports_without_writing() {
        let temp_dir = project();
        let root = temp_dir.path();

        let result = run_rewrite(Config::for_root(root)).unwrap();
        assert!(!result.written);
        assert!(result.failures.is_empty());
        assert_eq!(result.rewrites.len(), 2);
        assert_eq!(result.statements_rewritten(), 2);

        let a = result.rewrites.iter().find(|r| r.path.ends_with("src/a.js")).unwrap();
        assert_eq!(
            a.output,
            "import { format } from './lib/format';\nimport { parse } from './lib/parse';\n"
        );

        let on_disk = fs::read_to_string(root.join("src/a.js")).unwrap();
        assert_eq!(on_disk, "import { format, parse } from '@lib';\n");
    }

    #[test]
    fn test_write_mode_is_idempotent() {
        let temp_dir = project();
        let root = temp_dir.path();

        let mut cfg = Config::for_root(root);
        cfg.write = true;
        let first = run_rewrite(cfg.clone()).unwrap();
        assert!(first.written);
        assert_eq!(first.rewrites.len(), 2);
        assert_eq!(
            fs::read_to_string(root.join("src/b.js")).unwrap(),
            "import { parse } from './lib/parse';\nexport const b = 1;\n"
        );

        let second = run_rewrite(cfg).unwrap();
        assert!(second.rewrites.is_empty());
    }

    #[test]
    fn test_each_module_indexed_once() {
        let temp_dir = project();
        let result = run_rewrite(Config::for_root(temp_dir.path())).unwrap();
        // lib/index.js, lib/format.js, lib/parse.js
        assert_eq!(result.modules_indexed, 3);
        assert_eq!(result.files_analyzed, 7);
    }

    #[test]
    fn test_broken_file_does_not_stop_run() {
        let temp_dir = project();
        let root = temp_dir.path();
        create_test_file(root, "src/broken.js", "import { parse } from './lib';\nconst = ;\n");

        let result = run_rewrite(Config::for_root(root)).unwrap();
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].path.ends_with("src/broken.js"));
        assert_eq!(result.rewrites.len(), 2);
    }

    #[test]
    fn test_abort_policy() {
        let temp_dir = project();
        let root = temp_dir.path();
        create_test_file(root, "src/d.js", "import { parse, missing } from './lib';\n");

        let mut cfg = Config::for_root(root);
        let keep = run_rewrite(cfg.clone()).unwrap();
        assert!(keep.rewrites.iter().any(|r| r.path.ends_with("src/d.js")));

        cfg.on_unresolved = UnresolvedPolicy::Abort;
        let abort = run_rewrite(cfg).unwrap();
        assert!(!abort.rewrites.iter().any(|r| r.path.ends_with("src/d.js")));
    }

    #[test]
    fn test_entry_glob_restricts_files() {
        let temp_dir = project();
        let mut cfg = Config::for_root(temp_dir.path());
        cfg.entry_glob = Some("src/b.js".to_string());

        let result = run_rewrite(cfg).unwrap();
        assert_eq!(result.files_analyzed, 1);
        assert_eq!(result.rewrites.len(), 1);
    }

    #[test]
    fn test_no_sources_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(run_rewrite(Config::for_root(temp_dir.path())).is_err());
    }
}
