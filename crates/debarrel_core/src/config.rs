use anyhow::{Result, anyhow};
use ignore::WalkBuilder;
use json_comments::StripComments;
use log::{debug, trace, warn};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    constants::NODE_MODULES,
    types::{Alias, AliasTarget},
};

pub fn find_git_root() -> Result<PathBuf> {
    find_git_root_from(&env::current_dir()?)
}

pub fn find_git_root_from(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root");
    trace!("Starting search from: {:?}", start);
    let mut current_dir = start;

    loop {
        let git_dir = current_dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", current_dir);
            return Ok(current_dir.to_path_buf());
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent,
            None => {
                debug!("Could not find .git directory in any parent folder");
                return Err(anyhow!("Could not find .git directory in any parent folder"));
            }
        }
    }
}

/// Collects `compilerOptions.paths` from every tsconfig.json under `root` as aliases.
///
/// `"@app/*": ["src/app/*"]` becomes a prefix alias, `"@utils": ["src/utils"]` an exact one.
pub fn read_tsconfig_paths(root: &Path) -> Vec<Alias> {
    debug!("Reading tsconfig paths from root: {:?}", root);
    let mut aliases = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .filter_entry(|e| e.file_name() != NODE_MODULES)
        .build();

    let mut tsconfig_files = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.file_name().and_then(|n| n.to_str()) == Some("tsconfig.json") {
            trace!("Found tsconfig at: {:?}", path);
            tsconfig_files.push(path.to_path_buf());
        }
    }
    // Stable alias order regardless of walk order
    tsconfig_files.sort();

    debug!("Found {} tsconfig.json files", tsconfig_files.len());

    for tsconfig_path in &tsconfig_files {
        let file = match fs::File::open(tsconfig_path) {
            Ok(file) => file,
            Err(e) => {
                trace!("Could not read tsconfig at {:?}: {}", tsconfig_path, e);
                continue;
            }
        };
        // tsconfig allows comments; strip them outside of strings before parsing
        let json: serde_json::Value = match serde_json::from_reader(StripComments::new(file)) {
            Ok(json) => json,
            Err(e) => {
                warn!("Ignoring unparsable tsconfig at {:?}: {}", tsconfig_path, e);
                continue;
            }
        };

        if let Some(compiler_options) = json.get("compilerOptions")
            && let Some(paths_obj) = compiler_options.get("paths").and_then(|p| p.as_object())
        {
            let base_url = compiler_options.get("baseUrl").and_then(|b| b.as_str()).unwrap_or(".");
            let tsconfig_dir = tsconfig_path.parent().unwrap_or(root);
            let base_path = tsconfig_dir.join(base_url);

            for (key, targets) in paths_obj {
                let Some(target_arr) = targets.as_array() else { continue };
                let targets: Vec<AliasTarget> = target_arr
                    .iter()
                    .filter_map(|t| t.as_str())
                    .map(|t| AliasTarget::Path(base_path.join(t.trim_end_matches("/*"))))
                    .collect();
                if targets.is_empty() {
                    continue;
                }

                let alias = Alias {
                    key: key.trim_end_matches("/*").to_string(),
                    exact: !key.ends_with("/*"),
                    targets,
                };
                trace!("Found tsconfig path alias: '{}' -> {:?}", alias.key, alias.targets);
                aliases.push(alias);
            }
        }
    }

    debug!("Loaded {} tsconfig path aliases", aliases.len());
    aliases
}
