use std::path::{Component, Path, PathBuf};

use crate::constants::NODE_MODULES;

/// Files owned by the package manager are never analyzed or rewritten.
pub fn is_external(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == NODE_MODULES)
}

/// Create a relative path from `base` to `target`.
///
/// Returns `None` when the two paths don't share a root (e.g. different drives).
pub fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let mut target_components = target.components();
    let mut base_components = base.components();

    let mut common_prefix_len = 0;
    let mut target_parts = Vec::new();
    let mut base_parts = Vec::new();

    loop {
        match (target_components.next(), base_components.next()) {
            (Some(t), Some(b)) if t == b => {
                common_prefix_len += 1;
            }
            (Some(t), Some(b)) => {
                target_parts.push(t);
                base_parts.push(b);
                break;
            }
            (Some(t), None) => {
                target_parts.push(t);
                break;
            }
            (None, Some(b)) => {
                base_parts.push(b);
                break;
            }
            (None, None) => {
                return Some(PathBuf::from("."));
            }
        }
    }

    target_parts.extend(target_components);
    base_parts.extend(base_components);

    if common_prefix_len == 0 && target.components().next() != base.components().next() {
        return None;
    }

    let mut result = PathBuf::new();
    for _ in &base_parts {
        result.push("..");
    }
    for component in target_parts {
        match component {
            Component::Normal(p) => result.push(p),
            Component::CurDir => {}
            Component::ParentDir => result.push(".."),
            Component::RootDir | Component::Prefix(_) => {}
        }
    }

    if result.as_os_str().is_empty() { Some(PathBuf::from(".")) } else { Some(result) }
}

/// Module request that imports `target` from `from_file`: `./x`, `../x`, always `/`-separated.
pub fn import_request_for(from_file: &Path, target: &Path) -> String {
    let from_dir = from_file.parent().unwrap_or_else(|| Path::new("/"));
    let Some(relative) = make_relative(target, from_dir) else {
        return to_slash(target);
    };

    let relative = to_slash(&relative);
    if relative.starts_with("../") { relative } else { format!("./{}", relative) }
}

/// Drops the extension from a request, `./Button.tsx` -> `./Button`.
pub fn strip_extension(request: &str) -> Option<&str> {
    let (stem, ext) = request.rsplit_once('.')?;
    if ext.contains('/') || stem.is_empty() || stem.ends_with('/') || stem.ends_with('.') {
        return None;
    }
    Some(stem)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir => Some(String::new()),
            Component::CurDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_relative_sibling_and_nested() {
        assert_eq!(
            make_relative(Path::new("/repo/src/ui/Button.tsx"), Path::new("/repo/src")),
            Some(PathBuf::from("ui/Button.tsx"))
        );
        assert_eq!(
            make_relative(Path::new("/repo/lib/a.js"), Path::new("/repo/src/pages")),
            Some(PathBuf::from("../../lib/a.js"))
        );
        assert_eq!(make_relative(Path::new("/repo"), Path::new("/repo")), Some(PathBuf::from(".")));
    }

    #[test]
    fn test_make_relative_target_is_ancestor() {
        assert_eq!(
            make_relative(Path::new("/repo"), Path::new("/repo/src/ui")),
            Some(PathBuf::from("../.."))
        );
    }

    #[test]
    fn test_import_request_for() {
        let from = Path::new("/repo/src/pages/home.js");
        assert_eq!(import_request_for(from, Path::new("/repo/src/pages/hero.js")), "./hero.js");
        assert_eq!(
            import_request_for(from, Path::new("/repo/src/ui/button/index.js")),
            "../ui/button/index.js"
        );
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("./Button.tsx"), Some("./Button"));
        assert_eq!(strip_extension("../a/b.js"), Some("../a/b"));
        assert_eq!(strip_extension("./dir.v2/file"), None);
        assert_eq!(strip_extension("./.eslintrc"), None);
        assert_eq!(strip_extension("../x"), None);
    }

    #[test]
    fn test_is_external() {
        assert!(is_external(Path::new("/repo/node_modules/react/index.js")));
        assert!(!is_external(Path::new("/repo/src/node_modules_helpers.js")));
    }
}
