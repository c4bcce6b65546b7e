//! Follows re-export chains to the module that defines a binding.

use debarrel_core::{ExportIndex, ExportKind, Resolver};
use log::trace;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use crate::types::{Resolution, ResolvedOrigin, UnresolvedReason};

/// Finds where `name`, as exported by `module`, is defined.
///
/// Explicit exports are preferred over `export *` fall-through, which is
/// tried in source order and never for `default`. A forward that leaves the
/// source tree (a package, or a request that does not resolve) ends the walk
/// at the module doing the forwarding. Every `(module, name)` pair is searched
/// at most once, and only a pair reached again through its own chain counts
/// as a cycle.
pub fn resolve_origin(
    exports: &ExportIndex,
    resolver: &Resolver,
    module: &Path,
    name: &str,
) -> Resolution {
    // Each entry carries its depth so `chain` can be cut back to its ancestors
    let mut stack: Vec<(PathBuf, String, usize)> =
        vec![(module.to_path_buf(), name.to_string(), 0)];
    let mut chain: Vec<(PathBuf, String)> = Vec::new();
    let mut visited: HashSet<(PathBuf, String)> = HashSet::new();
    let mut cycle = false;
    let mut opaque: Option<ResolvedOrigin> = None;

    while let Some((file, name, depth)) = stack.pop() {
        chain.truncate(depth);
        let key = (file.clone(), name.clone());
        if chain.contains(&key) {
            trace!("Re-export cycle at '{}' in {}", name, file.display());
            cycle = true;
            continue;
        }
        if !visited.insert(key.clone()) {
            trace!("Already searched '{}' in {}", name, file.display());
            continue;
        }
        chain.push(key);

        let module_exports = exports.exports_of(&file, resolver);

        if let Some(descriptor) = module_exports.find(&name) {
            let Some(forward) = &descriptor.forwards_to else {
                trace!("'{}' is defined in {}", name, file.display());
                return Resolution::Origin(ResolvedOrigin {
                    file_path: file,
                    kind: descriptor.kind,
                    exported_name: name,
                });
            };

            match forward.target.local() {
                Some(target) => {
                    trace!(
                        "'{}' in {} forwards to '{}' in {}",
                        name,
                        file.display(),
                        forward.imported_name,
                        target.display()
                    );
                    stack.push((target.to_path_buf(), forward.imported_name.clone(), depth + 1));
                }
                None => {
                    trace!(
                        "'{}' in {} forwards to '{}', which cannot be followed",
                        name,
                        file.display(),
                        forward.target.request
                    );
                    return Resolution::Origin(ResolvedOrigin {
                        file_path: file,
                        kind: descriptor.kind,
                        exported_name: name,
                    });
                }
            }
            continue;
        }

        if name == "default" {
            continue;
        }

        // Reversed so the first `export *` is searched first
        for star in module_exports.star_exports.iter().rev() {
            match star.local() {
                Some(target) => stack.push((target.to_path_buf(), name.clone(), depth + 1)),
                None => {
                    trace!(
                        "Wildcard re-export of '{}' in {} cannot be followed",
                        star.request,
                        file.display()
                    );
                    opaque.get_or_insert_with(|| ResolvedOrigin {
                        file_path: file.clone(),
                        kind: ExportKind::Named,
                        exported_name: name.clone(),
                    });
                }
            }
        }
    }

    if let Some(origin) = opaque {
        return Resolution::Origin(origin);
    }
    let reason =
        if cycle { UnresolvedReason::ForwardingCycle } else { UnresolvedReason::ExportNotFound };
    trace!("No origin for '{}' from {}: {:?}", name, module.display(), reason);
    Resolution::Unresolved(reason)
}
