use crate::fs::Fs;
use crate::{ContentPackage, Result};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// One step of bringing the output tree in line with the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOp {
    /// Drop the output subtree of an excluded package.
    Remove { id: String, target: PathBuf },
    /// Replace the output subtree of a selected package with a fresh copy.
    Replace {
        id: String,
        source: PathBuf,
        target: PathBuf,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub ops: Vec<SyncOp>,
}

impl SyncPlan {
    pub fn replaced(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            SyncOp::Replace { id, .. } => Some(id.as_str()),
            SyncOp::Remove { .. } => None,
        })
    }
}

/// How a copied package is reshaped before it lands in the output tree.
#[derive(Debug, Clone, Copy)]
pub struct PackageShape<'a> {
    pub template: &'a Path,
    pub template_target: &'a str,
    pub strip: &'a [String],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub removed: Vec<String>,
    pub synced: Vec<String>,
}

/// True when `id` names a single directory directly below the output root.
pub fn is_package_id(id: &str) -> bool {
    let mut parts = Path::new(id).components();
    matches!(
        (parts.next(), parts.next()),
        (Some(Component::Normal(name)), None) if name == id
    )
}

/// Every excluded identifier gets a `Remove`, whether or not the input root
/// still carries it; then one `Replace` per selected package, in order.
/// Exclusions that are not a plain directory name are skipped.
pub fn plan_sync(
    selected: &[ContentPackage],
    exclusions: &BTreeSet<String>,
    output_root: &Path,
) -> SyncPlan {
    let mut ops: Vec<SyncOp> = exclusions
        .iter()
        .filter(|id| {
            let ok = is_package_id(id);
            if !ok {
                tracing::warn!(event = "exclusion_skipped", exclusion = %id, "not a package directory name");
            }
            ok
        })
        .map(|id| SyncOp::Remove {
            id: id.clone(),
            target: output_root.join(id),
        })
        .collect();
    ops.extend(selected.iter().map(|p| SyncOp::Replace {
        id: p.id.clone(),
        source: p.path.clone(),
        target: output_root.join(&p.id),
    }));
    SyncPlan { ops }
}

fn staging_path(target: &Path, id: &str) -> PathBuf {
    target.with_file_name(format!(".{id}.skysync-staging"))
}

fn stage_package(
    fs: &dyn Fs,
    source: &Path,
    staging: &Path,
    shape: &PackageShape<'_>,
) -> Result<()> {
    fs.copy_tree(source, staging)?;
    fs.copy_file(shape.template, &staging.join(shape.template_target))?;
    for sub in shape.strip {
        fs.remove_tree(&staging.join(sub))?;
    }
    Ok(())
}

/// Build the new subtree next to the old one and swap it in only once it is
/// complete, so a failed copy leaves the previous output as it was.
pub fn replace_package(
    fs: &dyn Fs,
    id: &str,
    source: &Path,
    target: &Path,
    shape: &PackageShape<'_>,
) -> Result<()> {
    let staging = staging_path(target, id);
    fs.remove_tree(&staging)?;
    if let Err(e) = stage_package(fs, source, &staging, shape) {
        if let Err(cleanup) = fs.remove_tree(&staging) {
            tracing::warn!(event = "staging_cleanup_failed", package = id, error = %cleanup);
        }
        return Err(e);
    }
    fs.remove_tree(target)?;
    fs.rename(&staging, target)?;
    Ok(())
}

pub fn apply_sync(plan: &SyncPlan, fs: &dyn Fs, shape: &PackageShape<'_>) -> Result<SyncOutcome> {
    let mut outcome = SyncOutcome::default();
    for op in &plan.ops {
        match op {
            SyncOp::Remove { id, target } => {
                if fs.exists(target) {
                    fs.remove_tree(target)?;
                    tracing::info!(event = "excluded_removed", package = %id, path = %target.display());
                    outcome.removed.push(id.clone());
                }
            }
            SyncOp::Replace { id, source, target } => {
                tracing::info!(event = "package_sync", package = %id, from = %source.display());
                replace_package(fs, id, source, target, shape)?;
                outcome.synced.push(id.clone());
            }
        }
    }
    Ok(outcome)
}
