use crate::{ContentPackage, Result};
use color_eyre::eyre::WrapErr;
use std::collections::BTreeSet;
use std::path::Path;

/// One directory entry of the input root, as seen by the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub is_dir: bool,
    pub has_manifest: bool,
}

/// Outcome of classifying an input root. All lists are sorted by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub selected: Vec<String>,
    pub excluded: Vec<String>,
    /// Directories without a manifest.
    pub ignored: Vec<String>,
}

pub fn select_from_listing<I>(candidates: I, exclusions: &BTreeSet<String>) -> Selection
where
    I: IntoIterator<Item = Candidate>,
{
    let mut out = Selection::default();
    for c in candidates {
        if !c.is_dir {
            continue;
        }
        if exclusions.contains(&c.name) {
            out.excluded.push(c.name);
        } else if !c.has_manifest {
            out.ignored.push(c.name);
        } else {
            out.selected.push(c.name);
        }
    }
    out.selected.sort();
    out.excluded.sort();
    out.ignored.sort();
    out
}

/// Read `root` and classify its subdirectories.
pub fn scan(root: &Path, exclusions: &BTreeSet<String>, manifest: &str) -> Result<Selection> {
    let mut candidates = Vec::new();
    for entry in
        std::fs::read_dir(root).wrap_err_with(|| format!("listing {}", root.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            tracing::warn!(event = "non_utf8_entry", path = %path.display());
            continue;
        };
        let is_dir = path.is_dir();
        let has_manifest = is_dir && path.join(manifest).exists();
        candidates.push(Candidate {
            name,
            is_dir,
            has_manifest,
        });
    }
    let selection = select_from_listing(candidates, exclusions);
    for id in &selection.ignored {
        tracing::debug!(event = "package_ignored", package = %id, manifest = manifest);
    }
    Ok(selection)
}

/// Valid, non-excluded packages under `root`, ordered by identifier.
pub fn select(
    root: &Path,
    exclusions: &BTreeSet<String>,
    manifest: &str,
) -> Result<Vec<ContentPackage>> {
    let selection = scan(root, exclusions, manifest)?;
    Ok(selection
        .selected
        .into_iter()
        .map(|id| {
            let path = root.join(&id);
            ContentPackage::new(id, path)
        })
        .collect())
}
