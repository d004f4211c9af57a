//! Combined catalog generation.
//!
//! For each target locale the selected packages are visited in selector
//! order and their catalogs for the resolved source locale are appended to
//! one combined catalog. The first package to provide a given
//! `(msgid, msgctxt)` wins; later duplicates are dropped. Within a package,
//! translated entries go in before untranslated ones. A combined catalog
//! without a single translated entry is not written.

use crate::locale::LocaleResolver;
use crate::{Catalog, CatalogEntry, ContentPackage, EntryKey, Result};
use color_eyre::eyre::WrapErr;
use skysync_config::Metadata;
use std::collections::{BTreeMap, HashSet};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Build output directory sometimes present in upstream checkouts.
pub const RESERVED_PACKAGE: &str = "out";

/// Source of per-package catalogs.
pub trait CatalogStore {
    /// `Ok(None)` when the package has no catalog for `source_locale`.
    fn load(&self, package: &ContentPackage, source_locale: &str) -> Result<Option<Catalog>>;
}

/// Catalogs stored as `<package>/<catalog_dir>/<locale>.po`.
#[derive(Debug, Clone)]
pub struct PackageCatalogs {
    pub catalog_dir: String,
}

impl PackageCatalogs {
    pub fn new(catalog_dir: impl Into<String>) -> Self {
        Self {
            catalog_dir: catalog_dir.into(),
        }
    }

    pub fn path_for(&self, package: &ContentPackage, source_locale: &str) -> PathBuf {
        package
            .path
            .join(&self.catalog_dir)
            .join(format!("{source_locale}.po"))
    }
}

impl CatalogStore for PackageCatalogs {
    fn load(&self, package: &ContentPackage, source_locale: &str) -> Result<Option<Catalog>> {
        let path = self.path_for(package, source_locale);
        if !path.is_file() {
            return Ok(None);
        }
        skysync_po::read_catalog(&path).map(Some)
    }
}

impl CatalogStore for BTreeMap<(String, String), Catalog> {
    fn load(&self, package: &ContentPackage, source_locale: &str) -> Result<Option<Catalog>> {
        Ok(self
            .get(&(package.id.clone(), source_locale.to_string()))
            .cloned())
    }
}

/// A combined catalog under construction.
#[derive(Debug, Clone)]
pub struct CombinedCatalog {
    catalog: Catalog,
    seen: HashSet<EntryKey>,
    duplicates: usize,
}

impl CombinedCatalog {
    pub fn new(metadata: Vec<(String, String)>) -> Self {
        Self {
            catalog: Catalog {
                metadata,
                entries: Vec::new(),
            },
            seen: HashSet::new(),
            duplicates: 0,
        }
    }

    /// Append `entry` unless its key is already present. Returns whether it was added.
    pub fn insert(&mut self, entry: &CatalogEntry) -> bool {
        if self.seen.insert(entry.key()) {
            self.catalog.entries.push(entry.clone());
            true
        } else {
            self.duplicates += 1;
            false
        }
    }

    /// Merge one package catalog: translated entries first, then untranslated.
    /// Fuzzy and obsolete entries are left out.
    pub fn merge(&mut self, source: &Catalog) -> usize {
        let mut added = 0;
        for e in source.translated_entries().chain(source.untranslated_entries()) {
            if self.insert(e) {
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.catalog.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.entries.is_empty()
    }

    pub fn translated(&self) -> usize {
        self.catalog.translated_entries().count()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.catalog.entries
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

/// Result of aggregating one target locale.
#[derive(Debug, Clone)]
pub struct LocaleOutcome {
    pub locale: String,
    pub source_locale: String,
    /// `None` when suppressed for lack of translated entries.
    pub catalog: Option<Catalog>,
    pub entries: usize,
    pub translated: usize,
    pub duplicates: usize,
    pub missing: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn aggregate_locale(
    packages: &[ContentPackage],
    locale: &str,
    resolver: &LocaleResolver,
    metadata: &Metadata,
    store: &dyn CatalogStore,
) -> Result<LocaleOutcome> {
    let source_locale = resolver.resolve(locale).to_string();
    let mut combined = CombinedCatalog::new(metadata.header(locale));
    let mut missing = Vec::new();
    let mut warnings = Vec::new();

    for package in packages {
        if package.id == RESERVED_PACKAGE {
            tracing::debug!(event = "reserved_package_skipped", package = %package.id);
            continue;
        }
        let catalog = store.load(package, &source_locale).wrap_err_with(|| {
            format!(
                "loading catalog {source_locale} of package {}",
                package.id
            )
        })?;
        let Some(catalog) = catalog else {
            tracing::warn!(event = "catalog_missing", locale = %source_locale, package = %package.id);
            warnings.push(format!(
                "no language \"{source_locale}\" for sky culture \"{}\"",
                package.id
            ));
            missing.push(package.id.clone());
            continue;
        };
        let added = combined.merge(&catalog);
        tracing::debug!(event = "catalog_merged", locale = %locale, package = %package.id, added = added);
    }

    let entries = combined.len();
    let translated = combined.translated();
    let duplicates = combined.duplicates();
    let catalog = if translated == 0 {
        tracing::warn!(event = "locale_empty", locale = %locale, source_locale = %source_locale);
        warnings.push(format!("no strings present for language \"{source_locale}\""));
        None
    } else {
        Some(combined.into_catalog())
    };

    Ok(LocaleOutcome {
        locale: locale.to_string(),
        source_locale,
        catalog,
        entries,
        translated,
        duplicates,
        missing,
        warnings,
    })
}

/// Aggregate every target locale, in the given order.
pub fn aggregate(
    packages: &[ContentPackage],
    locales: &[String],
    resolver: &LocaleResolver,
    metadata: &Metadata,
    store: &dyn CatalogStore,
) -> Result<Vec<LocaleOutcome>> {
    locales
        .iter()
        .map(|locale| aggregate_locale(packages, locale, resolver, metadata, store))
        .collect()
}

/// Mode of written catalog files.
#[cfg(unix)]
const CATALOG_MODE: u32 = 0o644;

pub fn catalog_path(i18n_dir: &Path, locale: &str) -> PathBuf {
    i18n_dir.join(format!("{locale}.po"))
}

/// Write every non-suppressed catalog to `<i18n_dir>/<locale>.po`. Each file
/// is written to a temporary sibling first and then moved into place.
pub fn write_catalogs(outcomes: &[LocaleOutcome], i18n_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(i18n_dir)
        .wrap_err_with(|| format!("creating {}", i18n_dir.display()))?;
    let mut written = Vec::new();
    for outcome in outcomes {
        let Some(catalog) = &outcome.catalog else {
            continue;
        };
        let path = catalog_path(i18n_dir, &outcome.locale);
        let mut tmp = tempfile::NamedTempFile::new_in(i18n_dir)?;
        // temp files start out owner-only; catalogs are read by packaging steps
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(CATALOG_MODE))
                .wrap_err_with(|| format!("setting permissions for {}", path.display()))?;
        }
        skysync_po::write_catalog_to(BufWriter::new(tmp.as_file_mut()), catalog)?;
        tmp.persist(&path)
            .wrap_err_with(|| format!("writing {}", path.display()))?;
        tracing::info!(event = "catalog_written", locale = %outcome.locale, entries = outcome.entries, path = %path.display());
        written.push(path);
    }
    Ok(written)
}
