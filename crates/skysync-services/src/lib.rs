//! Orchestration layer: package selection, output synchronization and
//! combined catalog generation. The CLI only talks to this crate.

pub mod aggregate;
pub mod fs;
pub mod locale;
pub mod pipeline;
pub mod select;
pub mod sync;

pub use aggregate::{aggregate, write_catalogs, CatalogStore, CombinedCatalog, LocaleOutcome, PackageCatalogs};
pub use fs::{Fs, StdFs};
pub use locale::LocaleResolver;
pub use pipeline::{list_packages, run, RunOptions};
pub use select::{select, Selection};
pub use skysync_core::{Catalog, CatalogEntry, ContentPackage, EntryKey, Result, SkySyncError};
pub use sync::{apply_sync, is_package_id, plan_sync, PackageShape, SyncOp, SyncPlan};
