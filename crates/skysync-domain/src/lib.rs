use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LocaleStatus {
    /// A combined catalog was written (or would be, in a dry run).
    Written,
    /// No translated entry anywhere; nothing written.
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LocaleReport {
    pub locale: String,
    pub source_locale: String,
    pub status: LocaleStatus,
    pub path: Option<String>,
    pub entries: usize,
    pub translated: usize,
    pub duplicates: usize,
    /// Packages with no catalog for `source_locale`.
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub schema_version: u32,
    pub input_root: String,
    pub dry_run: bool,
    pub selected: Vec<String>,
    /// Output subtrees removed because their package is excluded.
    pub removed: Vec<String>,
    pub synced: Vec<String>,
    pub locales: Vec<LocaleReport>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PackageListing {
    pub schema_version: u32,
    pub selected: Vec<String>,
    pub excluded: Vec<String>,
    /// Directories without a manifest.
    pub ignored: Vec<String>,
}
