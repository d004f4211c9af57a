use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workspace-wide result alias.
pub type Result<T> = color_eyre::eyre::Result<T>;

/// A candidate content package picked up from the input root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPackage {
    /// Directory name; unique within one input root.
    pub id: String,
    /// Absolute or root-relative path of the package directory.
    pub path: PathBuf,
}

impl ContentPackage {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

/// Identity of a catalog entry: message id plus optional disambiguation context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey {
    pub msgid: String,
    pub msgctxt: Option<String>,
}

/// One translation unit of a gettext catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub msgctxt: Option<String>,
    pub msgid: String,
    pub msgid_plural: Option<String>,
    pub msgstr: String,
    /// `msgstr[n]` values, indexed by plural form.
    pub msgstr_plural: Vec<String>,
    /// `# ` comments
    pub translator_comments: Vec<String>,
    /// `#.` comments
    pub extracted_comments: Vec<String>,
    /// `#:` references, one item per whitespace-separated token
    pub references: Vec<String>,
    /// `#,` flags such as `fuzzy` or `c-format`
    pub flags: Vec<String>,
    /// raw `#|` lines without the marker
    pub previous: Vec<String>,
    pub obsolete: bool,
}

impl CatalogEntry {
    pub fn new(msgid: impl Into<String>, msgstr: impl Into<String>) -> Self {
        Self {
            msgid: msgid.into(),
            msgstr: msgstr.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.msgctxt = Some(ctx.into());
        self
    }

    pub fn key(&self) -> EntryKey {
        EntryKey {
            msgid: self.msgid.clone(),
            msgctxt: self.msgctxt.clone(),
        }
    }

    pub fn is_fuzzy(&self) -> bool {
        self.flags.iter().any(|f| f == "fuzzy")
    }

    /// gettext notion of "translated": live, not fuzzy, and every form filled.
    pub fn is_translated(&self) -> bool {
        if self.obsolete || self.is_fuzzy() {
            return false;
        }
        if !self.msgstr.is_empty() {
            return true;
        }
        !self.msgstr_plural.is_empty() && self.msgstr_plural.iter().all(|s| !s.is_empty())
    }

    pub fn is_untranslated(&self) -> bool {
        !self.is_translated() && !self.obsolete && !self.is_fuzzy()
    }
}

/// A parsed catalog: header metadata in file order plus entries in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub metadata: Vec<(String, String)>,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn translated_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_translated())
    }

    pub fn untranslated_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_untranslated())
    }
}

/// Conditions that abort a run.
#[derive(Debug, Error)]
pub enum SkySyncError {
    #[error("input root {} does not exist or is not a directory", .0.display())]
    InputRootMissing(PathBuf),
    #[error("no input root given: pass --sky-culture-dir or set source_dir in skysync.toml")]
    InputRootUnset,
    #[error("{} is not a packages directory; run from the project root", .0.display())]
    WrongWorkingDir(PathBuf),
    #[error("build template {} not found", .0.display())]
    TemplateMissing(PathBuf),
    #[error("failed to copy {} to {}", .from.display(), .to.display())]
    CopyFailed { from: PathBuf, to: PathBuf },
    #[error("{path}:{line}: {message}")]
    CatalogParse {
        path: String,
        line: usize,
        message: String,
    },
}
