use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "skysync.toml";

/// Packages left out on purpose: poor quality, unclear image licensing,
/// or redundant with another Arabic sky culture.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "northern_andes",
    "aztec",
    "boorong",
    "dakota",
    "macedonian",
    "ojibwe",
    "lokono",
    "arabic_arabian_peninsula",
];

pub const DEFAULT_LOCALES: &[&str] = &[
    "aa", "ae", "af", "am", "ar", "ast", "av", "az", "be", "bg", "bh", "bi", "bn", "br", "bs",
    "ca", "ce", "cs", "csb", "cv", "da", "de", "el", "en", "en_AU", "en_CA", "en_GB", "en_US",
    "eo", "es", "et", "eu", "fa", "fi", "fil", "fj", "fr", "fy", "ga", "gd", "gl", "gn", "gu",
    "gv", "he", "hi", "hr", "hrx", "hu", "hy", "id", "is", "it", "ja", "jv", "ka", "kg", "kk",
    "ko", "ku", "ky", "la", "lt", "lv", "mk", "ml", "mn", "mo", "mr", "ms", "na", "nb", "nds",
    "ne", "nl", "nn", "oj", "pa", "pl", "pt", "pt_BR", "ro", "ru", "sc", "si", "sk", "sl", "sq",
    "sr", "sv", "sw", "ta", "te", "tg", "th", "tl", "tr", "ug", "uk", "ur", "vi", "zh", "zh_CN",
    "zh_HK", "zh_TW",
];

/// Script-tagged targets read their strings from a regional catalog.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[("zh_Hant", "zh_TW"), ("zh_Hans", "zh_CN")];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkySyncConfig {
    pub source_dir: Option<String>,
    pub manifest: Option<String>,
    pub exclusions: Option<Vec<String>>,
    pub locales: Option<Vec<String>>,
    pub aliases: Option<BTreeMap<String, String>>,
    pub layout: Option<LayoutCfg>,
    pub metadata: Option<MetadataCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutCfg {
    pub packages_dir: Option<String>,
    pub i18n_dir: Option<String>,
    pub template: Option<String>,
    pub template_target: Option<String>,
    pub strip: Option<Vec<String>>,
    pub catalog_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataCfg {
    pub project_id_version: Option<String>,
    pub last_translator: Option<String>,
    pub language_team: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Parse one config file.
pub fn load_file(path: &Path) -> Result<SkySyncConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<SkySyncConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_optional(path: &Path) -> Result<Option<SkySyncConfig>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    load_file(path).map(Some)
}

/// Search order: explicit path, CWD/skysync.toml, $CONFIG/skysync/skysync.toml.
/// Earlier layers win field by field. A missing explicit file is an error;
/// missing implicit files are skipped.
pub fn load_config(explicit: Option<&Path>) -> Result<SkySyncConfig, ConfigError> {
    let mut merged = SkySyncConfig::default();
    if let Some(p) = explicit {
        merged = merge(merged, load_file(p)?);
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(cfg) = load_optional(&cwd.join(CONFIG_FILE))? {
            merged = merge(merged, cfg);
        }
    }
    if let Some(base) = dirs::config_dir() {
        if let Some(cfg) = load_optional(&base.join("skysync").join(CONFIG_FILE))? {
            merged = merge(merged, cfg);
        }
    }
    Ok(merged)
}

pub fn merge(mut a: SkySyncConfig, b: SkySyncConfig) -> SkySyncConfig {
    if a.source_dir.is_none() {
        a.source_dir = b.source_dir;
    }
    if a.manifest.is_none() {
        a.manifest = b.manifest;
    }
    if a.exclusions.is_none() {
        a.exclusions = b.exclusions;
    }
    if a.locales.is_none() {
        a.locales = b.locales;
    }
    if a.aliases.is_none() {
        a.aliases = b.aliases;
    }
    a.layout = merge_opt(a.layout, b.layout, merge_layout);
    a.metadata = merge_opt(a.metadata, b.metadata, merge_metadata);
    a
}

fn merge_opt<T>(a: Option<T>, b: Option<T>, f: fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        (None, Some(b)) => Some(b),
        (Some(a), None) => Some(a),
        (None, None) => None,
    }
}

fn merge_layout(mut a: LayoutCfg, b: LayoutCfg) -> LayoutCfg {
    if a.packages_dir.is_none() {
        a.packages_dir = b.packages_dir;
    }
    if a.i18n_dir.is_none() {
        a.i18n_dir = b.i18n_dir;
    }
    if a.template.is_none() {
        a.template = b.template;
    }
    if a.template_target.is_none() {
        a.template_target = b.template_target;
    }
    if a.strip.is_none() {
        a.strip = b.strip;
    }
    if a.catalog_dir.is_none() {
        a.catalog_dir = b.catalog_dir;
    }
    a
}

fn merge_metadata(mut a: MetadataCfg, b: MetadataCfg) -> MetadataCfg {
    if a.project_id_version.is_none() {
        a.project_id_version = b.project_id_version;
    }
    if a.last_translator.is_none() {
        a.last_translator = b.last_translator;
    }
    if a.language_team.is_none() {
        a.language_team = b.language_team;
    }
    a
}

/// Where things live, relative to the project root (packages_dir, i18n_dir)
/// or to a package (strip, catalog_dir).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub packages_dir: PathBuf,
    pub i18n_dir: PathBuf,
    /// File name of the build template inside `packages_dir`.
    pub template: String,
    /// Name the template gets inside every synchronized package.
    pub template_target: String,
    pub strip: Vec<String>,
    pub catalog_dir: String,
}

/// Fixed header fields of every combined catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub project_id_version: String,
    pub last_translator: String,
    pub language_team: String,
}

impl Metadata {
    /// Header pairs for the combined catalog of `locale`, in output order.
    pub fn header(&self, locale: &str) -> Vec<(String, String)> {
        [
            ("Project-Id-Version", self.project_id_version.as_str()),
            ("Last-Translator", self.last_translator.as_str()),
            ("Language-Team", self.language_team.as_str()),
            ("MIME-Version", "1.0"),
            ("Content-Type", "text/plain; charset=utf-8"),
            ("Content-Transfer-Encoding", "8bit"),
            ("Language", locale),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

/// Fully resolved settings handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub source_dir: Option<PathBuf>,
    pub manifest: String,
    pub exclusions: BTreeSet<String>,
    pub locales: Vec<String>,
    pub aliases: BTreeMap<String, String>,
    pub layout: Layout,
    pub metadata: Metadata,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(SkySyncConfig::default())
    }
}

impl Settings {
    pub fn resolve(cfg: SkySyncConfig) -> Self {
        let layout = cfg.layout.unwrap_or_default();
        let metadata = cfg.metadata.unwrap_or_default();
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Settings {
            source_dir: cfg.source_dir.map(PathBuf::from),
            manifest: cfg.manifest.unwrap_or_else(|| "index.json".into()),
            exclusions: cfg
                .exclusions
                .unwrap_or_else(|| owned(DEFAULT_EXCLUSIONS))
                .into_iter()
                .collect(),
            locales: cfg.locales.unwrap_or_else(|| owned(DEFAULT_LOCALES)),
            aliases: cfg.aliases.unwrap_or_else(|| {
                DEFAULT_ALIASES
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            }),
            layout: Layout {
                packages_dir: PathBuf::from(
                    layout.packages_dir.unwrap_or_else(|| "skycultures".into()),
                ),
                i18n_dir: PathBuf::from(
                    layout
                        .i18n_dir
                        .unwrap_or_else(|| "po/stellarium-skycultures".into()),
                ),
                template: layout
                    .template
                    .unwrap_or_else(|| "CMakeLists.txt.template".into()),
                template_target: layout
                    .template_target
                    .unwrap_or_else(|| "CMakeLists.txt".into()),
                strip: layout
                    .strip
                    .unwrap_or_else(|| vec!["po".into(), "doc".into()]),
                catalog_dir: layout.catalog_dir.unwrap_or_else(|| "po".into()),
            },
            metadata: Metadata {
                project_id_version: metadata
                    .project_id_version
                    .unwrap_or_else(|| "1.0".into()),
                last_translator: metadata
                    .last_translator
                    .unwrap_or_else(|| "Stellarium Labs".into()),
                language_team: metadata
                    .language_team
                    .unwrap_or_else(|| "Stellarium Labs".into()),
            },
        }
    }
}
