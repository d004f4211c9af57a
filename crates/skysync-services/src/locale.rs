use skysync_config::{Settings, DEFAULT_ALIASES};
use std::collections::BTreeMap;

/// Maps a target locale tag to the tag whose package catalogs feed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleResolver {
    aliases: BTreeMap<String, String>,
}

impl Default for LocaleResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALIASES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl LocaleResolver {
    pub fn new(aliases: BTreeMap<String, String>) -> Self {
        Self { aliases }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.aliases.clone())
    }

    /// Source tag for `target`; identity unless `target` is aliased.
    pub fn resolve<'a>(&'a self, target: &'a str) -> &'a str {
        self.aliases
            .get(target)
            .map(String::as_str)
            .unwrap_or(target)
    }
}
