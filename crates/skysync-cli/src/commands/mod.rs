pub mod packages;
pub mod resolve_locale;
pub mod schema;
pub mod update;
