use skysync_services::LocaleResolver;

pub fn run_resolve_locale(settings: &skysync_config::Settings, tags: &[String]) -> color_eyre::Result<()> {
    let resolver = LocaleResolver::from_settings(settings);
    for tag in tags {
        crate::ui_out!("{tag} -> {}", resolver.resolve(tag));
    }
    Ok(())
}
