use crate::Format;
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub fn run_packages(
    settings: &skysync_config::Settings,
    sky_culture_dir: Option<PathBuf>,
    format: Format,
    use_color: bool,
) -> color_eyre::Result<()> {
    let root = skysync_services::pipeline::resolve_input_root(sky_culture_dir.as_deref(), settings)?;
    let listing = skysync_services::list_packages(&root, settings)?;

    if format == Format::Json {
        crate::ui_out!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    for id in &listing.selected {
        crate::ui_out!("{id}");
    }
    for (label, ids) in [("excluded", &listing.excluded), ("ignored", &listing.ignored)] {
        if ids.is_empty() {
            continue;
        }
        let label = if use_color {
            label.dimmed().to_string()
        } else {
            label.to_string()
        };
        crate::ui_out!("{label}: {}", ids.join(", "));
    }
    Ok(())
}
