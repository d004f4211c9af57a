use crate::Format;
use owo_colors::OwoColorize;
use skysync_domain::{LocaleStatus, RunSummary};
use skysync_services::{RunOptions, StdFs};
use std::path::PathBuf;

pub fn run_update(
    settings: &skysync_config::Settings,
    sky_culture_dir: Option<PathBuf>,
    project_root: PathBuf,
    dry_run: bool,
    format: Format,
    use_color: bool,
) -> color_eyre::Result<()> {
    tracing::debug!(event = "update_args", sky_culture_dir = ?sky_culture_dir, project_root = ?project_root, dry_run = dry_run, format = ?format);

    let opts = RunOptions {
        input_root: sky_culture_dir,
        project_root,
        dry_run,
    };
    let summary = skysync_services::run(&opts, settings, &StdFs)?;

    match format {
        Format::Json => {
            crate::ui_out!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Format::Text => print_text(&summary, use_color),
    }
    Ok(())
}

fn print_text(summary: &RunSummary, use_color: bool) {
    let verb = if summary.dry_run { "would sync" } else { "synced" };
    for id in &summary.removed {
        crate::ui_out!("  - {id} (excluded)");
    }
    for r in &summary.locales {
        match (r.status, &r.path) {
            (LocaleStatus::Written, Some(path)) => {
                let tag = if use_color {
                    r.locale.green().to_string()
                } else {
                    r.locale.clone()
                };
                crate::ui_out!(
                    "  {tag} <- {} : {} entries, {} translated, {} duplicates dropped ({path})",
                    r.source_locale,
                    r.entries,
                    r.translated,
                    r.duplicates
                );
            }
            _ => {
                let tag = if use_color {
                    r.locale.yellow().to_string()
                } else {
                    r.locale.clone()
                };
                crate::ui_out!("  {tag} <- {} : no translated strings, skipped", r.source_locale);
            }
        }
    }
    let written = summary
        .locales
        .iter()
        .filter(|r| r.status == LocaleStatus::Written)
        .count();
    crate::ui_ok!(
        "{verb} {} packages, removed {} excluded, {} of {} catalogs {}",
        summary.synced.len(),
        summary.removed.len(),
        written,
        summary.locales.len(),
        if summary.dry_run { "to write" } else { "written" }
    );
    if !summary.warnings.is_empty() {
        crate::ui_warn!("{} warnings, see log for details", summary.warnings.len());
    }
}
