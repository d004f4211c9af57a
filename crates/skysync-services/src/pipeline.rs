use crate::aggregate::{aggregate, catalog_path, write_catalogs, PackageCatalogs};
use crate::fs::Fs;
use crate::locale::LocaleResolver;
use crate::select::{scan, select};
use crate::sync::{apply_sync, plan_sync, PackageShape, SyncOp, SyncOutcome};
use crate::{Result, SkySyncError};
use skysync_config::{Layout, Settings};
use skysync_domain::{LocaleReport, LocaleStatus, PackageListing, RunSummary, SCHEMA_VERSION};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pre-fetched input root; falls back to `Settings::source_dir`.
    pub input_root: Option<PathBuf>,
    /// Directory holding `packages_dir` and `i18n_dir`.
    pub project_root: PathBuf,
    pub dry_run: bool,
}

/// Output locations, checked to exist before anything is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub packages_dir: PathBuf,
    pub i18n_dir: PathBuf,
    pub template: PathBuf,
}

pub fn check_context(project_root: &Path, layout: &Layout) -> Result<Workspace> {
    let packages_dir = project_root.join(&layout.packages_dir);
    if !packages_dir.is_dir() {
        return Err(SkySyncError::WrongWorkingDir(packages_dir).into());
    }
    let template = packages_dir.join(&layout.template);
    if !template.is_file() {
        return Err(SkySyncError::TemplateMissing(template).into());
    }
    Ok(Workspace {
        i18n_dir: project_root.join(&layout.i18n_dir),
        packages_dir,
        template,
    })
}

pub fn resolve_input_root(explicit: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
    let root = explicit
        .map(Path::to_path_buf)
        .or_else(|| settings.source_dir.clone())
        .ok_or(SkySyncError::InputRootUnset)?;
    if !root.is_dir() {
        return Err(SkySyncError::InputRootMissing(root).into());
    }
    Ok(root)
}

/// Selected, excluded and ignored identifiers of an input root.
pub fn list_packages(input_root: &Path, settings: &Settings) -> Result<PackageListing> {
    let selection = scan(input_root, &settings.exclusions, &settings.manifest)?;
    Ok(PackageListing {
        schema_version: SCHEMA_VERSION,
        selected: selection.selected,
        excluded: selection.excluded,
        ignored: selection.ignored,
    })
}

/// Full update: sync package subtrees, then build combined catalogs.
pub fn run(opts: &RunOptions, settings: &Settings, fs: &dyn Fs) -> Result<RunSummary> {
    let ws = check_context(&opts.project_root, &settings.layout)?;
    let input_root = resolve_input_root(opts.input_root.as_deref(), settings)?;
    tracing::info!(event = "run_start", input = %input_root.display(), output = %ws.packages_dir.display(), dry_run = opts.dry_run);

    let selected = select(&input_root, &settings.exclusions, &settings.manifest)?;
    let plan = plan_sync(&selected, &settings.exclusions, &ws.packages_dir);

    let sync = if opts.dry_run {
        SyncOutcome {
            removed: plan
                .ops
                .iter()
                .filter_map(|op| match op {
                    SyncOp::Remove { id, target } if fs.exists(target) => Some(id.clone()),
                    _ => None,
                })
                .collect(),
            synced: plan.replaced().map(String::from).collect(),
        }
    } else {
        let shape = PackageShape {
            template: &ws.template,
            template_target: &settings.layout.template_target,
            strip: &settings.layout.strip,
        };
        apply_sync(&plan, fs, &shape)?
    };

    tracing::info!(event = "catalogs_start", locales = settings.locales.len());
    let outcomes = aggregate(
        &selected,
        &settings.locales,
        &LocaleResolver::from_settings(settings),
        &settings.metadata,
        &PackageCatalogs::new(settings.layout.catalog_dir.clone()),
    )?;
    if !opts.dry_run {
        write_catalogs(&outcomes, &ws.i18n_dir)?;
    }

    let mut warnings = Vec::new();
    let locales = outcomes
        .into_iter()
        .map(|o| {
            warnings.extend(o.warnings);
            let written = o.catalog.is_some();
            LocaleReport {
                path: written.then(|| catalog_path(&ws.i18n_dir, &o.locale).display().to_string()),
                status: if written {
                    LocaleStatus::Written
                } else {
                    LocaleStatus::Empty
                },
                locale: o.locale,
                source_locale: o.source_locale,
                entries: o.entries,
                translated: o.translated,
                duplicates: o.duplicates,
                missing: o.missing,
            }
        })
        .collect();

    Ok(RunSummary {
        schema_version: SCHEMA_VERSION,
        input_root: input_root.display().to_string(),
        dry_run: opts.dry_run,
        selected: selected.into_iter().map(|p| p.id).collect(),
        removed: sync.removed,
        synced: sync.synced,
        locales,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::StdFs;
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn settings(exclusions: &[&str], locales: &[&str]) -> Settings {
        let mut s = Settings::default();
        s.exclusions = exclusions.iter().map(|s| s.to_string()).collect();
        s.locales = locales.iter().map(|s| s.to_string()).collect();
        s
    }

    struct Fixture {
        _tmp: tempfile::TempDir,
        input: PathBuf,
        project: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("upstream");
        let project = tmp.path().join("project");
        write(
            &project.join("skycultures/CMakeLists.txt.template"),
            "get_filename_component(SC ${CMAKE_CURRENT_SOURCE_DIR} NAME)\n",
        );
        write(&input.join("A/index.json"), "{}");
        write(&input.join("A/po/fr.po"), "msgid \"x\"\nmsgstr \"bonjour\"\n");
        write(&input.join("B/index.json"), "{}");
        write(
            &input.join("B/po/fr.po"),
            "msgid \"x\"\nmsgstr \"salut\"\n\nmsgid \"y\"\nmsgstr \"oui\"\n",
        );
        write(&input.join("C/index.json"), "{}");
        write(&input.join("C/po/de.po"), "msgid \"z\"\nmsgstr \"\"\n");
        write(&input.join("D/index.json"), "{}");
        write(&project.join("skycultures/D/index.json"), "{}");
        Fixture {
            _tmp: tmp,
            input,
            project,
        }
    }

    fn opts(f: &Fixture, dry_run: bool) -> RunOptions {
        RunOptions {
            input_root: Some(f.input.clone()),
            project_root: f.project.clone(),
            dry_run,
        }
    }

    #[test]
    fn full_run_syncs_and_merges() {
        let f = fixture();
        let s = settings(&["D"], &["fr", "de"]);
        let summary = run(&opts(&f, false), &s, &StdFs).unwrap();

        assert_eq!(summary.selected, vec!["A", "B", "C"]);
        assert_eq!(summary.removed, vec!["D"]);
        assert!(!f.project.join("skycultures/D").exists());
        assert!(f.project.join("skycultures/A/CMakeLists.txt").is_file());
        assert!(!f.project.join("skycultures/A/po").exists());

        let fr = skysync_po::read_catalog(
            &f.project.join("po/stellarium-skycultures/fr.po"),
        )
        .unwrap();
        let got: Vec<_> = fr
            .entries
            .iter()
            .map(|e| (e.msgid.as_str(), e.msgstr.as_str()))
            .collect();
        assert_eq!(got, vec![("x", "bonjour"), ("y", "oui")]);
        assert!(!f.project.join("po/stellarium-skycultures/de.po").exists());

        let de = summary.locales.iter().find(|l| l.locale == "de").unwrap();
        assert_eq!(de.status, LocaleStatus::Empty);
        assert!(summary
            .warnings
            .iter()
            .any(|w| w == "no strings present for language \"de\""));
    }

    /// Relative path and content of every file under `root`, in walk order.
    fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect()
    }

    #[test]
    fn second_run_is_byte_identical() {
        let f = fixture();
        let s = settings(&["D"], &["fr"]);
        run(&opts(&f, false), &s, &StdFs).unwrap();
        let po = f.project.join("po/stellarium-skycultures/fr.po");
        let first = fs::read(&po).unwrap();
        let packages = snapshot(&f.project.join("skycultures"));
        assert!(packages
            .iter()
            .any(|(p, _)| p == Path::new("A/CMakeLists.txt")));

        let summary = run(&opts(&f, false), &s, &StdFs).unwrap();
        assert_eq!(fs::read(&po).unwrap(), first);
        assert_eq!(snapshot(&f.project.join("skycultures")), packages);
        assert!(summary.removed.is_empty(), "D already gone");

        let leftovers: Vec<_> = fs::read_dir(f.project.join("skycultures"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".skysync-staging"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let f = fixture();
        let s = settings(&["D"], &["fr"]);
        let summary = run(&opts(&f, true), &s, &StdFs).unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.removed, vec!["D"]);
        assert_eq!(summary.synced, vec!["A", "B", "C"]);
        assert!(f.project.join("skycultures/D").exists());
        assert!(!f.project.join("skycultures/A").exists());
        assert!(!f.project.join("po").exists());
        assert_eq!(summary.locales[0].status, LocaleStatus::Written);
    }

    #[test]
    fn wrong_project_root_is_fatal() {
        let f = fixture();
        let mut o = opts(&f, false);
        o.project_root = f.input.clone();
        let err = run(&o, &Settings::default(), &StdFs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkySyncError>(),
            Some(SkySyncError::WrongWorkingDir(_))
        ));
    }

    #[test]
    fn missing_input_root_is_fatal() {
        let f = fixture();
        let mut o = opts(&f, false);
        o.input_root = None;
        let err = run(&o, &Settings::default(), &StdFs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkySyncError>(),
            Some(SkySyncError::InputRootUnset)
        ));

        o.input_root = Some(f.input.join("nope"));
        let err = run(&o, &Settings::default(), &StdFs).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkySyncError>(),
            Some(SkySyncError::InputRootMissing(_))
        ));
    }

    #[test]
    fn listing_reports_all_three_groups() {
        let f = fixture();
        fs::create_dir_all(f.input.join("scratch")).unwrap();
        let listing = list_packages(&f.input, &settings(&["D"], &[])).unwrap();
        assert_eq!(listing.selected, vec!["A", "B", "C"]);
        assert_eq!(listing.excluded, vec!["D"]);
        assert_eq!(listing.ignored, vec!["scratch"]);
    }
}
