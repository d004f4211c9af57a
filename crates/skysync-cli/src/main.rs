mod commands;
mod ui;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(
    name = "skysync",
    version,
    about = "Update sky-culture packages and build combined translation catalogs"
)]
struct Cli {
    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    /// Only log warnings and errors to the console
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file loaded before ./skysync.toml and the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync packages into the project and regenerate combined catalogs
    Update {
        /// Directory holding the upstream sky cultures
        #[arg(long, alias = "source-dir")]
        sky_culture_dir: Option<PathBuf>,
        /// Project root containing the packages and catalog directories
        #[arg(long, default_value = ".")]
        project_root: PathBuf,
        /// Compute everything, write nothing
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Show which packages of an input root would be used
    Packages {
        #[arg(long, alias = "source-dir")]
        sky_culture_dir: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the catalog locale each target locale is read from
    ResolveLocale {
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Write JSON schemas of the report formats
    Schema {
        #[arg(long, default_value = "./docs/schemas")]
        out_dir: PathBuf,
    },
}

impl Commands {
    fn run(self, settings: &skysync_config::Settings, use_color: bool) -> Result<()> {
        let cmd_name = format!("{:?}", self);
        info!(event = "command_start", command = %cmd_name);

        let result = match self {
            Commands::Update {
                sky_culture_dir,
                project_root,
                dry_run,
                format,
            } => commands::update::run_update(
                settings,
                sky_culture_dir,
                project_root,
                dry_run,
                format,
                use_color,
            ),
            Commands::Packages {
                sky_culture_dir,
                format,
            } => commands::packages::run_packages(settings, sky_culture_dir, format, use_color),
            Commands::ResolveLocale { tags } => {
                commands::resolve_locale::run_resolve_locale(settings, &tags)
            }
            Commands::Schema { out_dir } => commands::schema::run_schema(out_dir),
        };

        match &result {
            Ok(_) => debug!(event = "command_done", command = %cmd_name),
            Err(e) => error!(event = "command_failed", command = %cmd_name, error = ?e),
        }
        result
    }
}

fn init_tracing(quiet: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = std::env::var_os("SKYSYNC_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(log_dir, "skysync.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if quiet { "warn" } else { "info" };
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        );

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    guard
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _guard = init_tracing(cli.quiet);

    let use_color = !cli.no_color
        && std::io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none();

    let config = skysync_config::load_config(cli.config.as_deref())?;
    let settings = skysync_config::Settings::resolve(config);
    debug!(event = "settings", settings = ?settings);

    cli.cmd.run(&settings, use_color)
}
