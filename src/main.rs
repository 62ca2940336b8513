//! Facelet Compose CLI
//!
//! Usage:
//!   facelet-compose [OPTIONS] <VIEW>
//!
//! Options:
//!   -r, --root <DIR>         Directory holding the view fragments (default: .)
//!   -s, --settings <FILE>    Settings file with [view] and [beans] (TOML format)
//!       --stage <STAGE>      Project stage, overriding the settings file
//!       --legacy-decorate    Enable legacy decorate (markers need a state store)
//!   -v, --verbose            Debug logging (RUST_LOG takes precedence)
//!   -h, --help               Print help

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use facelet_compose::view::DirectoryLoader;
use facelet_compose::{ProjectStage, RenderError, Settings, ViewEngine};

#[derive(Parser)]
#[command(name = "facelet-compose")]
#[command(about = "Build a view from template fragments and print its markup")]
struct Cli {
    /// View to build, as a path below the root directory
    view: String,

    /// Directory holding the view fragments
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Settings file with [view] and [beans] sections (TOML format)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Project stage (development, production, system-test, unit-test)
    #[arg(long)]
    stage: Option<ProjectStage>,

    /// Enable legacy decorate tracking. A single run has no state store,
    /// so this only takes effect for library callers that pass one.
    #[arg(long)]
    legacy_decorate: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(markup) => println!("{}", markup),
        Err(e) => {
            eprintln!("Error: {}", e.report());
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String, RenderError> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(stage) = cli.stage {
        settings.view.project_stage = stage;
    }
    if cli.legacy_decorate {
        settings.view.legacy_decorate = true;
    }

    let engine = ViewEngine::new(DirectoryLoader::new(&cli.root), settings.view);
    let view_id = format!("/{}", cli.view.trim_start_matches('/'));
    let view = engine.build_view(&view_id, &settings.beans)?;
    Ok(view.to_markup())
}

fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("facelet_compose=debug")
    } else {
        EnvFilter::new("warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
