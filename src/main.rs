//! Setup Companion - command-line front end.
//!
//! Stands in for a GUI host: dialogs opened by the import pipeline are rendered
//! as console output, and the user's choices come from command-line flags.
//!
//! # Execution Flow
//!
//! 1. Parse arguments and load `Companion Config.yaml` / `Track Catalog.yaml`
//! 2. Initialize logging → `<Log Directory>/setup-companion.<date>`
//! 3. Create tokio runtime, StateManager and ImportController
//! 4. Run the requested command and print the result

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use setup_companion::services::{SetupStore, collect_directory_entries};
use setup_companion::{
    APP_NAME, ConfigManager, ImportController, ImportEntry, ImportOutcome, SaveOutcome,
    StateManager, TrackCatalog, VERSION,
};
use std::sync::Arc;

/// Import and manage Assetto Corsa Competizione car setups.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding Companion Config.yaml and Track Catalog.yaml
    #[arg(long, default_value = "Companion Data")]
    config_dir: Utf8PathBuf,

    /// Override the setups root from the config file
    #[arg(long)]
    setups_dir: Option<Utf8PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import setup files, folders or zip archives
    Import {
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,

        /// Track applied to every file of a flat import
        #[arg(long)]
        track: Option<String>,

        /// Show what would be imported without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List the setups stored for a car on a track
    List { car: String, track: String },

    /// Print the track catalog
    Tracks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let user_config = config_manager.load_user_config()?;
    let settings = &user_config.companion_settings;

    let _guard = setup_companion::logging::setup_logging_with_console(
        &settings.log_dir,
        APP_NAME,
        cli.debug || settings.debug_mode,
        cli.debug,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let setups_dir = match cli.setups_dir {
        Some(dir) => dir,
        None => config_manager.setups_dir(&user_config)?,
    };
    let catalog = Arc::new(config_manager.load_track_catalog()?);
    let controller = ImportController::new(
        Arc::new(StateManager::new()),
        SetupStore::new(setups_dir),
        catalog,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("companion-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let result = runtime.block_on(async {
        match cli.command {
            Command::Import {
                paths,
                track,
                dry_run,
            } => run_import(&controller, &paths, track.as_deref(), dry_run).await,
            Command::List { car, track } => run_list(controller.store(), &car, &track).await,
            Command::Tracks => {
                print_tracks(controller.catalog());
                Ok(())
            }
        }
    });

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Expand command-line paths into import entries, walking directories.
async fn collect_entries(paths: &[Utf8PathBuf]) -> Vec<ImportEntry> {
    let mut entries = Vec::new();
    for path in paths {
        if path.is_dir() {
            entries.extend(collect_directory_entries(path).await);
        } else {
            entries.push(ImportEntry::from_disk(path.clone()));
        }
    }
    entries
}

async fn run_import(
    controller: &ImportController,
    paths: &[Utf8PathBuf],
    track: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let entries = collect_entries(paths).await;

    let outcome = controller.handle_import(&entries).await;
    match outcome {
        ImportOutcome::Empty => {
            println!("No valid setup files found");
            return Ok(());
        }
        ImportOutcome::Unrecognized => {
            println!("Folder structure not recognized: expected setup files or track folders");
            return Ok(());
        }
        ImportOutcome::NoTrackGroups => {
            println!("Track folders found, but none contained a valid setup");
            return Ok(());
        }
        ImportOutcome::BatchImportOpened { .. } => print_batch_import(controller),
        ImportOutcome::TrackImportOpened { .. } => print_track_import(controller),
    }

    if dry_run {
        controller.close_batch_import_dialog();
        controller.close_track_import_dialog();
        println!("Dry run: nothing written");
        return Ok(());
    }

    let saved = match outcome {
        ImportOutcome::BatchImportOpened { .. } => {
            let Some(track) = track else {
                controller.close_batch_import_dialog();
                bail!("Flat imports need --track to choose where the setups go");
            };
            if !controller.set_all_tracks(track) {
                controller.close_batch_import_dialog();
                bail!("Unknown track '{}'; see the `tracks` command", track);
            }
            controller.save_batch_import().await
        }
        _ => controller.save_track_import().await,
    };

    match saved.context("Import failed")? {
        SaveOutcome::Saved(report) => {
            for path in &report.written {
                println!("  wrote {}", path);
            }
            println!("Imported {} setup(s)", report.len());
        }
        SaveOutcome::AlreadySaving => println!("An import is already being saved"),
    }
    Ok(())
}

fn print_batch_import(controller: &ImportController) {
    let items = controller
        .state_manager()
        .read(|state| state.batch_import_items.clone());
    println!("Found {} setup(s):", items.len());
    for item in &items {
        println!("  {} ({})", item.file_name, item.setup.car_name());
    }
}

fn print_track_import(controller: &ImportController) {
    let groups = controller
        .state_manager()
        .read(|state| state.track_import_groups.clone());
    println!("Found {} track folder(s):", groups.len());
    for group in &groups {
        let name = controller
            .catalog()
            .get(&group.track_key)
            .map_or(group.track_key.as_str(), |record| record.full_name.as_str());
        println!(
            "  {} / {}: {} setup(s)",
            group.car_name,
            name,
            group.items.len()
        );
    }
}

async fn run_list(store: &SetupStore, car: &str, track: &str) -> Result<()> {
    let setups = store
        .list_setups(car, track)
        .await
        .with_context(|| format!("Failed to list setups for {}/{}", car, track))?;

    if setups.is_empty() {
        println!("No setups for {} on {} in {}", car, track, store.root());
        return Ok(());
    }
    println!("{} setup(s) for {} on {}:", setups.len(), car, track);
    for name in setups {
        println!("  {}", name);
    }
    Ok(())
}

fn print_tracks(catalog: &TrackCatalog) {
    for record in catalog.tracks() {
        println!("{:<20} {:<20} {}", record.key, record.id, record.full_name);
    }
}
