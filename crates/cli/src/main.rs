mod commands;

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wildlog_core::{Settings, parse_observation_date};
use wildlog_location::{LocationProvider, SimulatedPlatform};
use wildlog_service::ObservationController;
use wildlog_storage::{KvBackend, ObservationStore};

#[derive(Parser)]
#[command(name = "wildlog")]
#[command(about = "Wildlife observation log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every observation, newest first
    List,
    Show {
        id: String,
    },
    /// Record an observation at the given position, or at the current one
    Add {
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Sighting day, YYYY-MM-DD; defaults to today
        #[arg(short, long, value_parser = parse_observation_date)]
        date: Option<NaiveDate>,
        #[arg(short = 'D', long)]
        description: Option<String>,
        #[arg(long)]
        image_uri: Option<String>,
    },
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short = 'D', long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
    },
    Delete {
        id: String,
    },
    /// Print the text a share sheet would send
    Share {
        id: String,
    },
    /// Print permission, screen state and the current fix
    Locate,
}

fn build_controller(settings: &Settings) -> Result<ObservationController> {
    let backend = KvBackend::open(settings)?;
    let store = ObservationStore::new(Arc::new(backend), settings.storage_key.clone());
    let platform = SimulatedPlatform::granted(settings.fixed_position);
    let location = LocationProvider::new(Arc::new(platform), settings.watch);
    Ok(ObservationController::new(store, location))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    tracing::debug!(
        backend = %settings.backend,
        key = %settings.storage_key,
        fixed_position = settings.fixed_position.is_some(),
        "Loaded settings"
    );
    let controller = build_controller(&settings)?;
    controller.refresh().await;

    match cli.command {
        Commands::List => commands::run_list(&controller).await?,
        Commands::Show { id } => commands::run_show(&controller, &id).await?,
        Commands::Add { name, lat, lon, date, description, image_uri } => {
            let position = lat.zip(lon);
            let form = commands::AddForm { name, date, description, image_uri };
            commands::run_add(&controller, position, form).await?;
        },
        Commands::Edit { id, name, description, clear_description } => {
            commands::run_edit(&controller, &id, name, description, clear_description).await?;
        },
        Commands::Delete { id } => commands::run_delete(&controller, &id).await?,
        Commands::Share { id } => commands::run_share(&controller, &id).await?,
        Commands::Locate => commands::run_locate(&controller).await?,
    }

    Ok(())
}
