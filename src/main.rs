use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use derbynames::database::{establish_connection, get_database_url, setup_database};
use derbynames::server::{self, MigrateDirection};
use derbynames::services::{export_names_to_csv, import_names_from_csv};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        #[clap(short, long, default_value = "3000")]
        port: u16,
        #[clap(short, long, default_value = "derbynames.db")]
        database: String,
        #[clap(short, long, default_value = "media")]
        media_dir: String,
        #[clap(long)]
        cors_origin: Option<String>,
    },
    /// Run database migrations
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
        #[clap(short, long, default_value = "derbynames.db")]
        database: String,
    },
    /// Import names from a CSV file (columns: name, optional metadata JSON)
    Import {
        file: String,
        #[clap(short, long, default_value = "derbynames.db")]
        database: String,
    },
    /// Export all names to a CSV file
    Export {
        file: String,
        #[clap(short, long, default_value = "derbynames.db")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Commands::Serve {
            port,
            database,
            media_dir,
            cors_origin,
        } => {
            info!("Starting server on port {}", port);
            server::start_server(port, &database, &media_dir, cors_origin.as_deref()).await?;
        }
        Commands::Migrate {
            direction,
            database,
        } => {
            server::migrate_database(&database, direction).await?;
        }
        Commands::Import { file, database } => {
            let db = establish_connection(&get_database_url(Some(&database))).await?;
            setup_database(&db).await?;
            let report = import_names_from_csv(&db, Path::new(&file)).await?;
            info!(
                "Imported {} names ({} skipped)",
                report.inserted, report.skipped
            );
        }
        Commands::Export { file, database } => {
            let db = establish_connection(&get_database_url(Some(&database))).await?;
            setup_database(&db).await?;
            let exported = export_names_to_csv(&db, Path::new(&file)).await?;
            info!("Exported {} names to {}", exported, file);
        }
    }

    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("handlebars=off,{}", log_level)))
        .without_time()
        .init();
}
