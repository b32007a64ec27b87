pub mod app;
pub mod handlers;

use std::path::Path;

use anyhow::Result;
use clap::Subcommand;
use sea_orm_migration::prelude::*;
use tracing::{info, warn};

use crate::config::ImageGenConfig;
use crate::database::{connection::*, migrations::Migrator};
use crate::services::JerseyImageService;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

pub async fn start_server(
    port: u16,
    database_path: &str,
    media_dir: &str,
    cors_origin: Option<&str>,
) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    // Run migrations
    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    std::fs::create_dir_all(media_dir)?;

    let images = match ImageGenConfig::from_env() {
        Some(config) => {
            info!("Jersey image generation enabled (model: {})", config.model);
            Some(JerseyImageService::new(db.clone(), config, media_dir))
        }
        None => {
            warn!("HF_TOKEN not set, jersey image generation disabled");
            None
        }
    };

    let app = app::create_app(db, cors_origin, Path::new(media_dir), images).await?;

    log_routes(port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(port: u16) {
    info!("Endpoints:");
    info!("  /                           - Browse random derby names");
    info!("  /names/:id                  - Name detail page");
    info!("  /jerseys                    - Jersey grid");
    info!("  /admin                      - Admin console");
    info!("  /media/*                    - Jersey image files");
    info!("  /health                     - Health check");
    info!("  /docs                       - Swagger UI documentation");
    info!("  /api/v1/*                   - REST API (names, jerseys, search)");
    info!("");
    info!("Browse at http://localhost:{}/", port);
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
