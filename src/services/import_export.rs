use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, SqlErr};
use serde::Deserialize;
use tracing::warn;

use crate::database::entities::{derby_names, derby_names::Entity as DerbyNames};

#[derive(Debug, Default)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Deserialize)]
struct NameRecord {
    name: String,
    #[serde(default)]
    metadata: Option<String>,
}

/// Import names from a CSV file with a `name` header column and an optional
/// `metadata` column holding a JSON object. Duplicates and blank names are
/// skipped with a warning.
pub async fn import_names_from_csv(
    db: &DatabaseConnection,
    path: &Path,
) -> Result<ImportReport> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut report = ImportReport::default();
    for result in reader.deserialize() {
        let record: NameRecord = result?;
        let name = record.name.trim().to_string();
        if name.is_empty() {
            warn!("Skipping row with empty name");
            report.skipped += 1;
            continue;
        }

        let metadata = match record.metadata.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                serde_json::from_str(raw)
                    .with_context(|| format!("Invalid metadata JSON for '{}'", name))?,
            ),
            _ => None,
        };

        let now = Utc::now();
        let row = derby_names::ActiveModel {
            name: Set(name.clone()),
            metadata: Set(metadata),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        match row.insert(db).await {
            Ok(_) => report.inserted += 1,
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                warn!("Skipping duplicate name '{}'", name);
                report.skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(report)
}

/// Export all names, alphabetically, as `name,created_at` CSV.
pub async fn export_names_to_csv(db: &DatabaseConnection, path: &Path) -> Result<usize> {
    let names = DerbyNames::find()
        .order_by_asc(derby_names::Column::Name)
        .all(db)
        .await?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["name", "created_at"])?;
    for name in &names {
        writer.write_record([name.name.as_str(), &name.created_at.to_rfc3339()])?;
    }
    writer.flush()?;

    Ok(names.len())
}
