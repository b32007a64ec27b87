//! Database functionality tests
//!
//! Tests for migrations, entity operations and data integrity.

use anyhow::Result;
use chrono::Utc;
use derbynames::database::entities::*;
use derbynames::database::setup_database;
use derbynames::services::{export_names_to_csv, import_names_from_csv};
use sea_orm::{
    ActiveModelTrait, Database, DatabaseConnection, EntityTrait, ModelTrait, Set, SqlErr,
};
use serde_json::json;
use tempfile::TempDir;

/// Create a test database connection with migrations applied.
async fn setup_test_db() -> Result<(DatabaseConnection, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("derbynames.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, temp_dir))
}

async fn insert_name(db: &DatabaseConnection, name: &str) -> Result<derby_names::Model> {
    let now = Utc::now();
    let row = derby_names::ActiveModel {
        name: Set(name.to_string()),
        metadata: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(row.insert(db).await?)
}

async fn insert_jersey(db: &DatabaseConnection, name_id: i32) -> Result<derby_jerseys::Model> {
    let now = Utc::now();
    let row = derby_jerseys::ActiveModel {
        name_id: Set(name_id),
        image: Set(None),
        metadata: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(row.insert(db).await?)
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let names = derby_names::Entity::find().all(&db).await?;
    assert_eq!(names.len(), 0);

    let jerseys = derby_jerseys::Entity::find().all(&db).await?;
    assert_eq!(jerseys.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_name_crud_operations() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let name = insert_name(&db, "Annie Maul").await?;
    assert_eq!(name.name, "Annie Maul");

    let found = derby_names::Entity::find_by_id(name.id)
        .one(&db)
        .await?
        .expect("Name should exist");
    assert_eq!(found.name, "Annie Maul");

    let mut update: derby_names::ActiveModel = found.into();
    update.name = Set("Annie Maulover".to_string());
    let updated = update.update(&db).await?;
    assert_eq!(updated.name, "Annie Maulover");

    derby_names::Entity::delete_by_id(name.id).exec(&db).await?;
    assert!(derby_names::Entity::find_by_id(name.id)
        .one(&db)
        .await?
        .is_none());

    Ok(())
}

#[tokio::test]
async fn test_name_uniqueness_enforced_by_store() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    insert_name(&db, "Bella Donna").await?;
    let err = insert_name(&db, "Bella Donna")
        .await
        .expect_err("duplicate insert should fail");

    let db_err = err
        .downcast_ref::<sea_orm::DbErr>()
        .expect("should be a database error");
    assert!(matches!(
        db_err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_deleting_name_cascades_to_jerseys() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let name = insert_name(&db, "Mall Rat").await?;
    insert_jersey(&db, name.id).await?;
    insert_jersey(&db, name.id).await?;

    let kept = insert_name(&db, "Bella Donna").await?;
    let kept_jersey = insert_jersey(&db, kept.id).await?;

    derby_names::Entity::delete_by_id(name.id).exec(&db).await?;

    let remaining = derby_jerseys::Entity::find().all(&db).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, kept_jersey.id);

    Ok(())
}

#[tokio::test]
async fn test_jersey_name_relation() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let name = insert_name(&db, "Annie Maul").await?;
    let jersey = insert_jersey(&db, name.id).await?;

    let jerseys = name.find_related(derby_jerseys::Entity).all(&db).await?;
    assert_eq!(jerseys.len(), 1);
    assert_eq!(jerseys[0].id, jersey.id);

    let owner = jersey
        .find_related(derby_names::Entity)
        .one(&db)
        .await?
        .expect("jersey should have an owner");
    assert_eq!(owner.id, name.id);

    Ok(())
}

#[tokio::test]
async fn test_metadata_json_round_trip() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let name = insert_name(&db, "Bella Donna").await?;
    let now = Utc::now();
    let jersey = derby_jerseys::ActiveModel {
        name_id: Set(name.id),
        image: Set(Some("jerseys/jersey_Bella_Donna_1.png".to_string())),
        metadata: Set(Some(json!({
            "prompt": "a jersey for Bella Donna",
            "generation_attempted": true
        }))),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let jersey = jersey.insert(&db).await?;

    let found = derby_jerseys::Entity::find_by_id(jersey.id)
        .one(&db)
        .await?
        .expect("jersey should exist");
    let metadata = found.metadata.expect("metadata should round-trip");
    assert_eq!(metadata["prompt"], "a jersey for Bella Donna");
    assert_eq!(metadata["generation_attempted"], true);

    Ok(())
}

#[tokio::test]
async fn test_csv_import_and_export() -> Result<()> {
    let (db, temp) = setup_test_db().await?;

    let import_path = temp.path().join("names.csv");
    std::fs::write(
        &import_path,
        "name,metadata\n\
         Annie Maul,\n\
         Bella Donna,\"{\"\"league\"\": \"\"north\"\"}\"\n\
         Annie Maul,\n\
         ,\n",
    )?;

    let report = import_names_from_csv(&db, &import_path).await?;
    assert_eq!(report.inserted, 2);
    assert_eq!(report.skipped, 2);

    let names = derby_names::Entity::find().all(&db).await?;
    assert_eq!(names.len(), 2);
    let bella = names
        .iter()
        .find(|n| n.name == "Bella Donna")
        .expect("imported name");
    assert_eq!(bella.metadata.as_ref().unwrap()["league"], "north");

    let export_path = temp.path().join("export.csv");
    let exported = export_names_to_csv(&db, &export_path).await?;
    assert_eq!(exported, 2);

    let contents = std::fs::read_to_string(&export_path)?;
    assert!(contents.starts_with("name,created_at"));
    assert!(contents.contains("Annie Maul"));
    assert!(contents.contains("Bella Donna"));

    Ok(())
}
