//! One-shot migration: copy the `surveys` collection into `consultations`.
//!
//! Every survey document is copied with a `consultationId` field added,
//! taken from its `surveyId`; the old collection is then renamed to
//! `surveys_backup`. Run manually, once. There is no retry or rollback
//! beyond the renamed backup.

use anyhow::{Context, Result};
use consulta::config::Config;
use consulta::storage::mongodb::connect;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let (client, database) = connect(&config.mongodb).await?;

    tracing::info!("Starting migration...");

    let surveys: Vec<Document> = database
        .collection::<Document>("surveys")
        .find(doc! {})
        .await
        .context("failed to read surveys collection")?
        .try_collect()
        .await?;

    tracing::info!("Found {} surveys to migrate", surveys.len());

    if surveys.is_empty() {
        tracing::info!("No surveys to migrate");
        return Ok(());
    }

    // The survey fields are carried over as-is, `surveyId` included; only
    // the consultation id field is added.
    let consultations: Vec<Document> = surveys
        .into_iter()
        .map(|mut doc| {
            if let Some(id) = doc.get("surveyId").cloned() {
                doc.insert("consultationId", id);
            }
            doc
        })
        .collect();

    let result = database
        .collection::<Document>("consultations")
        .insert_many(consultations)
        .await
        .context("failed to insert consultations")?;
    tracing::info!("Migrated {} consultations successfully", result.inserted_ids.len());

    // Keep the old collection around as a backup.
    client
        .database("admin")
        .run_command(doc! {
            "renameCollection": format!("{}.surveys", config.mongodb.database),
            "to": format!("{}.surveys_backup", config.mongodb.database),
        })
        .await
        .context("failed to rename surveys collection")?;
    tracing::info!("Renamed old surveys collection to surveys_backup");

    tracing::info!("Migration completed successfully");
    Ok(())
}
