use std::path::{Path, PathBuf};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::config::ImageGenConfig;
use crate::database::entities::{derby_jerseys, derby_jerseys::Entity as DerbyJerseys};

/// Metadata key marking that generation was tried for a jersey. Clearing it
/// (and leaving the image empty) makes the jersey eligible again.
pub const GENERATION_ATTEMPTED_KEY: &str = "generation_attempted";
/// Metadata key recording the prompt that produced the stored image.
pub const PROMPT_KEY: &str = "prompt";

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference provider returned {status}: {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

/// Best-effort text-to-image generation for jerseys.
///
/// Each dispatch runs on its own background task; there is no retry policy
/// and no coordination between tasks. Failures are logged, the attempt is
/// recorded on the jersey's metadata, and the image stays empty.
#[derive(Clone)]
pub struct JerseyImageService {
    db: DatabaseConnection,
    client: reqwest::Client,
    config: ImageGenConfig,
    media_root: PathBuf,
}

impl JerseyImageService {
    pub fn new(
        db: DatabaseConnection,
        config: ImageGenConfig,
        media_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            client: reqwest::Client::new(),
            config,
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// Dispatch generation for a jersey without an image. Nothing awaits the
    /// task; the result lands on the row whenever the task finishes.
    pub fn spawn_generation(&self, jersey: derby_jerseys::Model, name: String) {
        let service = self.clone();
        tokio::spawn(async move {
            let jersey_id = jersey.id;
            if let Err(err) = service.generate(jersey, &name).await {
                error!("Error generating jersey image for {}: {}", name, err);
                if let Err(err) = service.mark_attempted(jersey_id).await {
                    error!(
                        "Failed to record generation attempt for jersey {}: {}",
                        jersey_id, err
                    );
                }
            }
        });
    }

    async fn generate(&self, jersey: derby_jerseys::Model, name: &str) -> Result<(), ImageGenError> {
        let prompt = self.config.render_prompt(name);
        info!("Prompt for image generation: {}", prompt);

        let bytes = self.text_to_image(&prompt).await?;

        let relative = format!("jerseys/jersey_{}_{}.png", file_stem(name), jersey.id);
        let full_path = self.media_root.join(&relative);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, &bytes).await?;

        let metadata = record_generation(jersey.metadata.clone(), prompt);

        let mut active: derby_jerseys::ActiveModel = jersey.into();
        active.image = Set(Some(relative));
        active.metadata = Set(Some(metadata));
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;

        info!(
            "Generated image for {} saved to {}",
            name,
            full_path.display()
        );
        Ok(())
    }

    async fn text_to_image(&self, prompt: &str) -> Result<Vec<u8>, ImageGenError> {
        let url = format!(
            "{}/models/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImageGenError::Provider { status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Mark the jersey as attempted so a failed generation is not retried on
    /// every subsequent save. A row deleted in the meantime is fine.
    async fn mark_attempted(&self, jersey_id: i32) -> Result<(), ImageGenError> {
        let Some(jersey) = DerbyJerseys::find_by_id(jersey_id).one(&self.db).await? else {
            return Ok(());
        };

        let metadata = mark_metadata_attempted(jersey.metadata.clone());
        let mut active: derby_jerseys::ActiveModel = jersey.into();
        active.metadata = Set(Some(metadata));
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(())
    }
}

/// Whether generation has already been tried for this jersey.
pub fn generation_attempted(metadata: &Option<Value>) -> bool {
    metadata
        .as_ref()
        .and_then(|m| m.get(GENERATION_ATTEMPTED_KEY))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Record a successful generation: the prompt used plus the attempted flag.
/// Non-object metadata is replaced, as in [`mark_metadata_attempted`].
pub fn record_generation(metadata: Option<Value>, prompt: String) -> Value {
    let mut metadata = mark_metadata_attempted(metadata);
    if let Some(map) = metadata.as_object_mut() {
        map.insert(PROMPT_KEY.to_string(), Value::String(prompt));
    }
    metadata
}

pub fn mark_metadata_attempted(metadata: Option<Value>) -> Value {
    let mut metadata = match metadata {
        Some(value @ Value::Object(_)) => value,
        _ => json!({}),
    };
    if let Some(map) = metadata.as_object_mut() {
        map.insert(GENERATION_ATTEMPTED_KEY.to_string(), Value::Bool(true));
    }
    metadata
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempted_flag_round_trip() {
        assert!(!generation_attempted(&None));
        assert!(!generation_attempted(&Some(json!({"prompt": "x"}))));
        assert!(!generation_attempted(&Some(
            json!({GENERATION_ATTEMPTED_KEY: false})
        )));

        let marked = mark_metadata_attempted(None);
        assert!(generation_attempted(&Some(marked)));

        let marked = mark_metadata_attempted(Some(json!({"prompt": "x"})));
        assert_eq!(marked["prompt"], "x");
        assert!(generation_attempted(&Some(marked)));
    }

    #[test]
    fn mark_replaces_non_object_metadata() {
        let marked = mark_metadata_attempted(Some(json!("free text")));
        assert!(marked.is_object());
        assert!(generation_attempted(&Some(marked)));
    }

    #[test]
    fn record_generation_keeps_existing_keys() {
        let recorded = record_generation(Some(json!({"league": "north"})), "a prompt".to_string());
        assert_eq!(recorded["league"], "north");
        assert_eq!(recorded[PROMPT_KEY], "a prompt");
        assert!(generation_attempted(&Some(recorded)));
    }

    #[test]
    fn record_generation_replaces_non_object_metadata() {
        let recorded = record_generation(Some(json!("free text")), "a prompt".to_string());
        assert!(recorded.is_object());
        assert_eq!(recorded[PROMPT_KEY], "a prompt");
        assert!(generation_attempted(&Some(recorded)));
    }

    #[test]
    fn file_stem_keeps_names_filesystem_safe() {
        assert_eq!(file_stem("Annie Maul"), "Annie_Maul");
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
        assert_eq!(file_stem("Bella-Donna"), "Bella_Donna");
    }
}
