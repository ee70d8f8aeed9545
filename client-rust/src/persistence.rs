use crate::{
    client_utils,
    opentelemetry::{trace_materials, MaterialsOperation},
    options::{Backend, BackendOptions},
    Artifact, ContentKind, MaterialKey, PersistenceError, PersistenceResult, ReadCache,
    SavedArtifact,
};
use std::sync::Arc;

/// Saves completed artifacts as class materials.
///
/// Saves are keyed by the artifact value and its `(kind, topic, day)` key,
/// never by a session, so an artifact can be saved again after its session
/// is gone. Failed saves are not retried.
pub struct PersistenceGateway {
    backend: Backend,
    cache: Arc<ReadCache>,
}

impl PersistenceGateway {
    #[must_use]
    pub fn new(options: BackendOptions, cache: Arc<ReadCache>) -> Self {
        Self {
            backend: Backend::new(options),
            cache,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ReadCache> {
        &self.cache
    }

    /// Upsert `artifact` under `(kind, topic_id, day_id)`. The previous
    /// artifact under the key is replaced. On success the cache entry for
    /// the key and every cached entry of `kind` are invalidated, and the
    /// saved artifact is returned with its key.
    pub async fn save(
        &self,
        kind: ContentKind,
        topic_id: &str,
        day_id: &str,
        artifact: &Artifact,
    ) -> PersistenceResult<SavedArtifact> {
        if artifact.kind() != kind {
            return Err(PersistenceError::InvalidInput(format!(
                "cannot save a {} artifact as {kind}",
                artifact.kind()
            )));
        }

        let key = MaterialKey::new(kind, topic_id, day_id);
        trace_materials(MaterialsOperation::Save, &key, self.upsert(&key, artifact)).await?;

        self.cache.invalidate(&key);
        let dropped = self.cache.invalidate_kind(kind);
        tracing::info!(key = %key, dropped, "class material saved");
        Ok(SavedArtifact {
            key,
            artifact: artifact.clone(),
        })
    }

    async fn upsert(&self, key: &MaterialKey, artifact: &Artifact) -> PersistenceResult<()> {
        let headers = self
            .backend
            .request_headers()
            .map_err(PersistenceError::InvalidInput)?;
        let url = self.backend.endpoints.materials_url(key);
        let payload = artifact
            .to_payload()
            .map_err(|error| PersistenceError::InvalidInput(error.to_string()))?;

        client_utils::post_json_created(&self.backend.client, &url, &payload, headers).await
    }
}
