use crate::{
    client_utils,
    opentelemetry::{trace_materials, MaterialsOperation},
    options::{Backend, BackendOptions},
    Artifact, ContentKind, MaterialKey, PersistenceError, PersistenceResult,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

#[derive(Default)]
struct CacheState {
    /// `None` records a confirmed "not found".
    entries: HashMap<MaterialKey, Option<Artifact>>,
    /// Bumped on every invalidation so that a fetch started before the
    /// invalidation does not store its stale result.
    epoch: u64,
}

/// Reads persisted class materials and remembers the answers until they are
/// invalidated.
pub struct ReadCache {
    backend: Backend,
    state: Mutex<CacheState>,
}

impl ReadCache {
    #[must_use]
    pub fn new(options: BackendOptions) -> Self {
        Self {
            backend: Backend::new(options),
            state: Mutex::new(CacheState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the artifact saved for `(kind, topic_id, day_id)`.
    /// Resolves to `Ok(None)` when nothing has been saved under the key.
    pub async fn fetch(
        &self,
        kind: ContentKind,
        topic_id: &str,
        day_id: &str,
    ) -> PersistenceResult<Option<Artifact>> {
        let key = MaterialKey::new(kind, topic_id, day_id);

        let epoch = {
            let state = self.state();
            if let Some(entry) = state.entries.get(&key) {
                tracing::debug!(key = %key, "class material served from cache");
                return Ok(entry.clone());
            }
            state.epoch
        };

        let artifact = trace_materials(MaterialsOperation::Fetch, &key, self.load(&key)).await?;

        let mut state = self.state();
        if state.epoch == epoch {
            state.entries.insert(key, artifact.clone());
        }
        Ok(artifact)
    }

    async fn load(&self, key: &MaterialKey) -> PersistenceResult<Option<Artifact>> {
        let headers = self
            .backend
            .request_headers()
            .map_err(PersistenceError::InvalidInput)?;
        let url = self.backend.endpoints.materials_url(key);

        let Some(value) =
            client_utils::get_json_optional::<Value>(&self.backend.client, &url, headers).await?
        else {
            tracing::debug!(key = %key, "no class material saved");
            return Ok(None);
        };

        Artifact::from_value(key.kind, value)
            .map(Some)
            .map_err(|error| PersistenceError::Decode {
                kind: key.kind,
                message: error.to_string(),
            })
    }

    /// The cached answer for a key without touching the backend.
    /// The outer `None` means the key is not cached.
    #[must_use]
    #[allow(clippy::option_option)]
    pub fn cached(&self, key: &MaterialKey) -> Option<Option<Artifact>> {
        self.state().entries.get(key).cloned()
    }

    /// Drop the entry for one key. Returns whether an entry was cached.
    pub fn invalidate(&self, key: &MaterialKey) -> bool {
        let mut state = self.state();
        state.epoch += 1;
        state.entries.remove(key).is_some()
    }

    /// Drop every entry of `kind`. Returns how many entries were removed.
    pub fn invalidate_kind(&self, kind: ContentKind) -> usize {
        let mut state = self.state();
        state.epoch += 1;
        let before = state.entries.len();
        state.entries.retain(|key, _| key.kind != kind);
        before - state.entries.len()
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.epoch += 1;
        state.entries.clear();
    }
}
