use crate::{ContentKind, MaterialKey};

/// Path shape used for generation requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EndpointLayout {
    /// `/api/topics/{topic_id}/days/{day_id}/{kind}` for every kind.
    #[default]
    Uniform,
    /// Stories are generated at
    /// `/api/day/{day_id}/topic/{topic_id}/class-materials/story`, the other
    /// kinds as in [`EndpointLayout::Uniform`]. For backends that still
    /// serve the older story route.
    Legacy,
}

/// URL builder for the generation and class-materials routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
    layout: EndpointLayout,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>, layout: EndpointLayout) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            layout,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Where a generation attempt is posted.
    #[must_use]
    pub fn generation_url(&self, kind: ContentKind, topic_id: &str, day_id: &str) -> String {
        match (self.layout, kind) {
            (EndpointLayout::Legacy, ContentKind::Story) => format!(
                "{}/api/day/{day_id}/topic/{topic_id}/class-materials/story",
                self.base_url
            ),
            _ => format!(
                "{}/api/topics/{topic_id}/days/{day_id}/{}",
                self.base_url,
                kind.path_segment()
            ),
        }
    }

    /// The persisted class material for a key. Saved with `POST`, read with
    /// `GET`.
    #[must_use]
    pub fn materials_url(&self, key: &MaterialKey) -> String {
        format!(
            "{}/api/topics/{}/days/{}/class-materials/{}",
            self.base_url,
            key.topic_id,
            key.day_id,
            key.kind.path_segment()
        )
    }
}
