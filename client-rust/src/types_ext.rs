use crate::{
    Artifact, ContentKind, DrawingArtifact, Flashcard, FlashcardsArtifact, GameArtifact,
    GenerationBody, GenerationError, GenerationRequest, GenerationResult, MaterialKey,
    StoryArtifact, ThreadId,
};
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

impl ContentKind {
    pub const ALL: [Self; 4] = [Self::Story, Self::Flashcards, Self::Game, Self::Drawing];

    /// Path segment used by the generation and class-materials endpoints.
    #[must_use]
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Flashcards => "flashcards",
            Self::Game => "game",
            Self::Drawing => "blackboard-drawing",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Story => "story",
            Self::Flashcards => "flashcards",
            Self::Game => "game",
            Self::Drawing => "blackboard drawing",
        };
        f.write_str(name)
    }
}

impl GenerationRequest {
    pub fn new(
        content_kind: ContentKind,
        topic_id: impl Into<String>,
        day_id: impl Into<String>,
        classroom_id: impl Into<String>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            content_kind,
            topic_id: topic_id.into(),
            day_id: day_id.into(),
            classroom_id: classroom_id.into(),
            teacher_requirements: None,
            thread_id: thread_id.into(),
            previous_artifact: None,
        }
    }

    #[must_use]
    pub fn with_teacher_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.teacher_requirements = Some(requirements.into());
        self
    }

    #[must_use]
    pub fn with_previous_artifact(mut self, artifact: Artifact) -> Self {
        self.previous_artifact = Some(artifact);
        self
    }

    /// Check the request before anything is sent.
    pub fn validate(&self) -> GenerationResult<()> {
        for (field, value) in [
            ("topic_id", &self.topic_id),
            ("day_id", &self.day_id),
            ("classroom_id", &self.classroom_id),
            ("thread_id", &self.thread_id),
        ] {
            if value.trim().is_empty() {
                return Err(GenerationError::InvalidInput(format!(
                    "{field} must not be empty"
                )));
            }
        }

        match (&self.previous_artifact, self.content_kind) {
            (None, _) | (Some(Artifact::Game(_)), ContentKind::Game) => Ok(()),
            (Some(_), ContentKind::Game) => Err(GenerationError::InvalidInput(
                "previous_artifact must be a game artifact".to_string(),
            )),
            (Some(_), kind) => Err(GenerationError::InvalidInput(format!(
                "previous_artifact is not supported for {kind} generation"
            ))),
        }
    }

    #[must_use]
    pub fn key(&self) -> MaterialKey {
        MaterialKey::new(self.content_kind, &self.topic_id, &self.day_id)
    }

    /// The JSON body posted to the generation endpoint.
    #[must_use]
    pub fn body(&self) -> GenerationBody {
        let previous_game = match &self.previous_artifact {
            Some(Artifact::Game(game)) => Some(game.clone()),
            _ => None,
        };

        GenerationBody {
            classroom_id: self.classroom_id.clone(),
            teacher_requirements: self.teacher_requirements.clone(),
            thread_id: self.thread_id.clone(),
            previous_game,
        }
    }
}

/// Story payloads arrive either as a bare JSON string or as an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoryPayload {
    Text(String),
    Object(StoryArtifact),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlashcardsPayload {
    Cards(Vec<Flashcard>),
    Object(FlashcardsArtifact),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DrawingPayload {
    Url(String),
    Object(DrawingArtifact),
}

impl Artifact {
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Story(_) => ContentKind::Story,
            Self::Flashcards(_) => ContentKind::Flashcards,
            Self::Game(_) => ContentKind::Game,
            Self::Drawing(_) => ContentKind::Drawing,
        }
    }

    /// Decode a JSON-encoded `data` payload into the shape of `kind`.
    pub fn parse(kind: ContentKind, payload: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_value(kind, value)
    }

    pub fn from_value(kind: ContentKind, value: Value) -> Result<Self, serde_json::Error> {
        let artifact = match kind {
            ContentKind::Story => match serde_json::from_value(value)? {
                StoryPayload::Text(text) => Self::Story(StoryArtifact { text }),
                StoryPayload::Object(story) => Self::Story(story),
            },
            ContentKind::Flashcards => match serde_json::from_value(value)? {
                FlashcardsPayload::Cards(cards) => Self::Flashcards(FlashcardsArtifact { cards }),
                FlashcardsPayload::Object(deck) => Self::Flashcards(deck),
            },
            ContentKind::Game => Self::Game(serde_json::from_value(value)?),
            ContentKind::Drawing => match serde_json::from_value(value)? {
                DrawingPayload::Url(image_url) => Self::Drawing(DrawingArtifact { image_url }),
                DrawingPayload::Object(drawing) => Self::Drawing(drawing),
            },
        };
        Ok(artifact)
    }

    /// The kind-specific JSON shape, without the `content_kind` tag, as the
    /// class-materials endpoints store it.
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Story(story) => serde_json::to_value(story),
            Self::Flashcards(deck) => serde_json::to_value(deck),
            Self::Game(game) => serde_json::to_value(game),
            Self::Drawing(drawing) => serde_json::to_value(drawing),
        }
    }
}

impl From<StoryArtifact> for Artifact {
    fn from(value: StoryArtifact) -> Self {
        Self::Story(value)
    }
}

impl From<FlashcardsArtifact> for Artifact {
    fn from(value: FlashcardsArtifact) -> Self {
        Self::Flashcards(value)
    }
}

impl From<GameArtifact> for Artifact {
    fn from(value: GameArtifact) -> Self {
        Self::Game(value)
    }
}

impl From<DrawingArtifact> for Artifact {
    fn from(value: DrawingArtifact) -> Self {
        Self::Drawing(value)
    }
}

impl StoryArtifact {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DrawingArtifact {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
        }
    }
}

impl MaterialKey {
    pub fn new(kind: ContentKind, topic_id: impl Into<String>, day_id: impl Into<String>) -> Self {
        Self {
            kind,
            topic_id: topic_id.into(),
            day_id: day_id.into(),
        }
    }
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@topic:{}/day:{}",
            self.kind.path_segment(),
            self.topic_id,
            self.day_id
        )
    }
}

impl ThreadId {
    /// Start a new refinement chain.
    #[must_use]
    pub fn generate() -> Self {
        let value: u64 = rand::thread_rng().gen();
        Self(format!("thread_{value:016x}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ThreadId> for String {
    fn from(value: ThreadId) -> Self {
        value.0
    }
}
