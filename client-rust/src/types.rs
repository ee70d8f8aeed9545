use serde::{Deserialize, Serialize};

/// The kind of class material produced by a generation session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Story,
    Flashcards,
    Game,
    /// A blackboard drawing.
    Drawing,
}

/// A request to generate one piece of class material for a topic day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct GenerationRequest {
    pub content_kind: ContentKind,
    pub topic_id: String,
    pub day_id: String,
    pub classroom_id: String,
    /// Free-form guidance from the teacher, forwarded verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_requirements: Option<String>,
    /// Correlates a chain of refinement requests on the backend.
    pub thread_id: String,
    /// The artifact to refine. Only accepted for [`ContentKind::Game`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_artifact: Option<Artifact>,
}

/// Body posted to a generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct GenerationBody {
    pub classroom_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_requirements: Option<String>,
    pub thread_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_game: Option<GameArtifact>,
}

/// Generated teaching material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(tag = "content_kind", rename_all = "kebab-case")]
pub enum Artifact {
    Story(StoryArtifact),
    Flashcards(FlashcardsArtifact),
    Game(GameArtifact),
    Drawing(DrawingArtifact),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct StoryArtifact {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct FlashcardsArtifact {
    pub cards: Vec<Flashcard>,
}

/// One card of a flashcard deck.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Flashcard {
    /// The word or concept revealed when the card is turned.
    pub reveal_text: String,
    /// What the picture on the card should show.
    pub visual_description: String,
    pub explanation: String,
    /// A hint the teacher can read out before revealing the card.
    pub teacher_clue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

/// A classroom game definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct GameArtifact {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    /// How a round is played.
    pub play: String,
    /// The learning goal the game serves.
    pub purpose: String,
}

/// A reference to a generated blackboard drawing. The URL may be a
/// `data:` URL carrying the image inline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DrawingArtifact {
    pub image_url: String,
}

/// Key under which at most one artifact is persisted. A new save overwrites
/// the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct MaterialKey {
    pub kind: ContentKind,
    pub topic_id: String,
    pub day_id: String,
}

/// An artifact together with the key it is persisted under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct SavedArtifact {
    pub key: MaterialKey,
    pub artifact: Artifact,
}

/// Decoded bytes of an inline image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Correlation id for a chain of related generation requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct ThreadId(pub String);
