//! Enum types for Snipspace entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity type discriminator, one per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Space,
    Snippet,
    Note,
    Prompt,
}

impl EntityType {
    /// Lowercase name used for table names and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Space => "space",
            EntityType::Snippet => "snippet",
            EntityType::Note => "note",
            EntityType::Prompt => "prompt",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            EntityType::Space => "Space",
            EntityType::Snippet => "Snippet",
            EntityType::Note => "Note",
            EntityType::Prompt => "Prompt",
        };
        f.write_str(value)
    }
}

/// The kinds of content that live inside a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Snippet,
    Note,
    Prompt,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Snippet, ContentKind::Note, ContentKind::Prompt];

    pub fn entity_type(&self) -> EntityType {
        match self {
            ContentKind::Snippet => EntityType::Snippet,
            ContentKind::Note => EntityType::Note,
            ContentKind::Prompt => EntityType::Prompt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.entity_type().as_str()
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ContentKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snippet" | "snippets" => Ok(ContentKind::Snippet),
            "note" | "notes" => Ok(ContentKind::Note),
            "prompt" | "prompts" => Ok(ContentKind::Prompt),
            _ => Err(ContentKindParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid content kind string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKindParseError(pub String);

impl fmt::Display for ContentKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid content kind: {}", self.0)
    }
}

impl std::error::Error for ContentKindParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_parse_accepts_plural() {
        assert_eq!("Prompts".parse::<ContentKind>(), Ok(ContentKind::Prompt));
        assert_eq!("snippet".parse::<ContentKind>(), Ok(ContentKind::Snippet));
        assert!("space".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_content_kind_maps_to_entity_type() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.as_str(), kind.entity_type().as_str());
        }
    }
}
