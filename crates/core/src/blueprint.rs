//! Song blueprint: the structured creative brief distilled from an interview

use serde::{Deserialize, Serialize};

/// Value shape of a blueprint field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextList,
}

/// Static description of one blueprint field
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

/// Every blueprint field, in canonical order
pub const BLUEPRINT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "core_emotion",
        kind: FieldKind::Text,
        required: true,
        description: "The central, specific emotion of the story (e.g., 'bittersweet nostalgia').",
    },
    FieldSpec {
        name: "singing_to",
        kind: FieldKind::Text,
        required: false,
        description: "Who the song is addressed to (e.g., 'my past self').",
    },
    FieldSpec {
        name: "narrative_summary",
        kind: FieldKind::Text,
        required: true,
        description: "A brief 2-3 sentence summary of the story's plot (e.g., 'After a bad date, the artist drives home alone at 2 AM and realizes the relationship is over, feeling lighter than expected.').",
    },
    FieldSpec {
        name: "key_metaphor_or_image",
        kind: FieldKind::Text,
        required: false,
        description: "A powerful, recurring image or metaphor from the story (e.g., 'a house of cards').",
    },
    FieldSpec {
        name: "sonic_vibe",
        kind: FieldKind::Text,
        required: true,
        description: "The overall mood and feel of the music (e.g., 'driving alone at 2 AM').",
    },
    FieldSpec {
        name: "tempo_and_energy",
        kind: FieldKind::Text,
        required: false,
        description: "The song's pace and energy (e.g., 'mid-tempo, around 110 BPM, with a driving beat').",
    },
    FieldSpec {
        name: "instrumentation_ideas",
        kind: FieldKind::TextList,
        required: false,
        description: "Suggested instruments or sounds (e.g., 'dreamy synth pads').",
    },
    FieldSpec {
        name: "vocal_style",
        kind: FieldKind::Text,
        required: false,
        description: "The desired style of the vocals (e.g., 'raw and vulnerable').",
    },
    FieldSpec {
        name: "artist_purpose",
        kind: FieldKind::Text,
        required: true,
        description: "The artist's core reason for needing to tell this story (e.g., 'to finally let go of a relationship that was holding them back').",
    },
];

/// Names of the required fields, in canonical order
pub fn required_fields() -> impl Iterator<Item = &'static str> {
    BLUEPRINT_FIELDS
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
}

/// Structured creative brief
///
/// Optional fields are always materialized as empty string / empty list,
/// never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    pub core_emotion: String,
    #[serde(default)]
    pub singing_to: String,
    pub narrative_summary: String,
    #[serde(default)]
    pub key_metaphor_or_image: String,
    pub sonic_vibe: String,
    #[serde(default)]
    pub tempo_and_energy: String,
    #[serde(default)]
    pub instrumentation_ideas: Vec<String>,
    #[serde(default)]
    pub vocal_style: String,
    pub artist_purpose: String,
}

impl Blueprint {
    /// Required fields that are empty or whitespace-only, in canonical order
    pub fn missing_required(&self) -> Vec<&'static str> {
        required_fields().filter(|name| self.is_blank(name)).collect()
    }

    /// Whether the named field holds no content; unknown names count as blank
    pub fn is_blank(&self, name: &str) -> bool {
        let text = match name {
            "core_emotion" => &self.core_emotion,
            "singing_to" => &self.singing_to,
            "narrative_summary" => &self.narrative_summary,
            "key_metaphor_or_image" => &self.key_metaphor_or_image,
            "sonic_vibe" => &self.sonic_vibe,
            "tempo_and_energy" => &self.tempo_and_energy,
            "instrumentation_ideas" => {
                return self.instrumentation_ideas.iter().all(|i| i.trim().is_empty())
            },
            "vocal_style" => &self.vocal_style,
            "artist_purpose" => &self.artist_purpose,
            _ => return true,
        };
        text.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}
