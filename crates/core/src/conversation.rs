//! Conversation log for a single interview session
//!
//! A `Conversation` is an ordered, append-only sequence of turns. It is seeded
//! with the interviewer's opening greeting and grows two turns at a time as the
//! interview advances. Turns are never edited in place; the only way to shrink
//! a conversation is a wholesale reset back to the opening turn.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The AI producer conducting the interview
    Interviewer,
    /// The artist telling their story
    Artist,
}

impl Speaker {
    /// Label used when the conversation is rendered as a transcript
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Speaker::Interviewer => "Producer",
            Speaker::Artist => "Artist",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Interviewer => write!(f, "interviewer"),
            Speaker::Artist => write!(f, "artist"),
        }
    }
}

/// A single utterance in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    speaker: Speaker,
    text: String,
    sequence: usize,
}

impl Turn {
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 0-based position in the conversation
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// `"Producer: ..."` / `"Artist: ..."`
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.speaker.transcript_label(), self.text)
    }
}

/// Ordered log of turns, always starting with an interviewer turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Start a session with the interviewer's opening greeting
    pub fn seeded(opening: impl Into<String>) -> Result<Self> {
        let opening = opening.into();
        let mut conversation = Self { turns: Vec::new() };
        conversation.push(Speaker::Interviewer, opening)?;
        Ok(conversation)
    }

    /// Rebuild a conversation from caller-supplied `(speaker, text)` pairs
    ///
    /// The list must be non-empty, start with the interviewer, and contain no
    /// blank texts.
    pub fn from_turns<I, S>(turns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Speaker, S)>,
        S: Into<String>,
    {
        let mut conversation = Self { turns: Vec::new() };
        for (speaker, text) in turns {
            if conversation.turns.is_empty() && speaker != Speaker::Interviewer {
                return Err(Error::InvalidInput(
                    "conversation must start with the interviewer".to_string(),
                ));
            }
            conversation.push(speaker, text.into())?;
        }

        if conversation.turns.is_empty() {
            return Err(Error::InvalidInput("conversation is empty".to_string()));
        }

        Ok(conversation)
    }

    /// Append a turn; blank text is rejected
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) -> Result<&Turn> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "turn {} from {} has no text",
                self.turns.len(),
                speaker
            )));
        }

        let sequence = self.turns.len();
        self.turns.push(Turn {
            speaker,
            text,
            sequence,
        });
        Ok(&self.turns[sequence])
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Never true for a constructed conversation; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Drop every turn after the opening greeting
    pub fn reset(&mut self) {
        self.turns.truncate(1);
    }

    /// One line per turn, labelled by speaker
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(Turn::transcript_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
