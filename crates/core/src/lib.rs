//! Core types and traits for the uPOP pipeline
//!
//! This crate provides the foundational types shared by every other crate:
//! - Conversation log (speakers, turns, seeding, transcript rendering)
//! - Song blueprint and its field table
//! - Audio artifact
//! - Language model request/response types
//! - Backend traits (`LanguageModel`, `SoundGenerator`)
//! - Error taxonomy

pub mod audio;
pub mod blueprint;
pub mod conversation;
pub mod error;
pub mod llm_types;
pub mod traits;

pub use audio::{AudioArtifact, AUDIO_MPEG};
pub use blueprint::{required_fields, Blueprint, FieldKind, FieldSpec, BLUEPRINT_FIELDS};
pub use conversation::{Conversation, Speaker, Turn};
pub use error::{Error, Result};
pub use llm_types::{
    FinishReason, GenerateRequest, GenerateResponse, Message, ResponseFormat, Role, TokenUsage,
};
pub use traits::{AudioChunkStream, LanguageModel, SoundGenerator, SoundRequest};
