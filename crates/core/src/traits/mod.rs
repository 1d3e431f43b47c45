//! Pluggable backend traits
//!
//! ```text
//!   - LanguageModel: chat and structured generation (Gemini)
//!   - SoundGenerator: prompt -> streamed audio chunks (ElevenLabs)
//! ```
//!
//! Both are object safe and shared as `Arc<dyn _>` so tests can swap in mocks.

mod llm;
mod sound;

pub use llm::LanguageModel;
pub use sound::{AudioChunkStream, SoundGenerator, SoundRequest};
