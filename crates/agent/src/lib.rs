//! Interview-to-audio pipeline stages
//!
//! Features:
//! - Interview controller: one chat turn against the conversational model
//! - Blueprint extractor: schema-constrained JSON extraction with repair
//! - Synthesis compiler: blueprint -> prompt -> reassembled audio artifact
//!
//! Every stage is `Send + Sync` and holds its backend behind an `Arc<dyn _>`,
//! so one instance serves any number of independent conversations.

pub mod extraction;
pub mod interview;
pub mod synthesis;

pub use extraction::BlueprintExtractor;
pub use interview::InterviewController;
pub use synthesis::{compile_prompt, reassemble, SynthesisCompiler};
