//! Sound generation trait

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::Result;

/// Ordered stream of binary audio chunks; any item may fail mid-stream
pub type AudioChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Parameters for one sound generation call
#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub text: String,
    pub duration_seconds: f32,
    /// 0.0 - 1.0, how literally the model follows the prompt
    pub prompt_influence: f32,
}

/// Text-to-sound interface
#[async_trait]
pub trait SoundGenerator: Send + Sync + 'static {
    /// Start a generation and return its chunk stream
    ///
    /// Errors before the first byte (auth, HTTP status) are returned directly;
    /// transport errors after that surface as stream items.
    async fn generate(&self, request: SoundRequest) -> Result<AudioChunkStream>;

    async fn is_available(&self) -> bool;

    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    struct MockSound;

    #[async_trait]
    impl SoundGenerator for MockSound {
        async fn generate(&self, request: SoundRequest) -> Result<AudioChunkStream> {
            let chunks = vec![Ok(Bytes::from(request.text.into_bytes()))];
            Ok(Box::pin(futures::stream::iter(chunks)))
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "mock-sound"
        }
    }

    #[tokio::test]
    async fn test_mock_sound_streams_chunks() {
        let sound = MockSound;
        let mut stream = sound
            .generate(SoundRequest {
                text: "abc".to_string(),
                duration_seconds: 7.0,
                prompt_influence: 0.7,
            })
            .await
            .unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.as_ref(), b"abc");
        assert!(stream.next().await.is_none());
    }
}
