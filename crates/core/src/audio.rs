//! Synthesized audio artifact

use bytes::Bytes;

/// Media type of every artifact the sound backend produces
pub const AUDIO_MPEG: &str = "audio/mpeg";

/// One contiguous, fully assembled audio buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    bytes: Bytes,
    media_type: &'static str,
}

impl AudioArtifact {
    /// Wrap an assembled MPEG buffer
    pub fn mpeg(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: AUDIO_MPEG,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    /// Byte length, used verbatim as `Content-Length`
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpeg_artifact() {
        let artifact = AudioArtifact::mpeg(vec![1u8, 2, 3]);
        assert_eq!(artifact.media_type(), "audio/mpeg");
        assert_eq!(artifact.len(), 3);
        assert_eq!(artifact.into_bytes().as_ref(), &[1, 2, 3]);
    }
}
