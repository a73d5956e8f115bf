use std::io::Cursor;

use anyhow::{anyhow, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// Plays one-shot sound effects.
///
/// Initialization is graceful: with no output device the system stays usable
/// and every playback request silently degrades, matching how the session
/// treats sound as optional.
pub struct AudioSystem {
    _stream: Option<OutputStream>,
    stream_handle: Option<OutputStreamHandle>,
    available: bool,
}

impl AudioSystem {
    pub fn new() -> Self {
        match OutputStream::try_default() {
            Ok((stream, stream_handle)) => Self {
                _stream: Some(stream),
                stream_handle: Some(stream_handle),
                available: true,
            },
            Err(e) => {
                log::warn!("Failed to initialize audio: {}. Audio will be unavailable.", e);
                Self {
                    _stream: None,
                    stream_handle: None,
                    available: false,
                }
            }
        }
    }

    /// Check if audio is available and working.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Play a one-shot clip from encoded bytes. The clip plays once and
    /// cleans up automatically; multiple clips can overlap.
    pub fn play_clip(&self, bytes: &[u8]) -> Result<()> {
        let stream_handle = self
            .stream_handle
            .as_ref()
            .ok_or_else(|| anyhow!("Audio system is not available"))?;

        // Clone bytes to get the 'static lifetime the decoder wants.
        let cursor = Cursor::new(bytes.to_vec());
        let source =
            Decoder::new(cursor).map_err(|e| anyhow!("Failed to decode sound clip: {}", e))?;

        let sink = Sink::try_new(stream_handle)
            .map_err(|e| anyhow!("Failed to create audio sink: {}", e))?;
        sink.append(source);
        sink.detach();

        Ok(())
    }
}

impl Default for AudioSystem {
    fn default() -> Self {
        Self::new()
    }
}
