use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WaveclipError, WaveclipResult};
use crate::render::surface::FrameRGBA;

/// Result of a finished capture.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderArtifact {
    /// Written file, when the sink writes one.
    pub path: Option<PathBuf>,
    pub frames: u64,
    pub duration_s: f64,
}

/// `waveclip-render-<unix millis>.webm`
pub fn artifact_file_name(now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("waveclip-render-{millis}.webm")
}

/// Pushes captured frames into a sink and finalizes it into a [`RenderArtifact`].
pub struct Recorder<'s> {
    sink: Box<dyn FrameSink + 's>,
    fps: u32,
    next: FrameIndex,
}

impl std::fmt::Debug for Recorder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("fps", &self.fps)
            .field("frames", &self.next.0)
            .finish_non_exhaustive()
    }
}

impl<'s> Recorder<'s> {
    /// Begin the sink and return a recorder ready for frames.
    pub fn start(mut sink: Box<dyn FrameSink + 's>, cfg: SinkConfig) -> WaveclipResult<Self> {
        if cfg.fps == 0 {
            return Err(WaveclipError::validation("capture fps must be non-zero"));
        }
        let fps = cfg.fps;
        sink.begin(cfg)?;
        tracing::debug!(fps, "capture started");
        Ok(Self {
            sink,
            fps,
            next: FrameIndex(0),
        })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frames captured so far.
    pub fn frames(&self) -> u64 {
        self.next.0
    }

    pub fn capture(&mut self, frame: &FrameRGBA) -> WaveclipResult<()> {
        self.sink.push_frame(self.next, frame)?;
        self.next = FrameIndex(self.next.0 + 1);
        Ok(())
    }

    /// End the sink. Frames already pushed are kept.
    pub fn finish(mut self) -> WaveclipResult<RenderArtifact> {
        let path = self.sink.end()?;
        let frames = self.next.0;
        Ok(RenderArtifact {
            path,
            frames,
            duration_s: frames as f64 / f64::from(self.fps),
        })
    }
}
