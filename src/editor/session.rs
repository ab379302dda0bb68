use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::audio::decode::{AudioPcm, DEFAULT_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::audio::pipeline::AudioPipeline;
use crate::capture::recorder::{Recorder, RenderArtifact};
use crate::editor::state::EditorState;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::error::{WaveclipError, WaveclipResult};
use crate::playback::clock::{AudioTrack, PlaybackHost, TimeBase};
use crate::render::compositor::{Compositor, FrameInputs};
use crate::render::surface::FrameRGBA;
use crate::scene::model::Project;
use crate::subtitle::generate::SubtitleGenerator;
use crate::subtitle::sanitize::sanitize;
use crate::subtitle::timeline::{SubtitleTimeline, total_duration};

static TAP_COUNTER: AtomicU64 = AtomicU64::new(0);

struct ActiveRender<'s> {
    recorder: Recorder<'s>,
    tap: Option<PathBuf>,
}

/// One editing session: document state, playback clock, analysis, compositor, and capture.
///
/// `tick` is the frame step; it never runs concurrently with itself.
pub struct Editor<'s, H: PlaybackHost> {
    state: EditorState,
    clock: TimeBase,
    audio: Option<AudioPipeline>,
    compositor: Compositor,
    render: Option<ActiveRender<'s>>,
    last_artifact: Option<RenderArtifact>,
    host: H,
}

impl<H: PlaybackHost + std::fmt::Debug> std::fmt::Debug for Editor<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("time", &self.clock.current_time())
            .field("playing", &self.clock.is_playing())
            .field("rendering", &self.state.rendering)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl<'s, H: PlaybackHost> Editor<'s, H> {
    /// Build a session and register the project fonts.
    pub fn new(state: EditorState, host: H) -> WaveclipResult<Self> {
        state.canvas.validate()?;
        let mut compositor = Compositor::new(state.canvas)?;
        compositor.register_fonts(&state.fonts)?;
        Ok(Self {
            state,
            clock: TimeBase::new(),
            audio: None,
            compositor,
            render: None,
            last_artifact: None,
            host,
        })
    }

    /// Session for a project file, decoding its audio when one is set.
    pub fn open(project: &Project, host: H) -> WaveclipResult<Self> {
        let mut editor = Self::new(EditorState::from_project(project), host)?;
        if let Some(audio) = project.audio.as_deref() {
            // Loading audio clears subtitles; restore the project's own.
            let subtitles = editor.state.subtitles.clone();
            editor.load_audio(audio)?;
            editor.state.subtitles = subtitles;
        }
        Ok(editor)
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Playback ceiling for the loaded audio and subtitles.
    pub fn total_duration(&self) -> f64 {
        let audio = self.clock.audio().map_or(0.0, AudioTrack::duration);
        total_duration(audio, &self.state.subtitles)
    }

    /// Decode an audio file with ffmpeg and bind it.
    pub fn load_audio(&mut self, path: &Path) -> WaveclipResult<()> {
        let pcm = decode_audio_f32_stereo(path, DEFAULT_SAMPLE_RATE)?;
        self.bind_audio(Arc::new(pcm), Some(path.to_path_buf()));
        Ok(())
    }

    /// Bind already decoded audio.
    pub fn load_audio_pcm(&mut self, pcm: Arc<AudioPcm>) {
        self.bind_audio(pcm, None);
    }

    fn bind_audio(&mut self, pcm: Arc<AudioPcm>, source: Option<PathBuf>) {
        let duration = pcm.duration_s();
        match self.audio.as_mut() {
            Some(pipeline) => pipeline.rebind(pcm),
            None => self.audio = Some(AudioPipeline::new(pcm)),
        }
        // New audio invalidates timings made against the old track.
        self.state.subtitles.clear();
        self.state.audio_source = source;
        self.state.tap_sync = false;
        self.clock
            .set_audio(AudioTrack::new(duration), &mut self.host);
        tracing::info!(duration_s = duration, "audio loaded");
    }

    pub fn play(&mut self) {
        if self.audio.is_none() {
            return;
        }
        self.clock.play(&mut self.host);
    }

    pub fn pause(&mut self) {
        self.clock.pause(&mut self.host);
    }

    pub fn toggle_play(&mut self) {
        if self.clock.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn stop(&mut self) {
        self.clock.stop(&mut self.host);
        self.state.tap_sync = false;
    }

    pub fn seek(&mut self, t: f64) {
        self.clock.seek(t, &mut self.host);
    }

    pub fn skip(&mut self, delta: f64) {
        self.clock.skip(delta, &mut self.host);
    }

    /// Enter or leave tap-to-sync mode, playing while it is on.
    ///
    /// Returns the new mode; stays off when there are no subtitles.
    pub fn toggle_tap_sync(&mut self) -> bool {
        if self.state.subtitles.is_empty() {
            return false;
        }
        self.state.tap_sync = !self.state.tap_sync;
        if self.state.tap_sync {
            self.play();
        } else {
            self.pause();
        }
        self.state.tap_sync
    }

    /// Retime line `i` to the playhead. Ignored outside tap-to-sync mode.
    pub fn tap(&mut self, i: usize) -> bool {
        if !self.state.tap_sync {
            return false;
        }
        let now = self.clock.current_time();
        self.state.subtitles.tap_sync(i, now)
    }

    /// Run the generator against the loaded audio file and replace the subtitles.
    ///
    /// The in-progress flag is cleared whether or not generation succeeds.
    #[tracing::instrument(skip_all)]
    pub fn generate_subtitles(
        &mut self,
        generator: &mut dyn SubtitleGenerator,
    ) -> WaveclipResult<usize> {
        let audio = self
            .state
            .audio_source
            .clone()
            .ok_or_else(|| WaveclipError::validation("no audio file loaded"))?;
        self.state.generating_subtitles = true;
        let result = generator.generate(&audio);
        self.state.generating_subtitles = false;

        let raw = result.inspect_err(|e| tracing::warn!(error = %e, "subtitle generation failed"))?;
        let subs = sanitize(raw);
        let count = subs.len();
        let offset = self.state.subtitles.offset();
        self.state.subtitles = SubtitleTimeline::new(subs, offset);
        tracing::info!(count, "subtitles generated");
        Ok(count)
    }

    pub fn is_rendering(&self) -> bool {
        self.render.is_some()
    }

    pub fn last_artifact(&self) -> Option<&RenderArtifact> {
        self.last_artifact.as_ref()
    }

    /// Start capturing into `sink`: rewind to 0, start playback, begin the sink.
    #[tracing::instrument(skip_all)]
    pub fn start_render(&mut self, sink: impl FrameSink + 's) -> WaveclipResult<()> {
        if self.render.is_some() {
            return Err(WaveclipError::validation("a render is already in progress"));
        }
        let Some(pipeline) = self.audio.as_ref() else {
            return Err(WaveclipError::validation("rendering requires loaded audio"));
        };
        if pipeline.pcm().duration_s() <= 0.0 {
            return Err(WaveclipError::validation("loaded audio is empty"));
        }

        let total = self.total_duration();
        let tap = std::env::temp_dir().join(format!(
            "waveclip-tap-{}-{}.f32le",
            std::process::id(),
            TAP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        pipeline.write_export_tap(&tap, total)?;
        let audio = AudioInputConfig {
            path: tap.clone(),
            sample_rate: pipeline.pcm().sample_rate,
            channels: pipeline.pcm().channels,
        };
        let cfg = SinkConfig {
            width: self.state.canvas.width,
            height: self.state.canvas.height,
            fps: self.state.fps,
            audio: Some(audio),
        };

        let recorder = match Recorder::start(Box::new(sink), cfg) {
            Ok(r) => r,
            Err(e) => {
                remove_tap(&tap);
                return Err(e);
            }
        };

        self.clock.seek(0.0, &mut self.host);
        self.clock.play(&mut self.host);
        self.render = Some(ActiveRender {
            recorder,
            tap: Some(tap),
        });
        self.state.rendering = true;
        self.last_artifact = None;
        tracing::info!(total_s = total, fps = self.state.fps, "render started");
        Ok(())
    }

    /// Finalize the capture and notify the host. `None` when nothing was rendering.
    pub fn stop_render(&mut self) -> WaveclipResult<Option<RenderArtifact>> {
        let Some(active) = self.render.take() else {
            return Ok(None);
        };
        self.state.rendering = false;
        self.clock.pause(&mut self.host);

        let result = active.recorder.finish();
        if let Some(tap) = active.tap.as_deref() {
            remove_tap(tap);
        }
        let artifact = result?;
        self.host.render_complete(&artifact);
        self.last_artifact = Some(artifact.clone());
        Ok(Some(artifact))
    }

    /// User abort. Frames already captured are kept and finalized.
    pub fn cancel_render(&mut self) -> WaveclipResult<Option<RenderArtifact>> {
        if self.render.is_some() {
            tracing::info!("render cancelled");
        }
        self.stop_render()
    }

    /// Drive a full capture into `sink` at the project frame rate.
    #[tracing::instrument(skip_all)]
    pub fn export(&mut self, sink: impl FrameSink + 's) -> WaveclipResult<RenderArtifact> {
        self.start_render(sink)?;
        let fps = f64::from(self.state.fps);
        let dt = 1.0 / fps;
        let ceiling = (self.total_duration() * fps).ceil() as u64 + u64::from(self.state.fps);

        let mut ticks = 0u64;
        while self.render.is_some() && ticks < ceiling {
            if let Err(e) = self.tick(dt) {
                let _ = self.stop_render();
                return Err(e);
            }
            ticks += 1;
        }
        if self.render.is_some() {
            tracing::warn!(ticks, "frame ceiling reached; finalizing render");
            self.stop_render()?;
        }
        self.last_artifact
            .clone()
            .ok_or_else(|| WaveclipError::encode("render finished without an artifact"))
    }

    /// One frame: sync the clock, draw, capture, and handle the end of playback.
    ///
    /// While rendering, `dt` is ignored and time follows the captured frame index.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&mut self, dt: f64) -> WaveclipResult<()> {
        if self.render.is_some() {
            return self.capture_tick();
        }
        let track_ended = self.clock.poll(dt);
        let time = self.clock.current_time();
        let playing = self.clock.is_playing();
        let total = self.total_duration();
        let reached_end = playing && (track_ended || (total > 0.0 && time >= total));
        self.host.time_updated(time);

        self.draw(time, playing)?;
        if reached_end {
            self.end_playback();
        }
        Ok(())
    }

    /// Frame `n` is drawn at `n / fps`; the render ends once the next frame would start at or
    /// past the end of the track or the total duration.
    fn capture_tick(&mut self) -> WaveclipResult<()> {
        let Some(active) = self.render.as_ref() else {
            return Ok(());
        };
        let fps = f64::from(active.recorder.fps());
        let time = active.recorder.frames() as f64 / fps;
        self.clock.lock_to(time);
        let playing = self.clock.is_playing();
        self.host.time_updated(time);

        self.draw(time, playing)?;
        let frame = self.compositor.snapshot();
        let Some(active) = self.render.as_mut() else {
            return Ok(());
        };
        active.recorder.capture(&frame)?;

        let next = active.recorder.frames() as f64 / fps;
        let track_end = self.clock.audio().map_or(0.0, AudioTrack::duration);
        let end = track_end.min(self.total_duration());
        if playing && next >= end {
            self.end_playback();
            self.stop_render()?;
        }
        Ok(())
    }

    fn end_playback(&mut self) {
        self.clock.mark_ended();
        self.state.tap_sync = false;
        self.host.ended();
        self.host.play_state_changed(false);
    }

    /// Draw the frame at `time` without touching the clock.
    pub fn draw_at(&mut self, time: f64, playing: bool) -> WaveclipResult<FrameRGBA> {
        self.draw(time, playing)?;
        Ok(self.compositor.snapshot())
    }

    /// The most recently drawn frame.
    pub fn frame(&self) -> FrameRGBA {
        self.compositor.snapshot()
    }

    fn draw(&mut self, time: f64, playing: bool) -> WaveclipResult<()> {
        let analysis = match self.audio.as_mut() {
            Some(pipeline) => Some(pipeline.analyse(time, playing)?),
            None => None,
        };
        let inputs = FrameInputs {
            time,
            playing,
            beat_scale: analysis.as_ref().map_or(1.0, |a| a.beat_scale),
            spectrum: analysis.as_ref().map(|a| a.bins.as_slice()),
            seed: self.state.seed,
        };
        self.compositor.draw_frame(&self.state.scene(), &inputs)?;
        Ok(())
    }
}

fn remove_tap(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::debug!(path = %path.display(), error = %e, "export tap not removed");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
