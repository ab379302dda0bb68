use crate::capture::recorder::RenderArtifact;
use crate::foundation::error::{WaveclipError, WaveclipResult};

/// Callbacks from the editor to whatever hosts it.
pub trait PlaybackHost {
    fn play_state_changed(&mut self, _playing: bool) {}
    fn time_updated(&mut self, _seconds: f64) {}
    fn duration_changed(&mut self, _seconds: f64) {}
    fn ended(&mut self) {}
    fn render_complete(&mut self, _artifact: &RenderArtifact) {}
}

/// Host that logs every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingHost;

impl PlaybackHost for TracingHost {
    fn play_state_changed(&mut self, playing: bool) {
        tracing::debug!(playing, "play state changed");
    }

    fn time_updated(&mut self, seconds: f64) {
        tracing::trace!(seconds, "time updated");
    }

    fn duration_changed(&mut self, seconds: f64) {
        tracing::debug!(seconds, "duration changed");
    }

    fn ended(&mut self) {
        tracing::debug!("playback ended");
    }

    fn render_complete(&mut self, artifact: &RenderArtifact) {
        tracing::info!(
            frames = artifact.frames,
            duration_s = artifact.duration_s,
            path = ?artifact.path,
            "render complete"
        );
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    PlayState(bool),
    Time(f64),
    Duration(f64),
    Ended,
    RenderComplete(RenderArtifact),
}

/// Host that records callbacks in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventLog {
    pub events: Vec<HostEvent>,
}

impl EventLog {
    /// Events other than the per-frame time updates.
    pub fn significant(&self) -> Vec<&HostEvent> {
        self.events
            .iter()
            .filter(|e| !matches!(e, HostEvent::Time(_)))
            .collect()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.events.iter().rev().find_map(|e| match e {
            HostEvent::Time(t) => Some(*t),
            _ => None,
        })
    }
}

impl PlaybackHost for EventLog {
    fn play_state_changed(&mut self, playing: bool) {
        self.events.push(HostEvent::PlayState(playing));
    }

    fn time_updated(&mut self, seconds: f64) {
        self.events.push(HostEvent::Time(seconds));
    }

    fn duration_changed(&mut self, seconds: f64) {
        self.events.push(HostEvent::Duration(seconds));
    }

    fn ended(&mut self) {
        self.events.push(HostEvent::Ended);
    }

    fn render_complete(&mut self, artifact: &RenderArtifact) {
        self.events.push(HostEvent::RenderComplete(artifact.clone()));
    }
}

/// Playback state of the loaded track, advanced by the frame clock.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    duration: f64,
    position: f64,
    paused: bool,
    ended: bool,
}

impl AudioTrack {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: if duration.is_finite() {
                duration.max(0.0)
            } else {
                0.0
            },
            position: 0.0,
            paused: true,
            ended: false,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn play(&mut self) -> WaveclipResult<()> {
        if self.duration <= 0.0 {
            return Err(WaveclipError::media("audio track has no playable samples"));
        }
        if self.ended || self.position >= self.duration {
            self.position = 0.0;
            self.ended = false;
        }
        self.paused = false;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn seek(&mut self, t: f64) {
        self.position = t.clamp(0.0, self.duration);
        self.ended = false;
    }

    /// Move the playhead by `dt` while playing.
    pub fn advance(&mut self, dt: f64) {
        if self.paused || dt.is_nan() || dt <= 0.0 {
            return;
        }
        self.position += dt;
        if self.position >= self.duration {
            self.position = self.duration;
            self.ended = true;
            self.paused = true;
        }
    }
}

/// Authoritative playback position shared by animation, subtitles, and capture.
///
/// Master time follows the track while it plays and otherwise holds the last seek.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeBase {
    audio: Option<AudioTrack>,
    master_time: f64,
    playing: bool,
}

impl TimeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audio(&self) -> Option<&AudioTrack> {
        self.audio.as_ref()
    }

    /// Bind a new track; playback stops and the playhead returns to 0.
    pub fn set_audio(&mut self, track: AudioTrack, host: &mut dyn PlaybackHost) {
        let duration = track.duration();
        self.audio = Some(track);
        self.master_time = 0.0;
        if self.playing {
            self.playing = false;
            host.play_state_changed(false);
        }
        if duration > 0.0 {
            host.duration_changed(duration);
        }
        host.time_updated(0.0);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_time(&self) -> f64 {
        self.master_time
    }

    pub fn seek(&mut self, t: f64, host: &mut dyn PlaybackHost) {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        self.master_time = t;
        if let Some(audio) = self.audio.as_mut() {
            audio.seek(t);
        }
        host.time_updated(t);
    }

    /// Relative seek, clamped at 0.
    pub fn skip(&mut self, delta: f64, host: &mut dyn PlaybackHost) {
        self.seek(self.master_time + delta, host);
    }

    pub fn play(&mut self, host: &mut dyn PlaybackHost) {
        let result = match self.audio.as_mut() {
            Some(audio) => {
                audio.seek(self.master_time);
                audio.play()
            }
            None => Err(WaveclipError::media("no audio loaded")),
        };
        match result {
            Ok(()) => {
                self.playing = true;
                host.play_state_changed(true);
            }
            Err(e) => {
                tracing::warn!(error = %e, "playback failed to start");
                self.playing = false;
                host.play_state_changed(false);
            }
        }
    }

    pub fn pause(&mut self, host: &mut dyn PlaybackHost) {
        if let Some(audio) = self.audio.as_mut() {
            audio.pause();
        }
        self.playing = false;
        host.play_state_changed(false);
    }

    /// Pause and rewind to 0.
    pub fn stop(&mut self, host: &mut dyn PlaybackHost) {
        if let Some(audio) = self.audio.as_mut() {
            audio.pause();
            audio.seek(0.0);
        }
        self.playing = false;
        self.master_time = 0.0;
        host.play_state_changed(false);
        host.time_updated(0.0);
    }

    /// Advance the track by one frame and sync master time from it.
    ///
    /// Returns whether the track reported `ended`.
    pub fn poll(&mut self, dt: f64) -> bool {
        let Some(audio) = self.audio.as_mut() else {
            return false;
        };
        let was_playing = !audio.paused();
        audio.advance(dt);
        if was_playing {
            self.master_time = audio.position();
        }
        audio.ended()
    }

    /// Pin master time to `t` without notifying the host. Capture drives time this way.
    pub fn lock_to(&mut self, t: f64) {
        let t = if t.is_finite() { t.max(0.0) } else { 0.0 };
        self.master_time = t;
        if let Some(audio) = self.audio.as_mut() {
            audio.seek(t);
        }
    }

    /// Host-side end of playback: the clock stops where it is.
    pub fn mark_ended(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            audio.pause();
        }
        self.playing = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
