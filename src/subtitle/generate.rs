use std::path::Path;
use std::process::{Command, Stdio};

use crate::foundation::error::{WaveclipError, WaveclipResult};
use crate::subtitle::sanitize::{RawSubtitle, parse_raw};

/// Environment variable holding the default generator command line.
pub const SUBTITLE_CMD_ENV: &str = "WAVECLIP_SUBTITLE_CMD";

/// Transcribes an audio file into timed lyric lines.
///
/// Output is untrusted; callers run it through [`crate::subtitle::sanitize::sanitize`].
pub trait SubtitleGenerator {
    fn generate(&mut self, audio: &Path) -> WaveclipResult<Vec<RawSubtitle>>;
}

/// External program that receives the audio path as its last argument and prints a JSON array
/// of `{text, startTime, endTime}` on stdout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandGenerator {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line.
    ///
    /// Quotes are not interpreted; use [`CommandGenerator::from_argv`] for arguments that
    /// contain spaces.
    pub fn parse(cmdline: &str) -> WaveclipResult<Self> {
        let parts: Vec<&str> = cmdline.split_whitespace().collect();
        Self::from_argv(&parts)
    }

    /// Program followed by its arguments, each kept verbatim.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> WaveclipResult<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| WaveclipError::subtitle("generator command is empty"))?;
        Ok(Self::new(
            program.as_ref(),
            args.iter().map(|a| a.as_ref().to_owned()).collect(),
        ))
    }

    /// Command from `WAVECLIP_SUBTITLE_CMD`, if set.
    pub fn from_env() -> WaveclipResult<Self> {
        let cmd = std::env::var(SUBTITLE_CMD_ENV).map_err(|_| {
            WaveclipError::subtitle(format!("{SUBTITLE_CMD_ENV} is not set"))
        })?;
        Self::parse(&cmd)
    }
}

impl SubtitleGenerator for CommandGenerator {
    #[tracing::instrument(skip(self), fields(program = %self.program))]
    fn generate(&mut self, audio: &Path) -> WaveclipResult<Vec<RawSubtitle>> {
        let out = Command::new(&self.program)
            .args(&self.args)
            .arg(audio)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                WaveclipError::subtitle(format!("failed to spawn '{}': {e}", self.program))
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(WaveclipError::subtitle(format!(
                "'{}' exited with status {}: {}",
                self.program,
                out.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&out.stdout);
        let raw = parse_raw(stdout.trim())
            .map_err(|e| WaveclipError::subtitle(format!("generator output is not valid: {e}")))?;
        tracing::info!(lines = raw.len(), "subtitle generator finished");
        Ok(raw)
    }
}
