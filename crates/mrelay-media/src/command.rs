//! FFmpeg command builder and runner.
//!
//! Commands are always spawned with a discrete argument vector. Nothing here
//! goes through a shell, so paths and parameters are never re-tokenized.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path (absent for probes)
    output: Option<PathBuf>,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: Some(output.as_ref().to_path_buf()),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
        }
    }

    /// Create a metadata probe (`ffmpeg -i <input>` with no output).
    ///
    /// FFmpeg exits non-zero for this form but still prints the stream
    /// summary, including the `Duration:` line.
    pub fn probe(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: None,
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: false,
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Copy all streams without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Drop the video stream.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Output path, if this is not a probe.
    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }
        args.push("-hide_banner".to_string());
        args.push("-nostdin".to_string());

        args.extend(self.input_args.iter().cloned());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.iter().cloned());

        if let Some(ref output) = self.output {
            args.push(output.to_string_lossy().to_string());
        }

        args
    }
}

/// How a non-zero exit status is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// A real transform; non-zero exit is a failure.
    Transform,
    /// Metadata-only; the output is returned whatever the exit code.
    Probe,
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// stdout followed by stderr
    pub text: String,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runner for FFmpeg commands with hard timeouts.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    program: PathBuf,
    transform_timeout: Duration,
    probe_timeout: Duration,
}

impl FfmpegRunner {
    /// Create a runner for the given binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let defaults = MediaConfig::default();
        Self {
            program: program.into(),
            transform_timeout: defaults.transform_timeout,
            probe_timeout: defaults.probe_timeout,
        }
    }

    /// Create a runner from media configuration.
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.ffmpeg_path.clone())
            .with_transform_timeout(config.transform_timeout)
            .with_probe_timeout(config.probe_timeout)
    }

    /// Set the transform timeout.
    pub fn with_transform_timeout(mut self, timeout: Duration) -> Self {
        self.transform_timeout = timeout;
        self
    }

    /// Set the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// The binary this runner invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run a transform. Non-zero exit is [`MediaError::FfmpegFailed`].
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutput> {
        self.invoke(&cmd.build_args(), InvocationKind::Transform).await
    }

    /// Run a probe and return its diagnostic text regardless of exit code.
    pub async fn probe(&self, cmd: &FfmpegCommand) -> MediaResult<ToolOutput> {
        self.invoke(&cmd.build_args(), InvocationKind::Probe).await
    }

    /// Spawn the binary with `args`, enforcing the timeout for `kind`.
    ///
    /// On expiry the child is killed and reaped before returning
    /// [`MediaError::Timeout`].
    pub async fn invoke(&self, args: &[String], kind: InvocationKind) -> MediaResult<ToolOutput> {
        let timeout = match kind {
            InvocationKind::Transform => self.transform_timeout,
            InvocationKind::Probe => self.probe_timeout,
        };

        debug!(
            program = %self.program.display(),
            kind = ?kind,
            "Running FFmpeg: {}",
            args.join(" ")
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MediaError::FfmpegNotFound(self.program.clone()),
                _ => MediaError::Io(e),
            })?;

        // Drain both pipes concurrently so a chatty child never blocks on a full pipe
        let stdout_task = tokio::spawn(read_pipe(child.stdout.take()));
        let stderr_task = tokio::spawn(read_pipe(child.stderr.take()));

        let start = Instant::now();
        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    program = %self.program.display(),
                    "FFmpeg timed out after {:?}, killing process",
                    timeout
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out FFmpeg process: {}", e);
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(MediaError::Timeout(timeout));
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        let output = ToolOutput {
            text: combine_output(&stdout, &stderr),
            exit_code: status.code(),
            elapsed: start.elapsed(),
        };

        if kind == InvocationKind::Transform && !status.success() {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg exited with non-zero status",
                output.text,
                output.exit_code,
            ));
        }

        Ok(output)
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            debug!("Failed to read child output: {}", e);
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn combine_output(stdout: &str, stderr: &str) -> String {
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, _) => stderr.to_string(),
        (_, true) => stdout.to_string(),
        _ => format!("{}\n{}", stdout.trim_end(), stderr),
    }
}

/// Check that the configured FFmpeg binary can be resolved.
pub fn check_ffmpeg(program: &Path) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::FfmpegNotFound(program.to_path_buf()))
}
