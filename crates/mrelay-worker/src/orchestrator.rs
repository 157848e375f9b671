//! Per-request transform jobs.
//!
//! Each public method runs one job end to end: allocate temp paths, fetch
//! the source, run at most one transform, publish the result. The job's
//! [`TempSet`] is released on success and on every failure before the
//! result is returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use mrelay_media::{
    burn_captions_command, extract_mp3_command, probe_media, trim_command, trim_target,
    FfmpegCommand, FfmpegRunner, MediaConfig, MediaError, MediaResult, ProbeReport,
    RemoteFetcher,
};
use mrelay_models::{
    is_video_key, join_key, sanitize_filename, sanitize_folder, sanitize_key, split_extension,
    CaptionStyle, KeyRules, TransformKind, CAPTIONED_PREFIX,
};
use mrelay_storage::{PublicUrl, Publisher};
use tracing::Instrument;
use url::Url;

use crate::error::{JobError, JobResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::stage::JobStage;
use crate::temp::{TempRole, TempSet};

/// Stem used when no title can be recovered for an audio extract.
const FALLBACK_AUDIO_STEM: &str = "audio";

/// Burn SRT captions into a video.
#[derive(Debug, Clone)]
pub struct CaptionJob {
    pub video_url: String,
    pub srt: String,
    pub video_name: String,
    pub style: CaptionStyle,
}

#[derive(Debug, Clone)]
pub struct CaptionOutcome {
    pub video_url: PublicUrl,
    /// The caller-supplied name, unchanged
    pub video_name: String,
    pub key: String,
}

/// Extract a video's audio track to MP3.
#[derive(Debug, Clone)]
pub struct AudioJob {
    pub video_url: String,
    pub folder: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AudioOutcome {
    pub mp3_url: PublicUrl,
    pub mp3_name: String,
    pub key: String,
    /// Duration of the produced MP3, when FFmpeg reported one
    pub duration_seconds: Option<f64>,
}

/// Cut a clip to a target duration.
#[derive(Debug, Clone)]
pub struct TrimJob {
    pub url: String,
    pub folder: Option<String>,
    pub filename: Option<String>,
    /// Requested duration in seconds
    pub target_duration: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TrimOutcome {
    pub url: PublicUrl,
    pub key: String,
    pub duration_original: f64,
    pub duration_trimmed: f64,
}

/// Copy a remote file into the bucket unchanged.
#[derive(Debug, Clone)]
pub struct RelayJob {
    pub url: String,
    pub folder: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RelayOutcome {
    pub url: PublicUrl,
    pub key: String,
}

/// Runs transform jobs against shared clients.
#[derive(Clone)]
pub struct Orchestrator {
    fetcher: RemoteFetcher,
    runner: FfmpegRunner,
    publisher: Publisher,
    key_rules: Arc<KeyRules>,
    work_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(
        fetcher: RemoteFetcher,
        runner: FfmpegRunner,
        publisher: Publisher,
        key_rules: KeyRules,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            runner,
            publisher,
            key_rules: Arc::new(key_rules),
            work_dir: work_dir.into(),
        }
    }

    /// Build the fetcher and runner from media configuration.
    pub fn from_config(
        config: &MediaConfig,
        publisher: Publisher,
        key_rules: KeyRules,
    ) -> MediaResult<Self> {
        Ok(Self::new(
            RemoteFetcher::new(config.fetch_connect_timeout)?,
            FfmpegRunner::from_config(config),
            publisher,
            key_rules,
            config.work_dir.clone(),
        ))
    }

    pub fn runner(&self) -> &FfmpegRunner {
        &self.runner
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Burn captions and publish under `captioned/<name>_captioned.mp4`.
    pub async fn burn_captions(&self, job: CaptionJob) -> JobResult<CaptionOutcome> {
        let mut run = JobRun::start(TransformKind::CaptionBurn, &job.video_name, &self.work_dir);
        let span = run.logger.create_span();
        let result = self.burn_captions_inner(&job, &mut run).instrument(span).await;
        run.finish(result).await
    }

    async fn burn_captions_inner(
        &self,
        job: &CaptionJob,
        run: &mut JobRun,
    ) -> JobResult<CaptionOutcome> {
        let name = sanitize_key(caption_base_name(&job.video_name));
        if name.is_empty() {
            return Err(JobError::invalid_input("videoName has no usable characters"));
        }
        let key = format!("{}{}_captioned.mp4", CAPTIONED_PREFIX, name);

        let input = run.temp.allocate(TempRole::Input, "mp4");
        let subtitle = run.temp.allocate(TempRole::Subtitle, "srt");
        let output = run.temp.allocate(TempRole::Output, "mp4");

        let command = burn_captions_command(&input, &subtitle, &output, &job.style)
            .map_err(|e| JobError::invalid_input(e.to_string()))?;

        self.prepare_work_dir().await?;
        run.advance(JobStage::FetchingSource);
        self.fetch(&job.video_url, &input).await?;
        tokio::fs::write(&subtitle, job.srt.as_bytes()).await?;

        run.advance(JobStage::Transforming);
        self.transform(run.kind(), &command).await?;

        run.advance(JobStage::Publishing);
        let video_url = self.publish_file(&output, &key).await?;

        Ok(CaptionOutcome {
            video_url,
            video_name: job.video_name.clone(),
            key,
        })
    }

    /// Extract audio to MP3 and publish under `<folder>/<title>.mp3`.
    pub async fn extract_audio(&self, job: AudioJob) -> JobResult<AudioOutcome> {
        let mut run = JobRun::start(TransformKind::AudioExtract, &job.video_url, &self.work_dir);
        let span = run.logger.create_span();
        let result = self.extract_audio_inner(&job, &mut run).instrument(span).await;
        run.finish(result).await
    }

    async fn extract_audio_inner(
        &self,
        job: &AudioJob,
        run: &mut JobRun,
    ) -> JobResult<AudioOutcome> {
        let folder = sanitize_folder(job.folder.as_deref().unwrap_or_default());
        let input = run.temp.allocate(TempRole::Input, &source_extension(&job.video_url));
        let output = run.temp.allocate(TempRole::Output, "mp3");

        self.prepare_work_dir().await?;
        run.advance(JobStage::FetchingSource);
        self.fetch(&job.video_url, &input).await?;

        run.advance(JobStage::Transforming);
        let source = self.probe(&input).await?;
        let title = source.title.or_else(|| url_file_stem(&job.video_url));
        let stem = title
            .map(|t| self.key_rules.apply(&t))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| FALLBACK_AUDIO_STEM.to_string());

        self.transform(run.kind(), &extract_mp3_command(&input, &output))
            .await?;
        let produced = self.probe(&output).await?;
        if produced.duration.is_none() {
            run.logger.log_warning("duration of extracted audio unavailable");
        }

        let mp3_name = format!("{}.mp3", stem);
        let key = join_key(&folder, &mp3_name);

        run.advance(JobStage::Publishing);
        let mp3_url = self.publish_file(&output, &key).await?;

        Ok(AudioOutcome {
            mp3_url,
            mp3_name,
            key,
            duration_seconds: produced.duration,
        })
    }

    /// Trim with stream copy and publish under `<folder>/<filename>`.
    pub async fn trim_and_save(&self, job: TrimJob) -> JobResult<TrimOutcome> {
        let mut run = JobRun::start(TransformKind::Trim, &job.url, &self.work_dir);
        let span = run.logger.create_span();
        let result = self.trim_and_save_inner(&job, &mut run).instrument(span).await;
        run.finish(result).await
    }

    async fn trim_and_save_inner(&self, job: &TrimJob, run: &mut JobRun) -> JobResult<TrimOutcome> {
        let (key, ext) = self.target_key(&job.url, job.folder.as_deref(), job.filename.as_deref())?;
        let input = run.temp.allocate(TempRole::Input, &ext);
        let output = run.temp.allocate(TempRole::Output, &ext);

        self.prepare_work_dir().await?;
        run.advance(JobStage::FetchingSource);
        self.fetch(&job.url, &input).await?;

        run.advance(JobStage::Transforming);
        let duration = self
            .probe(&input)
            .await?
            .duration
            .ok_or(JobError::DurationUnavailable)?;
        let target = trim_target(duration, job.target_duration)
            .ok_or(JobError::SourceTooShort { duration })?;

        self.transform(run.kind(), &trim_command(&input, &output, target))
            .await?;

        run.advance(JobStage::Publishing);
        let url = self.publish_file(&output, &key).await?;

        Ok(TrimOutcome {
            url,
            key,
            duration_original: duration,
            duration_trimmed: target,
        })
    }

    /// Fetch and publish unchanged under `<folder>/<filename>`.
    pub async fn relay(&self, job: RelayJob) -> JobResult<RelayOutcome> {
        let mut run = JobRun::start(TransformKind::Relay, &job.url, &self.work_dir);
        let span = run.logger.create_span();
        let result = self.relay_inner(&job, &mut run).instrument(span).await;
        run.finish(result).await
    }

    async fn relay_inner(&self, job: &RelayJob, run: &mut JobRun) -> JobResult<RelayOutcome> {
        let (key, ext) = self.target_key(&job.url, job.folder.as_deref(), job.filename.as_deref())?;
        let input = run.temp.allocate(TempRole::Input, &ext);

        self.prepare_work_dir().await?;
        run.advance(JobStage::FetchingSource);
        self.fetch(&job.url, &input).await?;

        run.advance(JobStage::Publishing);
        let url = self.publish_file(&input, &key).await?;

        Ok(RelayOutcome { url, key })
    }

    /// Resolve the storage key and temp extension for a relayed or trimmed file.
    fn target_key(
        &self,
        url: &str,
        folder: Option<&str>,
        filename: Option<&str>,
    ) -> JobResult<(String, String)> {
        let raw = filename
            .map(str::to_string)
            .filter(|f| !f.trim().is_empty())
            .or_else(|| url_file_name(url))
            .ok_or_else(|| {
                JobError::invalid_input("filename is required when the URL has no file name")
            })?;
        let mut name = sanitize_filename(&raw).ok_or_else(|| {
            JobError::invalid_input(format!("filename '{}' has no usable characters", raw))
        })?;

        // An extensionless name borrows the source's so FFmpeg and the
        // content type table can both resolve the format
        let ext = match split_extension(&name).1 {
            Some(ext) => ext.to_string(),
            None => {
                let ext = source_extension(url);
                name = format!("{}.{}", name, ext);
                ext
            }
        };
        let folder = sanitize_folder(folder.unwrap_or_default());
        Ok((join_key(&folder, &name), ext))
    }

    async fn prepare_work_dir(&self) -> JobResult<()> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        Ok(())
    }

    async fn fetch(&self, url: &str, dest: &Path) -> JobResult<()> {
        let started = Instant::now();
        self.fetcher.fetch(url, dest).await.map_err(JobError::Fetch)?;
        metrics::record_download_duration(started.elapsed().as_secs_f64());
        Ok(())
    }

    async fn probe(&self, path: &Path) -> JobResult<ProbeReport> {
        probe_media(&self.runner, path)
            .await
            .map_err(JobError::Transcode)
    }

    async fn transform(&self, kind: TransformKind, command: &FfmpegCommand) -> JobResult<()> {
        match self.runner.run(command).await {
            Ok(output) => {
                metrics::record_ffmpeg_duration(kind, output.elapsed.as_secs_f64());
                Ok(())
            }
            Err(e) => {
                if let MediaError::Timeout(_) = e {
                    metrics::record_ffmpeg_timeout(kind);
                }
                Err(JobError::Transcode(e))
            }
        }
    }

    async fn publish_file(&self, path: &Path, key: &str) -> JobResult<PublicUrl> {
        let started = Instant::now();
        let url = self.publisher.publish_file(path, key).await?;
        metrics::record_upload_duration(started.elapsed().as_secs_f64());
        Ok(url)
    }
}

/// Lifecycle bookkeeping for one job.
struct JobRun {
    logger: JobLogger,
    stage: JobStage,
    temp: TempSet,
    started: Instant,
}

impl JobRun {
    fn start(kind: TransformKind, subject: &str, work_dir: &Path) -> Self {
        let logger = JobLogger::new(kind);
        logger.log_start(subject);
        Self {
            logger,
            stage: JobStage::Created,
            temp: TempSet::new(work_dir),
            started: Instant::now(),
        }
    }

    fn kind(&self) -> TransformKind {
        self.logger.operation()
    }

    fn advance(&mut self, next: JobStage) {
        if !self.stage.can_advance_to(next) {
            self.logger
                .log_warning(&format!("unexpected transition {} -> {}", self.stage, next));
        }
        self.logger.log_stage(self.stage, next);
        self.stage = next;
    }

    /// Release temp files and record the terminal stage.
    async fn finish<T>(mut self, result: JobResult<T>) -> JobResult<T> {
        let failed_at = self.stage;
        match &result {
            Ok(_) => {
                self.advance(JobStage::Done);
                metrics::record_job_completed(self.kind(), self.started.elapsed().as_secs_f64());
                self.logger.log_completion(&format!(
                    "in {:.2}s",
                    self.started.elapsed().as_secs_f64()
                ));
            }
            Err(e) => {
                self.advance(JobStage::Failed);
                metrics::record_job_failed(self.kind(), failed_at.as_str());
                self.logger.log_error(&format!("failed during {}: {}", failed_at, e));
            }
        }

        self.temp.cleanup().await;
        result
    }
}

/// Caller-supplied video name without a trailing video extension.
fn caption_base_name(video_name: &str) -> &str {
    let trimmed = video_name.trim();
    if is_video_key(trimmed) {
        split_extension(trimmed).0
    } else {
        trimmed
    }
}

/// Last path segment of a URL, percent-decoded.
fn url_file_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment).ok()?.into_owned();
    (!decoded.trim().is_empty()).then_some(decoded)
}

/// URL file name without its extension.
fn url_file_stem(url: &str) -> Option<String> {
    let name = url_file_name(url)?;
    let stem = split_extension(&name).0.to_string();
    (!stem.is_empty()).then_some(stem)
}

/// Extension for a downloaded source, taken from its URL when plausible.
fn source_extension(url: &str) -> String {
    url_file_name(url)
        .and_then(|name| split_extension(&name).1.map(str::to_ascii_lowercase))
        .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "mp4".to_string())
}
