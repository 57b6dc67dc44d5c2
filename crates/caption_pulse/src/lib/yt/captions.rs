use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
    process::{Output, Stdio},
    sync::OnceLock,
    time::Duration,
};

use tempfile::TempDir;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::{
    config::ExtractorConfig,
    error::ExtractError,
    types::VideoReference,
    yt::{find_caption_file, locator::ExecutableLocator, CaptionFile, CaptionSource},
};

/// Caption extraction through the yt-dlp command line.
#[derive(Debug, Clone)]
pub struct YtDlpCaptions {
    locator: ExecutableLocator,
    executable: OnceLock<PathBuf>,
    config: ExtractorConfig,
}

impl YtDlpCaptions {
    /// Resolves the executable once; fails with `ExecutableNotFound` when
    /// nothing the locator probes exists.
    pub fn new(locator: &ExecutableLocator, config: ExtractorConfig) -> Result<Self, ExtractError> {
        let extractor = Self::deferred(locator.clone(), config);
        extractor.executable()?;
        Ok(extractor)
    }

    /// Defers resolution to the first `fetch_captions`, so callers that never
    /// touch a video do not need yt-dlp installed.
    pub fn deferred(locator: ExecutableLocator, config: ExtractorConfig) -> Self {
        Self {
            locator,
            executable: OnceLock::new(),
            config,
        }
    }

    /// The resolved executable, probing the locator on first use.
    pub fn executable(&self) -> Result<&Path, ExtractError> {
        if let Some(path) = self.executable.get() {
            return Ok(path);
        }

        let path = self.locator.resolve()?;
        tracing::debug!(path = %path.display(), "Resolved yt-dlp executable");
        Ok(self.executable.get_or_init(|| path))
    }

    fn scoped_dir(&self) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("captions-");
        match &self.config.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
    }

    fn command(&self, executable: &Path, video: &VideoReference, output_template: &Path) -> Command {
        let mut cmd = Command::new(executable);
        cmd.arg("--skip-download")
            .arg("--write-auto-subs")
            .arg("--sub-langs")
            .arg(&self.config.language)
            .arg("--output")
            .arg(output_template)
            .arg(video.url().as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl CaptionSource for YtDlpCaptions {
    #[tracing::instrument(skip_all, fields(video = %video))]
    async fn fetch_captions(
        &self,
        video: &VideoReference,
        cancel: &CancellationToken,
    ) -> Result<CaptionFile, ExtractError> {
        let executable = self.executable()?;

        // removed on every return path below
        let workdir = self.scoped_dir()?;
        let output_template = workdir.path().join(&self.config.output_template);

        let child = self
            .command(executable, video, &output_template)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ExtractError::ExecutableNotFound {
                    attempted: vec![executable.to_path_buf()],
                },
                _ => ExtractError::Io(e),
            })
            .inspect_err(|e| tracing::error!(error = %e, "Failed to spawn yt-dlp"))?;

        let output = cancel
            .run_until_cancelled(wait_bounded(child.wait_with_output(), self.config.timeout))
            .await
            .ok_or(ExtractError::Cancelled)
            .inspect_err(|_| tracing::warn!("Caption extraction cancelled, yt-dlp killed"))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(status = ?output.status, %stderr, "yt-dlp exited unsuccessfully");
            return Err(ExtractError::ExtractionFailed {
                code: output.status.code(),
                stderr,
            });
        }

        let Some((path, format)) = find_caption_file(workdir.path(), &self.config.formats)? else {
            tracing::warn!(language = %self.config.language, "yt-dlp produced no caption file");
            return Err(ExtractError::NoCaptionsAvailable);
        };

        tracing::info!(path = %path.display(), ?format, "Found caption file");
        Ok(CaptionFile::new(workdir, path, format))
    }
}

async fn wait_bounded<F>(wait: F, timeout: Option<Duration>) -> Result<Output, ExtractError>
where
    F: Future<Output = io::Result<Output>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| ExtractError::TimedOut(limit))
            .inspect_err(|e| tracing::error!(error = %e, "yt-dlp timed out, killing it"))?
            .map_err(ExtractError::from),
        None => wait.await.map_err(ExtractError::from),
    }
}
