use std::sync::{Arc, Mutex};

use caption_pulse::{
    types::{CaptionFormat, VideoReference},
    yt::{CaptionFile, CaptionSource},
    ExtractError,
};
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct MockCaptionSource {
    /// Caption file contents; `None` means yt-dlp wrote no caption file.
    pub captions: Option<String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
    /// Blocks until the token is cancelled.
    pub hang: bool,
}

impl MockCaptionSource {
    pub fn new(captions: &str) -> Self {
        Self {
            captions: Some(captions.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
            hang: false,
        }
    }

    pub fn without_captions() -> Self {
        Self {
            captions: None,
            ..Self::new("")
        }
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            fail_with: Some(stderr.to_string()),
            ..Self::new("")
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new("")
        }
    }
}

impl CaptionSource for MockCaptionSource {
    async fn fetch_captions(
        &self,
        video: &VideoReference,
        cancel: &CancellationToken,
    ) -> Result<CaptionFile, ExtractError> {
        self.calls.lock().unwrap().push(video.to_string());

        if self.hang {
            cancel.cancelled().await;
            return Err(ExtractError::Cancelled);
        }
        if let Some(ref stderr) = self.fail_with {
            return Err(ExtractError::ExtractionFailed {
                code: Some(1),
                stderr: stderr.clone(),
            });
        }
        let Some(ref captions) = self.captions else {
            return Err(ExtractError::NoCaptionsAvailable);
        };

        let workdir = tempfile::tempdir()?;
        let path = workdir.path().join("video.en.vtt");
        tokio::fs::write(&path, captions).await?;

        Ok(CaptionFile::new(workdir, path, CaptionFormat::Vtt))
    }
}
