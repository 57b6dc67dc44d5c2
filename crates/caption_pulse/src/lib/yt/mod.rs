pub mod captions;
pub mod locator;

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::{
    error::ExtractError,
    types::{CaptionFormat, VideoReference},
};

pub trait CaptionSource {
    /// Fetches the caption file for `video`.
    ///
    /// Implementations must stop and clean up when `cancel` fires.
    fn fetch_captions(
        &self,
        video: &VideoReference,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<CaptionFile, ExtractError>>;
}

/// A caption file inside the scoped directory it was written to.
///
/// The directory is removed when the file is read or dropped.
#[derive(Debug)]
pub struct CaptionFile {
    path: PathBuf,
    format: CaptionFormat,
    workdir: TempDir,
}

impl CaptionFile {
    pub fn new(workdir: TempDir, path: impl Into<PathBuf>, format: CaptionFormat) -> Self {
        Self {
            path: path.into(),
            format,
            workdir,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> CaptionFormat {
        self.format
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Reads the caption content and releases the scoped directory.
    pub async fn read(self) -> Result<String, ExtractError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .inspect_err(|e| tracing::error!(error = %e, path = ?self.path, "Failed to read caption file"))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// First file in `dir`, in directory listing order, with one of the `formats` extensions.
pub fn find_caption_file(
    dir: &Path,
    formats: &[CaptionFormat],
) -> std::io::Result<Option<(PathBuf, CaptionFormat)>> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        if let Some(format) = CaptionFormat::from_path(&path).filter(|f| formats.contains(f)) {
            return Ok(Some((path, format)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_caption_file_ignores_media_and_unlisted_formats() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("video.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("talk.en.srt"), b"1").unwrap();
        std::fs::create_dir(dir.path().join("nested.vtt")).unwrap();

        let found = find_caption_file(dir.path(), &[CaptionFormat::Vtt]).unwrap();
        assert!(found.is_none(), "directories and unlisted formats must be skipped");

        let (path, format) = find_caption_file(dir.path(), &CaptionFormat::ALL)
            .unwrap()
            .expect("srt file should be found");
        assert_eq!(format, CaptionFormat::Srt);
        assert_eq!(path.file_name().unwrap(), "talk.en.srt");
    }

    #[tokio::test]
    async fn test_reading_releases_scoped_directory() {
        let workdir = tempfile::tempdir().unwrap();
        let dir_path = workdir.path().to_path_buf();
        let file_path = dir_path.join("clip.en.vtt");
        std::fs::write(&file_path, "WEBVTT\n\nhello").unwrap();

        let caption_file = CaptionFile::new(workdir, &file_path, CaptionFormat::Vtt);
        let content = caption_file.read().await.unwrap();

        assert_eq!(content, "WEBVTT\n\nhello");
        assert!(!dir_path.exists(), "scoped directory should be removed");
    }
}
