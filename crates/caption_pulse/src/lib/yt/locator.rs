use std::{
    env,
    ffi::{OsStr, OsString},
    path::PathBuf,
};

use crate::error::ExtractError;

/// Finds the yt-dlp executable: an ordered list of candidate paths first,
/// then the program name on the search path.
#[derive(Debug, Clone)]
pub struct ExecutableLocator {
    program: OsString,
    candidates: Vec<PathBuf>,
    search_path: Option<OsString>,
}

impl Default for ExecutableLocator {
    fn default() -> Self {
        Self::new(Self::PROGRAM).with_candidates(platform_candidates())
    }
}

impl ExecutableLocator {
    pub const PROGRAM: &'static str = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };

    /// A locator with no candidates that searches the ambient `PATH`.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            candidates: Vec::new(),
            search_path: env::var_os("PATH"),
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }

    /// Probes `path` before every other candidate.
    pub fn prefer(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.insert(0, path.into());
        self
    }

    /// Overrides the search path; `None` disables the search path fallback.
    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn resolve(&self) -> Result<PathBuf, ExtractError> {
        if let Some(found) = self.candidates.iter().find(|c| c.is_file()) {
            return Ok(found.clone());
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        if let Some(search_path) = &self.search_path {
            if let Ok(found) = which::which_in(&self.program, Some(search_path), &cwd) {
                return Ok(found);
            }
        }

        let mut attempted = self.candidates.clone();
        attempted.push(PathBuf::from(&self.program));
        tracing::error!(?attempted, "yt-dlp executable not found");
        Err(ExtractError::ExecutableNotFound { attempted })
    }
}

#[cfg(unix)]
fn platform_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("/usr/local/bin/yt-dlp")];
    if let Some(home) = env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(".local/bin/yt-dlp"));
    }
    if let Some(venv) = env::var_os("VIRTUAL_ENV") {
        candidates.push(PathBuf::from(venv).join("bin").join("yt-dlp"));
    }
    candidates
}

#[cfg(windows)]
fn platform_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("yt-dlp.exe")];
    if let Some(venv) = env::var_os("VIRTUAL_ENV") {
        candidates.push(PathBuf::from(venv).join("Scripts").join("yt-dlp.exe"));
    }
    candidates
}

#[cfg(not(any(unix, windows)))]
fn platform_candidates() -> Vec<PathBuf> {
    Vec::new()
}
