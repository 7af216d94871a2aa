use serde::Serialize;
use tracing::debug;

pub const UPLOAD_IN_PROGRESS_STATUS: &str = "Uploading and processing files...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadPhase {
    Idle,
    Uploading,
}

/// How a front end should present the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusSeverity {
    Progress,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadStatus {
    pub text: String,
    pub severity: StatusSeverity,
}

impl UploadStatus {
    pub fn is_failure(&self) -> bool {
        self.severity == StatusSeverity::Failure
    }
}

/// Knowledge-base upload lifecycle.
///
/// Every upload gets a fresh generation number; completions and clear-timer
/// firings that carry an older generation are ignored.
#[derive(Debug, Clone, Serialize)]
pub struct UploadState {
    phase: UploadPhase,
    status: Option<UploadStatus>,
    generation: u64,
    /// Bumped after every attempt so the file picker can be reset
    file_picker_generation: u64,
}

impl Default for UploadState {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadState {
    pub fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            status: None,
            generation: 0,
            file_picker_generation: 0,
        }
    }

    /// Start an upload of `file_count` files.
    ///
    /// Returns the new generation, or `None` when there is nothing to upload
    /// or another upload is still running.
    pub fn begin(&mut self, file_count: usize) -> Option<u64> {
        if file_count == 0 {
            debug!("No files selected, upload skipped");
            return None;
        }
        if self.phase == UploadPhase::Uploading {
            debug!(generation = self.generation, "Upload already in progress");
            return None;
        }

        self.generation += 1;
        self.phase = UploadPhase::Uploading;
        self.status = Some(UploadStatus {
            text: UPLOAD_IN_PROGRESS_STATUS.to_string(),
            severity: StatusSeverity::Progress,
        });
        Some(self.generation)
    }

    /// Record a successful upload. Returns false for a stale generation.
    pub fn succeed(&mut self, generation: u64, file_count: usize) -> bool {
        if !self.finish(generation) {
            return false;
        }
        self.status = Some(UploadStatus {
            text: format!(
                "Successfully uploaded {} file(s) to product catalog",
                file_count
            ),
            severity: StatusSeverity::Success,
        });
        true
    }

    /// Record a failed upload. The failure status stays until the next attempt.
    pub fn fail(&mut self, generation: u64, message: &str) -> bool {
        if !self.finish(generation) {
            return false;
        }
        self.status = Some(UploadStatus {
            text: format!("Upload failed: {}", message),
            severity: StatusSeverity::Failure,
        });
        true
    }

    /// Clear the success status of `generation`. Returns false, leaving the
    /// status alone, when a later upload has started since.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.phase == UploadPhase::Uploading {
            debug!(
                stale = generation,
                current = self.generation,
                "Ignoring stale status clear"
            );
            return false;
        }
        self.status = None;
        true
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    pub fn status(&self) -> Option<&UploadStatus> {
        self.status.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file_picker_generation(&self) -> u64 {
        self.file_picker_generation
    }

    fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.phase != UploadPhase::Uploading {
            debug!(
                stale = generation,
                current = self.generation,
                "Ignoring stale upload completion"
            );
            return false;
        }
        self.phase = UploadPhase::Idle;
        self.file_picker_generation += 1;
        true
    }
}
