//! Transcript logger.
//!
//! Appends timestamped lines to one text file per meeting under a configured
//! directory. Independent of room state: any meeting id that is safe to use
//! as a file name is accepted.

use crate::errors::MeetError;
use chrono::Local;
use std::path::PathBuf;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Per-meeting append-only transcript files.
#[derive(Debug)]
pub struct TranscriptService {
    dir: PathBuf,
    /// Serializes appends within this process.
    write_lock: Mutex<()>,
}

impl TranscriptService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// File name used for a meeting's transcript.
    pub fn file_name(meeting_id: &str) -> String {
        format!("meeting-{meeting_id}.txt")
    }

    /// Path of a meeting's transcript file.
    ///
    /// # Errors
    ///
    /// Returns `MeetError::BadRequest` if the id is blank or could escape the
    /// transcripts directory.
    pub fn path_for(&self, meeting_id: &str) -> Result<PathBuf, MeetError> {
        let id = meeting_id.trim();
        if id.is_empty() {
            return Err(MeetError::BadRequest("meetingId must not be blank".to_string()));
        }
        if id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(MeetError::BadRequest(
                "meetingId contains illegal characters".to_string(),
            ));
        }

        Ok(self.dir.join(Self::file_name(id)))
    }

    /// Append `[YYYY-MM-DD HH:MM:SS] speaker: text` to the meeting's file.
    ///
    /// Creates the directory and file as needed. Returns the file path.
    ///
    /// # Errors
    ///
    /// Returns `MeetError::BadRequest` for an unusable meeting id and
    /// `MeetError::Storage` if the file cannot be written.
    pub async fn append(
        &self,
        meeting_id: &str,
        speaker: &str,
        text: &str,
    ) -> Result<PathBuf, MeetError> {
        let path = self.path_for(meeting_id)?;
        let line = format_line(&Local::now().format("%Y-%m-%d %H:%M:%S").to_string(), speaker, text);

        let _guard = self.write_lock.lock().await;

        fs::create_dir_all(&self.dir).await?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(
            target: "meet.transcripts",
            meeting_id = %meeting_id.trim(),
            path = %path.display(),
            "Transcript line appended"
        );

        Ok(path)
    }

    /// Open a meeting's transcript for reading.
    ///
    /// Returns `Ok(None)` if nothing has been written for the meeting yet.
    ///
    /// # Errors
    ///
    /// Returns `MeetError::BadRequest` for an unusable meeting id and
    /// `MeetError::Storage` for any other I/O failure.
    pub async fn open(&self, meeting_id: &str) -> Result<Option<File>, MeetError> {
        let path = self.path_for(meeting_id)?;

        match File::open(&path).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(target: "meet.transcripts", path = %path.display(), "Transcript not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Render one transcript line, newline included.
fn format_line(timestamp: &str, speaker: &str, text: &str) -> String {
    format!("[{timestamp}] {speaker}: {text}\n")
}
