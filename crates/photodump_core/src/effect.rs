use crate::{CandidateFile, JobId, Presentation, UploadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the push channel (it reconnects on its own afterwards).
    ConnectChannel,
    Upload {
        upload_id: UploadId,
        files: Vec<CandidateFile>,
    },
    RemoveFile {
        filename: String,
    },
    ListUploads,
    StartJob {
        job_id: JobId,
        categories: Vec<String>,
    },
    ClearServer {
        scope: ClearScope,
    },
    Download,
    /// Best-effort cleanup request; nobody waits for the answer.
    Cleanup,
    Exit,
    Present(Presentation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Staged files and job state (`POST /clear`).
    All,
    /// Staged files only (`POST /clear-uploads`).
    Uploads,
}
