use crate::{CandidateFile, ClearScope, Direction, JobId, PushEvent, ResultSet, UploadId, UploadReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// App started: connect the push channel and recover staged files.
    SessionStarted,
    /// Input layer produced a set of files (drop or browse).
    FilesAdded(Vec<CandidateFile>),
    UploadFinished {
        upload_id: UploadId,
        result: Result<UploadReceipt, String>,
    },
    RemoveClicked { filename: String },
    RemoveFinished {
        filename: String,
        result: Result<(), String>,
    },
    /// Re-read the staged set from the server.
    ReloadRequested,
    UploadsListed(Result<Vec<String>, String>),
    /// User edited the category box (one label per line).
    CategoriesChanged(String),
    StartClicked,
    /// Response of the blocking start call.
    ProcessFinished {
        job_id: JobId,
        result: Result<ResultSet, String>,
    },
    /// Status update from the push channel.
    Push(PushEvent),
    ChannelOpened,
    ChannelFailed(String),
    ChannelClosed,
    ClearAllClicked,
    ClearSelectionClicked,
    ServerCleared {
        scope: ClearScope,
        result: Result<(), String>,
    },
    DownloadClicked,
    /// Saved archive location, or failure reason.
    DownloadFinished(Result<String, String>),
    ImageOpened { src: String },
    ModalNavigated(Direction),
    ModalClosed,
    /// User asked to leave (window close / quit).
    QuitRequested,
    /// User leaves despite the navigation-guard warning.
    QuitConfirmed,
}
