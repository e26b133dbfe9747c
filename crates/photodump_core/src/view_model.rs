use crate::{AddStats, JobState, ResultSet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub job: JobState,
    pub staged: Vec<PreviewTile>,
    pub categories: Vec<String>,
    pub start_enabled: bool,
    pub processing_visible: bool,
    pub status_text: Option<String>,
    /// Present while the results section is shown.
    pub results: Option<ResultSet>,
    pub download_enabled: bool,
    pub last_add_stats: Option<AddStats>,
    pub modal: Option<ModalView>,
    pub connected: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTile {
    pub filename: String,
    pub src: String,
    /// A removal request for this file is in flight.
    pub removing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub src: String,
    pub index: usize,
    pub count: usize,
    pub show_navigation: bool,
}
