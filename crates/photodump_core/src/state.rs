use crate::staging::StagingStore;
use crate::view_model::{AppViewModel, ModalView, PreviewTile};
use crate::{parse_categories, AddStats, Carousel, JobId, JobState, ResultSet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) staging: StagingStore,
    pub(crate) categories_input: String,
    job: JobState,
    current_job: Option<JobId>,
    next_job_id: JobId,
    results: Option<ResultSet>,
    status_text: Option<String>,
    pub(crate) last_add_stats: Option<AddStats>,
    pub(crate) carousel: Option<Carousel>,
    pub(crate) connected: bool,
    /// First guarded quit seen; cleared whenever a job starts or ends.
    pub(crate) teardown_warned: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let categories = parse_categories(&self.categories_input);
        let start_enabled =
            !self.staging.is_empty() && !categories.is_empty() && !self.job.is_active();
        AppViewModel {
            job: self.job,
            staged: self
                .staging
                .files()
                .iter()
                .map(|file| PreviewTile {
                    filename: file.name().to_string(),
                    src: file.preview_url(),
                    removing: self.staging.is_removing(file.name()),
                })
                .collect(),
            categories,
            start_enabled,
            processing_visible: self.job.is_active(),
            status_text: self.status_text.clone(),
            results: self.results.clone(),
            download_enabled: self.results.is_some(),
            last_add_stats: self.last_add_stats,
            modal: self.carousel.as_ref().map(|carousel| ModalView {
                src: carousel.current().to_string(),
                index: carousel.index(),
                count: carousel.len(),
                show_navigation: carousel.shows_navigation(),
            }),
            connected: self.connected,
            dirty: self.dirty,
        }
    }

    pub fn job_state(&self) -> JobState {
        self.job
    }

    /// Identifier of the job that is currently starting or running.
    pub fn active_job(&self) -> Option<JobId> {
        self.current_job.filter(|_| self.job.is_active())
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn staged_count(&self) -> usize {
        self.staging.len()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Gallery the modal browses: results when shown, staged previews otherwise.
    pub(crate) fn visible_gallery(&self) -> Vec<String> {
        match &self.results {
            Some(results) => results.photo_urls(),
            None => self
                .staging
                .files()
                .iter()
                .map(|file| file.preview_url())
                .collect(),
        }
    }

    pub(crate) fn begin_job(&mut self) -> JobId {
        self.next_job_id += 1;
        let job_id = self.next_job_id;
        self.current_job = Some(job_id);
        self.job = JobState::Starting;
        self.results = None;
        self.status_text = None;
        self.carousel = None;
        self.teardown_warned = false;
        self.mark_dirty();
        job_id
    }

    pub(crate) fn mark_running(&mut self, status: &str) {
        self.job = JobState::Running;
        self.status_text = Some(status.to_string());
        self.mark_dirty();
    }

    /// Check-and-clear gate for terminal transitions: only the first caller
    /// while the job is active moves it to `outcome`.
    pub(crate) fn finish_job(&mut self, outcome: JobState) -> bool {
        debug_assert!(outcome.is_terminal());
        if !self.job.is_active() {
            return false;
        }
        self.job = outcome;
        self.status_text = None;
        self.teardown_warned = false;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_results(&mut self, results: ResultSet) {
        self.results = Some(results);
        self.carousel = None;
        self.teardown_warned = false;
        self.mark_dirty();
    }

    /// Drop staged files, results and job state.
    pub(crate) fn reset(&mut self) {
        self.staging.clear();
        self.job = JobState::Idle;
        self.current_job = None;
        self.results = None;
        self.status_text = None;
        self.carousel = None;
        self.last_add_stats = None;
        self.teardown_warned = false;
        self.mark_dirty();
    }
}
