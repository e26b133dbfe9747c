use crate::{
    parse_categories, AddStats, AppState, Carousel, ClearScope, Effect, JobState, Msg,
    Presentation, PushEvent, ResultSet,
};

const STATUS_CATEGORIZING: &str = "Analyzing and categorizing photos...";
const STATUS_PROCESSING: &str = "Processing and ranking photos...";

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages are applied one at a time, so the active-job gate checked in the
/// completion handlers cannot be interleaved with another completion.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SessionStarted => vec![Effect::ConnectChannel, Effect::ListUploads],
        Msg::FilesAdded(files) => {
            let plan = state.staging.plan_add(files);
            match plan.batch {
                Some((upload_id, files)) => vec![Effect::Upload { upload_id, files }],
                None => {
                    if plan.local_duplicates > 0 {
                        state.last_add_stats = Some(AddStats {
                            local_duplicates: plan.local_duplicates,
                            ..AddStats::default()
                        });
                        state.mark_dirty();
                    }
                    Vec::new()
                }
            }
        }
        Msg::UploadFinished { upload_id, result } => match result {
            Ok(receipt) => {
                let stats = state.staging.confirm_upload(upload_id, &receipt);
                state.last_add_stats = Some(stats);
                state.mark_dirty();
                if receipt.skipped > 0 {
                    vec![notice_info(format!(
                        "{} files skipped (already exist)",
                        receipt.skipped
                    ))]
                } else {
                    Vec::new()
                }
            }
            Err(_reason) => {
                state.staging.abandon_upload(upload_id);
                vec![notice_error("Failed to upload files")]
            }
        },
        Msg::RemoveClicked { filename } => {
            if state.staging.begin_remove(&filename) {
                state.mark_dirty();
                vec![Effect::RemoveFile { filename }]
            } else {
                Vec::new()
            }
        }
        Msg::RemoveFinished { filename, result } => match result {
            Ok(()) => {
                state.staging.confirm_remove(&filename);
                state.mark_dirty();
                Vec::new()
            }
            Err(_reason) => {
                state.staging.abandon_remove(&filename);
                state.mark_dirty();
                vec![notice_error("Failed to remove file")]
            }
        },
        Msg::ReloadRequested => vec![Effect::ListUploads],
        Msg::UploadsListed(result) => {
            match result {
                Ok(names) => state.staging.replace_all(names),
                // Fall back to an empty view rather than a stale one.
                Err(_reason) => state.staging.clear(),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::CategoriesChanged(raw) => {
            if state.categories_input != raw {
                state.categories_input = raw;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::StartClicked => start_job(&mut state),
        Msg::ProcessFinished { job_id, result } => {
            if state.active_job() != Some(job_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(results) => complete_job(&mut state, results),
                Err(_reason) => fail_job(&mut state, "Processing failed"),
            }
        }
        Msg::Push(event) => apply_push(&mut state, event),
        Msg::ChannelOpened => {
            state.connected = true;
            state.mark_dirty();
            vec![notice_info("Connected to server")]
        }
        Msg::ChannelFailed(_reason) => {
            state.connected = false;
            state.mark_dirty();
            vec![notice_error("Connection error, retrying...")]
        }
        Msg::ChannelClosed => {
            if state.connected {
                state.connected = false;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ClearAllClicked => {
            if state.job_state().is_active() {
                vec![notice_info("Cannot clear while processing")]
            } else {
                vec![Effect::ClearServer {
                    scope: ClearScope::All,
                }]
            }
        }
        Msg::ClearSelectionClicked => {
            if state.job_state().is_active() || state.results().is_some() {
                vec![notice_info("Cannot clear while processing or with results")]
            } else {
                vec![Effect::ClearServer {
                    scope: ClearScope::Uploads,
                }]
            }
        }
        Msg::ServerCleared { scope, result } => match (scope, result) {
            (ClearScope::All, Ok(())) => {
                state.reset();
                state.categories_input.clear();
                vec![notice_info("All data cleared successfully")]
            }
            (ClearScope::Uploads, Ok(())) => {
                state.staging.clear();
                state.last_add_stats = None;
                state.mark_dirty();
                vec![notice_info("Selection cleared")]
            }
            (ClearScope::All, Err(_)) => vec![notice_error("Failed to clear data")],
            (ClearScope::Uploads, Err(_)) => vec![notice_error("Failed to clear selection")],
        },
        Msg::DownloadClicked => {
            if state.results().is_some() {
                vec![Effect::Download]
            } else {
                Vec::new()
            }
        }
        Msg::DownloadFinished(result) => match result {
            Ok(location) => vec![notice_info(format!("Results saved to {location}"))],
            Err(_reason) => vec![notice_error("Failed to download results")],
        },
        Msg::ImageOpened { src } => {
            state.carousel = Carousel::open(&src, state.visible_gallery());
            state.mark_dirty();
            Vec::new()
        }
        Msg::ModalNavigated(direction) => {
            if let Some(carousel) = state.carousel.as_mut() {
                carousel.navigate(direction);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ModalClosed => {
            if state.carousel.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QuitRequested => {
            let guarded = state.job_state().is_active() || state.results().is_some();
            if !guarded {
                vec![Effect::Cleanup, Effect::Exit]
            } else if state.teardown_warned {
                vec![Effect::Exit]
            } else {
                state.teardown_warned = true;
                vec![notice_info(
                    "A job is running or results are displayed; quit again to leave",
                )]
            }
        }
        Msg::QuitConfirmed => vec![Effect::Exit],
    };

    (state, effects)
}

fn start_job(state: &mut AppState) -> Vec<Effect> {
    let categories = parse_categories(&state.categories_input);
    if categories.is_empty() || state.staged_count() == 0 {
        return Vec::new();
    }
    if state.job_state().is_active() {
        return vec![notice_error("Processing already in progress")];
    }
    let job_id = state.begin_job();
    vec![Effect::StartJob { job_id, categories }]
}

fn apply_push(state: &mut AppState, event: PushEvent) -> Vec<Effect> {
    if let PushEvent::Cleared = event {
        state.reset();
        return Vec::new();
    }
    // Replayed or foreign statuses while no job of ours is in flight.
    if !state.job_state().is_active() {
        return Vec::new();
    }
    match event {
        PushEvent::Categorizing => running(state, STATUS_CATEGORIZING),
        PushEvent::Processing => running(state, STATUS_PROCESSING),
        PushEvent::Complete { results } => complete_job(state, results.unwrap_or_default()),
        PushEvent::Cancelled => {
            if state.finish_job(JobState::Cancelled) {
                vec![notice_info("Processing cancelled")]
            } else {
                Vec::new()
            }
        }
        PushEvent::Error { message } => {
            let message = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "An error occurred".to_string());
            fail_job(state, &message)
        }
        PushEvent::Cleared | PushEvent::Unknown(_) => Vec::new(),
    }
}

fn running(state: &mut AppState, status: &str) -> Vec<Effect> {
    state.mark_running(status);
    vec![Effect::Present(Presentation::Status(status.to_string()))]
}

fn complete_job(state: &mut AppState, results: ResultSet) -> Vec<Effect> {
    if !state.finish_job(JobState::Succeeded) {
        return Vec::new();
    }
    state.set_results(results.clone());
    vec![
        Effect::Present(Presentation::Results(results)),
        notice_info("Processing complete!"),
    ]
}

fn fail_job(state: &mut AppState, message: &str) -> Vec<Effect> {
    if !state.finish_job(JobState::Failed) {
        return Vec::new();
    }
    vec![notice_error(message)]
}

fn notice_info(message: impl Into<String>) -> Effect {
    Effect::Present(Presentation::info(message))
}

fn notice_error(message: impl Into<String>) -> Effect {
    Effect::Present(Presentation::error(message))
}
