//! Photodump core: pure synchronization state machine and view-model helpers.
//!
//! Everything in this crate is synchronous and free of IO. The application
//! feeds [`Msg`]s into [`update`] one at a time and executes the returned
//! [`Effect`]s; request outcomes and push events come back as further messages.
mod carousel;
mod effect;
mod job;
mod msg;
mod presentation;
mod staging;
mod state;
mod update;
mod view_model;

pub use carousel::{Carousel, Direction};
pub use effect::{ClearScope, Effect};
pub use job::{parse_categories, CategoryPhotos, JobId, JobState, PushEvent, ResultSet};
pub use msg::Msg;
pub use presentation::{NoticeLevel, Presentation, PresentationSink};
pub use staging::{upload_url, AddStats, CandidateFile, StagedFile, UploadId, UploadReceipt};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, ModalView, PreviewTile};
