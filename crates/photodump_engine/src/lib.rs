//! Photodump engine: server IO and push-channel supervision.
mod api;
mod channel;
mod engine;
mod persist;
mod types;

pub use api::{ApiSettings, ReqwestApi, ServerApi, ARCHIVE_FILENAME};
pub use channel::{
    push_url, ChannelError, ChannelEvent, ChannelSink, FixedDelay, PushChannel, ReconnectPolicy,
    DEFAULT_RECONNECT_DELAY,
};
pub use engine::{EngineError, EngineEvents, EngineHandle};
pub use persist::{ensure_target_dir, AtomicFileWriter, PendingFile, PersistError};
pub use types::{
    decode_results, CategoryResults, ClearScope, EngineEvent, FailureKind, JobId, RequestError,
    StatusEvent, UploadFile, UploadId, UploadReceipt,
};
