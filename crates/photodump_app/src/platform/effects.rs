use std::sync::mpsc;
use std::thread;

use photodump_core::{ClearScope, Effect, Msg, PresentationSink, PushEvent, ResultSet, UploadReceipt};
use photodump_engine::{
    decode_results, ChannelEvent, EngineEvent, EngineEvents, EngineHandle, StatusEvent, UploadFile,
};
use photodump_logging::{pd_debug, pd_info, pd_warn};

use super::app::AppInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Executes core effects: IO goes to the engine, presentations to the sink.
pub struct EffectRunner<S: PresentationSink> {
    engine: EngineHandle,
    sink: S,
}

impl<S: PresentationSink> EffectRunner<S> {
    pub fn new(engine: EngineHandle, sink: S) -> Self {
        Self { engine, sink }
    }

    pub fn run(&mut self, effects: Vec<Effect>) -> Flow {
        for effect in effects {
            match effect {
                Effect::ConnectChannel => self.engine.connect(),
                Effect::Upload { upload_id, files } => {
                    let files = files
                        .into_iter()
                        .map(|file| UploadFile {
                            name: file.name,
                            content_type: file.content_type,
                            data: file.data,
                        })
                        .collect();
                    self.engine.upload(upload_id, files);
                }
                Effect::RemoveFile { filename } => self.engine.remove(filename),
                Effect::ListUploads => self.engine.list_uploads(),
                Effect::StartJob { job_id, categories } => {
                    self.engine.process(job_id, categories);
                }
                Effect::ClearServer { scope } => self.engine.clear(engine_scope(scope)),
                Effect::Download => self.engine.download(),
                Effect::Cleanup => self.engine.cleanup(),
                Effect::Exit => {
                    pd_info!("Exit requested");
                    return Flow::Exit;
                }
                Effect::Present(presentation) => presentation.deliver(&mut self.sink),
            }
        }
        Flow::Continue
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

/// Forward engine events into the app inbox until either side goes away.
pub fn spawn_event_forwarder(events: EngineEvents, inbox: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            let Some(msg) = map_event(event) else {
                continue;
            };
            if inbox.send(AppInput::Core(msg)).is_err() {
                break;
            }
        }
        pd_debug!("Engine event forwarder stopped");
    });
}

pub fn map_event(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::Uploaded { upload_id, result } => Msg::UploadFinished {
            upload_id,
            result: result
                .map(|receipt| UploadReceipt {
                    files: receipt.files,
                    skipped: receipt.skipped,
                })
                .map_err(|err| err.to_string()),
        },
        EngineEvent::Removed { filename, result } => Msg::RemoveFinished {
            filename,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::UploadsListed(result) => {
            Msg::UploadsListed(result.map_err(|err| err.to_string()))
        }
        EngineEvent::Processed { job_id, result } => Msg::ProcessFinished {
            job_id,
            result: result
                .map(ResultSet::from_groups)
                .map_err(|err| err.to_string()),
        },
        EngineEvent::Cleared { scope, result } => Msg::ServerCleared {
            scope: core_scope(scope),
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::Downloaded(result) => Msg::DownloadFinished(
            result
                .map(|path| path.display().to_string())
                .map_err(|err| err.to_string()),
        ),
        EngineEvent::Channel(event) => return map_channel_event(event),
    };
    Some(msg)
}

fn map_channel_event(event: ChannelEvent) -> Option<Msg> {
    match event {
        ChannelEvent::Opened => Some(Msg::ChannelOpened),
        ChannelEvent::Status(status) => push_event(status).map(Msg::Push),
        ChannelEvent::Error(reason) => Some(Msg::ChannelFailed(reason)),
        ChannelEvent::Closed => Some(Msg::ChannelClosed),
        ChannelEvent::DecodeFailed(_) | ChannelEvent::ReconnectScheduled { .. } => None,
    }
}

/// Interpret a raw status payload. A `complete` whose results do not decode
/// is dropped like any other undecodable frame.
pub fn push_event(status: StatusEvent) -> Option<PushEvent> {
    let event = match status.status.as_str() {
        "categorizing" => PushEvent::Categorizing,
        "processing" => PushEvent::Processing,
        "complete" => {
            let results = match status.results.map(decode_results).transpose() {
                Ok(groups) => groups.map(ResultSet::from_groups),
                Err(err) => {
                    pd_warn!("Dropping complete event with malformed results: {}", err);
                    return None;
                }
            };
            PushEvent::Complete { results }
        }
        "cancelled" => PushEvent::Cancelled,
        "error" => PushEvent::Error {
            message: status.message,
        },
        "cleared" => PushEvent::Cleared,
        _ => {
            pd_info!("Unknown push status '{}'", status.status);
            PushEvent::Unknown(status.status)
        }
    };
    Some(event)
}

fn engine_scope(scope: ClearScope) -> photodump_engine::ClearScope {
    match scope {
        ClearScope::All => photodump_engine::ClearScope::All,
        ClearScope::Uploads => photodump_engine::ClearScope::Uploads,
    }
}

fn core_scope(scope: photodump_engine::ClearScope) -> ClearScope {
    match scope {
        photodump_engine::ClearScope::All => ClearScope::All,
        photodump_engine::ClearScope::Uploads => ClearScope::Uploads,
    }
}
