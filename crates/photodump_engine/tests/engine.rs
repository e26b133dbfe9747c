use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use photodump_engine::{
    CategoryResults, ClearScope, EngineEvent, EngineHandle, FixedDelay, RequestError, ServerApi,
    UploadFile, UploadReceipt,
};
use pretty_assertions::assert_eq;
use url::Url;

#[derive(Default)]
struct RecordingApi {
    calls: Mutex<Vec<String>>,
}

impl RecordingApi {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl ServerApi for RecordingApi {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadReceipt, RequestError> {
        self.record("upload");
        Ok(UploadReceipt {
            files: files.into_iter().map(|f| f.name).collect(),
            skipped: 0,
        })
    }

    async fn remove_file(&self, filename: &str) -> Result<(), RequestError> {
        self.record(format!("remove {filename}"));
        Ok(())
    }

    async fn list_uploads(&self) -> Result<Vec<String>, RequestError> {
        Ok(vec!["a.png".into()])
    }

    async fn clear(&self, scope: ClearScope) -> Result<(), RequestError> {
        self.record(format!("clear {scope:?}"));
        Ok(())
    }

    async fn process(&self, categories: &[String]) -> Result<CategoryResults, RequestError> {
        Ok(categories
            .iter()
            .map(|c| (c.clone(), vec![format!("out/{c}.png")]))
            .collect())
    }

    async fn download(&self) -> Result<PathBuf, RequestError> {
        Ok(PathBuf::from("images.zip"))
    }

    async fn cleanup(&self) -> Result<(), RequestError> {
        self.record("cleanup");
        Ok(())
    }
}

fn engine(api: Arc<RecordingApi>) -> (EngineHandle, photodump_engine::EngineEvents) {
    let push = Url::parse("ws://127.0.0.1:9/ws").unwrap();
    EngineHandle::with_api(api, push, FixedDelay(Duration::from_millis(10))).unwrap()
}

#[test]
fn requests_resolve_into_tagged_events() {
    let api = Arc::new(RecordingApi::default());
    let (handle, events) = engine(api.clone());

    handle.process(7, vec!["cats".into()]);
    let event = events.recv_timeout(Duration::from_secs(5)).expect("event");
    assert_eq!(
        event,
        EngineEvent::Processed {
            job_id: 7,
            result: Ok(vec![("cats".into(), vec!["out/cats.png".into()])]),
        }
    );

    handle.remove("a.png".into());
    let event = events.recv_timeout(Duration::from_secs(5)).expect("event");
    assert_eq!(
        event,
        EngineEvent::Removed {
            filename: "a.png".into(),
            result: Ok(()),
        }
    );

    handle.clear(ClearScope::Uploads);
    let event = events.recv_timeout(Duration::from_secs(5)).expect("event");
    assert_eq!(
        event,
        EngineEvent::Cleared {
            scope: ClearScope::Uploads,
            result: Ok(()),
        }
    );
    handle.shutdown();
}

#[test]
fn cleanup_produces_no_event() {
    let api = Arc::new(RecordingApi::default());
    let (handle, events) = engine(api.clone());

    handle.cleanup();
    handle.shutdown();

    assert!(events.try_recv().is_none());
    assert_eq!(*api.calls.lock().unwrap(), vec!["cleanup".to_string()]);
}

#[test]
fn push_channel_failures_arrive_as_channel_events() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api: Arc<dyn ServerApi> = Arc::new(RecordingApi::default());
    let push = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let (mut handle, events) =
        EngineHandle::with_api(api, push, FixedDelay(Duration::from_millis(10))).unwrap();
    handle.connect();

    let first = events.recv_timeout(Duration::from_secs(5)).expect("event");
    assert!(matches!(first, EngineEvent::Channel(photodump_engine::ChannelEvent::Error(_))));
    handle.shutdown();
}
