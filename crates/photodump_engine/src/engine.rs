use std::sync::{mpsc, Arc};
use std::time::Duration;

use photodump_logging::{pd_debug, pd_info, pd_warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::api::{ApiSettings, ReqwestApi, ServerApi};
use crate::channel::{push_url, ChannelError, ChannelEvent, PushChannel, ReconnectPolicy};
use crate::types::{ClearScope, EngineEvent, JobId, RequestError, UploadFile, UploadId};

/// Upper bound for the exit-time cleanup request and runtime shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Runs server requests and the push channel on a private tokio runtime.
///
/// Every request resolves into exactly one [`EngineEvent`] on the paired
/// [`EngineEvents`] receiver, except `cleanup`, whose result nobody reads.
pub struct EngineHandle {
    runtime: Runtime,
    api: Arc<dyn ServerApi>,
    push_url: Url,
    policy: Option<Box<dyn ReconnectPolicy>>,
    channel_cancel: Option<CancellationToken>,
    event_tx: mpsc::Sender<EngineEvent>,
}

pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl EngineHandle {
    pub fn new(
        settings: ApiSettings,
        policy: impl ReconnectPolicy + 'static,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let push_url = push_url(&settings.base_url)?;
        let api = Arc::new(ReqwestApi::new(settings)?);
        Self::with_api(api, push_url, policy)
    }

    /// Build around any [`ServerApi`] implementation.
    pub fn with_api(
        api: Arc<dyn ServerApi>,
        push_url: Url,
        policy: impl ReconnectPolicy + 'static,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("photodump-engine")
            .enable_all()
            .build()?;
        let (event_tx, event_rx) = mpsc::channel();
        let handle = Self {
            runtime,
            api,
            push_url,
            policy: Some(Box::new(policy)),
            channel_cancel: None,
            event_tx,
        };
        Ok((handle, EngineEvents { event_rx }))
    }

    /// Start the push channel. Later calls are ignored; the channel reconnects by itself.
    pub fn connect(&mut self) {
        let Some(policy) = self.policy.take() else {
            pd_debug!("Push channel already running");
            return;
        };
        let channel = PushChannel::new(self.push_url.clone(), BoxedPolicy(policy));
        self.channel_cancel = Some(channel.cancellation_token());

        let event_tx = self.event_tx.clone();
        let sink = Arc::new(move |event: ChannelEvent| {
            let _ = event_tx.send(EngineEvent::Channel(event));
        });
        pd_info!("Starting push channel to {}", self.push_url);
        self.runtime.spawn(channel.run(sink));
    }

    pub fn upload(&self, upload_id: UploadId, files: Vec<UploadFile>) {
        pd_info!("Uploading batch {} with {} file(s)", upload_id, files.len());
        self.spawn_request(move |api| async move {
            let result = api.upload(files).await;
            EngineEvent::Uploaded { upload_id, result }
        });
    }

    pub fn remove(&self, filename: String) {
        self.spawn_request(move |api| async move {
            let result = api.remove_file(&filename).await;
            EngineEvent::Removed { filename, result }
        });
    }

    pub fn list_uploads(&self) {
        self.spawn_request(|api| async move { EngineEvent::UploadsListed(api.list_uploads().await) });
    }

    pub fn process(&self, job_id: JobId, categories: Vec<String>) {
        pd_info!("Starting job {} over {} categories", job_id, categories.len());
        self.spawn_request(move |api| async move {
            let result = api.process(&categories).await;
            EngineEvent::Processed { job_id, result }
        });
    }

    pub fn clear(&self, scope: ClearScope) {
        self.spawn_request(move |api| async move {
            let result = api.clear(scope).await;
            EngineEvent::Cleared { scope, result }
        });
    }

    pub fn download(&self) {
        self.spawn_request(|api| async move { EngineEvent::Downloaded(api.download().await) });
    }

    /// Best-effort cleanup on the way out. Waits at most [`SHUTDOWN_GRACE`];
    /// the outcome is only logged and never produces an event.
    pub fn cleanup(&self) {
        let api = self.api.clone();
        let outcome = self
            .runtime
            .block_on(async move { tokio::time::timeout(SHUTDOWN_GRACE, api.cleanup()).await });
        match outcome {
            Ok(Ok(())) => pd_debug!("Cleanup request accepted"),
            Ok(Err(err)) => pd_warn!("Cleanup request failed: {}", err),
            Err(_) => pd_warn!("Cleanup request timed out"),
        }
    }

    /// Stop the push channel and give pending fire-and-forget work a short grace period.
    pub fn shutdown(self) {
        if let Some(cancel) = &self.channel_cancel {
            cancel.cancel();
        }
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
    }

    fn spawn_request<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<dyn ServerApi>) -> Fut,
        Fut: std::future::Future<Output = EngineEvent> + Send + 'static,
    {
        let event_tx = self.event_tx.clone();
        let future = request(self.api.clone());
        self.runtime.spawn(async move {
            let event = future.await;
            if event_tx.send(event).is_err() {
                pd_debug!("Engine event dropped: receiver gone");
            }
        });
    }
}

struct BoxedPolicy(Box<dyn ReconnectPolicy>);

impl ReconnectPolicy for BoxedPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        self.0.delay(attempt)
    }
}
