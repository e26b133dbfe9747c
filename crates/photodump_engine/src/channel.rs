use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use photodump_logging::{pd_debug, pd_info, pd_warn};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::types::StatusEvent;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Decides how long to wait before reconnect attempt number `attempt` (1-based).
pub trait ReconnectPolicy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

/// Same delay for every attempt, forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_RECONNECT_DELAY)
    }
}

impl ReconnectPolicy for FixedDelay {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Opened,
    Status(StatusEvent),
    /// A frame arrived that is not a status payload; the connection stays up.
    DecodeFailed(String),
    Error(String),
    Closed,
    ReconnectScheduled { attempt: u32, delay: Duration },
}

/// Single consumer of channel events.
pub trait ChannelSink: Send + Sync {
    fn deliver(&self, event: ChannelEvent);
}

impl<F> ChannelSink for F
where
    F: Fn(ChannelEvent) + Send + Sync,
{
    fn deliver(&self, event: ChannelEvent) {
        self(event)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("unsupported scheme {0}")]
    UnsupportedScheme(String),
}

/// Push endpoint for an HTTP base URL: `http` -> `ws`, `https` -> `wss`, path `/ws`.
pub fn push_url(base: &str) -> Result<Url, ChannelError> {
    let mut url = Url::parse(base.trim()).map_err(|err| ChannelError::InvalidUrl(err.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ChannelError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| ChannelError::UnsupportedScheme(scheme.to_string()))?;
    url.set_path("/ws");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Persistent push connection that reconnects until cancelled.
///
/// One loop iteration is one connection attempt followed by exactly one
/// scheduled reconnect, so an error and a close on the same connection never
/// queue two retries.
pub struct PushChannel {
    url: Url,
    policy: Arc<dyn ReconnectPolicy>,
    cancel: CancellationToken,
}

impl PushChannel {
    pub fn new(url: Url, policy: impl ReconnectPolicy + 'static) -> Self {
        Self {
            url,
            policy: Arc::new(policy),
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the loop (and any open connection) when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(self, sink: Arc<dyn ChannelSink>) {
        let mut attempt: u32 = 0;
        loop {
            let opened = tokio::select! {
                _ = self.cancel.cancelled() => break,
                opened = self.run_session(sink.as_ref()) => opened,
            };
            if opened {
                attempt = 0;
            }
            attempt = attempt.saturating_add(1);
            let delay = self.policy.delay(attempt);
            pd_debug!("Push channel reconnect #{} in {:?}", attempt, delay);
            sink.deliver(ChannelEvent::ReconnectScheduled { attempt, delay });

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        pd_info!("Push channel to {} stopped", self.url);
    }

    /// One connection lifetime. Returns whether the connection was established.
    async fn run_session(&self, sink: &dyn ChannelSink) -> bool {
        let mut stream = match connect_async(self.url.as_str()).await {
            Ok((stream, _response)) => stream,
            Err(err) => {
                pd_warn!("Push channel connect to {} failed: {}", self.url, err);
                sink.deliver(ChannelEvent::Error(err.to_string()));
                return false;
            }
        };
        pd_info!("Push channel connected to {}", self.url);
        sink.deliver(ChannelEvent::Opened);

        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<StatusEvent>(&text) {
                    Ok(event) => sink.deliver(ChannelEvent::Status(event)),
                    Err(err) => {
                        pd_warn!("Ignoring undecodable push message: {}", err);
                        sink.deliver(ChannelEvent::DecodeFailed(err.to_string()));
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    pd_warn!("Push channel error: {}", err);
                    sink.deliver(ChannelEvent::Error(err.to_string()));
                    break;
                }
            }
        }

        pd_info!("Push channel to {} closed", self.url);
        sink.deliver(ChannelEvent::Closed);
        true
    }
}
