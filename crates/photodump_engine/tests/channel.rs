use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use photodump_engine::{ChannelEvent, FixedDelay, PushChannel, StatusEvent};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use url::Url;

const FAST: Duration = Duration::from_millis(10);

/// Accepts every connection, sends `frames`, then closes.
async fn spawn_push_server(frames: Vec<&'static str>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let frames = frames.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(tcp).await else {
                    return;
                };
                for frame in frames {
                    if ws.send(Message::Text(frame.into())).await.is_err() {
                        return;
                    }
                }
                let _ = ws.close(None).await;
            });
        }
    });
    addr
}

fn start(url: Url) -> (UnboundedReceiver<ChannelEvent>, CancellationToken, JoinHandle<()>) {
    let (tx, rx) = unbounded_channel();
    let channel = PushChannel::new(url, FixedDelay(FAST));
    let cancel = channel.cancellation_token();
    let sink = Arc::new(move |event: ChannelEvent| {
        let _ = tx.send(event);
    });
    let task = tokio::spawn(channel.run(sink));
    (rx, cancel, task)
}

async fn next_event(rx: &mut UnboundedReceiver<ChannelEvent>) -> ChannelEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("channel event in time")
        .expect("sink alive")
}

fn status(name: &str) -> ChannelEvent {
    ChannelEvent::Status(StatusEvent {
        status: name.to_string(),
        results: None,
        message: None,
    })
}

#[tokio::test]
async fn undecodable_frames_do_not_drop_the_connection() {
    let addr = spawn_push_server(vec!["not json", r#"{"status":"processing"}"#]).await;
    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let (mut rx, cancel, task) = start(url);

    assert_eq!(next_event(&mut rx).await, ChannelEvent::Opened);
    assert!(matches!(next_event(&mut rx).await, ChannelEvent::DecodeFailed(_)));
    assert_eq!(next_event(&mut rx).await, status("processing"));
    assert_eq!(next_event(&mut rx).await, ChannelEvent::Closed);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("channel stops after cancel")
        .unwrap();
}

#[tokio::test]
async fn every_close_schedules_exactly_one_reconnect() {
    let addr = spawn_push_server(vec![r#"{"status":"categorizing"}"#]).await;
    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let (mut rx, cancel, _task) = start(url);

    for _ in 0..3 {
        assert_eq!(next_event(&mut rx).await, ChannelEvent::Opened);
        assert_eq!(next_event(&mut rx).await, status("categorizing"));
        assert_eq!(next_event(&mut rx).await, ChannelEvent::Closed);
        // A successful open resets the attempt counter.
        assert_eq!(
            next_event(&mut rx).await,
            ChannelEvent::ReconnectScheduled {
                attempt: 1,
                delay: FAST
            }
        );
    }
    cancel.cancel();
}

#[tokio::test]
async fn unreachable_server_keeps_retrying() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let url = Url::parse(&format!("ws://{addr}/ws")).unwrap();
    let (mut rx, cancel, task) = start(url);

    for attempt in 1..=3 {
        assert!(matches!(next_event(&mut rx).await, ChannelEvent::Error(_)));
        assert_eq!(
            next_event(&mut rx).await,
            ChannelEvent::ReconnectScheduled {
                attempt,
                delay: FAST
            }
        );
    }

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("channel stops after cancel")
        .unwrap();
}
