use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::channel::ChannelEvent;

pub type JobId = u64;
pub type UploadId = u64;

/// Category label -> photo paths, in the order the server sent them.
pub type CategoryResults = Vec<(String, Vec<String>)>;

/// One file of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    All,
    Uploads,
}

impl ClearScope {
    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            ClearScope::All => "clear",
            ClearScope::Uploads => "clear-uploads",
        }
    }
}

/// Push payload, decoded but otherwise forwarded as the server sent it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusEvent {
    pub status: String,
    #[serde(default)]
    pub results: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Uploaded {
        upload_id: UploadId,
        result: Result<UploadReceipt, RequestError>,
    },
    Removed {
        filename: String,
        result: Result<(), RequestError>,
    },
    UploadsListed(Result<Vec<String>, RequestError>),
    Processed {
        job_id: JobId,
        result: Result<CategoryResults, RequestError>,
    },
    Cleared {
        scope: ClearScope,
        result: Result<(), RequestError>,
    },
    Downloaded(Result<PathBuf, RequestError>),
    Channel(ChannelEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidInput,
    HttpStatus(u16),
    Network,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidInput => write!(f, "invalid input"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Decode a `{category: [path, ...]}` object, keeping the server's key order.
pub fn decode_results(value: Value) -> Result<CategoryResults, RequestError> {
    let Value::Object(map) = value else {
        return Err(RequestError::new(
            FailureKind::Decode,
            "results must be an object",
        ));
    };
    map.into_iter()
        .map(|(category, photos)| {
            serde_json::from_value::<Vec<String>>(photos)
                .map(|photos| (category.clone(), photos))
                .map_err(|err| {
                    RequestError::new(FailureKind::Decode, format!("category {category}: {err}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_results, FailureKind, StatusEvent};
    use serde_json::json;

    #[test]
    fn results_keep_server_order() {
        let decoded = decode_results(json!({
            "zebras": ["z.png"],
            "apples": [],
            "mice": ["m1.png", "m2.png"],
        }))
        .unwrap();
        let labels: Vec<_> = decoded.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(labels, vec!["zebras", "apples", "mice"]);
        assert_eq!(decoded[2].1, vec!["m1.png", "m2.png"]);
    }

    #[test]
    fn malformed_results_are_rejected() {
        let err = decode_results(json!(["a.png"])).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
        let err = decode_results(json!({"cats": "a.png"})).unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }

    #[test]
    fn status_event_tolerates_missing_and_extra_fields() {
        let event: StatusEvent =
            serde_json::from_str(r#"{"status":"error","message":"boom","extra":1}"#).unwrap();
        assert_eq!(event.status, "error");
        assert_eq!(event.message.as_deref(), Some("boom"));
        assert!(event.results.is_none());
    }
}
