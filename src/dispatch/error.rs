//! Dispatch error taxonomy
//!
//! Client input problems map to 4xx with their own message. Every handler
//! execution problem collapses into one generic 500 for the caller; the
//! specific cause only reaches the server log.

use http_body_util::LengthLimitError;
use hyper::StatusCode;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no file uploaded")]
    NoFile,

    #[error("unsupported file type: {0:?}")]
    UnsupportedType(String),

    #[error("unexpected file field: {0:?}")]
    UnexpectedField(String),

    #[error("invalid multipart body: {0}")]
    Multipart(multer::Error),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("failed to store upload: {0}")]
    Storage(#[from] io::Error),

    #[error("handler process {program:?} failed: {source}")]
    Process {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("handler did not finish within {0:?}")]
    Timeout(Duration),

    #[error("handler output has no FINAL_OUTPUT_PATH line (exit code {exit_code:?})")]
    NoMarker { exit_code: Option<i32> },

    #[error("cannot read handler result {}: {source}", .path.display())]
    ResultUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DispatchError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NoFile | Self::UnsupportedType(_) | Self::UnexpectedField(_) | Self::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_)
            | Self::Process { .. }
            | Self::Timeout(_)
            | Self::NoMarker { .. }
            | Self::ResultUnreadable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body sent to the caller
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::NoFile => "No file uploaded",
            Self::UnsupportedType(_) => "Unsupported file type",
            Self::UnexpectedField(_) => "Unexpected field",
            Self::Multipart(_) => "Invalid multipart body",
            Self::PayloadTooLarge => "413 Payload Too Large",
            Self::Storage(_) => "Upload failed",
            Self::Process { .. }
            | Self::Timeout(_)
            | Self::NoMarker { .. }
            | Self::ResultUnreadable { .. } => "Compression failed",
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<multer::Error> for DispatchError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamReadFailed(source) if source.is::<LengthLimitError>() => {
                Self::PayloadTooLarge
            }
            other => Self::Multipart(other),
        }
    }
}
