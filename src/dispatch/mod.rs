//! Upload dispatch
//!
//! Classifies an upload by extension, runs the matching external handler,
//! and recovers the file it produced from the marker line in its output.

mod error;
mod kind;
mod marker;
mod runner;
mod upload;

pub use error::DispatchError;
pub use kind::{file_extension, HandlerKind};
pub use marker::{parse_marker, MarkerLine, MARKER_PREFIX};
pub use runner::{HandlerInvocation, HandlerRunner, ProcessRunner};
pub use upload::{read_upload, UploadRequest, FILE_FIELD, TARGET_SIZE_FIELD};

use hyper::body::Bytes;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::mime;
use crate::logger;

/// File produced by a handler, ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct CompressedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Bytes,
}

pub struct Dispatcher {
    runner: Arc<dyn HandlerRunner>,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn HandlerRunner>) -> Self {
        Self { runner }
    }

    /// Run one upload through its handler
    ///
    /// The exit status is logged but never decides the outcome; only the
    /// marker line does.
    pub async fn dispatch(&self, upload: &UploadRequest) -> Result<CompressedFile, DispatchError> {
        let kind = upload.handler_kind().ok_or_else(|| {
            DispatchError::UnsupportedType(upload.extension().unwrap_or_default())
        })?;

        let args = [
            upload.path().as_os_str().to_owned(),
            OsString::from(&upload.target_size),
        ];
        let invocation = self.runner.invoke(kind, &args).await?;

        for line in invocation.stderr.lines().filter(|l| !l.trim().is_empty()) {
            logger::log_handler_stderr(kind, line);
        }

        match parse_marker(&invocation.stdout) {
            MarkerLine::Resolved(path) => {
                if invocation.exit_code != Some(0) {
                    logger::log_warning(&format!(
                        "{kind} handler exited with {:?} but reported {}",
                        invocation.exit_code,
                        path.display()
                    ));
                }
                load_result(path).await
            }
            MarkerLine::NotFound => Err(DispatchError::NoMarker {
                exit_code: invocation.exit_code,
            }),
        }
    }
}

async fn load_result(path: PathBuf) -> Result<CompressedFile, DispatchError> {
    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(source) => return Err(DispatchError::ResultUnreadable { path, source }),
    };

    let file_name = path
        .file_name()
        .map_or_else(|| "download".to_string(), |n| n.to_string_lossy().into_owned());
    let extension = file_extension(&file_name);
    let content_type = mime::get_content_type(extension.as_deref());

    Ok(CompressedFile {
        path,
        file_name,
        content_type,
        data: Bytes::from(data),
    })
}
