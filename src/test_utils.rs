//! Shared fixtures for unit tests: multipart bodies and a scripted runner

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use multer::Multipart;
use std::ffi::OsString;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::dispatch::{DispatchError, HandlerInvocation, HandlerKind, HandlerRunner};

pub const BOUNDARY: &str = "squeeze-test-boundary";

/// Builds a `multipart/form-data` body with [`BOUNDARY`]
#[derive(Default)]
pub struct FormBody {
    buf: Vec<u8>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: &str, file_name: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn finish(mut self) -> Bytes {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(self.buf)
    }
}

pub fn form_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub fn multipart(body: Bytes) -> Multipart<'static> {
    Multipart::new(Full::new(body).into_data_stream(), BOUNDARY)
}

/// Canned handler output
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Runner that never spawns anything; records every call instead
#[derive(Default)]
pub struct StubRunner {
    script: Script,
    delay: Duration,
    calls: AtomicUsize,
    last: Mutex<Option<(HandlerKind, Vec<OsString>)>>,
}

impl StubRunner {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Handler that prints `FINAL_OUTPUT_PATH::<path>` and exits with `exit_code`
    pub fn printing(path: &std::path::Path, exit_code: i32) -> Self {
        Self::new(Script {
            stdout: format!("compressing...\nFINAL_OUTPUT_PATH::{}\n", path.display()),
            stderr: String::new(),
            exit_code: Some(exit_code),
        })
    }

    /// Take `delay` to "run", like a slow compression would
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> Option<(HandlerKind, Vec<OsString>)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl HandlerRunner for StubRunner {
    async fn invoke(
        &self,
        kind: HandlerKind,
        args: &[OsString],
    ) -> Result<HandlerInvocation, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((kind, args.to_vec()));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(HandlerInvocation {
            kind,
            args: args.to_vec(),
            stdout: self.script.stdout.clone(),
            stderr: self.script.stderr.clone(),
            exit_code: self.script.exit_code,
        })
    }
}
