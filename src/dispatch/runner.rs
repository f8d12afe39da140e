//! External handler invocation
//!
//! [`HandlerRunner`] is the process boundary. [`ProcessRunner`] runs the
//! configured scripts through an interpreter; tests swap in a stub.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::error::DispatchError;
use super::kind::HandlerKind;
use crate::config::CompressionConfig;
use crate::logger;

/// Everything observed about one finished handler run
#[derive(Debug, Clone)]
pub struct HandlerInvocation {
    pub kind: HandlerKind,
    pub args: Vec<OsString>,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

#[async_trait]
pub trait HandlerRunner: Send + Sync {
    /// Run the handler for `kind` to completion with positional `args`
    async fn invoke(
        &self,
        kind: HandlerKind,
        args: &[OsString],
    ) -> Result<HandlerInvocation, DispatchError>;
}

/// Runs `<interpreter> <script> <args...>` as a child process
///
/// Working directory and environment are inherited from the server. The
/// child is killed if the wait is abandoned (timeout or dropped request).
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interpreter: String,
    image_script: PathBuf,
    pdf_script: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(
        interpreter: impl Into<String>,
        image_script: impl Into<PathBuf>,
        pdf_script: impl Into<PathBuf>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            image_script: image_script.into(),
            pdf_script: pdf_script.into(),
            timeout,
        }
    }

    pub fn from_config(config: &CompressionConfig) -> Self {
        let timeout = (config.handler_timeout_secs > 0)
            .then(|| Duration::from_secs(config.handler_timeout_secs));
        Self::new(
            config.interpreter.clone(),
            &config.image_script,
            &config.pdf_script,
            timeout,
        )
    }

    pub fn script_for(&self, kind: HandlerKind) -> &Path {
        match kind {
            HandlerKind::Image => self.image_script.as_path(),
            HandlerKind::Pdf => self.pdf_script.as_path(),
        }
    }

    fn process_error(&self, source: std::io::Error) -> DispatchError {
        DispatchError::Process {
            program: self.interpreter.clone(),
            source,
        }
    }

    /// Warn about handler scripts that are missing at startup
    pub fn check_scripts(&self) {
        for kind in [HandlerKind::Image, HandlerKind::Pdf] {
            let script = self.script_for(kind);
            if !script.is_file() {
                logger::log_warning(&format!(
                    "{kind} handler script not found: {}",
                    script.display()
                ));
            }
        }
    }
}

#[async_trait]
impl HandlerRunner for ProcessRunner {
    async fn invoke(
        &self,
        kind: HandlerKind,
        args: &[OsString],
    ) -> Result<HandlerInvocation, DispatchError> {
        let mut command = Command::new(&self.interpreter);
        command
            .arg(self.script_for(kind))
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let child = command.spawn().map_err(|source| self.process_error(source))?;
        logger::log_handler_started(kind, child.id(), args);

        // Dropping the wait future drops the child, which kills it
        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| DispatchError::Timeout(limit))?,
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|source| self.process_error(source))?;

        let invocation = HandlerInvocation {
            kind,
            args: args.to_vec(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        logger::log_handler_finished(kind, invocation.exit_code, started.elapsed());
        Ok(invocation)
    }
}
