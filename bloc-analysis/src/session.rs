//! One buffer's linter runs.
//!
//! Every [`CheckSession::start`] bumps the session generation and terminates the check
//! that was still live, so at most one linter process runs per buffer. A superseded
//! [`PendingCheck`] resolves to [`CheckOutcome::Superseded`] and its process is killed
//! when the pending check is dropped. Outcomes carry the generation they were started
//! with; [`CheckSession::accept`] refuses any that is not the latest.

use crate::diagnostic::Diagnostic;
use crate::report::parse_report;
use crate::resolve::resolve_all;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("linter `{program}` was not found")]
    MissingExecutable { program: String },
    #[error("failed to start linter `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("linter did not finish within {limit:?}")]
    TimedOut { limit: Duration },
}

/// How to run the linter. The buffer is written to its standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerOptions {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            program: "bloc-check".to_string(),
            args: vec!["-".to_string()],
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Finished {
        generation: u64,
        diagnostics: Vec<Diagnostic>,
    },
    Superseded {
        generation: u64,
    },
}

impl CheckOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            CheckOutcome::Finished { generation, .. } | CheckOutcome::Superseded { generation } => {
                *generation
            }
        }
    }
}

#[derive(Debug)]
pub struct CheckSession {
    options: CheckerOptions,
    generation: u64,
    live: Option<oneshot::Sender<()>>,
}

impl CheckSession {
    pub fn new(options: CheckerOptions) -> Self {
        Self {
            options,
            generation: 0,
            live: None,
        }
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// Generation of the most recently started check, 0 before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start checking `text`, superseding the live check if there is one.
    pub fn start(&mut self, text: &str) -> Result<PendingCheck, CheckError> {
        self.cancel();
        self.generation += 1;
        let program = self.options.program.clone();
        let child = Command::new(&program)
            .args(&self.options.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    warn!(program = %program, "linter executable not found");
                    CheckError::MissingExecutable {
                        program: program.clone(),
                    }
                } else {
                    CheckError::Spawn {
                        program: program.clone(),
                        source,
                    }
                }
            })?;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.live = Some(cancel_tx);
        debug!(generation = self.generation, program = %program, "started check");
        Ok(PendingCheck {
            generation: self.generation,
            child,
            input: text.to_string(),
            cancel: cancel_rx,
            timeout: self.options.timeout,
        })
    }

    /// Terminate the live check, if any.
    pub fn cancel(&mut self) {
        if let Some(live) = self.live.take() {
            // the receiver is gone when that check already finished
            let _ = live.send(());
        }
    }

    /// Diagnostics of `outcome` when it belongs to the latest check.
    pub fn accept(&mut self, outcome: CheckOutcome) -> Option<Vec<Diagnostic>> {
        match outcome {
            CheckOutcome::Finished {
                generation,
                diagnostics,
            } if generation == self.generation => {
                self.live = None;
                Some(diagnostics)
            }
            CheckOutcome::Finished { generation, .. } => {
                debug!(
                    generation,
                    current = self.generation,
                    "discarding diagnostics of a stale check"
                );
                None
            }
            CheckOutcome::Superseded { generation } => {
                debug!(generation, "check was superseded");
                None
            }
        }
    }
}

/// A running linter process. Dropping it kills the process.
#[derive(Debug)]
pub struct PendingCheck {
    generation: u64,
    child: Child,
    input: String,
    cancel: oneshot::Receiver<()>,
    timeout: Option<Duration>,
}

impl PendingCheck {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Feed the buffer to the linter and wait for its report, or for the session to
    /// supersede this check.
    pub async fn wait(self) -> Result<CheckOutcome, CheckError> {
        let PendingCheck {
            generation,
            mut child,
            input,
            mut cancel,
            timeout,
        } = self;

        if let Some(mut stdin) = child.stdin.take() {
            let bytes = input.clone().into_bytes();
            tokio::spawn(async move {
                // linters may exit without reading everything
                let _ = stdin.write_all(&bytes).await;
            });
        }

        let run = async move {
            let output = child.wait_with_output();
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, output).await {
                    Ok(output) => output.map_err(CheckError::from),
                    Err(_) => {
                        warn!(generation, ?limit, "linter timed out");
                        Err(CheckError::TimedOut { limit })
                    }
                },
                None => output.await.map_err(CheckError::from),
            }
        };

        tokio::select! {
            _ = &mut cancel => Ok(CheckOutcome::Superseded { generation }),
            output = run => {
                let output = output?;
                debug!(generation, status = %output.status, "linter finished");
                let mut report = String::from_utf8_lossy(&output.stdout).into_owned();
                if !report.is_empty() && !report.ends_with('\n') {
                    report.push('\n');
                }
                report.push_str(&String::from_utf8_lossy(&output.stderr));
                let diagnostics = resolve_all(&input, &parse_report(&report));
                Ok(CheckOutcome::Finished {
                    generation,
                    diagnostics,
                })
            }
        }
    }
}
