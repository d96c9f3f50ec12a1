// src/exec/supervisor.rs

//! Supervised external processes.
//!
//! A [`SupervisedProcess`] owns nothing but a handle: the child itself lives
//! in a background Tokio task (the *monitor*) which waits for it, drains its
//! output, delivers terminate/kill requests and finally runs the exit hooks.
//! The launcher is free to do other work while the process runs.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use anyhow::anyhow;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::{BackwatchError, Result};

/// Program plus argument vector. Never goes through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    program: OsString,
    args: Vec<OsString>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }
}

/// Shell-quoted command line, for logs only.
impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

/// Quote `s` for a POSIX shell when it contains anything but safe characters.
pub fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Callback receiving the exit code.
pub type ExitHook = Box<dyn FnOnce(i32) + Send + 'static>;

/// Callbacks run by the monitor task once the process has exited.
///
/// `on_exit` always runs; `on_error` additionally runs for a non-zero code.
/// Both run on a Tokio worker, never on the launcher's task.
#[derive(Default)]
pub struct ExitHooks {
    on_exit: Option<ExitHook>,
    on_error: Option<ExitHook>,
}

impl ExitHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_exit(mut self, hook: impl FnOnce(i32) + Send + 'static) -> Self {
        self.on_exit = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl FnOnce(i32) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for ExitHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitHooks")
            .field("on_exit", &self.on_exit.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Terminate,
    Kill,
}

/// Handle to a running (or finished) external process.
#[derive(Debug)]
pub struct SupervisedProcess {
    program: String,
    pid: Option<u32>,
    exit_rx: watch::Receiver<Option<i32>>,
    control_tx: mpsc::UnboundedSender<Signal>,
}

impl SupervisedProcess {
    /// Start `spec` and hand it to a monitor task.
    ///
    /// Returns only once the OS process exists, so an immediate `wait()`
    /// cannot race process creation. A binary that cannot be started is a
    /// [`BackwatchError::LaunchError`]. Must be called within a Tokio runtime.
    pub fn launch(spec: &ProcessSpec, hooks: ExitHooks) -> Result<Self> {
        let program = spec.program.to_string_lossy().into_owned();
        debug!(command = %spec, "launching process");

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BackwatchError::LaunchError {
                program: program.clone(),
                source,
            })?;

        let pid = child.id();
        debug!(program = %program, pid, "process started");

        if let Some(stdout) = child.stdout.take() {
            drain_output(stdout, program.clone(), "stdout");
        }
        if let Some(stderr) = child.stderr.take() {
            drain_output(stderr, program.clone(), "stderr");
        }

        let (exit_tx, exit_rx) = watch::channel(None);
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        tokio::spawn(monitor(child, program.clone(), hooks, control_rx, exit_tx));

        Ok(Self {
            program,
            pid,
            exit_rx,
            control_tx,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Non-blocking poll: `Some(code)` once the process has exited and its
    /// hooks have run.
    pub fn status(&self) -> Option<i32> {
        *self.exit_rx.borrow()
    }

    /// Wait for the process to exit and its hooks to finish.
    pub async fn wait(&self) -> Result<i32> {
        let mut rx = self.exit_rx.clone();
        let code = rx.wait_for(Option::is_some).await.map_err(|_| {
            anyhow!(
                "monitor for '{}' stopped without reporting an exit code",
                self.program
            )
        })?;
        Ok((*code).unwrap_or(-1))
    }

    /// Wait at most `deadline`, then terminate; if the process is still
    /// alive after `grace`, kill it.
    pub async fn wait_with_deadline(&self, deadline: Duration, grace: Duration) -> Result<i32> {
        if let Ok(res) = tokio::time::timeout(deadline, self.wait()).await {
            return res;
        }

        warn!(program = %self.program, pid = self.pid, ?deadline, "process exceeded its deadline; terminating");
        self.terminate();

        if let Ok(res) = tokio::time::timeout(grace, self.wait()).await {
            return res;
        }

        warn!(program = %self.program, pid = self.pid, ?grace, "process ignored terminate; killing");
        self.kill();
        self.wait().await
    }

    /// Ask the process to stop (SIGTERM on unix).
    pub fn terminate(&self) {
        self.signal(Signal::Terminate);
    }

    /// Force the process to stop.
    pub fn kill(&self) {
        self.signal(Signal::Kill);
    }

    fn signal(&self, signal: Signal) {
        if self.status().is_some() {
            debug!(program = %self.program, ?signal, "process already exited; ignoring signal");
            return;
        }
        if self.control_tx.send(signal).is_err() {
            debug!(program = %self.program, ?signal, "monitor already finished; ignoring signal");
        }
    }
}

async fn monitor(
    mut child: Child,
    program: String,
    hooks: ExitHooks,
    mut control_rx: mpsc::UnboundedReceiver<Signal>,
    exit_tx: watch::Sender<Option<i32>>,
) {
    let code = loop {
        tokio::select! {
            status = child.wait() => {
                break match status {
                    Ok(status) => status.code().unwrap_or(-1),
                    Err(e) => {
                        warn!(program = %program, error = %e, "failed waiting for process");
                        -1
                    }
                };
            }
            Some(signal) = control_rx.recv() => deliver(&mut child, signal, &program),
        }
    };

    info!(program = %program, exit_code = code, success = code == 0, "process exited");

    if let Some(on_exit) = hooks.on_exit {
        on_exit(code);
    }
    if code != 0 {
        if let Some(on_error) = hooks.on_error {
            on_error(code);
        }
    }

    // Published last so that `wait()` observes completed hooks.
    exit_tx.send_replace(Some(code));
}

fn deliver(child: &mut Child, signal: Signal, program: &str) {
    let res = match signal {
        Signal::Terminate => send_terminate(child),
        Signal::Kill => child.start_kill(),
    };
    match res {
        Ok(()) => debug!(program = %program, ?signal, "signal delivered"),
        Err(e) => warn!(program = %program, ?signal, error = %e, "failed to signal process"),
    }
}

#[cfg(unix)]
fn send_terminate(child: &mut Child) -> std::io::Result<()> {
    // `id()` is None once the child was reaped, so a recycled pid is never hit.
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = libc::pid_t::try_from(pid).map_err(std::io::Error::other)?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_terminate(child: &mut Child) -> std::io::Result<()> {
    child.start_kill()
}

/// Consume a child output stream so pipes never fill; log lines at debug.
fn drain_output<R>(stream: R, program: String, name: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(program = %program, stream = name, "{}", line);
        }
    });
}
