//! Interrupt handling for a running gather.
//!
//! [`interrupted`] resolves with the first termination signal the process receives.
//! The caller cancels the supervisor's root token; sources still finish or time out.

use std::fmt;

/// The signal that ended the wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    /// `SIGINT`, or Ctrl-C on Windows.
    CtrlC,
    /// `SIGTERM`.
    Terminate,
    /// `SIGHUP`: the controlling terminal went away.
    Hangup,
}

impl fmt::Display for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Interrupt::CtrlC => "SIGINT",
            Interrupt::Terminate => "SIGTERM",
            Interrupt::Hangup => "SIGHUP",
        })
    }
}

/// Waits for `SIGINT`, `SIGTERM` or `SIGHUP`.
///
/// Fails only if a handler cannot be registered.
#[cfg(unix)]
pub async fn interrupted() -> std::io::Result<Interrupt> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut int = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;
    let mut hup = signal(SignalKind::hangup())?;

    Ok(tokio::select! {
        _ = int.recv() => Interrupt::CtrlC,
        _ = term.recv() => Interrupt::Terminate,
        _ = hup.recv() => Interrupt::Hangup,
    })
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub async fn interrupted() -> std::io::Result<Interrupt> {
    tokio::signal::ctrl_c().await.map(|()| Interrupt::CtrlC)
}
