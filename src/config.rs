//! Environment-sourced runtime configuration. The argument vector is
//! deliberately not consulted.

use std::env;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use tracing::warn;

/// Names the signal to observe. Defaults to SIGTERM; harnesses point it at an
/// uncatchable signal (e.g. SIGKILL) to drive the registration failure path.
pub const SIGNAL_ENV: &str = "SIGWHO_SIGNAL";

#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Signal whose sender gets reported.
    pub signal: Signal,
}

impl Config {
    /// Reads configuration from the environment. A value that does not name
    /// a signal is reported as `EINVAL`, the same way an unregistrable
    /// signal would be.
    pub fn from_env() -> Result<Self, Errno> {
        let signal = match env::var(SIGNAL_ENV) {
            Ok(name) => parse_signal(&name)?,
            Err(env::VarError::NotPresent) => Signal::SIGTERM,
            Err(env::VarError::NotUnicode(raw)) => {
                warn!("{} is not valid unicode: {:?}", SIGNAL_ENV, raw);
                return Err(Errno::EINVAL);
            }
        };
        Ok(Config { signal })
    }
}

fn parse_signal(name: &str) -> Result<Signal, Errno> {
    name.trim().parse::<Signal>().map_err(|_| {
        warn!("unrecognized signal name {:?}", name);
        Errno::EINVAL
    })
}
