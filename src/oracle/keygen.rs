//! `ssh-keygen` backed inspector

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::{Inspection, KeyInspector};
use crate::error::{KeySyncError, Result};

/// Default program name, looked up on PATH
pub const DEFAULT_PROGRAM: &str = "ssh-keygen";

/// Default upper bound on a single invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs `<program> -l -f <path>` and captures its listing
#[derive(Debug, Clone)]
pub struct SshKeygen {
    program: String,
    timeout: Duration,
}

impl SshKeygen {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for the child, killing it once the deadline passes
    fn wait_bounded(&self, child: &mut Child) -> Result<ExitStatus> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!(
                    program = %self.program,
                    timeout = ?self.timeout,
                    "key inspector timed out, killing it"
                );
                child.kill().ok();
                child.wait().ok();
                return Err(KeySyncError::OracleTimeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Read a child pipe to the end on its own thread while the child runs
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut pipe) = pipe {
            let mut bytes = Vec::new();
            pipe.read_to_end(&mut bytes).ok();
            text = String::from_utf8_lossy(&bytes).into_owned();
        }
        text
    })
}

fn collect(reader: JoinHandle<String>) -> String {
    reader.join().unwrap_or_default()
}

impl Default for SshKeygen {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_TIMEOUT)
    }
}

impl KeyInspector for SshKeygen {
    fn inspect(&self, path: &Path) -> Result<Inspection> {
        debug!(program = %self.program, path = %path.display(), "inspecting key");

        let mut child = Command::new(&self.program)
            .arg("-l")
            .arg("-f")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| KeySyncError::OracleFailed(format!("{}: {}", self.program, e)))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // On timeout the readers are left to finish on their own
        let status = self.wait_bounded(&mut child)?;
        let stdout = collect(stdout);
        let stderr = collect(stderr);

        if !status.success() {
            return Err(KeySyncError::OracleFailed(stderr.trim().to_string()));
        }

        let inspection = Inspection::new(stdout);
        // The Windows build of ssh-keygen omits the algorithm label
        if cfg!(windows) {
            Ok(inspection.without_algorithm())
        } else {
            Ok(inspection)
        }
    }
}
