//! `authorized_keys` synchronization
//!
//! Every registered key becomes one forced-command line:
//!
//! ```text
//! command="<app> serv key-<id> --config='<conf>'",no-port-forwarding,no-X11-forwarding,no-agent-forwarding,no-pty <content>
//! ```
//!
//! All mutations go through one lock. Appends write in place; single-key
//! removal and full rebuilds write a sibling temporary file and rename it
//! over the original as the last step.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::keys::PublicKey;
use crate::registry::KeyRegistry;

/// File name inside the SSH directory
pub const AUTHORIZED_KEYS_FILE: &str = "authorized_keys";

/// Fixed parts of every generated line, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTemplate {
    /// Executable invoked by the forced command
    pub app_path: String,
    /// Config file passed to the forced command
    pub config_path: String,
}

impl EntryTemplate {
    pub fn new(app_path: impl Into<String>, config_path: impl Into<String>) -> Self {
        Self {
            app_path: app_path.into(),
            config_path: config_path.into(),
        }
    }

    /// The full `authorized_keys` line for `key`, newline included
    pub fn render(&self, key: &PublicKey) -> String {
        format!(
            "command=\"{} {}--config='{}'\",no-port-forwarding,no-X11-forwarding,no-agent-forwarding,no-pty {}\n",
            self.app_path,
            marker(key.id),
            self.config_path,
            key.content
        )
    }
}

/// Id marker as it appears inside a generated line. The trailing space keeps
/// `key-1` from matching `key-12`.
fn marker(id: i64) -> String {
    format!("serv key-{} ", id)
}

/// Owner of the on-disk `authorized_keys` file
#[derive(Debug)]
pub struct AuthorizedKeys {
    dir: PathBuf,
    path: PathBuf,
    template: EntryTemplate,
    lock: Mutex<()>,
}

impl AuthorizedKeys {
    pub fn new(ssh_dir: impl Into<PathBuf>, template: EntryTemplate) -> Self {
        let dir = ssh_dir.into();
        let path = dir.join(AUTHORIZED_KEYS_FILE);
        Self {
            dir,
            path,
            template,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn template(&self) -> &EntryTemplate {
        &self.template
    }

    /// Append one line per key, in order.
    ///
    /// A failed write aborts the batch and may leave a partial line behind;
    /// a rebuild from the registry repairs that.
    pub fn add(&self, keys: &[PublicKey]) -> Result<()> {
        let _guard = self.lock.lock();

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        restrict_permissions(&file, &self.path)?;

        for key in keys {
            file.write_all(key.authorized_line(&self.template).as_bytes())?;
        }

        debug!(count = keys.len(), path = %self.path.display(), "appended authorized keys");
        Ok(())
    }

    /// Drop the line belonging to `key` and keep everything else in order.
    ///
    /// Returns whether a matching line was found. A missing file holds no
    /// lines, so there is nothing to remove.
    pub fn remove(&self, key: &PublicKey) -> Result<bool> {
        let _guard = self.lock.lock();

        let source = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let marker = marker(key.id);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        let mut found = false;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            for line in BufReader::new(source).lines() {
                let line = line?;
                if !found && line.contains(&marker) && line.contains(&key.content) {
                    found = true;
                    continue;
                }
                writer.write_all(line.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(id = key.id, found, "removed authorized key");
        Ok(found)
    }

    /// Regenerate the whole file from the registry.
    ///
    /// Returns the number of lines written.
    pub fn rewrite_all(&self, registry: &dyn KeyRegistry) -> Result<usize> {
        let _guard = self.lock.lock();

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        let mut count = 0;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            registry.iterate_all(&mut |key| {
                writer.write_all(key.authorized_line(&self.template).as_bytes())?;
                count += 1;
                Ok(())
            })?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(count, path = %self.path.display(), "rewrote authorized_keys");
        Ok(count)
    }
}

/// Tighten an `authorized_keys` file that is readable beyond its owner
#[cfg(unix)]
fn restrict_permissions(file: &File, path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = file.metadata()?.permissions().mode() & 0o777;
    if mode & !0o600 != 0 {
        warn!(
            path = %path.display(),
            mode = %format!("{:o}", mode),
            "authorized_keys has unusual permission flags, setting to 0600"
        );
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File, _path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests;
