//! Настройки, разрешаемые один раз при запуске

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::authorized::EntryTemplate;
use crate::error::{KeySyncError, Result};
use crate::oracle::{SshKeygen, DEFAULT_PROGRAM, DEFAULT_TIMEOUT};

const SSH_DIR: &str = ".ssh";
const DATA_DIR: &str = ".ssh-keysync";
const REGISTRY_FILE: &str = "keys.json";
const DEFAULT_CONFIG: &str = "custom/conf/app.ini";

/// Settings file contents; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `authorized_keys`
    pub ssh_dir: Option<PathBuf>,
    /// Executable named in the forced command
    pub app_path: Option<String>,
    /// Config file passed to the forced command
    pub config_path: Option<String>,
    /// Key inspector program
    pub keygen_program: Option<String>,
    /// Upper bound for one inspector run
    pub keygen_timeout_secs: Option<u64>,
    /// JSON key registry
    pub registry_path: Option<PathBuf>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub ssh_dir: PathBuf,
    pub app_path: String,
    pub config_path: String,
    pub keygen_program: String,
    pub keygen_timeout: Duration,
    pub registry_path: PathBuf,
}

impl Settings {
    /// Прочитать файл настроек
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Fill defaults from the environment: home directory and the running
    /// executable. `source` is the settings file, if one was given.
    pub fn resolve(self, source: Option<&Path>) -> Result<ResolvedSettings> {
        let home = dirs::home_dir().ok_or_else(|| {
            KeySyncError::InvalidConfig("не удалось определить домашнюю директорию".into())
        })?;
        let exe = std::env::current_exe()?;
        self.resolve_with(&home, &exe, source)
    }

    fn resolve_with(
        self,
        home: &Path,
        exe: &Path,
        source: Option<&Path>,
    ) -> Result<ResolvedSettings> {
        if self.keygen_timeout_secs == Some(0) {
            return Err(KeySyncError::InvalidConfig(
                "keygen_timeout_secs должен быть больше нуля".into(),
            ));
        }

        let ssh_dir = self.ssh_dir.unwrap_or_else(|| home.join(SSH_DIR));

        let app_path = self
            .app_path
            .unwrap_or_else(|| exe.to_string_lossy().into_owned())
            .replace('\\', "/");

        let config_path = match (self.config_path, source) {
            (Some(path), _) => path,
            (None, Some(source)) => source.to_string_lossy().into_owned(),
            (None, None) => exe
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_CONFIG)
                .to_string_lossy()
                .into_owned(),
        }
        .replace('\\', "/");

        let keygen_timeout = self
            .keygen_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(ResolvedSettings {
            ssh_dir,
            app_path,
            config_path,
            keygen_program: self.keygen_program.unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            keygen_timeout,
            registry_path: self
                .registry_path
                .unwrap_or_else(|| home.join(DATA_DIR).join(REGISTRY_FILE)),
        })
    }
}

impl ResolvedSettings {
    /// Load settings from an optional file and resolve them
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        settings.resolve(path)
    }

    /// Создать директорию SSH с правами 0700, если её нет
    pub fn ensure_ssh_dir(&self) -> Result<()> {
        if !self.ssh_dir.exists() {
            fs::create_dir_all(&self.ssh_dir)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&self.ssh_dir, fs::Permissions::from_mode(0o700))?;
            }
        }
        Ok(())
    }

    pub fn entry_template(&self) -> EntryTemplate {
        EntryTemplate::new(self.app_path.clone(), self.config_path.clone())
    }

    pub fn inspector(&self) -> SshKeygen {
        SshKeygen::new(self.keygen_program.clone(), self.keygen_timeout)
    }
}
