//! Реализация CLI команд

pub mod add;
pub mod check;
pub mod list;
pub mod rebuild;
pub mod remove;
pub mod rename;

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::authorized::AuthorizedKeys;
use crate::config::ResolvedSettings;
use crate::error::Result;
use crate::registry::FileRegistry;
use crate::service::KeyService;

/// Собрать сервис из разрешённых настроек
pub fn open_service(settings: &ResolvedSettings) -> Result<KeyService> {
    settings.ensure_ssh_dir()?;

    let registry = FileRegistry::open(&settings.registry_path)?;
    let authorized = AuthorizedKeys::new(&settings.ssh_dir, settings.entry_template());

    Ok(KeyService::new(
        Box::new(registry),
        Box::new(settings.inspector()),
        authorized,
    ))
}

/// Прочитать текст ключа из файла или из stdin (`-` или без аргумента)
pub fn read_key_input(source: Option<&Path>) -> Result<String> {
    match source {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Запросить подтверждение да/нет
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}
