//! Добавление публичного ключа

use std::path::Path;

use colored::Colorize;

use crate::config::ResolvedSettings;
use crate::error::Result;

use super::{open_service, read_key_input};

pub fn run(
    settings: &ResolvedSettings,
    owner: i64,
    name: &str,
    source: Option<&Path>,
) -> Result<()> {
    let raw = read_key_input(source)?;
    let service = open_service(settings)?;

    let key = service.add_public_key(owner, name, &raw)?;

    println!(
        "{} Ключ '{}' добавлен (id {})",
        "Успех:".green().bold(),
        key.name,
        key.id
    );
    println!("  {} {}", "Отпечаток:".cyan(), key.fingerprint);

    Ok(())
}
