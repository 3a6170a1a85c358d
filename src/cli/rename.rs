//! Переименование ключа

use colored::Colorize;

use crate::config::ResolvedSettings;
use crate::error::Result;

use super::open_service;

pub fn run(settings: &ResolvedSettings, id: i64, name: &str) -> Result<()> {
    let service = open_service(settings)?;

    let mut key = service.get_public_key(id)?;
    let old_name = std::mem::replace(&mut key.name, name.to_string());
    let key = service.update_public_key(&key)?;

    println!(
        "{} Ключ '{}' переименован в '{}'",
        "Успех:".green().bold(),
        old_name,
        key.name
    );

    Ok(())
}
