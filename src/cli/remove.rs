//! Удаление ключа

use colored::Colorize;

use crate::config::ResolvedSettings;
use crate::error::Result;

use super::{confirm, open_service};

pub fn run(settings: &ResolvedSettings, id: i64, yes: bool) -> Result<()> {
    let service = open_service(settings)?;
    let key = service.get_public_key(id)?;

    if !yes {
        println!("{} {}", "Ключ:".cyan(), key.omit_comment());
        let prompt = format!("Удалить ключ '{}' пользователя {}?", key.name, key.owner_id);
        if !confirm(&prompt) {
            println!("Отменено.");
            return Ok(());
        }
    }

    service.delete_public_key(id)?;

    println!("{} Ключ '{}' удалён.", "Успех:".green().bold(), key.name);

    Ok(())
}
