//! Просмотр ключей

use colored::Colorize;

use crate::config::ResolvedSettings;
use crate::error::Result;

use super::open_service;

/// Показать ключи пользователя
pub fn list(settings: &ResolvedSettings, owner: i64) -> Result<()> {
    let service = open_service(settings)?;
    let keys = service.list_public_keys(owner)?;

    if keys.is_empty() {
        println!("У пользователя {} нет ключей.", owner);
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<50} {:<10}",
        "ID".bold(),
        "ИМЯ".bold(),
        "ОТПЕЧАТОК".bold(),
        "АКТИВНОСТЬ".bold()
    );
    println!("{}", "─".repeat(90).dimmed());

    for key in &keys {
        let activity = if key.has_recent_activity && key.has_used {
            "недавно".green()
        } else if key.has_used {
            "давно".normal()
        } else {
            "нет".dimmed()
        };
        println!(
            "{:<6} {:<20} {:<50} {:<10}",
            key.id, key.name, key.fingerprint, activity
        );
    }

    println!();
    Ok(())
}

/// Показать один ключ
pub fn show(settings: &ResolvedSettings, id: i64) -> Result<()> {
    let service = open_service(settings)?;
    let key = service.get_public_key(id)?;

    println!("{} {}", "ID:".cyan(), key.id);
    println!("{} {}", "Владелец:".cyan(), key.owner_id);
    println!("{} {}", "Имя:".cyan(), key.name);
    println!("{} {}", "Отпечаток:".cyan(), key.fingerprint);
    println!("{} {}", "Создан:".cyan(), key.created.to_rfc3339());
    println!("{} {}", "Обновлён:".cyan(), key.updated.to_rfc3339());
    println!();
    println!("{}", key.omit_comment());

    Ok(())
}
