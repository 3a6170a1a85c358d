//! Проверка ключа без сохранения

use std::path::Path;

use colored::Colorize;

use crate::config::ResolvedSettings;
use crate::error::Result;

use super::{open_service, read_key_input};

pub fn run(settings: &ResolvedSettings, source: Option<&Path>) -> Result<()> {
    let raw = read_key_input(source)?;
    let service = open_service(settings)?;

    let checked = service.check_key(&raw)?;
    let registered = service.registry().exists_by_fingerprint(&checked.fingerprint)?;

    println!("{}", "Ключ принят".green().bold());
    println!("  {} {}", "Тип:".cyan(), checked.key_type);
    println!("  {} {}", "Отпечаток:".cyan(), checked.fingerprint);
    if registered {
        println!("  {}", "Этот ключ уже зарегистрирован".yellow());
    }
    println!();
    println!("{}", checked.content);

    Ok(())
}
