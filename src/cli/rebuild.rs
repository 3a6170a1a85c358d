//! Полная перезапись authorized_keys из реестра

use colored::Colorize;

use crate::config::ResolvedSettings;
use crate::error::Result;

use super::open_service;

pub fn run(settings: &ResolvedSettings) -> Result<()> {
    let service = open_service(settings)?;

    let count = service.rewrite_all_public_keys()?;

    println!(
        "{} {} перезаписан, ключей: {}",
        "Успех:".green().bold(),
        service.authorized().path().display().to_string().cyan(),
        count
    );

    Ok(())
}
