use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use ssh_keysync::cli;
use ssh_keysync::config::ResolvedSettings;
use ssh_keysync::Result;

#[derive(Parser)]
#[command(name = "ssh-keysync")]
#[command(author = "Oleg")]
#[command(version = "0.1.0")]
#[command(about = "Управление публичными SSH-ключами и файлом authorized_keys", long_about = None)]
struct Cli {
    /// Файл настроек (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Добавить публичный ключ пользователю
    Add {
        /// ID владельца
        #[arg(long)]
        owner: i64,
        /// Имя ключа (уникально для владельца)
        #[arg(long)]
        name: String,
        /// Файл с ключом; `-` или без аргумента - stdin
        file: Option<PathBuf>,
    },

    /// Удалить ключ
    Remove {
        /// ID ключа
        id: i64,
        /// Не спрашивать подтверждение
        #[arg(short, long)]
        yes: bool,
    },

    /// Показать ключи пользователя
    List {
        /// ID владельца
        #[arg(long)]
        owner: i64,
    },

    /// Показать ключ
    Show {
        /// ID ключа
        id: i64,
    },

    /// Переименовать ключ
    Rename {
        /// ID ключа
        id: i64,
        /// Новое имя
        name: String,
    },

    /// Перезаписать authorized_keys из реестра
    Rebuild,

    /// Проверить ключ без сохранения
    Check {
        /// Файл с ключом; `-` или без аргумента - stdin
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Ошибка:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = ResolvedSettings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Add { owner, name, file } => {
            cli::add::run(&settings, owner, &name, file.as_deref())
        }
        Commands::Remove { id, yes } => cli::remove::run(&settings, id, yes),
        Commands::List { owner } => cli::list::list(&settings, owner),
        Commands::Show { id } => cli::list::show(&settings, id),
        Commands::Rename { id, name } => cli::rename::run(&settings, id, &name),
        Commands::Rebuild => cli::rebuild::run(&settings),
        Commands::Check { file } => cli::check::run(&settings, file.as_deref()),
    }
}
