//! VPND CLI
//!
//! Демон выбора сервера VPN.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use vpnd_core::{Protocol, VpnTechnology};
use vpnd_daemon::{Daemon, DaemonConfig, RefreshOutcome};

/// Аргументы командной строки
#[derive(Parser, Debug)]
#[command(name = "vpnd")]
#[command(about = "VPN daemon: server selection and ranking", long_about = None)]
struct Args {
    /// Путь к конфигурационному файлу
    #[arg(short, long, default_value = "vpnd.toml")]
    config: PathBuf,

    /// Уровень логирования (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Подкоманды
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Запустить фоновое обновление кеша
    Run,

    /// Выбрать сервер для подключения
    Connect {
        /// Страна, город, hostname или группа
        #[arg(default_value = "")]
        selector: String,

        /// Группа серверов
        #[arg(short, long, default_value = "")]
        group: String,

        /// Технология (wireguard, openvpn)
        #[arg(short, long)]
        technology: Option<VpnTechnology>,

        /// Протокол (udp, tcp)
        #[arg(short, long)]
        protocol: Option<Protocol>,

        /// Обфусцированные серверы
        #[arg(long)]
        obfuscate: bool,

        /// Сколько серверов показать (без случайного выбора)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Доступные страны
    Countries,

    /// Доступные города страны
    Cities {
        /// Название или код страны
        country: String,
    },

    /// Доступные группы
    Groups,

    /// Обновить кеш
    Refresh {
        /// Обновить даже годный снимок
        #[arg(short, long)]
        force: bool,
    },

    /// Генерация примера конфигурации
    GenerateConfig {
        /// Путь для сохранения
        #[arg(short, long, default_value = "vpnd.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let command = match args.command {
        Some(Commands::GenerateConfig { output }) => {
            if let Err(e) = generate_config(&output) {
                eprintln!("Ошибка генерации конфигурации: {}", e);
                std::process::exit(1);
            }
            println!("Конфигурация сохранена в: {}", output.display());
            return;
        }
        Some(command) => command,
        None => Commands::Run,
    };

    // Загрузка конфигурации
    let config = match DaemonConfig::from_file(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            if !args.config.exists() {
                println!("⚠ Конфигурационный файл не найден: {}", args.config.display());
                println!("📝 Создание конфигурации по умолчанию...");

                if let Err(gen_err) = generate_config(&args.config) {
                    eprintln!("Ошибка создания конфигурации: {}", gen_err);
                    std::process::exit(1);
                }

                println!("✓ Конфигурация создана: {}", args.config.display());
                println!("  Укажите адрес API в секции [api] и запустите vpnd снова");
                std::process::exit(0);
            } else {
                eprintln!("Ошибка загрузки конфигурации: {}", e);
                eprintln!("Проверьте файл: {}", args.config.display());
                std::process::exit(1);
            }
        }
    };

    // Инициализация логирования
    let log_level = args
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .parse::<Level>()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Не удалось установить global subscriber");

    if let Err(e) = run_command(config, command).await {
        error!("Критическая ошибка: {}", e);
        std::process::exit(1);
    }
}

/// Выполнить подкоманду
async fn run_command(config: DaemonConfig, command: Commands) -> anyhow::Result<()> {
    let daemon = Daemon::new(config).await?;

    match command {
        Commands::Run => run_daemon(daemon).await,
        Commands::Connect {
            selector,
            group,
            technology,
            protocol,
            obfuscate,
            count,
        } => {
            daemon.refresh_job().run_once(false).await;

            let mut request = daemon.request(&selector, &group);
            if let Some(technology) = technology {
                request.technology = technology;
            }
            if let Some(protocol) = protocol {
                request.protocol = protocol;
            }
            request.obfuscated |= obfuscate;

            match count {
                Some(count) => {
                    let (servers, was_remote) =
                        daemon.selector().get_servers(&request, count).await?;
                    for server in &servers {
                        println!("{}\t{:.4}\t{}%", server.hostname, server.penalty, server.load);
                    }
                    info!("Источник: {}", if was_remote { "API" } else { "кеш" });
                }
                None => {
                    let (server, _) = daemon.pick_server(&request).await?;
                    println!("{}", server.hostname);
                }
            }
            Ok(())
        }
        Commands::Countries => {
            daemon.refresh_job().run_once(false).await;
            print_list(daemon.available_countries().await?);
            Ok(())
        }
        Commands::Cities { country } => {
            daemon.refresh_job().run_once(false).await;
            print_list(daemon.available_cities(&country).await?);
            Ok(())
        }
        Commands::Groups => {
            daemon.refresh_job().run_once(false).await;
            print_list(daemon.available_groups().await?);
            Ok(())
        }
        Commands::Refresh { force } => {
            let job = daemon.refresh_job();
            report("стран", job.refresh_countries(force).await?);
            report("серверов", job.refresh_servers(force).await?);
            Ok(())
        }
        Commands::GenerateConfig { .. } => {
            unreachable!("generate-config выполняется до загрузки конфигурации")
        }
    }
}

/// Фоновое обновление до Ctrl+C
async fn run_daemon(daemon: Daemon) -> anyhow::Result<()> {
    info!("╔═══════════════════════════════════════════════════╗");
    info!("║           VPND v{}                             ║", env!("CARGO_PKG_VERSION"));
    info!("╚═══════════════════════════════════════════════════╝");

    info!("Конфигурация:");
    info!("  • API: {}", daemon.config().api.base_url);
    info!(
        "  • Технология: {}",
        daemon.config().server_technology()?
    );
    match &daemon.config().cache.cache_dir {
        Some(dir) => info!("  • Кеш: {}", dir.display()),
        None => info!("  • Кеш: только в памяти"),
    }

    let refresh_task = daemon.start_refresh();

    tokio::signal::ctrl_c().await?;
    info!("Получен сигнал Ctrl+C, остановка демона...");

    refresh_task.abort();
    info!("Демон остановлен");
    Ok(())
}

fn print_list(items: Vec<String>) {
    for item in items {
        println!("{}", item);
    }
}

fn report(what: &str, outcome: RefreshOutcome) {
    match outcome {
        RefreshOutcome::Skipped => println!("Кеш {} ещё годен", what),
        RefreshOutcome::Updated { count, unchanged } => {
            println!(
                "Кеш {} обновлён: {}{}",
                what,
                count,
                if unchanged { " (без изменений)" } else { "" }
            );
        }
    }
}

/// Генерация примера конфигурации
fn generate_config(path: &Path) -> anyhow::Result<()> {
    DaemonConfig::default().to_file(path)
}
