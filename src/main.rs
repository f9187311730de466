use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod rules;
mod services;
mod utils;

use config::Config;
use services::compositor::DryRunCompositor;
use services::{create_compositor, create_event_source, Controller, PluginHooks};
use tokio::task::block_in_place;

#[derive(Parser, Debug)]
#[command(name = "hyprvibr")]
#[command(about = "Насыщенность и разрешение монитора Hyprland в зависимости от активного окна")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value_os_t = config::default_config_path())]
    config: PathBuf,

    /// Режим сухого запуска (эмулируемый композитор, без реальных действий)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (переопределяет logging.level)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config = Arc::new(Config::load(&args.config)?);

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск hyprvibr v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {:?}", args.config);
    info!(
        "Файл правил: {:?} (директивы {} и {})",
        config.rules.path,
        config.saturation_keyword(),
        config.app_keyword()
    );

    if args.dry_run {
        warn!("Режим сухого запуска - реальные действия отключены");
    }

    // Инициализация компонентов
    // В dry-run композитор и источник событий работают с одним демо-состоянием
    let demo = args.dry_run.then(|| Arc::new(DryRunCompositor::with_demo_setup()));
    let compositor = create_compositor(config.clone(), demo.clone())?;
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let event_source = create_event_source(config.clone(), events_tx, demo)?;

    // Вызовы Controller блокирующие: IPC-сокет и внешняя команда CTM
    let mut controller = Controller::new(config.clone(), compositor);
    block_in_place(|| controller.start())?;

    info!("Все компоненты инициализированы");

    let source_handle = tokio::spawn(async move {
        if let Err(e) = event_source.run().await {
            error!("Ошибка в источнике событий: {}", e);
        }
    });

    info!("Все сервисы запущены");

    let mut sigterm = unix_signal(SignalKind::terminate())?;
    let mut sighup = unix_signal(SignalKind::hangup())?;

    // События обрабатываются строго по одному, в порядке доставки
    loop {
        tokio::select! {
            event = events_rx.recv() => match event {
                Some(event) => controller.dispatch_blocking(event),
                None => {
                    warn!("Источник событий завершился");
                    break;
                }
            },
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
            _ = sigterm.recv() => {
                info!("Получен SIGTERM");
                break;
            }
            _ = sighup.recv() => {
                info!("Получен SIGHUP, перечитываем правила");
                block_in_place(|| controller.reload_rules());
            }
        }
    }

    info!("Завершение работы...");

    // Вернуть мониторы в исходное состояние до выхода
    block_in_place(|| controller.on_unload());

    source_handle.abort();
    let _ = source_handle.await;

    info!("hyprvibr завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    Ok(())
}
