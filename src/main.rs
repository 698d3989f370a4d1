//! fandash entry point: CLI dispatch, signal handlers, async runtime.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fandash::api::{DeviceApi, HttpDeviceApi};
use fandash::app::cli::Args;
use fandash::app::logging::{filter_for_level, init_tracing, RELOAD_HANDLE};
use fandash::config::{load_config, save_config};
use fandash::control::{DispatchOutcome, NotificationScheduler, PwmDispatcher};
use fandash::poll::StatusPoller;
use fandash::render::{DebugInspector, RenderEngine};
use fandash::status::Observation;
use fandash::ui::{ConsoleUi, Notifier, RenderSink};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    // Priority: 1. --log-level flag, 2. LOG_LEVEL env, 3. config file, 4. default (info)
    let cli_level = if let Some(level) = args.log_level.as_ref() {
        Some(level.to_lowercase())
    } else {
        std::env::var("LOG_LEVEL").ok().map(|l| l.to_lowercase())
    };
    init_tracing(filter_for_level(cli_level.as_deref().unwrap_or("info")));

    let mut config = load_config(args.config.as_deref()).await?;

    // The config-file level only applies when neither flag nor env was given
    if cli_level.is_none() {
        if let Some(handle) = RELOAD_HANDLE.get() {
            let filter = filter_for_level(&config.logging.log_level);
            if let Err(e) = handle.reload(EnvFilter::new(filter)) {
                warn!("Failed to apply config log level: {}", e);
            }
        }
    }

    if let Some(url) = args.base_url.as_ref() {
        config.backend.base_url = url.clone();
    }

    // Show config if requested
    if args.show_config {
        println!("\n{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    // Persist the effective config if requested
    if args.write_config {
        save_config(&config, args.config.as_deref()).await?;
        return Ok(());
    }

    let api: Arc<dyn DeviceApi> = Arc::new(HttpDeviceApi::new(
        &config.backend.base_url,
        config.backend.timeout(),
    )?);

    // One-shot mode: apply a single PWM value and exit
    if let Some(raw) = args.apply_pwm.as_deref() {
        let ui = Arc::new(ConsoleUi::new());
        let sink: Arc<dyn RenderSink> = ui.clone();
        let notifier: Arc<dyn Notifier> = ui.clone();
        let notices = NotificationScheduler::new(
            notifier,
            Duration::from_millis(config.dashboard.notice_timeout_ms),
        );
        let dispatcher = PwmDispatcher::new(api, sink, notices);

        dispatcher.preview(raw);
        let outcome = dispatcher.apply(raw).await;
        ui.flush_now();
        if !matches!(outcome, DispatchOutcome::Applied(_)) {
            std::process::exit(1);
        }
        return Ok(());
    }

    info!(
        "fandash v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );
    info!("Backend: {}", config.backend.base_url);

    let ui = ConsoleUi::start();
    let sink: Arc<dyn RenderSink> = ui.clone();
    let notifier: Arc<dyn Notifier> = ui.clone();

    let notices = NotificationScheduler::new(
        notifier,
        Duration::from_millis(config.dashboard.notice_timeout_ms),
    );
    let dispatcher = Arc::new(PwmDispatcher::new(
        Arc::clone(&api),
        Arc::clone(&sink),
        notices,
    ));

    let observation = Arc::new(RwLock::new(Observation::None));
    let engine = RenderEngine::new(Arc::clone(&sink));
    let inspector = Arc::new(DebugInspector::new(
        Arc::clone(&sink),
        Arc::clone(&observation),
    ));
    if args.debug || config.dashboard.show_debug {
        inspector.set_enabled(true).await;
    }

    let poller = Arc::new(StatusPoller::new(
        api,
        engine,
        Arc::clone(&inspector),
        observation,
        Duration::from_millis(config.dashboard.poll_interval_ms),
    ));

    // Setup SIGHUP handler for log level reload
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let config_path = args.config.clone();
        let mut sighup = signal(SignalKind::hangup()).expect("Failed to setup SIGHUP handler");

        tokio::spawn(async move {
            loop {
                sighup.recv().await;
                info!("SIGHUP received, reloading log level configuration");

                match load_config(config_path.as_deref()).await {
                    Ok(new_config) => {
                        let filter = filter_for_level(&new_config.logging.log_level);
                        if let Some(handle) = RELOAD_HANDLE.get() {
                            match handle.reload(EnvFilter::new(filter)) {
                                Ok(_) => info!(
                                    "Log level reloaded: {}",
                                    new_config.logging.log_level.to_uppercase()
                                ),
                                Err(e) => error!("Failed to reload log level: {}", e),
                            }
                        }
                    }
                    Err(e) => error!("Failed to reload config: {}", e),
                }
            }
        });
    }

    // Setup SIGUSR1 handler for the raw-payload debug view
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let inspector = Arc::clone(&inspector);
        let mut sigusr1 =
            signal(SignalKind::user_defined1()).expect("Failed to setup SIGUSR1 handler");

        tokio::spawn(async move {
            loop {
                sigusr1.recv().await;
                let enabled = inspector.toggle().await;
                info!(
                    "Debug view {}",
                    if enabled { "enabled" } else { "disabled" }
                );
            }
        });
    }

    // stdin commands: a number previews and applies it as PWM,
    // "d" toggles the debug view, "q" quits
    {
        let dispatcher = Arc::clone(&dispatcher);
        let inspector = Arc::clone(&inspector);
        let poller = Arc::clone(&poller);

        tokio::spawn(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("d") {
                    inspector.toggle().await;
                    continue;
                }
                if line.eq_ignore_ascii_case("q") {
                    poller.stop().await;
                    break;
                }
                dispatcher.preview(&line);
                dispatcher.apply(&line).await;
            }
        });
    }

    // Setup signal handler with proper cancellation
    let poller_clone = Arc::clone(&poller);
    let shutdown_signal = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received (Ctrl+C)");
        poller_clone.stop().await;
    });

    // Run the polling loop with select to check for shutdown
    tokio::select! {
        result = poller.run() => {
            if let Err(e) = result {
                error!("Polling error: {}", e);
            }
        }
        _ = shutdown_signal => {
            info!("Shutdown signal handled");
        }
    }

    info!("Dashboard shutdown complete");
    Ok(())
}
