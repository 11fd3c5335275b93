use std::sync::Arc;

use rotabot::channels::{ChannelManager, CliChannel, TelegramChannel};
use rotabot::config::{RotaConfig, TelegramConfig};
use rotabot::rotation::engine::RotationEngine;
use rotabot::router::Router;
use rotabot::scheduler;
use rotabot::store::SnapshotStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; an optional daily rolling file log next to stderr
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    let _log_guard = match std::env::var("ROTABOT_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rotabot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .init();
            None
        }
    };

    let config = RotaConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export ROTABOT_SUPERVISOR_ID=<telegram user id>");
        eprintln!("  export ROTABOT_GROUP_CHAT_ID=<telegram chat id>");
        std::process::exit(1);
    });

    eprintln!("🔁 rotabot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Categories: {}", config.categories.join(", "));
    eprintln!("   Snapshot: {}", config.snapshot_path.display());
    eprintln!("   Reminder: {}", config.reminder_cron);
    eprintln!(
        "   Policy: leave_requires_approval={}, allow_reject={}",
        config.leave_requires_approval, config.allow_reject
    );

    let schedule = scheduler::parse_schedule(&config.reminder_cron)?;

    // ── Engine ───────────────────────────────────────────────────────
    let store = SnapshotStore::new(config.snapshot_path.clone());
    let engine = RotationEngine::load(config, store).await;

    // ── Channels ─────────────────────────────────────────────────────
    let mut channels = ChannelManager::new();
    channels.add(Arc::new(CliChannel::new()));

    if let Some(telegram) = TelegramConfig::from_env() {
        let allowed_users: Vec<String> = std::env::var("TELEGRAM_ALLOWED_USERS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        eprintln!(
            "   Telegram: enabled (allowed: {})",
            if allowed_users.iter().any(|u| u == "*") {
                "everyone".to_string()
            } else {
                allowed_users.join(", ")
            }
        );
        channels.add(Arc::new(TelegramChannel::new(
            telegram.bot_token,
            allowed_users,
        )));
    } else {
        eprintln!("   Telegram: disabled (TELEGRAM_BOT_TOKEN not set)");
    }

    eprintln!("   Channels: {}\n", channels.names().join(", "));

    // ── Event loop ───────────────────────────────────────────────────
    let (events_tx, events_rx) = tokio::sync::mpsc::channel(256);
    channels.start_all(events_tx.clone()).await?;
    let _ticker = scheduler::spawn_reminder_ticker(schedule, events_tx);

    let router = Router::new(engine, channels);

    tokio::select! {
        _ = router.run(events_rx) => {}
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
