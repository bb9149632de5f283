use fx_notifier::config::Config;
use fx_notifier::services::{CommandBot, Notifier, RateStore, Scheduler, TelegramSender};
use fx_notifier::sources::HolidayClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fx_notifier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Starting fx-notifier (daily run at {} KST, database {})",
        config.schedule_time.format("%H:%M"),
        config.database_path
    );

    let store = Arc::new(RateStore::new(&config.database_path)?);
    let notifier = Arc::new(Notifier::new(&config, store)?);

    let holidays = match &config.holiday_api_key {
        Some(key) => Some(HolidayClient::new(key.clone(), config.holiday_api_url.clone())?),
        None => None,
    };

    if config.bot_enabled {
        let telegram = TelegramSender::new(
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
        )?;
        let bot = CommandBot::new(telegram, notifier.clone(), config.schedule_time);
        tokio::spawn(bot.run());
    } else {
        info!("Chat commands disabled");
    }

    let scheduler = Scheduler::new(
        notifier,
        holidays,
        config.schedule_time,
        config.run_immediately,
    );
    let handle = tokio::spawn(scheduler.run());
    let abort = handle.abort_handle();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
            abort.abort();
        }
        result = handle => {
            if let Err(e) = result {
                error!("Scheduler task ended: {}", e);
            }
        }
    }

    Ok(())
}
