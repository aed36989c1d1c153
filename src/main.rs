mod config;
mod database;
#[cfg(feature = "demo")]
mod demo_mock_server;
mod error;
mod notification;
mod scheduler;
mod tools;
mod web;

#[macro_use]
extern crate log;

use crate::config::AppConfig;
use crate::database::{SqliteMemberStore, init_db};
use crate::error::Result;
use crate::notification::notifier::MessagingApiNotifier;
use crate::notification::sweep::Sweep;
use crate::scheduler::DailyScheduler;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("Can't start the notification service, aborting...\n{error:#?}");
            ExitCode::FAILURE
        }
    }
}

async fn start() -> Result<()> {
    let config = AppConfig::load()?;
    let pool = init_db(config.database_url())?;
    #[cfg(feature = "demo")]
    let (config, _mock_server) = init_demo(config, &pool).await?;

    let notifier = MessagingApiNotifier::new(config.messaging().clone())?;
    let sweep = Sweep::new(
        SqliteMemberStore::new(pool),
        notifier,
        config.rules().clone(),
        config.messaging().templates().clone(),
        *config.max_concurrent_sends(),
    );
    let scheduler = DailyScheduler::new(sweep, *config.run_at());
    info!(
        "Notification service started, sweeping members every day at {}.",
        config.run_at()
    );

    if *config.run_on_startup() {
        // A failed run is already logged, the next one is scheduled anyway.
        let _ = scheduler.run_once().await;
    }
    scheduler.run_forever().await;

    Ok(())
}

#[cfg(feature = "demo")]
async fn init_demo(
    config: AppConfig,
    pool: &database::DbPool,
) -> Result<(AppConfig, wiremock::MockServer)> {
    let mock_server = demo_mock_server::init_demo(pool).await?;
    let messaging_api = demo_mock_server::messaging_api(&mock_server);
    warn!("Demo mode: messages are sent to {}", messaging_api.url());

    Ok((config.for_demo(messaging_api), mock_server))
}
