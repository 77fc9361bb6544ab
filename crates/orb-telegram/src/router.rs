use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;

use teloxide::{
    dispatching::{update_listeners::webhooks, Dispatcher},
    dptree,
    prelude::*,
};

use tracing::info;

use orb_core::{
    completion::CompletionPort,
    config::{Config, Transport},
    exchange_log::ExchangeLog,
    relay::RelayController,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayController>,
}

/// Build the bot and drive one dispatcher run to completion.
///
/// Everything gateway-scoped (bot client, relay wiring, dispatcher) is
/// rebuilt per call so the supervisor restarts a failed loop with a clean
/// slate.
pub async fn run(
    cfg: Arc<Config>,
    completions: Arc<dyn CompletionPort>,
    log: Arc<ExchangeLog>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Startup probe: a bad token or dead network fails here, in front of the
    // supervisor, instead of leaving a silently idle dispatcher behind.
    let me = bot.get_me().await?;
    info!("orb started: @{}", me.username());

    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Arc::new(RelayController::new(&cfg, messenger, completions, log));
    let state = Arc::new(AppState { relay });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .build();

    match cfg.transport {
        Transport::Polling => {
            info!("listening via long polling");
            dispatcher.dispatch().await;
        }
        Transport::Webhook => {
            let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
            let url = cfg
                .webhook_url
                .parse()
                .with_context(|| format!("invalid WEBHOOK_URL: {}", cfg.webhook_url))?;
            info!("listening via webhook on {addr} for {}", cfg.webhook_url);

            let listener = webhooks::axum(bot, webhooks::Options::new(addr, url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("update listener error"),
                )
                .await;
        }
    }

    Ok(())
}
