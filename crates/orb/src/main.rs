use std::sync::Arc;

use orb_core::{
    completion::CompletionPort,
    config::Config,
    exchange_log::ExchangeLog,
    supervisor::{supervise, SupervisorOptions},
};
use orb_openrouter::OpenRouterClient;

#[tokio::main]
async fn main() -> Result<(), orb_core::Error> {
    orb_core::logging::init("orb")?;

    let cfg = Arc::new(Config::load()?);

    let completions: Arc<dyn CompletionPort> = Arc::new(OpenRouterClient::new(&cfg));
    let log = Arc::new(ExchangeLog::new(cfg.exchange_log_path.clone()));

    let opts = SupervisorOptions::from_config(&cfg);
    supervise("telegram gateway", opts, || {
        let cfg = cfg.clone();
        let completions = completions.clone();
        let log = log.clone();
        async move { orb_telegram::router::run(cfg, completions, log).await }
    })
    .await
    .map_err(|e| orb_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
