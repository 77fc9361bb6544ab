use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::warn;

use crate::config::Config;

/// Restart policy for a supervised run loop.
#[derive(Clone, Copy, Debug)]
pub struct SupervisorOptions {
    pub backoff: Duration,
    pub max_restarts: Option<u32>,
}

impl SupervisorOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            backoff: cfg.restart_backoff,
            max_restarts: cfg.max_restarts,
        }
    }
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(5),
            max_restarts: None,
        }
    }
}

/// Drive `run` until it returns `Ok`, restarting after `backoff` on error.
///
/// Restarts are unlimited unless `max_restarts` is set; once the cap is
/// exhausted the last error is returned.
pub async fn supervise<F, Fut, E>(
    name: &str,
    opts: SupervisorOptions,
    mut run: F,
) -> std::result::Result<(), E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: Display,
{
    let mut restarts = 0u32;
    loop {
        match run().await {
            Ok(()) => return Ok(()),
            Err(e) => {
                if let Some(max) = opts.max_restarts {
                    if restarts >= max {
                        warn!("{name} failed after {restarts} restarts: {e}");
                        return Err(e);
                    }
                }
                restarts += 1;
                warn!(
                    "{name} failed: {e}; restart #{restarts} in {:?}",
                    opts.backoff
                );
                sleep(opts.backoff).await;
            }
        }
    }
}
