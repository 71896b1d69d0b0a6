use crate::config::HealthCheckConfig;
use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, trace};
use reqwest::Client;
use tokio::time::sleep as TokioSleep;

const CHECK_HEALTH_DURATION: Duration = Duration::from_secs(3);

/// Join the server address with a health endpoint path.
pub fn health_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

/// Check if the server answers its health endpoint.
///
/// # Returns
///
/// * `true` - If the server responds with HTTP 2xx within 3 seconds
/// * `false` - If the request fails, times out or gets a non-2xx status
pub async fn check_health(url: &str) -> bool {
    let client = Client::new();

    match client.get(url).timeout(CHECK_HEALTH_DURATION).send().await {
        Ok(resp) if resp.status().is_success() => {
            debug!("Health check succeeded for {url}");
            true
        }
        Ok(resp) => {
            debug!("Health check failed for {url}: status={}", resp.status());
            false
        }
        Err(e) => {
            debug!("Health check failed for {url}: {e}");
            false
        }
    }
}

/// Poll the health endpoint with exponential backoff until it answers.
///
/// # Errors
///
/// Returns [`LaunchError::Timeout`] if the server is not healthy within
/// `max_wait_secs`.
pub async fn wait_for_health(base_url: &str, config: &HealthCheckConfig) -> Result<(), LaunchError> {
    let url = health_url(base_url, &config.path);
    let max_elapsed = Duration::from_secs(config.max_wait_secs);

    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(max_elapsed),
        ..Default::default()
    };

    debug!("Waiting for server health at {url}");

    loop {
        if check_health(&url).await {
            info!("Server is healthy at {url}");
            return Ok(());
        }

        match backoff.next_backoff() {
            Some(duration) => {
                trace!("Server not ready, retrying after {duration:?}");
                TokioSleep(duration).await;
            }
            None => {
                return Err(LaunchError::Timeout {
                    message: format!("Server at {url} did not become healthy within {max_elapsed:?}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }
}
