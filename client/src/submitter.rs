//! Deck registration with bounded retries.

use crate::{backoff::jitter, Account, Client, Credentials};
use fantasy_types::Deck;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Retry behaviour of deck registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitPolicy {
    /// Attempts before giving up on a deck. Credential switches do not count.
    pub max_attempts: usize,
    /// Pause after a retryable response or transport error.
    pub retry_delay: Duration,
    /// Extra pause after a server error, drawn uniformly from this range.
    pub server_error_jitter: (Duration, Duration),
    /// Pause after the last attempt failed, once the proxy was rotated.
    pub cooldown: Duration,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(2),
            server_error_jitter: (Duration::from_secs(1), Duration::from_secs(3)),
            cooldown: Duration::from_secs(15),
        }
    }
}

pub struct DeckSubmitter<'a> {
    client: &'a Client,
    policy: SubmitPolicy,
}

impl<'a> DeckSubmitter<'a> {
    pub fn new(client: &'a Client, policy: SubmitPolicy) -> Self {
        Self { client, policy }
    }

    /// Register `card_ids` as a deck in `tournament_id`.
    ///
    /// Returns `true` once the service accepts the deck. Returns `false` when every credential
    /// was rejected, or when all attempts failed (after rotating the proxy and cooling down).
    pub async fn submit(
        &self,
        credentials: &Credentials,
        account: &Account,
        tournament_id: &str,
        card_ids: &[String],
        deck_number: usize,
    ) -> bool {
        let max_attempts = self.policy.max_attempts;
        let mut cursor = credentials.cursor();
        let mut attempt = 0;
        while attempt < max_attempts {
            let Some(token) = cursor.current() else {
                error!(account = %account.label, "no credentials to register with");
                return false;
            };
            let deck = Deck::new(card_ids.to_vec(), tournament_id);
            debug!(
                account = %account.label,
                deck_id = %deck.deck_id,
                card_ids = ?deck.card_ids,
                tournament_id,
                "sending tournament registration"
            );

            let response = match self.client.create_deck(token, &deck).await {
                Ok(response) => response,
                Err(err) => {
                    attempt += 1;
                    if attempt < max_attempts {
                        error!(account = %account.label, attempt, "error during tournament registration: {err}, retrying");
                        sleep(self.policy.retry_delay).await;
                    } else {
                        error!(account = %account.label, attempt, "error during tournament registration: {err}");
                    }
                    continue;
                }
            };
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(json) => debug!(%status, response = %json, "tournament registration response"),
                Err(_) => debug!(%status, body = %body, "non-JSON tournament registration response"),
            }

            let mut delay = self.policy.retry_delay;
            match status {
                StatusCode::OK | StatusCode::CREATED => {
                    info!(
                        account = %account.label,
                        tournament_id,
                        deck_number,
                        "registered deck in tournament"
                    );
                    return true;
                }
                StatusCode::UNAUTHORIZED => {
                    if cursor.advance() {
                        info!(account = %account.label, "registration unauthorized, trying next credential");
                        continue;
                    }
                    error!(account = %account.label, "authorization failed during tournament registration");
                    return false;
                }
                StatusCode::BAD_REQUEST => {
                    info!(account = %account.label, attempt = attempt + 1, max_attempts, body = %body, "registration rejected, retrying");
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    info!(account = %account.label, attempt = attempt + 1, max_attempts, "rate limited during tournament registration, retrying");
                }
                StatusCode::INTERNAL_SERVER_ERROR => {
                    info!(account = %account.label, attempt = attempt + 1, max_attempts, "server error during tournament registration, retrying");
                    let (min, max) = self.policy.server_error_jitter;
                    delay += jitter(&mut rand::thread_rng(), min, max);
                }
                _ => {
                    info!(account = %account.label, %status, attempt = attempt + 1, max_attempts, "unknown response during tournament registration, retrying");
                    debug!(body = %body, "registration response");
                }
            }
            attempt += 1;
            sleep(delay).await;
        }

        info!(
            account = %account.label,
            max_attempts,
            cooldown_secs = self.policy.cooldown.as_secs(),
            "failed to register for tournament, rotating proxy and cooling down"
        );
        match self.client.rotate_proxy() {
            Ok(true) => info!(account = %account.label, "proxy rotated"),
            Ok(false) => info!(account = %account.label, "proxy rotation not available"),
            Err(err) => warn!(account = %account.label, "proxy rotation failed: {err}"),
        }
        sleep(self.policy.cooldown).await;
        false
    }
}
