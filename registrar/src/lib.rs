use anyhow::{Context, Result};
use fantasy_client::{client::DEFAULT_BASE_URL, Account, Client, Orchestrator, SubmitPolicy};
use fantasy_types::{RegistrationOutcome, TournamentIds};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use tracing::{info, warn};

/// Registrar configuration (from config file)
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub proxies: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub submit: SubmitConfig,
    pub tournaments: TournamentIds,
    pub accounts: Vec<AccountConfig>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// Deck registration retry settings, in seconds.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub max_attempts: usize,
    pub retry_delay_secs: f64,
    pub server_error_jitter_secs: (f64, f64),
    pub cooldown_secs: f64,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        let policy = SubmitPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            retry_delay_secs: policy.retry_delay.as_secs_f64(),
            server_error_jitter_secs: (
                policy.server_error_jitter.0.as_secs_f64(),
                policy.server_error_jitter.1.as_secs_f64(),
            ),
            cooldown_secs: policy.cooldown.as_secs_f64(),
        }
    }
}

impl SubmitConfig {
    pub fn policy(&self) -> Result<SubmitPolicy> {
        let secs = |value: f64, name: &str| {
            Duration::try_from_secs_f64(value).with_context(|| format!("invalid {name}: {value}"))
        };
        Ok(SubmitPolicy {
            max_attempts: self.max_attempts,
            retry_delay: secs(self.retry_delay_secs, "retry_delay_secs")?,
            server_error_jitter: (
                secs(self.server_error_jitter_secs.0, "server_error_jitter_secs")?,
                secs(self.server_error_jitter_secs.1, "server_error_jitter_secs")?,
            ),
            cooldown: secs(self.cooldown_secs, "cooldown_secs")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountConfig {
    pub wallet: String,
    pub token: String,
    /// Session-derived token to seed the cookie jar with.
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl AccountConfig {
    /// Accounts without a label are named by their 1-based position.
    pub fn account(&self, index: usize) -> Account {
        Account {
            label: self
                .label
                .clone()
                .unwrap_or_else(|| (index + 1).to_string()),
            wallet: self.wallet.clone(),
            token: self.token.clone(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("could not parse config file {}", path.display()))
    }

    /// A fresh session for one account.
    pub fn client_for(&self, account: &AccountConfig) -> Result<Client> {
        let mut client = Client::new(&self.base_url)
            .context("invalid base_url")?
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs));
        if let Some(user_agent) = &self.user_agent {
            client = client.with_user_agent(user_agent.clone());
        }
        if !self.proxies.is_empty() {
            client = client
                .with_proxies(self.proxies.clone())
                .context("invalid proxy")?;
        }
        if let Some(token) = account.session_token.as_deref().filter(|t| !t.is_empty()) {
            client.set_session_token(token);
        }
        Ok(client)
    }
}

/// Register every configured account, one after another.
pub async fn run(config: &Config) -> Result<Vec<(Account, RegistrationOutcome)>> {
    let policy = config.submit.policy()?;
    let mut results = Vec::with_capacity(config.accounts.len());
    for (index, account_config) in config.accounts.iter().enumerate() {
        let account = account_config.account(index);
        let client = match config.client_for(account_config) {
            Ok(client) => client,
            Err(err) => {
                warn!(account = %account.label, "skipping account: {err:#}");
                continue;
            }
        };
        let outcome = Orchestrator::new(client)
            .with_policy(policy.clone())
            .register(&account, &config.tournaments)
            .await;
        for (tier, registered) in outcome.iter() {
            info!(account = %account.label, %tier, registered, "registration finished");
        }
        results.push((account, outcome));
    }

    let registered = results
        .iter()
        .filter(|(_, outcome)| outcome.any_registered())
        .count();
    info!(
        accounts = results.len(),
        registered, "all accounts processed"
    );
    Ok(results)
}
