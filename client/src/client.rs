//! HTTP session shared by the card catalog and the deck submitter.
//!
//! A [Client] owns the cookie jar (where the session-derived bearer token lives), the proxy
//! pool and the fixed browser headers the service expects. One client serves one account.

use crate::{Error, Result};
use fantasy_types::Deck;
use reqwest::{
    cookie::{CookieStore, Jar},
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER},
    RequestBuilder, Response,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://secret-api.fantasy.top";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Cookie holding the session-derived bearer token.
pub const SESSION_TOKEN_COOKIE: &str = "privy-id-token";

/// Cards requested per listing page.
pub const PAGE_SIZE: u32 = 100;

const CARD_RARITIES: [&str; 4] = ["1", "2", "3", "4"];

pub struct Client {
    pub base_url: Url,
    user_agent: String,
    request_timeout: Duration,
    cookies: Arc<Jar>,
    proxies: Vec<String>,
    proxy_index: AtomicUsize,
    http: RwLock<reqwest::Client>,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }
        let cookies = Arc::new(Jar::default());
        let http = build_http(&cookies, None)?;
        Ok(Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cookies,
            proxies: Vec::new(),
            proxy_index: AtomicUsize::new(0),
            http: RwLock::new(http),
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Route requests through `proxies`, starting with the first one.
    pub fn with_proxies(mut self, proxies: Vec<String>) -> Result<Self> {
        let http = build_http(&self.cookies, proxies.first().map(String::as_str))?;
        self.proxies = proxies;
        self.proxy_index = AtomicUsize::new(0);
        self.http = RwLock::new(http);
        Ok(self)
    }

    pub fn current_proxy(&self) -> Option<&str> {
        if self.proxies.is_empty() {
            return None;
        }
        let index = self.proxy_index.load(Ordering::SeqCst) % self.proxies.len();
        Some(self.proxies[index].as_str())
    }

    /// Switch to the next proxy in the pool.
    ///
    /// Returns `Ok(false)` when the client has no proxies to rotate through.
    pub fn rotate_proxy(&self) -> Result<bool> {
        if self.proxies.is_empty() {
            return Ok(false);
        }
        let index = (self.proxy_index.fetch_add(1, Ordering::SeqCst) + 1) % self.proxies.len();
        let proxy = &self.proxies[index];
        let http = build_http(&self.cookies, Some(proxy))?;
        *self.http.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = http;
        debug!(index, "rotated proxy");
        Ok(true)
    }

    /// Session-derived bearer token, if the session has one.
    pub fn session_token(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_TOKEN_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
    }

    pub fn set_session_token(&self, token: &str) {
        self.cookies
            .add_cookie_str(&format!("{SESSION_TOKEN_COOKIE}={token}"), &self.base_url);
    }

    fn http(&self) -> reqwest::Client {
        self.http
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn authorized(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .headers(browser_headers())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .bearer_auth(token)
            .timeout(self.request_timeout)
    }

    /// Request one page of the cards owned by `wallet`.
    pub async fn list_cards(&self, wallet: &str, token: &str, page: u32) -> Result<Response> {
        let url = self.base_url.join(&format!("card/player/{wallet}"))?;
        let mut query: Vec<(&str, String)> = vec![
            ("pagination.page", page.to_string()),
            ("pagination.limit", PAGE_SIZE.to_string()),
        ];
        query.extend(
            CARD_RARITIES
                .iter()
                .map(|rarity| ("where.rarity.in", rarity.to_string())),
        );
        query.extend([
            ("orderBy", "cards_score_desc".to_string()),
            ("groupCard", "true".to_string()),
            ("isGalleryView", "false".to_string()),
        ]);
        let request = self.authorized(self.http().get(url).query(&query), token);
        Ok(request.send().await?)
    }

    /// Submit a deck to the tournament registration endpoint.
    pub async fn create_deck(&self, token: &str, deck: &Deck) -> Result<Response> {
        let url = self.base_url.join("tournaments/create-deck")?;
        let request = self.authorized(self.http().post(url).json(deck), token);
        Ok(request.send().await?)
    }
}

fn build_http(cookies: &Arc<Jar>, proxy: Option<&str>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().cookie_provider(cookies.clone());
    if let Some(proxy) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

/// Headers the service expects from its web frontend.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(ORIGIN, HeaderValue::from_static("https://monad.fantasy.top"));
    headers.insert(REFERER, HeaderValue::from_static("https://monad.fantasy.top/"));
    for (name, value) in [
        (
            "sec-ch-ua",
            "\"Not A(Brand\";v=\"8\", \"Chromium\";v=\"132\", \"Google Chrome\";v=\"132\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-site"),
        ("priority", "u=1, i"),
    ] {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}
