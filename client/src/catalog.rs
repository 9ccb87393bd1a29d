//! Paginated retrieval of an account's cards that are free for deck building.

use crate::{Account, Client, Credentials};
use fantasy_types::{Card, CardPage};
use reqwest::StatusCode;
use tracing::{debug, error, info};

/// Characters of an error body kept in debug output.
const ERROR_BODY_PREVIEW: usize = 200;

pub struct CardCatalog<'a> {
    client: &'a Client,
}

impl<'a> CardCatalog<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch every card of `account` that is not already in a deck.
    ///
    /// Rate-limited pages are re-requested until they go through. Any other failure discards
    /// whatever was collected so far and yields an empty pool.
    pub async fn fetch(&self, account: &Account, credentials: &Credentials) -> Vec<Card> {
        let mut cursor = credentials.cursor();
        let mut cards = Vec::new();
        let mut page = 1;
        loop {
            let Some(token) = cursor.current() else {
                error!(account = %account.label, "no credentials to fetch cards with");
                return Vec::new();
            };
            let response = match self.client.list_cards(&account.wallet, token, page).await {
                Ok(response) => response,
                Err(err) => {
                    error!(account = %account.label, page, "error fetching cards: {err}");
                    return Vec::new();
                }
            };

            match response.status() {
                StatusCode::OK => {}
                StatusCode::TOO_MANY_REQUESTS => {
                    let body = response.text().await.unwrap_or_default();
                    info!(account = %account.label, page, body = %body, "rate limited while fetching cards, retrying");
                    continue;
                }
                StatusCode::UNAUTHORIZED => {
                    if cursor.advance() {
                        debug!(account = %account.label, page, "card fetch unauthorized, trying next credential");
                        continue;
                    }
                    error!(account = %account.label, "authorization failed while fetching cards");
                    return Vec::new();
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    error!(account = %account.label, %status, "failed to fetch cards");
                    debug!(
                        account = %account.label,
                        body = %body.chars().take(ERROR_BODY_PREVIEW).collect::<String>(),
                        "card fetch response"
                    );
                    return Vec::new();
                }
            }

            let listing: CardPage = match response.json().await {
                Ok(listing) => listing,
                Err(err) => {
                    error!(account = %account.label, page, "error decoding cards: {err}");
                    return Vec::new();
                }
            };
            if listing.is_empty() {
                break;
            }
            let last = listing.is_last();
            cards.extend(listing.into_available());
            if last {
                break;
            }
            page += 1;
        }

        info!(account = %account.label, count = cards.len(), "fetched available cards");
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{bearer, serve_router};
    use axum::{
        extract::{Query, State as AxumState},
        http::{HeaderMap, StatusCode as AxumStatusCode},
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    fn account() -> Account {
        Account {
            label: "7".to_string(),
            wallet: "0xabc".to_string(),
            token: "static".to_string(),
        }
    }

    fn page_param(query: &[(String, String)]) -> u32 {
        query
            .iter()
            .find(|(key, _)| key == "pagination.page")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(0)
    }

    fn two_pages(page: u32) -> Response {
        match page {
            1 => Json(json!({
                "data": [
                    {"id": "a", "name": "Alpha", "stars": 3, "card_weighted_score": 10},
                    {"id": "b", "heroes": {"name": "Beta", "stars": 2}, "is_in_deck": true},
                ],
                "meta": {"currentPage": 1, "lastPage": 2},
            }))
            .into_response(),
            2 => Json(json!({
                "data": [{"id": "c", "heroes": {"name": "Gamma", "stars": "4"}, "weighted_score": 5}],
                "meta": {"currentPage": 2, "lastPage": 2},
            }))
            .into_response(),
            _ => AxumStatusCode::NOT_FOUND.into_response(),
        }
    }

    #[tokio::test]
    async fn test_fetch_paginates_and_skips_deployed_cards() {
        let requests = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/card/player/:wallet",
                get(
                    |AxumState(requests): AxumState<Arc<AtomicUsize>>,
                     Query(query): Query<Vec<(String, String)>>| async move {
                        requests.fetch_add(1, Ordering::SeqCst);
                        two_pages(page_param(&query))
                    },
                ),
            )
            .with_state(requests.clone());
        let (base_url, handle) = serve_router(router).await;
        let client = Client::new(&base_url).unwrap();
        let account = account();

        let cards = CardCatalog::new(&client)
            .fetch(&account, &Credentials::resolve(&client, &account))
            .await;
        let ids: Vec<_> = cards.iter().map(|card| card.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(cards[1].name, "Gamma");
        assert_eq!(cards[1].stars, 4);
        assert_eq!(cards[1].weighted_score, 5.0);
        assert_eq!(requests.load(Ordering::SeqCst), 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_fetch_stops_on_empty_page() {
        let router = Router::new().route(
            "/card/player/:wallet",
            get(|| async { Json(json!({"data": [], "meta": {"currentPage": 1, "lastPage": 9}})) }),
        );
        let (base_url, handle) = serve_router(router).await;
        let client = Client::new(&base_url).unwrap();

        let cards = CardCatalog::new(&client)
            .fetch(&account(), &Credentials::new(["static".to_string()]))
            .await;
        assert!(cards.is_empty());

        handle.abort();
    }

    #[tokio::test]
    async fn test_fetch_retries_rate_limited_page() {
        let requests = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/card/player/:wallet",
                get(
                    |AxumState(requests): AxumState<Arc<AtomicUsize>>,
                     Query(query): Query<Vec<(String, String)>>| async move {
                        let attempt = requests.fetch_add(1, Ordering::SeqCst);
                        // Every page is rate limited twice before it is served.
                        if attempt % 3 < 2 {
                            (AxumStatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
                        } else {
                            two_pages(page_param(&query))
                        }
                    },
                ),
            )
            .with_state(requests.clone());
        let (base_url, handle) = serve_router(router).await;
        let client = Client::new(&base_url).unwrap();

        let cards = CardCatalog::new(&client)
            .fetch(&account(), &Credentials::new(["static".to_string()]))
            .await;
        assert_eq!(cards.len(), 2);
        assert_eq!(requests.load(Ordering::SeqCst), 6);

        handle.abort();
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_static_token() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let router = Router::new()
            .route(
                "/card/player/:wallet",
                get(
                    |AxumState(seen): AxumState<Arc<std::sync::Mutex<Vec<String>>>>,
                     headers: HeaderMap| async move {
                        let token = bearer(&headers);
                        seen.lock().unwrap().push(token.clone());
                        if token == "static" {
                            two_pages(2)
                        } else {
                            AxumStatusCode::UNAUTHORIZED.into_response()
                        }
                    },
                ),
            )
            .with_state(seen.clone());
        let (base_url, handle) = serve_router(router).await;
        let client = Client::new(&base_url).unwrap();
        client.set_session_token("expired");
        let account = account();

        let cards = CardCatalog::new(&client)
            .fetch(&account, &Credentials::resolve(&client, &account))
            .await;
        assert_eq!(cards.len(), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["expired", "static"]);

        handle.abort();
    }

    #[tokio::test]
    async fn test_fetch_aborts_when_credentials_exhausted() {
        let requests = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/card/player/:wallet",
                get(|AxumState(requests): AxumState<Arc<AtomicUsize>>| async move {
                    requests.fetch_add(1, Ordering::SeqCst);
                    AxumStatusCode::UNAUTHORIZED
                }),
            )
            .with_state(requests.clone());
        let (base_url, handle) = serve_router(router).await;
        let client = Client::new(&base_url).unwrap();

        let cards = CardCatalog::new(&client)
            .fetch(&account(), &Credentials::new(["static".to_string()]))
            .await;
        assert!(cards.is_empty());
        assert_eq!(requests.load(Ordering::SeqCst), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_fetch_discards_partial_results_on_error() {
        let router = Router::new().route(
            "/card/player/:wallet",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                match query.get("pagination.page").map(String::as_str) {
                    Some("1") => two_pages(1),
                    _ => (AxumStatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
                }
            }),
        );
        let (base_url, handle) = serve_router(router).await;
        let client = Client::new(&base_url).unwrap();

        let cards = CardCatalog::new(&client)
            .fetch(&account(), &Credentials::new(["static".to_string()]))
            .await;
        assert!(cards.is_empty());

        handle.abort();
    }

    #[tokio::test]
    async fn test_fetch_aborts_on_undecodable_body() {
        for body in ["not json", r#"{"data": 5, "meta": {"currentPage": 1, "lastPage": 1}}"#] {
            let router = Router::new().route(
                "/card/player/:wallet",
                get(move || async move { (AxumStatusCode::OK, body) }),
            );
            let (base_url, handle) = serve_router(router).await;
            let client = Client::new(&base_url).unwrap();

            let cards = CardCatalog::new(&client)
                .fetch(&account(), &Credentials::new(["static".to_string()]))
                .await;
            assert!(cards.is_empty(), "{body}");

            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_fetch_aborts_on_transport_error() {
        // Nothing listens on the discard port.
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let cards = CardCatalog::new(&client)
            .fetch(&account(), &Credentials::new(["static".to_string()]))
            .await;
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_without_credentials() {
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let cards = CardCatalog::new(&client)
            .fetch(&account(), &Credentials::default())
            .await;
        assert!(cards.is_empty());
    }
}
