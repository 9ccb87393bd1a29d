//! In-process HTTP servers for exercising the client against scripted responses.

use axum::Router;
use std::net::SocketAddr;
use tokio::time::{sleep, Duration};

pub(crate) async fn serve_router(router: Router) -> (String, tokio::task::JoinHandle<()>) {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let actual_addr = listener.local_addr().unwrap();
    let base_url = format!("http://{actual_addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .unwrap();
    });

    sleep(Duration::from_millis(50)).await;
    (base_url, handle)
}

/// Bearer token carried by a request, without the `Bearer ` prefix.
pub(crate) fn bearer(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string()
}
