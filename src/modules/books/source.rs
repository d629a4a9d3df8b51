//! Where book records come from.

use std::time::Duration;

use async_trait::async_trait;
use bookstore_kernel::settings::CatalogSettings;
use serde_json::Value;
use thiserror::Error;

/// Any way the single catalog request can go wrong.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response from {url} is not a JSON array")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Produces the raw, unsanitized list of book records.
#[async_trait]
pub trait BookSource: Send + Sync {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<Value>, FetchFailure>;
}

/// Fetches the catalog with a single `GET` against the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpBookSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBookSource {
    pub fn new(settings: &CatalogSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = settings.fetch_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: settings.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BookSource for HttpBookSource {
    fn describe(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> Result<Vec<Value>, FetchFailure> {
        let url = &self.endpoint;
        let transport = |source: reqwest::Error| FetchFailure::Transport {
            url: url.clone(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status {
                url: url.clone(),
                status,
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|source| FetchFailure::Decode {
            url: url.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use serde_json::json;

    /// Serve `router` on an ephemeral local port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{address}")
    }

    fn source_for(endpoint: String) -> HttpBookSource {
        HttpBookSource::new(&CatalogSettings {
            endpoint,
            fetch_timeout_ms: Some(5000),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_json_array() {
        let base = serve(Router::new().route(
            "/bookstore-api/books",
            get(|| async { axum::Json(json!([{"id": 1, "title": "Dune"}, {}])) }),
        ))
        .await;

        let records = source_for(format!("{base}/bookstore-api/books"))
            .fetch()
            .await
            .unwrap();

        assert_eq!(records, vec![json!({"id": 1, "title": "Dune"}), json!({})]);
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let base = serve(Router::new().route(
            "/books",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        ))
        .await;

        let err = source_for(format!("{base}/books")).fetch().await.unwrap_err();

        match err {
            FetchFailure::Status { status, .. } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE)
            }
            other => panic!("expected status failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_array_body_is_a_decode_failure() {
        let base = serve(Router::new().route(
            "/books",
            get(|| async { axum::Json(json!({"books": []})) }),
        ))
        .await;

        let err = source_for(format!("{base}/books")).fetch().await.unwrap_err();

        assert!(matches!(err, FetchFailure::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        // Grab a free port, then close it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let source = source_for(format!("http://{address}/books"));
        let err = source.fetch().await.unwrap_err();

        assert!(matches!(err, FetchFailure::Transport { .. }), "{err:?}");
        assert_eq!(
            err.to_string(),
            format!("request to http://{address}/books failed")
        );
        assert_eq!(source.describe(), source.endpoint());
    }
}
