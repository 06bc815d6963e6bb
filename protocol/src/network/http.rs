//! HTTP gateway client.
//!
//! Talks to a gateway node's REST API over one pooled `reqwest::Client`.
//!
//! | Call                | Endpoint                       | Accepts   |
//! |---------------------|--------------------------------|-----------|
//! | `submit`            | `POST tx`                      | 200       |
//! | `fetch_transaction` | `GET tx/{id}`                  | 200, 202  |
//! | `fetch_status`      | `GET tx/{id}/status`           | 200, 202  |
//! | `fetch_data`        | `GET tx/{id}/data`             | 200, 202  |
//! | `fetch_last_tx`     | `GET wallet/{addr}/last_tx`    | 200, 202  |
//! | `fetch_balance`     | `GET wallet/{addr}/balance`    | 200, 202  |
//! | `fetch_price`       | `GET price/{bytes}[/{target}]` | 200, 202  |
//! | `query`             | `POST arql`                    | 200       |
//!
//! 404 and 410 become [`GatewayError::NotFound`]. Failures are never
//! retried.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::gateway::{GatewayError, NetworkGateway};
use crate::codec::decode_b64url;
use crate::config::GatewayConfig;
use crate::crypto::Address;
use crate::transaction::{Transaction, TransactionStatus, Winston};

const GET_ACCEPTS: &[u16] = &[200, 202];
const POST_ACCEPTS: &[u16] = &[200];

/// Map a response status to the body or a [`GatewayError`].
fn check_status(
    status: u16,
    accepted: &[u16],
    resource: &str,
    body: String,
) -> Result<String, GatewayError> {
    if accepted.contains(&status) {
        return Ok(body);
    }
    match status {
        404 | 410 => Err(GatewayError::NotFound {
            resource: resource.to_string(),
        }),
        _ => Err(GatewayError::UnexpectedStatus { status, body }),
    }
}

fn parse_winston(body: &str) -> Result<Winston, GatewayError> {
    Winston::new(body.trim()).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

/// Confirmed-status body returned with HTTP 200.
#[derive(Deserialize)]
struct ConfirmedBody {
    block_indep_hash: String,
    block_height: u64,
    number_of_confirmations: u64,
}

fn parse_status(status: StatusCode, body: &str) -> Result<TransactionStatus, GatewayError> {
    if status == StatusCode::ACCEPTED {
        return Ok(TransactionStatus::Pending);
    }
    let confirmed: ConfirmedBody =
        serde_json::from_str(body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
    Ok(TransactionStatus::Confirmed {
        block_indep_hash: confirmed.block_indep_hash,
        block_height: confirmed.block_height,
        number_of_confirmations: confirmed.number_of_confirmations,
    })
}

/// Anything that is not a JSON array of strings is an empty result.
fn parse_query_ids(body: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

fn price_path(byte_size: usize, target: Option<&Address>) -> String {
    match target {
        Some(target) => format!("price/{}/{}", byte_size, target),
        None => format!("price/{}", byte_size),
    }
}

/// A [`NetworkGateway`] backed by a real gateway node.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: GatewayConfig,
    client: Client,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, String), GatewayError> {
        let url = self.config.url(path);
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let body = check_status(status.as_u16(), GET_ACCEPTS, path, body)?;
        Ok((status, body))
    }

    async fn get_text(&self, path: &str) -> Result<String, GatewayError> {
        Ok(self.get(path).await?.1)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<String, GatewayError> {
        let url = self.config.url(path);
        debug!(%url, "POST");
        let resp = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        check_status(status, POST_ACCEPTS, path, body)
    }
}

#[async_trait]
impl NetworkGateway for HttpGateway {
    async fn submit(&self, tx: &Transaction) -> Result<(), GatewayError> {
        let body = match self.post_json("tx", tx).await {
            Ok(body) => body,
            Err(GatewayError::UnexpectedStatus { status, body }) => {
                warn!(id = %tx.id(), status, "gateway refused transaction");
                return Err(GatewayError::Rejected(body));
            }
            Err(e) => return Err(e),
        };
        if body.trim() != "OK" {
            warn!(id = %tx.id(), body = %body, "gateway refused transaction");
            return Err(GatewayError::Rejected(body));
        }
        debug!(id = %tx.id(), "transaction submitted");
        Ok(())
    }

    async fn fetch_transaction(&self, id: &str) -> Result<Transaction, GatewayError> {
        let (status, body) = self.get(&format!("tx/{}", id)).await?;
        if status == StatusCode::ACCEPTED {
            // Pending transactions have no record yet.
            return Err(GatewayError::NotFound {
                resource: format!("tx/{} (pending)", id),
            });
        }
        serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn fetch_status(&self, id: &str) -> Result<TransactionStatus, GatewayError> {
        let (status, body) = self.get(&format!("tx/{}/status", id)).await?;
        parse_status(status, &body)
    }

    async fn fetch_data(&self, id: &str) -> Result<Vec<u8>, GatewayError> {
        let body = self.get_text(&format!("tx/{}/data", id)).await?;
        decode_b64url(body.trim()).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn fetch_last_tx(&self, address: &Address) -> Result<String, GatewayError> {
        let body = self
            .get_text(&format!("wallet/{}/last_tx", address))
            .await?;
        Ok(body.trim().to_string())
    }

    async fn fetch_balance(&self, address: &Address) -> Result<Winston, GatewayError> {
        let body = self
            .get_text(&format!("wallet/{}/balance", address))
            .await?;
        parse_winston(&body)
    }

    async fn fetch_price(
        &self,
        byte_size: usize,
        target: Option<&Address>,
    ) -> Result<Winston, GatewayError> {
        let body = self.get_text(&price_path(byte_size, target)).await?;
        parse_winston(&body)
    }

    async fn query(&self, query: serde_json::Value) -> Result<Vec<String>, GatewayError> {
        let body = self.post_json("arql", &query).await?;
        Ok(parse_query_ids(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(check_status(200, GET_ACCEPTS, "tx/a", "x".into()).unwrap(), "x");
        assert_eq!(check_status(202, GET_ACCEPTS, "tx/a", "Pending".into()).unwrap(), "Pending");
        assert!(matches!(
            check_status(202, POST_ACCEPTS, "tx", String::new()),
            Err(GatewayError::UnexpectedStatus { status: 202, .. })
        ));
        for code in [404, 410] {
            match check_status(code, GET_ACCEPTS, "tx/abc", String::new()) {
                Err(GatewayError::NotFound { resource }) => assert_eq!(resource, "tx/abc"),
                other => panic!("expected NotFound, got {:?}", other),
            }
        }
        match check_status(500, GET_ACCEPTS, "tx/abc", "boom".into()) {
            Err(GatewayError::UnexpectedStatus { status: 500, body }) => assert_eq!(body, "boom"),
            other => panic!("expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[test]
    fn pending_and_confirmed_status() {
        assert_eq!(
            parse_status(StatusCode::ACCEPTED, "Pending").unwrap(),
            TransactionStatus::Pending
        );
        let body = r#"{"block_height":190582,"block_indep_hash":"abc","number_of_confirmations":8}"#;
        match parse_status(StatusCode::OK, body).unwrap() {
            TransactionStatus::Confirmed {
                block_height,
                number_of_confirmations,
                ..
            } => {
                assert_eq!(block_height, 190_582);
                assert_eq!(number_of_confirmations, 8);
            }
            other => panic!("expected Confirmed, got {:?}", other),
        }
        assert!(matches!(
            parse_status(StatusCode::OK, "garbage"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[test]
    fn query_response_parsing() {
        assert_eq!(parse_query_ids(r#"["a","b"]"#), vec!["a", "b"]);
        assert!(parse_query_ids(r#"{"error":"bad query"}"#).is_empty());
        assert!(parse_query_ids("").is_empty());
    }

    #[test]
    fn price_paths() {
        let target = Address::derive(b"recipient");
        assert_eq!(price_path(5, None), "price/5");
        assert_eq!(price_path(0, Some(&target)), format!("price/0/{}", target));
    }

    #[test]
    fn winston_bodies() {
        assert_eq!(parse_winston("12345\n").unwrap().as_str(), "12345");
        assert!(matches!(
            parse_winston("<html>"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_transport_error() {
        let config = GatewayConfig::new("http", "127.0.0.1", 9)
            .unwrap()
            .with_timeout(std::time::Duration::from_secs(2));
        let gateway = HttpGateway::new(config).unwrap();
        match gateway.fetch_price(10, None).await {
            Err(GatewayError::Transport(_)) => {}
            other => panic!("expected Transport, got {:?}", other),
        }
    }
}
