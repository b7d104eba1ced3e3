use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::{ProxyError, QueryProxy, QueryProxyRequest, QueryProxyResponse};
use crate::query::QueryRequest;

const API_KEY_HEADER: &str = "X-API-Key";

/// Client for a live query proxy, such as the Wormhole testnet one.
pub struct QueryProxyClient {
    client: Client,
    url: String,
    api_key: String,
}

impl QueryProxyClient {
    /// Fails without touching the network if no API key was provided.
    pub fn new(url: String, api_key: Option<String>) -> Result<Self, ProxyError> {
        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(ProxyError::MissingApiKey { url }),
        };
        Ok(Self {
            client: Client::new(),
            url,
            api_key,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QueryProxy for QueryProxyClient {
    async fn query(&self, request: &QueryRequest) -> Result<QueryProxyResponse, ProxyError> {
        let body = QueryProxyRequest::new(request)?;
        debug!("Sending {} byte query to {}", body.bytes.len(), self.url);
        let resp = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProxyError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }
        let response: QueryProxyResponse = resp.json().await?;
        debug!(
            "Query proxy returned {} bytes with {} signatures",
            response.bytes.len(),
            response.signatures.len()
        );
        Ok(response)
    }
}
