//! Snapshot persistence in a PostgREST-style key-value table.
//!
//! One row per sync id: `id` (text, primary key), `payload` (jsonb), and
//! `updated_at` (timestamptz). Saves are upserts on `id`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Request, Response, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::StorageError;
use super::gateway::{PersistenceGateway, check_sync_id};
use crate::document;
use crate::store::LedgerState;

const MAX_ERROR_BODY: usize = 512;

#[derive(Deserialize)]
struct Row {
    payload: Value,
}

#[derive(Serialize)]
struct Upsert<'a> {
    id: &'a str,
    payload: Value,
    updated_at: String,
}

/// Gateway over a REST table endpoint.
pub struct RestGateway {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RestGateway {
    /// Create a gateway for `table` under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Configuration` if the URL or table is blank or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, StorageError> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() || table.trim().is_empty() {
            return Err(StorageError::configuration(
                "rest storage needs a url and a table",
            ));
        }
        let client = Client::builder()
            .user_agent(concat!("sitebook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{base_url}/rest/v1/{table}"),
            api_key: api_key.to_string(),
        })
    }

    fn load_request(&self, sync_id: &str) -> Result<Request, StorageError> {
        let filter = format!("eq.{}", check_sync_id(sync_id)?);
        Ok(self
            .client
            .get(&self.endpoint)
            .query(&[("id", filter.as_str()), ("select", "payload")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .build()?)
    }

    fn save_request(&self, sync_id: &str, state: &LedgerState) -> Result<Request, StorageError> {
        let row = Upsert {
            id: check_sync_id(sync_id)?,
            payload: document::encode_value(state, Utc::now())?,
            updated_at: Utc::now().to_rfc3339(),
        };
        Ok(self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .header(header::CONTENT_TYPE, "application/json")
            .json(&[row])
            .build()?)
    }
}

async fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Rejected {
        status: status.as_u16(),
        body: clip_body(body),
    })
}

/// Cuts an error body to at most `MAX_ERROR_BODY` bytes on a char boundary.
fn clip_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    body
}

#[async_trait]
impl PersistenceGateway for RestGateway {
    async fn load_state(&self, sync_id: &str) -> Result<Option<LedgerState>, StorageError> {
        let request = self.load_request(sync_id)?;
        let response = check_status(self.client.execute(request).await?).await?;
        let rows: Vec<Row> = response.json().await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(document::decode_value(row.payload)?)),
            None => {
                debug!(sync_id, "no stored snapshot");
                Ok(None)
            }
        }
    }

    async fn save_state(&self, sync_id: &str, state: &LedgerState) -> Result<(), StorageError> {
        let request = self.save_request(sync_id, state)?;
        check_status(self.client.execute(request).await?).await?;
        debug!(sync_id, revision = state.revision, "snapshot upserted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
