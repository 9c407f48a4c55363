//! HTTP implementation of the [`HabitStore`](crate::HabitStore) trait.
//!
//! Talks to a PostgREST-style endpoint: filters are query parameters
//! (`user_id=eq.{id}`), uniqueness is enforced with `on_conflict` plus a
//! `Prefer: resolution=merge-duplicates` header on inserts.

use crate::{DayKey, Habit, HabitId, HabitLog, HabitStore, Level, StoreError};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Store client backed by reqwest.
#[derive(Clone, Debug)]
pub struct RestHabitStore {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl RestHabitStore {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Root of the hosted store (e.g. "http://localhost:54321")
    /// * `api_key` - The project API key; sent as both `apikey` and bearer token
    pub fn new(base_url: &str, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(url))
    }

    /// Build an authenticated POST request.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(url))
    }

    /// Build an authenticated DELETE request.
    fn delete_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.delete(url))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.api_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Execute a request with no expected response body.
    async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), StoreError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(())
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> StoreError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => StoreError::NotFound(body_snippet),
            401 | 403 => StoreError::Auth(body_snippet),
            422 => StoreError::InvalidInput(body_snippet),
            _ => StoreError::from_status(status, body_snippet),
        }
    }
}

#[async_trait]
impl HabitStore for RestHabitStore {
    async fn fetch_habits(&self, user_id: &str) -> Result<Vec<Habit>, StoreError> {
        metrics::counter!("habit_store_requests_total", "op" => "fetch_habits").increment(1);

        // Link table first; habit details only for the linked ids.
        #[derive(Deserialize)]
        struct LinkRow {
            habit_id: HabitId,
        }

        let links: Vec<LinkRow> = self
            .execute_json(self.get_request(&self.table_url("user_habits")).query(&[
                ("select", "habit_id".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ]))
            .await?;

        if links.is_empty() {
            tracing::debug!("no linked habits for user");
            return Ok(Vec::new());
        }

        let ids = links
            .iter()
            .map(|l| l.habit_id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        self.execute_json(self.get_request(&self.table_url("habits")).query(&[
            ("select", "id,name,category".to_string()),
            ("id", format!("in.({ids})")),
        ]))
        .await
    }

    async fn fetch_logs(&self, user_id: &str) -> Result<Vec<HabitLog>, StoreError> {
        metrics::counter!("habit_store_requests_total", "op" => "fetch_logs").increment(1);

        let rows: Vec<HabitLog> = self
            .execute_json(self.get_request(&self.table_url("habit_logs")).query(&[
                ("select", "habit_id,done_on,level".to_string()),
                ("user_id", format!("eq.{user_id}")),
            ]))
            .await?;
        tracing::debug!(rows = rows.len(), "fetched log rows");
        Ok(rows)
    }

    async fn upsert_log(
        &self,
        user_id: &str,
        habit_id: HabitId,
        day: DayKey,
        level: Level,
    ) -> Result<(), StoreError> {
        metrics::counter!("habit_store_requests_total", "op" => "upsert_log").increment(1);

        let row = serde_json::json!({
            "user_id": user_id,
            "habit_id": habit_id,
            "done_on": day,
            "level": level,
        });

        self.execute_empty(
            self.post_request(&self.table_url("habit_logs"))
                .query(&[("on_conflict", "user_id,habit_id,done_on")])
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&row),
        )
        .await
    }

    async fn delete_log(
        &self,
        user_id: &str,
        habit_id: HabitId,
        day: DayKey,
    ) -> Result<(), StoreError> {
        metrics::counter!("habit_store_requests_total", "op" => "delete_log").increment(1);

        // PostgREST answers 204 whether or not a row matched, which gives the
        // idempotence the boundary promises.
        self.execute_empty(self.delete_request(&self.table_url("habit_logs")).query(&[
            ("user_id", format!("eq.{user_id}")),
            ("habit_id", format!("eq.{habit_id}")),
            ("done_on", format!("eq.{day}")),
        ]))
        .await
    }
}
