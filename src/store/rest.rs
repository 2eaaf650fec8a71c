use std::env;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response, Url};
use tracing::debug;

use crate::error::AppError;
use crate::models::{ScheduledLecture, ScheduledLectureDraft, ScheduledLectureWithLecture};
use crate::store::dto::{self, ScheduledLectureRecord};
use crate::store::{ScheduleStore, StoreError};

const TABLE: &str = "scheduled_lectures";

#[derive(Clone, Debug)]
pub struct RestStoreConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestStoreConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("STORE_URL")
            .map_err(|_| AppError::Config("STORE_URL is not set".to_string()))?;
        let api_key = env::var("STORE_API_KEY")
            .map_err(|_| AppError::Config("STORE_API_KEY is not set".to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

/// Client for a hosted Postgres exposed through a PostgREST-style API.
pub struct RestStore {
    client: Client,
    config: RestStoreConfig,
}

impl RestStore {
    pub fn new(config: RestStoreConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn table_url(&self, params: &[(&str, String)]) -> Result<Url, StoreError> {
        let base = format!("{}/rest/v1/{}", self.config.base_url, TABLE);
        Url::parse_with_params(&base, params).map_err(|e| StoreError::Rejected {
            status: 0,
            message: format!("invalid store url: {}", e),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    async fn read_records(response: Response) -> Result<Vec<ScheduledLectureRecord>, StoreError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }
        debug!("store response: {} - {} bytes", status, body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl ScheduleStore for RestStore {
    async fn list_scheduled_lectures(
        &self,
        user_id: &str,
    ) -> Result<Vec<ScheduledLectureWithLecture>, StoreError> {
        let url = self.table_url(&[
            ("select", dto::SCHEDULED_LECTURE_SELECT.to_string()),
            ("user_id", eq(user_id)),
            ("order", "scheduled_date.asc,start_time.asc".to_string()),
        ])?;

        let response = self.authorized(self.client.get(url)).send().await?;
        let records = Self::read_records(response).await?;
        Ok(records.into_iter().map(ScheduledLectureRecord::into_view).collect())
    }

    async fn insert_scheduled_lecture(
        &self,
        draft: &ScheduledLectureDraft,
    ) -> Result<ScheduledLecture, StoreError> {
        let url = self.table_url(&[])?;

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(draft)
            .send()
            .await?;

        Self::read_records(response)
            .await?
            .into_iter()
            .next()
            .map(ScheduledLectureRecord::into_schedule)
            .ok_or(StoreError::NoRows)
    }

    async fn set_completed(
        &self,
        user_id: &str,
        id: &str,
        completed: bool,
    ) -> Result<ScheduledLecture, StoreError> {
        let url = self.table_url(&[("id", eq(id)), ("user_id", eq(user_id))])?;
        let now = Utc::now().to_rfc3339();

        let response = self
            .authorized(self.client.patch(url))
            .header("Prefer", "return=representation")
            .json(&dto::CompletionPatch { completed, updated_at: &now })
            .send()
            .await?;

        Self::read_records(response)
            .await?
            .into_iter()
            .next()
            .map(ScheduledLectureRecord::into_schedule)
            .ok_or(StoreError::NoRows)
    }

    async fn delete_scheduled_lecture(&self, user_id: &str, id: &str) -> Result<(), StoreError> {
        let url = self.table_url(&[("id", eq(id)), ("user_id", eq(user_id))])?;

        let response = self
            .authorized(self.client.delete(url))
            .header("Prefer", "return=representation")
            .send()
            .await?;

        if Self::read_records(response).await?.is_empty() {
            return Err(StoreError::NoRows);
        }
        Ok(())
    }
}
