use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::types::{ApiResponse, Profile, ProfileData, StatsData};

/// Typed client for the profile API. Pure transport: no caching, no local
/// invariants.
pub struct ProfileApi {
    client: reqwest::Client,
    base_url: String,
}

impl ProfileApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn create_or_update(
        &self,
        name: &str,
        email: &str,
        age: Option<i32>,
    ) -> Result<Profile> {
        let mut body = Map::new();
        body.insert("name".to_string(), json!(name));
        body.insert("email".to_string(), json!(email));
        if let Some(age) = age {
            body.insert("age".to_string(), json!(age));
        }

        let response = self
            .client
            .post(self.url("/api/profile"))
            .json(&body)
            .send()
            .await?;

        let envelope: ApiResponse<ProfileData> = decode(response).await?;
        Ok(extract(envelope)?.profile)
    }

    /// None when the server holds no profile; that is a normal outcome, not
    /// an error.
    pub async fn get(&self) -> Result<Option<Profile>> {
        let response = self.client.get(self.url("/api/profile")).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: ApiResponse<ProfileData> = decode(response).await?;
        Ok(Some(extract(envelope)?.profile))
    }

    pub async fn update(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        age: Option<i32>,
    ) -> Result<Profile> {
        let mut body = Map::new();
        if let Some(name) = name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(email) = email {
            body.insert("email".to_string(), json!(email));
        }
        if let Some(age) = age {
            body.insert("age".to_string(), json!(age));
        }

        let response = self
            .client
            .put(self.url("/api/profile"))
            .json(&body)
            .send()
            .await?;

        let envelope: ApiResponse<ProfileData> = decode(response).await?;
        Ok(extract(envelope)?.profile)
    }

    /// True when a profile was actually removed.
    pub async fn delete(&self) -> Result<bool> {
        let response = self.client.delete(self.url("/api/profile")).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        let envelope: ApiResponse<Value> = decode(response).await?;
        if !envelope.success {
            bail!(failure_message(&envelope));
        }
        Ok(true)
    }

    pub async fn stats(&self) -> Result<u64> {
        let response = self
            .client
            .get(self.url("/api/profile/stats"))
            .send()
            .await?;

        let envelope: ApiResponse<StatsData> = decode(response).await?;
        Ok(extract(envelope)?.total_profiles)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<ApiResponse<T>> {
    let status = response.status();

    response
        .json()
        .await
        .with_context(|| format!("server answered {status} without a valid envelope"))
}

fn extract<T>(envelope: ApiResponse<T>) -> Result<T> {
    if !envelope.success {
        bail!(failure_message(&envelope));
    }

    envelope.data.context("response envelope is missing data")
}

fn failure_message<T>(envelope: &ApiResponse<T>) -> String {
    let message = envelope.message.as_deref().unwrap_or("request failed");

    match &envelope.errors {
        Some(errors) if !errors.is_empty() => {
            let details: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            format!("{message} ({})", details.join("; "))
        }
        _ => message.to_string(),
    }
}
