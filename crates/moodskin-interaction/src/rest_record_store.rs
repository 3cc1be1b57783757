//! Remote user-record store over REST.
//!
//! - `GET   {base}/users/{key}` → [`UserRecord`], 404 when absent
//! - `POST  {base}/users/{key}` with a full record
//! - `PATCH {base}/users/{key}` with `{"savedThemes": [...]}`

use async_trait::async_trait;
use moodskin_core::error::{MoodskinError, Result};
use moodskin_core::identity::SessionKey;
use moodskin_core::record::{USER_RECORD_ENTITY, UserRecord, UserRecordStore};
use moodskin_core::saved::SavedThemeEntry;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;

use crate::http::{self, Service};

const NAME: &str = "record store";

#[derive(Clone)]
pub struct RestUserRecordStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceSavedThemes<'a> {
    saved_themes: &'a [SavedThemeEntry],
}

impl RestUserRecordStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: http::build_client(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn user_url(&self, key: &SessionKey) -> Result<Url> {
        http::join_url(Service::Remote, &self.base_url, &["users", key.as_str()])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send(&self, key: &SessionKey, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| http::request_error(Service::Remote, NAME, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MoodskinError::not_found(USER_RECORD_ENTITY, key.as_str()));
        }
        if !response.status().is_success() {
            return Err(http::error_from_response(Service::Remote, NAME, response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl UserRecordStore for RestUserRecordStore {
    async fn fetch(&self, key: &SessionKey) -> Result<UserRecord> {
        let url = self.user_url(key)?;
        let response = self.send(key, self.client.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| http::request_error(Service::Remote, NAME, e))
    }

    async fn create(&self, key: &SessionKey, record: &UserRecord) -> Result<()> {
        let url = self.user_url(key)?;
        self.send(key, self.client.post(url).json(record)).await?;
        Ok(())
    }

    async fn replace_saved_themes(
        &self,
        key: &SessionKey,
        saved_themes: &[SavedThemeEntry],
    ) -> Result<()> {
        let url = self.user_url(key)?;
        let body = ReplaceSavedThemes { saved_themes };
        self.send(key, self.client.patch(url).json(&body)).await?;
        Ok(())
    }
}
