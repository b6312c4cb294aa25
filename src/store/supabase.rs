//! Supabase-backed stores: objects over `/storage/v1`, visit rows over
//! `/rest/v1` (PostgREST). The anon key authenticates both; row-level
//! security on the deployment side decides what it may do.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};

use super::{ObjectStore, RecordStore, StoreError};
use crate::models::{NewVisit, VisitRecord};

/// Columns the gallery needs. The tracking code itself is never selected
/// back out of the store.
const SELECT_COLUMNS: &str = "id,created_at,nickname,message,lat,lon,photo_url";

/// Everything but unreserved characters gets escaped in object paths;
/// segment separators are added back when joining.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    http: Client,
}

impl SupabaseClient {
    /// Create a client targeting the given project URL.
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, StoreError> {
        let http = Client::builder().build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            http,
        })
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Query parameters for the gallery select: exact code match, newest first,
/// capped.
fn feed_query(tracking_code: &str, limit: u32) -> [(&'static str, String); 4] {
    [
        ("select", SELECT_COLUMNS.to_string()),
        ("tracking_code", format!("eq.{}", tracking_code)),
        ("order", "created_at.desc".to_string()),
        ("limit", limit.to_string()),
    ]
}

impl ObjectStore for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        );
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes.to_vec());
        let response = self.authed(request).send().await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(StoreError::AlreadyExists {
                path: path.to_string(),
            }),
            status => Err(StoreError::UnexpectedStatus {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        )
    }
}

impl RecordStore for SupabaseClient {
    async fn insert_visit(&self, table: &str, visit: &NewVisit) -> Result<(), StoreError> {
        let request = self
            .http
            .post(self.rest_url(table))
            .header("Prefer", "return=minimal")
            .json(visit);
        let response = self.authed(request).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::UnexpectedStatus {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn recent_visits(
        &self,
        table: &str,
        tracking_code: &str,
        limit: u32,
    ) -> Result<Vec<VisitRecord>, StoreError> {
        let request = self
            .http
            .get(self.rest_url(table))
            .query(&feed_query(tracking_code, limit));
        let response = self.authed(request).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: response.status(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }
}
