//! Remote store collaborators.
//!
//! The photo bytes live in an object store and the visit rows in a record
//! store; both sit behind traits so the submission and feed logic can be
//! exercised against fakes. The one real backend is Supabase.

use thiserror::Error;

use crate::models::{NewVisit, VisitRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("an object already exists at {path}")]
    AlreadyExists { path: String },
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Blob storage with public, stable URLs.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Write `bytes` at `path` inside `bucket`. Never overwrites: an
    /// existing object at the same path is an error, not a clobber.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// The public URL an uploaded object is served from. Pure string
    /// construction, no request.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Row storage for visit records.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Persist one pending visit. Rows are immutable after this.
    async fn insert_visit(&self, table: &str, visit: &NewVisit) -> Result<(), StoreError>;

    /// The newest visits for one tracking code, newest first, capped at
    /// `limit`.
    async fn recent_visits(
        &self,
        table: &str,
        tracking_code: &str,
        limit: u32,
    ) -> Result<Vec<VisitRecord>, StoreError>;
}

mod supabase;
pub use supabase::SupabaseClient;
