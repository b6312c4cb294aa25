//! Submission coordinator: turns a staged photo plus optional metadata into
//! a persisted visit.
//!
//! The chain is strictly sequential: upload the normalized blob, resolve its
//! public URL, insert the row. Any step failing aborts the rest, surfaces
//! one error, and leaves the form untouched so the visitor can retry without
//! re-entering anything. Only a fully persisted visit clears the form.

use thiserror::Error;

use crate::config::AppConfig;
use crate::gate::Gate;
use crate::models::{Coordinates, NewVisit, non_empty};
use crate::normalize::NormalizedImage;
use crate::store::{ObjectStore, RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("enter the tracking code before posting")]
    Locked,
    #[error("no photo staged for upload")]
    NothingStaged,
    #[error("a submission is already in flight")]
    InFlight,
    #[error("photo upload failed: {0}")]
    Upload(#[source] StoreError),
    #[error("saving the visit failed: {0}")]
    Insert(#[source] StoreError),
}

/// Transient form state. Survives failed submissions as entered; cleared
/// only once a visit is fully persisted.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub nickname: String,
    pub message: String,
    pub coords: Option<Coordinates>,
    pub staged: Option<NormalizedImage>,
}

impl SubmissionForm {
    fn clear(&mut self) {
        self.nickname.clear();
        self.message.clear();
        self.coords = None;
        self.staged = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SubmitState {
    Idle,
    Submitting,
}

pub struct Submitter {
    state: SubmitState,
    pub form: SubmissionForm,
}

impl Submitter {
    pub fn new() -> Self {
        Self {
            state: SubmitState::Idle,
            form: SubmissionForm::default(),
        }
    }

    /// Run the submission chain. Preconditions: the gate is unlocked, a
    /// photo is staged, and no submission is already in flight.
    pub async fn submit<S>(
        &mut self,
        store: &S,
        gate: &Gate,
        cfg: &AppConfig,
    ) -> Result<(), SubmitError>
    where
        S: ObjectStore + RecordStore,
    {
        if !gate.is_unlocked() {
            return Err(SubmitError::Locked);
        }
        if self.state == SubmitState::Submitting {
            return Err(SubmitError::InFlight);
        }
        if self.form.staged.is_none() {
            return Err(SubmitError::NothingStaged);
        }

        self.state = SubmitState::Submitting;
        let result = self.run(store, cfg).await;
        self.state = SubmitState::Idle;
        if result.is_ok() {
            self.form.clear();
        }
        result
    }

    async fn run<S>(&self, store: &S, cfg: &AppConfig) -> Result<(), SubmitError>
    where
        S: ObjectStore + RecordStore,
    {
        let Some(staged) = self.form.staged.as_ref() else {
            return Err(SubmitError::NothingStaged);
        };

        // Objects live under the tag's own prefix, never outside it.
        let path = format!("{}/{}", cfg.tracking_code, staged.file_name);
        store
            .upload(&cfg.bucket, &path, &staged.bytes, staged.content_type)
            .await
            .map_err(SubmitError::Upload)?;
        let photo_url = store.public_url(&cfg.bucket, &path);

        let visit = NewVisit {
            tracking_code: cfg.tracking_code.clone(),
            nickname: non_empty(&self.form.nickname),
            message: non_empty(&self.form.message),
            lat: self.form.coords.map(|c| c.latitude),
            lon: self.form.coords.map(|c| c.longitude),
            photo_url,
        };
        if let Err(err) = store.insert_visit(&cfg.table, &visit).await {
            // The uploaded object is not rolled back; the gallery simply
            // never references it.
            tracing::warn!(
                "visit insert failed after upload, object {} may be orphaned: {}",
                path,
                err
            );
            return Err(SubmitError::Insert(err));
        }
        Ok(())
    }
}

impl Default for Submitter {
    fn default() -> Self {
        Self::new()
    }
}
