//! Orchestration of the prodigy list: remote calls, flags and errors.
//!
//! Every operation follows the same shape: validate locally, raise the
//! matching flag through a guard, await the remote call, then commit the
//! server's answer to the store or record a user-facing error. The store is
//! never mutated before the backend has confirmed.

use std::sync::Arc;

use caviar_client::{ApiError, ProdigeApi};
use caviar_core::prodige::{Prodige, ProdigeDraft};

use crate::error::ServiceError;
use crate::list_store::{EntityListStore, Flag};
use crate::session::SessionContext;

pub const LOAD_FAILED: &str = "Unable to load your prodigies. Please try again.";
pub const SAVE_FAILED: &str = "Unable to save this prodigy. Please try again.";
pub const DELETE_FAILED: &str = "Unable to delete this prodigy. Please try again.";

pub struct ProdigeService<A> {
    api: A,
    store: Arc<EntityListStore<Prodige>>,
}

impl<A: ProdigeApi> ProdigeService<A> {
    pub fn new(api: A, store: Arc<EntityListStore<Prodige>>) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &Arc<EntityListStore<Prodige>> {
        &self.store
    }

    /// Replace the collection with the session user's prodigies.
    ///
    /// Returns the number of records received.
    pub async fn load(&self, session: &SessionContext) -> Result<usize, ServiceError> {
        let _loading = self.store.begin(Flag::Loading);

        match self.api.list(&session.user_id).await {
            Ok(records) => {
                let count = records.len();
                self.store.set_all(records);
                tracing::debug!(user_id = %session.user_id, count, "Prodigies loaded");
                Ok(count)
            }
            Err(err) => Err(self.fail(LOAD_FAILED, err)),
        }
    }

    /// Create a prodigy owned by the session user.
    pub async fn create(
        &self,
        session: &SessionContext,
        draft: ProdigeDraft,
    ) -> Result<Arc<Prodige>, ServiceError> {
        let payload = draft.into_payload(&session.user_id)?;
        let _saving = self.store.begin(Flag::Saving);

        let record = self
            .api
            .create(&payload)
            .await
            .map_err(|err| self.fail(SAVE_FAILED, err))?;

        let prodige = self.store.add(record);
        tracing::debug!(prodige_id = %prodige.id, "Prodige created");
        Ok(prodige)
    }

    /// Update an existing prodigy.
    ///
    /// Returns `None` when the response was not applied: the record is no
    /// longer in the collection, or a later update for it already landed.
    pub async fn update(
        &self,
        session: &SessionContext,
        id: &str,
        draft: ProdigeDraft,
    ) -> Result<Option<Arc<Prodige>>, ServiceError> {
        let owner = self
            .store
            .get(id)
            .map(|p| p.owner_id.clone())
            .filter(|owner| !owner.is_empty())
            .unwrap_or_else(|| session.user_id.clone());
        let payload = draft.into_payload(&owner)?;

        let ticket = self.store.begin_write(id);
        let _saving = self.store.begin(Flag::Saving);

        let record = self
            .api
            .update(id, &payload)
            .await
            .map_err(|err| self.fail(SAVE_FAILED, err))?;

        let committed = self.store.commit_update(ticket, record);
        tracing::debug!(prodige_id = %id, applied = committed.is_some(), "Prodige updated");
        Ok(committed)
    }

    /// Delete a prodigy. A record the backend no longer knows is treated as
    /// already deleted.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let _deleting = self.store.begin(Flag::Deleting);

        match self.api.delete(id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                tracing::debug!(prodige_id = %id, "Prodige already gone on the backend");
            }
            Err(err) => return Err(self.fail(DELETE_FAILED, err)),
        }

        self.store.remove(id);
        Ok(())
    }

    fn fail(&self, message: &str, err: ApiError) -> ServiceError {
        tracing::warn!(error = %err, "{message}");
        self.store.set_error(Some(message.to_string()));
        ServiceError::Remote {
            message: message.to_string(),
            source: err,
        }
    }
}
