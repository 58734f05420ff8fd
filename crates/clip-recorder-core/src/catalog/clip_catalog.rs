use crate::{ClipError, ClipExport, ClipResult, ClipStorage, ClipSummary};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// In-memory view of every stored clip's metadata.
///
/// Payloads stay in the store and are loaded one at a time on export.
///
/// The snapshot only changes on a successful [`ClipCatalog::refresh`]. A
/// failed refresh keeps the last-known list: a stale list stays usable,
/// while an empty one would hide clips that still exist.
#[derive(Debug, Default)]
pub struct ClipCatalog {
    clips: Vec<ClipSummary>,
}

impl ClipCatalog {
    /// Create an empty catalog. Call [`ClipCatalog::refresh`] to load it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips in the current snapshot, in store order.
    pub fn clips(&self) -> &[ClipSummary] {
        &self.clips
    }

    /// Number of clips in the snapshot.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Look up a clip in the snapshot.
    pub fn get(&self, id: i64) -> Option<&ClipSummary> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    /// Reload the snapshot from `store` and return the new clip count.
    ///
    /// # Errors
    ///
    /// Returns the store's error if listing fails; the previous snapshot is
    /// left in place.
    #[instrument(skip(self, store))]
    pub async fn refresh<C: ClipStorage>(&mut self, store: &C) -> ClipResult<usize> {
        match store.list_summaries().await {
            Ok(clips) => {
                self.clips = clips;
                debug!(clip_count = self.clips.len(), "Catalog refreshed");
                Ok(self.clips.len())
            }
            Err(e) => {
                warn!(
                    error = ?e,
                    clip_count = self.clips.len(),
                    "Catalog refresh failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    /// Load a clip listed in the snapshot from `store` and package it for
    /// download.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::NotFound`] if `id` is not in the snapshot or the
    /// store no longer holds it, for example after a delete from another
    /// view. Returns the store's error if loading fails.
    #[instrument(skip(self, store))]
    pub async fn export_clip<C: ClipStorage>(
        &self,
        store: &C,
        id: i64,
    ) -> ClipResult<ClipExport> {
        let location = ErrorLocation::from(Location::caller());

        if self.get(id).is_none() {
            return Err(ClipError::NotFound { id, location });
        }

        let record = store
            .get_by_id(id)
            .await?
            .ok_or(ClipError::NotFound { id, location })?;

        let export = ClipExport::from_record(&record);

        info!(
            clip_id = id,
            file_name = %export.file_name,
            bytes = export.data.len(),
            "Clip exported"
        );

        Ok(export)
    }

    /// Delete a clip from `store`, then reload the snapshot.
    ///
    /// Deleting an id the store no longer holds succeeds. A refresh failure
    /// after a successful delete is logged and not reported; the snapshot is
    /// then stale until the next refresh.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the delete fails; the snapshot is left
    /// untouched.
    #[instrument(skip(self, store))]
    pub async fn delete_clip<C: ClipStorage>(&mut self, store: &C, id: i64) -> ClipResult<()> {
        if self.get(id).is_none() {
            debug!(clip_id = id, "Deleting clip absent from snapshot");
        }

        store.delete_by_id(id).await?;

        if let Err(e) = self.refresh(store).await {
            warn!(clip_id = id, error = ?e, "Clip deleted but catalog is stale");
        }

        Ok(())
    }
}
