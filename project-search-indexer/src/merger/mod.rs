//! Document merge engine.
//!
//! Applies a [`CanonicalUpdate`] to the current state of a project document. Every merge
//! starts with a fresh read from the index; nothing is cached between events.
//!
//! Field ownership is enforced by the patch methods on
//! [`ProjectDocument`]: a project update replaces only the project-owned group and a
//! categorization update replaces only the categorization-owned group. The resulting
//! document is written with a full create-or-replace, so stale fields from an earlier
//! version of the same group never survive.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use project_search_repository::SearchIndexProvider;
use project_search_shared::ProjectDocument;

use crate::errors::IngestError;
use crate::normalizer::CanonicalUpdate;

/// Result of applying one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new document was created from a project event.
    Created,
    /// An existing document had one of its field groups replaced.
    Updated,
    /// The document was removed (or was already absent).
    Deleted,
    /// A categorization event arrived before its project; a document holding only the
    /// categorization fields was created.
    PlaceholderCreated,
    /// The update was valid but left the index untouched.
    Skipped,
}

/// Merges canonical updates into the index through the gateway.
pub struct DocumentMerger {
    provider: Arc<dyn SearchIndexProvider>,
    clock: fn() -> DateTime<Utc>,
}

impl DocumentMerger {
    /// Create a merger that stamps documents with the current time.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self::with_clock(provider, Utc::now)
    }

    /// Create a merger with a custom time source.
    pub fn with_clock(provider: Arc<dyn SearchIndexProvider>, clock: fn() -> DateTime<Utc>) -> Self {
        Self { provider, clock }
    }

    /// Apply one update and report what happened.
    ///
    /// A merge always runs to completion once started; a failure leaves the stored
    /// document at its previous version because the only write is the final upsert.
    #[instrument(skip(self, update), fields(project_id = %update.project_id(), kind = update.kind()))]
    pub async fn apply(&self, update: &CanonicalUpdate) -> Result<MergeOutcome, IngestError> {
        match update {
            CanonicalUpdate::ProjectDelete { id } => {
                self.provider.delete_document(id).await?;
                debug!("Document deleted");
                Ok(MergeOutcome::Deleted)
            }
            CanonicalUpdate::Skip { reason, .. } => {
                info!(reason = %reason, "Skipping update");
                Ok(MergeOutcome::Skipped)
            }
            _ => {
                let current = self.provider.get_document(update.project_id()).await?;
                let (document, outcome) = merge(current, update, (self.clock)())?;
                self.provider.upsert_document(&document).await?;

                if outcome == MergeOutcome::PlaceholderCreated {
                    info!("Target not yet indexed, created categorization placeholder");
                } else {
                    debug!(outcome = ?outcome, "Document written");
                }
                Ok(outcome)
            }
        }
    }
}

/// Compute the next document state for an upsert.
///
/// Deletes carry no next state and are rejected here; they are handled by
/// [`DocumentMerger::apply`] without a read.
pub fn merge(
    current: Option<ProjectDocument>,
    update: &CanonicalUpdate,
    now: DateTime<Utc>,
) -> Result<(ProjectDocument, MergeOutcome), IngestError> {
    match (current, update) {
        (None, CanonicalUpdate::ProjectUpsert { id, fields }) => Ok((
            ProjectDocument::from_project(id.clone(), fields.clone(), now),
            MergeOutcome::Created,
        )),
        (Some(mut document), CanonicalUpdate::ProjectUpsert { fields, .. }) => {
            document.apply_project(fields.clone(), now);
            Ok((document, MergeOutcome::Updated))
        }
        (None, CanonicalUpdate::CategorizationUpsert { id, fields }) => Ok((
            ProjectDocument::from_categorization(id.clone(), fields.clone(), now),
            MergeOutcome::PlaceholderCreated,
        )),
        (Some(mut document), CanonicalUpdate::CategorizationUpsert { fields, .. }) => {
            document.apply_categorization(fields.clone(), now);
            Ok((document, MergeOutcome::Updated))
        }
        (_, CanonicalUpdate::ProjectDelete { id }) | (_, CanonicalUpdate::Skip { id, .. }) => {
            Err(IngestError::malformed(format!(
                "{} for {} has no merged state",
                update.kind(),
                id
            )))
        }
    }
}
