//! Project document types for the search index.
//!
//! A `ProjectDocument` is the denormalized view of one project. Its fields are split
//! into two groups with distinct owners:
//!
//! - [`ProjectFields`] is written only by project lifecycle events.
//! - [`CategorizationFields`] is written only by categorization events.
//!
//! Each group is replaced as a whole through its own patch method, so a write to one
//! group can never touch the other.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The project-owned field group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub required_skills: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_level: Option<String>,
}

/// The categorization-owned field group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CategorizationFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl CategorizationFields {
    /// Create a categorization group from a main category and a list of tags.
    ///
    /// Duplicate tags collapse into one.
    pub fn new(main_category: Option<String>, tags: impl IntoIterator<Item = String>) -> Self {
        Self {
            main_category,
            tags: tags.into_iter().collect(),
        }
    }
}

/// Document representation for the project search index.
///
/// One document exists per project and is keyed by the project identifier. The two
/// field groups are flattened into a single JSON object when stored.
///
/// # Fields
///
/// - `id`: Project identifier, the document's primary key (immutable)
/// - `project`: Fields owned by the project lifecycle stream
/// - `categorization`: Fields owned by the categorization stream
/// - `last_indexed_at`: Timestamp of the last successful write
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub id: String,
    #[serde(flatten)]
    pub project: ProjectFields,
    #[serde(flatten)]
    pub categorization: CategorizationFields,
    pub last_indexed_at: DateTime<Utc>,
}

impl ProjectDocument {
    /// Create a document from a project event, with unset categorization fields.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::Utc;
    /// use project_search_shared::{ProjectDocument, ProjectFields};
    ///
    /// let fields = ProjectFields {
    ///     title: Some("API Developer".to_string()),
    ///     ..Default::default()
    /// };
    /// let doc = ProjectDocument::from_project("p-1", fields, Utc::now());
    /// assert!(doc.categorization.main_category.is_none());
    /// ```
    pub fn from_project(
        id: impl Into<String>,
        project: ProjectFields,
        indexed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project,
            categorization: CategorizationFields::default(),
            last_indexed_at: indexed_at,
        }
    }

    /// Create a placeholder document holding only categorization fields.
    ///
    /// Used when a categorization event arrives before the owning project event.
    /// The project group is completed later by [`ProjectDocument::apply_project`].
    pub fn from_categorization(
        id: impl Into<String>,
        categorization: CategorizationFields,
        indexed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            project: ProjectFields::default(),
            categorization,
            last_indexed_at: indexed_at,
        }
    }

    /// Replace the whole project-owned group, leaving categorization untouched.
    pub fn apply_project(&mut self, project: ProjectFields, indexed_at: DateTime<Utc>) {
        self.project = project;
        self.last_indexed_at = indexed_at;
    }

    /// Replace the whole categorization-owned group, leaving project fields untouched.
    pub fn apply_categorization(
        &mut self,
        categorization: CategorizationFields,
        indexed_at: DateTime<Utc>,
    ) {
        self.categorization = categorization;
        self.last_indexed_at = indexed_at;
    }

    /// Returns true while no project event has populated the document.
    pub fn is_placeholder(&self) -> bool {
        self.project == ProjectFields::default()
    }
}
