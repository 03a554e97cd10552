//! Search response types for the project search index.
//!
//! This module defines the external response structures returned by the query and
//! lookup endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single project as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub project_id: String,
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
    pub required_skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    pub tags: Vec<String>,
    pub last_indexed_at: DateTime<Utc>,

    /// Relevance score from the search engine. Absent for lookups by id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One page of search results with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSearchResponse {
    pub projects: Vec<ProjectResponse>,
    pub current_page: i64,
    pub page_size: i64,
    /// Total number of matching documents across all pages.
    pub total_elements: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl ProjectSearchResponse {
    /// Returns true if this page holds no projects.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Returns the number of projects on this page.
    pub fn len(&self) -> usize {
        self.projects.len()
    }
}
