//! Search request types for the project search index.
//!
//! This module defines the structured request accepted by the query endpoint.

use serde::{Deserialize, Serialize};

/// Maximum number of results per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size used when the request does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Sort direction for a requested sort field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[serde(alias = "asc", alias = "Asc")]
    Asc,
    #[serde(alias = "desc", alias = "Desc")]
    Desc,
}

impl SortDirection {
    /// The direction keyword understood by the search engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Search request parameters.
///
/// Every filter is optional. Equality filters restrict by exact value, set filters
/// require a document to contain every listed value, and the salary bounds select
/// projects whose offered range overlaps the requested one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectSearchRequest {
    /// Free-text term matched against title and description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,

    /// Every listed skill must be present on a matching project.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_skills: Vec<String>,
    /// Every listed tag must be present on a matching project.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Lower bound of the requested salary range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<f64>,
    /// Upper bound of the requested salary range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<f64>,

    /// Analyzed-text location filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Zero-based page index.
    pub page: i64,
    /// Page size, between 1 and [`MAX_PAGE_SIZE`].
    pub size: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
}

impl Default for ProjectSearchRequest {
    fn default() -> Self {
        Self {
            search_term: None,
            status: None,
            currency: None,
            job_level: None,
            main_category: None,
            is_remote: None,
            required_skills: Vec::new(),
            tags: Vec::new(),
            min_salary: None,
            max_salary: None,
            location: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: None,
            sort_direction: None,
        }
    }
}

impl ProjectSearchRequest {
    /// Create a free-text search request with default pagination.
    ///
    /// # Example
    ///
    /// ```
    /// use project_search_shared::ProjectSearchRequest;
    ///
    /// let request = ProjectSearchRequest::term("rust").with_page(1, 20);
    /// assert_eq!(request.page, 1);
    /// ```
    pub fn term(search_term: impl Into<String>) -> Self {
        Self {
            search_term: Some(search_term.into()),
            ..Default::default()
        }
    }

    /// Set the page index and page size.
    pub fn with_page(mut self, page: i64, size: i64) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    /// Set the requested salary range.
    pub fn with_salary_range(mut self, min_salary: Option<f64>, max_salary: Option<f64>) -> Self {
        self.min_salary = min_salary;
        self.max_salary = max_salary;
        self
    }

    /// Set the sort field and direction.
    pub fn sorted_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(field.into());
        self.sort_direction = Some(direction);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = ProjectSearchRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);
        assert!(request.search_term.is_none());
        assert!(request.required_skills.is_empty());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let request: ProjectSearchRequest =
            serde_json::from_str(r#"{"searchTerm":"api","requiredSkills":["rust"]}"#).unwrap();

        assert_eq!(request.search_term.as_deref(), Some("api"));
        assert_eq!(request.required_skills, vec!["rust".to_string()]);
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);
    }

    #[test]
    fn test_sort_direction_accepts_any_case() {
        let request: ProjectSearchRequest =
            serde_json::from_str(r#"{"sortBy":"minSalary","sortDirection":"desc"}"#).unwrap();
        assert_eq!(request.sort_direction, Some(SortDirection::Desc));

        let request: ProjectSearchRequest =
            serde_json::from_str(r#"{"sortDirection":"ASC"}"#).unwrap();
        assert_eq!(request.sort_direction, Some(SortDirection::Asc));
    }

    #[test]
    fn test_builders() {
        let request = ProjectSearchRequest::term("designer")
            .with_page(2, 25)
            .with_salary_range(Some(1000.0), None)
            .sorted_by("title", SortDirection::Asc);

        assert_eq!(request.page, 2);
        assert_eq!(request.size, 25);
        assert_eq!(request.min_salary, Some(1000.0));
        assert_eq!(request.sort_by.as_deref(), Some("title"));
    }
}
