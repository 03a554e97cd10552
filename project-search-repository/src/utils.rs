//! Utility functions for the project search repository.

use uuid::Uuid;

use crate::errors::SearchIndexError;

/// Parse and validate a project identifier from its string form.
///
/// Returns the canonical hyphenated lowercase form so that the same project always
/// maps to the same document id, whatever casing the producer used.
///
/// # Example
///
/// ```
/// use project_search_repository::parse_project_id;
///
/// let id = parse_project_id("550E8400-E29B-41D4-A716-446655440000").expect("valid UUID");
/// assert_eq!(id, "550e8400-e29b-41d4-a716-446655440000");
/// ```
pub fn parse_project_id(project_id: &str) -> Result<String, SearchIndexError> {
    let trimmed = project_id.trim();
    if trimmed.is_empty() {
        return Err(SearchIndexError::validation("projectId is required"));
    }
    let id = Uuid::parse_str(trimmed)
        .map_err(|e| SearchIndexError::validation(format!("Invalid projectId: {}", e)))?;
    Ok(id.to_string())
}

/// Treat blank strings as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
