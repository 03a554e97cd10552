//! Conversion of raw index hits into the external response shape.

use project_search_shared::{
    ProjectDocument, ProjectResponse, ProjectSearchRequest, ProjectSearchResponse,
};

use crate::types::SearchHits;

/// Map one page of hits into a [`ProjectSearchResponse`] with pagination metadata.
///
/// A page past the last one is not an error; it yields an empty page whose
/// `has_previous` still reflects the requested page index.
pub fn map(hits: SearchHits, request: &ProjectSearchRequest) -> ProjectSearchResponse {
    let total_pages = total_pages(hits.total, request.size);

    ProjectSearchResponse {
        projects: hits
            .hits
            .into_iter()
            .map(|hit| to_project_response(hit.document, hit.score))
            .collect(),
        current_page: request.page,
        page_size: request.size,
        total_elements: hits.total,
        total_pages,
        has_next: (request.page as i128) < (total_pages as i128) - 1,
        has_previous: request.page > 0,
    }
}

/// `ceil(total / size)`, zero for an empty result or a non-positive size.
pub fn total_pages(total: u64, size: i64) -> u64 {
    if size <= 0 {
        return 0;
    }
    total.div_ceil(size as u64)
}

/// Flatten a stored document into the response representation.
pub fn to_project_response(document: ProjectDocument, score: Option<f64>) -> ProjectResponse {
    let ProjectDocument {
        id,
        project,
        categorization,
        last_indexed_at,
    } = document;

    ProjectResponse {
        project_id: id,
        owner_id: project.owner_id,
        title: project.title,
        description: project.description,
        status: project.status,
        min_salary: project.min_salary,
        max_salary: project.max_salary,
        currency: project.currency,
        location: project.location,
        is_remote: project.is_remote,
        required_skills: project.required_skills.into_iter().collect(),
        job_level: project.job_level,
        main_category: categorization.main_category,
        tags: categorization.tags.into_iter().collect(),
        last_indexed_at,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchHit;
    use chrono::Utc;
    use project_search_shared::{CategorizationFields, ProjectFields};

    fn hits(total: u64) -> SearchHits {
        SearchHits {
            hits: Vec::new(),
            total,
        }
    }

    #[test]
    fn test_pagination_arithmetic() {
        let request = ProjectSearchRequest::default().with_page(2, 10);
        let response = map(hits(25), &request);
        assert_eq!(response.total_pages, 3);
        assert!(!response.has_next);
        assert!(response.has_previous);

        let response = map(hits(25), &ProjectSearchRequest::default().with_page(0, 10));
        assert!(response.has_next);
        assert!(!response.has_previous);
        assert_eq!(response.total_elements, 25);
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(1, 100), 1);
    }

    #[test]
    fn test_empty_result() {
        let response = map(hits(0), &ProjectSearchRequest::default().with_page(0, 10));
        assert_eq!(response.total_pages, 0);
        assert!(!response.has_next);
        assert!(!response.has_previous);

        let response = map(hits(0), &ProjectSearchRequest::default().with_page(4, 10));
        assert!(!response.has_next);
        assert!(response.has_previous);
        assert!(response.is_empty());
    }

    #[test]
    fn test_page_beyond_range() {
        let response = map(hits(5), &ProjectSearchRequest::default().with_page(7, 10));
        assert_eq!(response.total_pages, 1);
        assert!(!response.has_next);
        assert!(response.has_previous);
    }

    #[test]
    fn test_hits_are_mapped_with_scores() {
        let mut doc = ProjectDocument::from_project(
            "p-1",
            ProjectFields {
                title: Some("Logo Designer".to_string()),
                required_skills: ["figma".to_string()].into_iter().collect(),
                ..Default::default()
            },
            Utc::now(),
        );
        doc.apply_categorization(
            CategorizationFields::new(Some("Design".to_string()), vec!["ui".to_string()]),
            doc.last_indexed_at,
        );

        let response = map(
            SearchHits {
                hits: vec![SearchHit {
                    document: doc,
                    score: Some(1.5),
                }],
                total: 1,
            },
            &ProjectSearchRequest::default(),
        );

        assert_eq!(response.len(), 1);
        let project = &response.projects[0];
        assert_eq!(project.project_id, "p-1");
        assert_eq!(project.title.as_deref(), Some("Logo Designer"));
        assert_eq!(project.required_skills, vec!["figma".to_string()]);
        assert_eq!(project.main_category.as_deref(), Some("Design"));
        assert_eq!(project.tags, vec!["ui".to_string()]);
        assert_eq!(project.score, Some(1.5));
    }
}
