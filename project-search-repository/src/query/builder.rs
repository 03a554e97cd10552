//! Request validation and boolean query assembly.

use serde_json::{json, Value};
use tracing::debug;

use project_search_shared::{ProjectSearchRequest, MAX_PAGE_SIZE};

use super::clause::{fields, BoostedField, Clause};
use super::sort::SortSpec;
use crate::errors::SearchError;
use crate::utils::non_blank;

/// Fields searched by the free-text term, with their boosts.
pub const TEXT_FIELDS: [BoostedField; 2] = [
    BoostedField::new(fields::TITLE, 3.0),
    BoostedField::new(fields::DESCRIPTION, 2.0),
];

/// Deepest hit position the index will page to (`index.max_result_window`).
pub const MAX_RESULT_WINDOW: u64 = 10_000;

/// A fully built, immutable search query.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    /// Clauses that restrict the result set and contribute to relevance.
    pub must: Vec<Clause>,
    /// Clauses that only restrict the result set.
    pub filter: Vec<Clause>,
    pub sort: SortSpec,
    /// Offset of the first hit.
    pub from: u64,
    /// Maximum number of hits returned.
    pub size: u64,
}

impl IndexQuery {
    /// Returns true if the requested page lies past the deepest pageable position.
    ///
    /// Such a page is always empty, so only the total is fetched.
    pub fn exceeds_result_window(&self) -> bool {
        self.from.saturating_add(self.size) > MAX_RESULT_WINDOW
    }

    /// The `(from, size)` actually sent to the index.
    pub fn page_window(&self) -> (u64, u64) {
        if self.exceeds_result_window() {
            (0, 0)
        } else {
            (self.from, self.size)
        }
    }

    /// Render the complete search body in OpenSearch query DSL.
    pub fn to_search_body(&self) -> Value {
        let query = if self.must.is_empty() && self.filter.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({
                "bool": {
                    "must": self.must.iter().map(Clause::to_json).collect::<Vec<_>>(),
                    "filter": self.filter.iter().map(Clause::to_json).collect::<Vec<_>>(),
                }
            })
        };

        let (from, size) = self.page_window();

        json!({
            "query": query,
            "from": from,
            "size": size,
            "sort": self.sort.to_json(),
            "track_total_hits": true,
            "track_scores": true,
        })
    }
}

/// Owning builder that collects clauses into an [`IndexQuery`].
///
/// Every method consumes the builder and returns a new one, so partially built queries
/// are never shared.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    must: Vec<Clause>,
    filter: Vec<Clause>,
    sort: SortSpec,
    from: u64,
    size: u64,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scoring clause, if any.
    pub fn must(mut self, clause: Option<Clause>) -> Self {
        self.must.extend(clause);
        self
    }

    /// Add non-scoring clauses.
    pub fn filter(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.filter.extend(clauses);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, from: u64, size: u64) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    pub fn build(self) -> IndexQuery {
        IndexQuery {
            must: self.must,
            filter: self.filter,
            sort: self.sort,
            from: self.from,
            size: self.size,
        }
    }
}

/// Reject requests that cannot produce a meaningful page.
pub fn validate(request: &ProjectSearchRequest) -> Result<(), SearchError> {
    if let (Some(min), Some(max)) = (request.min_salary, request.max_salary) {
        if min > max {
            return Err(SearchError::invalid(
                "minSalary cannot be greater than maxSalary",
            ));
        }
    }
    if request.page < 0 {
        return Err(SearchError::invalid("page must be zero or positive"));
    }
    if request.size <= 0 {
        return Err(SearchError::invalid("size must be positive"));
    }
    if request.size > MAX_PAGE_SIZE {
        return Err(SearchError::invalid(format!(
            "size cannot exceed {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

/// Validate a search request and translate it into an [`IndexQuery`].
pub fn build(request: &ProjectSearchRequest) -> Result<IndexQuery, SearchError> {
    validate(request)?;

    let sort = SortSpec::from_request(
        non_blank(request.sort_by.as_deref()),
        request.sort_direction,
    )?;

    // validate() guarantees both are non-negative
    let size = request.size as u64;
    let from = (request.page as u64)
        .checked_mul(size)
        .ok_or_else(|| SearchError::invalid("page is out of range"))?;

    let query = QueryBuilder::new()
        .must(text_clause(request.search_term.as_deref()))
        .filter(term_filter(fields::STATUS, request.status.as_deref()))
        .filter(term_filter(fields::CURRENCY, request.currency.as_deref()))
        .filter(term_filter(fields::JOB_LEVEL, request.job_level.as_deref()))
        .filter(term_filter(
            fields::MAIN_CATEGORY,
            request.main_category.as_deref(),
        ))
        .filter(request.is_remote.map(|v| Clause::flag(fields::IS_REMOTE, v)))
        .filter(all_terms_filter(
            fields::REQUIRED_SKILLS,
            &request.required_skills,
        ))
        .filter(all_terms_filter(fields::TAGS, &request.tags))
        .filter(location_filter(request.location.as_deref()))
        .filter(salary_overlap_filters(request.min_salary, request.max_salary))
        .sort(sort)
        .paginate(from, size)
        .build();

    debug!(
        must = query.must.len(),
        filter = query.filter.len(),
        from = query.from,
        size = query.size,
        "Built search query"
    );

    Ok(query)
}

/// Weighted fuzzy match of the free-text term across title and description.
pub fn text_clause(term: Option<&str>) -> Option<Clause> {
    non_blank(term).map(|term| Clause::MultiMatch {
        query: term.to_string(),
        fields: TEXT_FIELDS.to_vec(),
        fuzzy: true,
    })
}

/// Exact match on a keyword field.
pub fn term_filter(field: &'static str, value: Option<&str>) -> Option<Clause> {
    non_blank(value).map(|value| Clause::keyword(field, value))
}

/// One term clause per value, so a document must contain every listed value.
pub fn all_terms_filter(field: &'static str, values: &[String]) -> Vec<Clause> {
    values
        .iter()
        .filter_map(|value| term_filter(field, Some(value)))
        .collect()
}

/// Analyzed-text match on the location.
pub fn location_filter(location: Option<&str>) -> Option<Clause> {
    non_blank(location).map(|location| Clause::Match {
        field: fields::LOCATION,
        query: location.to_string(),
    })
}

/// Select documents whose offered salary range overlaps the requested one.
///
/// The document's upper bound must reach the requested minimum and its lower bound
/// must not exceed the requested maximum.
pub fn salary_overlap_filters(min_salary: Option<f64>, max_salary: Option<f64>) -> Vec<Clause> {
    let mut clauses = Vec::with_capacity(2);
    if let Some(min) = min_salary {
        clauses.push(Clause::Range {
            field: fields::MAX_SALARY,
            gte: Some(min),
            lte: None,
        });
    }
    if let Some(max) = max_salary {
        clauses.push(Clause::Range {
            field: fields::MIN_SALARY,
            gte: None,
            lte: Some(max),
        });
    }
    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SortField, TermValue};
    use project_search_shared::SortDirection;

    fn assert_invalid(request: ProjectSearchRequest) {
        assert!(matches!(
            build(&request),
            Err(SearchError::InvalidSearchParameters(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_salary_range() {
        assert_invalid(
            ProjectSearchRequest::default().with_salary_range(Some(5000.0), Some(1000.0)),
        );
    }

    #[test]
    fn test_rejects_bad_page_size() {
        assert_invalid(ProjectSearchRequest::default().with_page(0, 0));
        assert_invalid(ProjectSearchRequest::default().with_page(0, 101));
        assert_invalid(ProjectSearchRequest::default().with_page(-1, 10));
    }

    #[test]
    fn test_accepts_boundaries() {
        assert!(build(&ProjectSearchRequest::default().with_page(0, 1)).is_ok());
        assert!(build(&ProjectSearchRequest::default().with_page(0, 100)).is_ok());
        assert!(build(
            &ProjectSearchRequest::default().with_salary_range(Some(1000.0), Some(1000.0))
        )
        .is_ok());
    }

    #[test]
    fn test_empty_request_matches_all() {
        let query = build(&ProjectSearchRequest::default()).unwrap();
        assert!(query.must.is_empty());
        assert!(query.filter.is_empty());
        assert_eq!(query.sort, SortSpec::default());
        assert_eq!(query.to_search_body()["query"], json!({ "match_all": {} }));
    }

    #[test]
    fn test_search_term_is_scoring_clause() {
        let query = build(&ProjectSearchRequest::term("backend")).unwrap();

        assert_eq!(query.must.len(), 1);
        assert!(query.filter.is_empty());
        match &query.must[0] {
            Clause::MultiMatch {
                query,
                fields,
                fuzzy,
            } => {
                assert_eq!(query, "backend");
                assert_eq!(fields.as_slice(), &TEXT_FIELDS);
                assert!(*fuzzy);
            }
            other => panic!("unexpected clause: {:?}", other),
        }
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let request = ProjectSearchRequest {
            search_term: Some("  ".to_string()),
            status: Some(String::new()),
            location: Some(" ".to_string()),
            required_skills: vec!["".to_string()],
            sort_by: Some(" ".to_string()),
            ..Default::default()
        };

        let query = build(&request).unwrap();
        assert!(query.must.is_empty());
        assert!(query.filter.is_empty());
        assert_eq!(query.sort, SortSpec::default());
    }

    #[test]
    fn test_equality_filters() {
        let request = ProjectSearchRequest {
            status: Some("OPEN".to_string()),
            currency: Some("USD".to_string()),
            job_level: Some("SENIOR".to_string()),
            main_category: Some("Backend".to_string()),
            is_remote: Some(false),
            ..Default::default()
        };

        let query = build(&request).unwrap();
        assert!(query.must.is_empty());
        assert_eq!(
            query.filter,
            vec![
                Clause::keyword(fields::STATUS, "OPEN"),
                Clause::keyword(fields::CURRENCY, "USD"),
                Clause::keyword(fields::JOB_LEVEL, "SENIOR"),
                Clause::keyword(fields::MAIN_CATEGORY, "Backend"),
                Clause::flag(fields::IS_REMOTE, false),
            ]
        );
    }

    #[test]
    fn test_set_filters_require_every_value() {
        let clauses =
            all_terms_filter(fields::REQUIRED_SKILLS, &["rust".to_string(), "sql".to_string()]);

        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|c| matches!(
            c,
            Clause::Term { field, value: TermValue::Keyword(_) } if *field == fields::REQUIRED_SKILLS
        )));
    }

    #[test]
    fn test_location_is_analyzed_match() {
        assert_eq!(
            location_filter(Some("Bogota")),
            Some(Clause::Match {
                field: fields::LOCATION,
                query: "Bogota".to_string(),
            })
        );
    }

    #[test]
    fn test_salary_filters_use_overlap() {
        assert_eq!(
            salary_overlap_filters(Some(3000.0), Some(5000.0)),
            vec![
                Clause::Range {
                    field: fields::MAX_SALARY,
                    gte: Some(3000.0),
                    lte: None,
                },
                Clause::Range {
                    field: fields::MIN_SALARY,
                    gte: None,
                    lte: Some(5000.0),
                },
            ]
        );
        assert!(salary_overlap_filters(None, None).is_empty());
    }

    #[test]
    fn test_pagination_offset() {
        let query = build(&ProjectSearchRequest::default().with_page(3, 20)).unwrap();
        assert_eq!(query.from, 60);
        assert_eq!(query.size, 20);
    }

    #[test]
    fn test_page_past_result_window_fetches_only_total() {
        let query = build(&ProjectSearchRequest::default().with_page(100, 100)).unwrap();
        assert_eq!(query.from, 10_000);
        assert!(query.exceeds_result_window());

        let body = query.to_search_body();
        assert_eq!(body["from"], 0);
        assert_eq!(body["size"], 0);
        assert_eq!(body["track_total_hits"], true);
    }

    #[test]
    fn test_last_page_inside_result_window() {
        let query = build(&ProjectSearchRequest::default().with_page(99, 100)).unwrap();
        assert!(!query.exceeds_result_window());
        assert_eq!(query.page_window(), (9_900, 100));
    }

    #[test]
    fn test_requested_sort() {
        let request = ProjectSearchRequest::default().sorted_by("maxSalary", SortDirection::Desc);
        let query = build(&request).unwrap();
        assert_eq!(query.sort.field, SortField::MaxSalary);
        assert_eq!(query.sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_search_body_shape() {
        let request = ProjectSearchRequest {
            status: Some("OPEN".to_string()),
            ..ProjectSearchRequest::term("api").with_page(1, 5)
        };
        let body = build(&request).unwrap().to_search_body();

        assert_eq!(body["from"], 5);
        assert_eq!(body["size"], 5);
        assert_eq!(body["track_total_hits"], true);
        assert_eq!(body["query"]["bool"]["must"][0]["multi_match"]["query"], "api");
        assert_eq!(body["query"]["bool"]["filter"][0]["term"]["status"], "OPEN");
        assert_eq!(body["sort"][0]["lastIndexedAt"]["order"], "desc");
    }
}
