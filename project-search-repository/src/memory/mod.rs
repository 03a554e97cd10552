//! In-memory index gateway for tests and local development.
//!
//! `InMemoryProvider` stores documents in a `RwLock<HashMap>` and evaluates the typed
//! [`IndexQuery`] clause tree locally, so the write path and the query semantics can be
//! exercised without an OpenSearch cluster.
//!
//! It is not a relevance engine. A hit's score is the sum of the boosts of the fields
//! in which each free-text token was found.
//!
//! # Example
//!
//! ```ignore
//! use project_search_repository::{InMemoryProvider, SearchIndexProvider};
//!
//! let provider = InMemoryProvider::new();
//! provider.upsert_document(&doc).await?;
//! let stored = provider.get_document(&doc.id).await?;
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use project_search_shared::{ProjectDocument, SortDirection};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::query::{fields, Clause, IndexQuery, SortField, TermValue};
use crate::types::{SearchHit, SearchHits};

/// Search index provider backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    documents: RwLock<HashMap<String, ProjectDocument>>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider pre-populated with documents.
    pub fn with_documents(documents: impl IntoIterator<Item = ProjectDocument>) -> Self {
        Self {
            documents: RwLock::new(
                documents
                    .into_iter()
                    .map(|doc| (doc.id.clone(), doc))
                    .collect(),
            ),
        }
    }

    /// Number of stored documents.
    pub fn len(&self) -> Result<usize, SearchIndexError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, SearchIndexError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ProjectDocument>>, SearchIndexError> {
        self.documents
            .read()
            .map_err(|_| SearchIndexError::unavailable("in-memory index lock poisoned"))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, ProjectDocument>>, SearchIndexError> {
        self.documents
            .write()
            .map_err(|_| SearchIndexError::unavailable("in-memory index lock poisoned"))
    }
}

#[async_trait]
impl SearchIndexProvider for InMemoryProvider {
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<ProjectDocument>, SearchIndexError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn upsert_document(&self, document: &ProjectDocument) -> Result<(), SearchIndexError> {
        if document.id.trim().is_empty() {
            return Err(SearchIndexError::validation("document id is required"));
        }
        self.write()?
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn delete_document(&self, id: &str) -> Result<(), SearchIndexError> {
        self.write()?.remove(id);
        Ok(())
    }

    async fn search(&self, query: &IndexQuery) -> Result<SearchHits, SearchIndexError> {
        let documents = self.read()?;

        let mut matched: Vec<SearchHit> = documents
            .values()
            .filter(|doc| query.filter.iter().all(|clause| score(clause, doc).is_some()))
            .filter_map(|doc| {
                let mut total = 0.0;
                for clause in &query.must {
                    total += score(clause, doc)?;
                }
                Some(SearchHit {
                    document: doc.clone(),
                    score: (!query.must.is_empty()).then_some(total),
                })
            })
            .collect();

        matched.sort_by(|a, b| {
            compare(&a.document, &b.document, query.sort.field, query.sort.direction)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });

        let total = matched.len() as u64;
        let (from, size) = query.page_window();
        let hits = matched
            .into_iter()
            .skip(usize::try_from(from).unwrap_or(usize::MAX))
            .take(usize::try_from(size).unwrap_or(usize::MAX))
            .collect();

        Ok(SearchHits { hits, total })
    }
}

/// Evaluate a clause against a document. `None` means no match; otherwise the clause's
/// contribution to the relevance score.
fn score(clause: &Clause, doc: &ProjectDocument) -> Option<f64> {
    match clause {
        Clause::MultiMatch { query, fields, .. } => {
            let terms = tokens(query);
            let mut total = 0.0;
            for field in fields {
                let Some(text) = text_value(doc, field.name) else {
                    continue;
                };
                let field_tokens = tokens(text);
                let found = terms.iter().filter(|t| field_tokens.contains(t)).count();
                total += found as f64 * field.boost;
            }
            (total > 0.0).then_some(total)
        }
        Clause::Term {
            field,
            value: TermValue::Keyword(value),
        } => keyword_values(doc, field)
            .iter()
            .any(|v| v == value)
            .then_some(0.0),
        Clause::Term {
            field,
            value: TermValue::Bool(value),
        } => (*field == fields::IS_REMOTE && doc.project.is_remote == Some(*value))
            .then_some(0.0),
        Clause::Match { field, query } => {
            let text = text_value(doc, field)?.to_lowercase();
            text.contains(&query.trim().to_lowercase()).then_some(0.0)
        }
        Clause::Range { field, gte, lte } => {
            let value = numeric_value(doc, field)?;
            let above = gte.map_or(true, |gte| value >= gte);
            let below = lte.map_or(true, |lte| value <= lte);
            (above && below).then_some(0.0)
        }
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn text_value<'a>(doc: &'a ProjectDocument, field: &str) -> Option<&'a str> {
    match field {
        fields::TITLE => doc.project.title.as_deref(),
        fields::DESCRIPTION => doc.project.description.as_deref(),
        fields::LOCATION => doc.project.location.as_deref(),
        _ => None,
    }
}

fn keyword_values(doc: &ProjectDocument, field: &str) -> Vec<String> {
    let single = |value: &Option<String>| value.iter().cloned().collect::<Vec<_>>();
    match field {
        fields::ID => vec![doc.id.clone()],
        fields::OWNER_ID => doc.project.owner_id.iter().map(|id| id.to_string()).collect(),
        fields::STATUS => single(&doc.project.status),
        fields::CURRENCY => single(&doc.project.currency),
        fields::JOB_LEVEL => single(&doc.project.job_level),
        fields::MAIN_CATEGORY => single(&doc.categorization.main_category),
        fields::REQUIRED_SKILLS => doc.project.required_skills.iter().cloned().collect(),
        fields::TAGS => doc.categorization.tags.iter().cloned().collect(),
        _ => Vec::new(),
    }
}

fn numeric_value(doc: &ProjectDocument, field: &str) -> Option<f64> {
    match field {
        fields::MIN_SALARY => doc.project.min_salary,
        fields::MAX_SALARY => doc.project.max_salary,
        _ => None,
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
    Time(DateTime<Utc>),
}

fn sort_key(doc: &ProjectDocument, field: SortField) -> Option<SortKey<'_>> {
    match field {
        SortField::LastIndexedAt => Some(SortKey::Time(doc.last_indexed_at)),
        SortField::MinSalary => doc.project.min_salary.map(SortKey::Number),
        SortField::MaxSalary => doc.project.max_salary.map(SortKey::Number),
        SortField::Title => doc.project.title.as_deref().map(SortKey::Text),
        SortField::Status => doc.project.status.as_deref().map(SortKey::Text),
        SortField::JobLevel => doc.project.job_level.as_deref().map(SortKey::Text),
        SortField::Currency => doc.project.currency.as_deref().map(SortKey::Text),
    }
}

/// Order two documents by a sort field. Documents missing the field always sort last.
fn compare(
    a: &ProjectDocument,
    b: &ProjectDocument,
    field: SortField,
    direction: SortDirection,
) -> Ordering {
    match (sort_key(a, field), sort_key(b, field)) {
        (Some(a), Some(b)) => {
            let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use chrono::TimeZone;
    use project_search_shared::{CategorizationFields, ProjectFields, ProjectSearchRequest};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn project(id: &str, title: &str, min: Option<f64>, max: Option<f64>) -> ProjectDocument {
        ProjectDocument::from_project(
            id,
            ProjectFields {
                title: Some(title.to_string()),
                description: Some(format!("{} wanted", title)),
                status: Some("OPEN".to_string()),
                min_salary: min,
                max_salary: max,
                ..Default::default()
            },
            at(0),
        )
    }

    async fn search_ids(provider: &InMemoryProvider, request: ProjectSearchRequest) -> Vec<String> {
        let query = query::build(&request).unwrap();
        provider
            .search(&query)
            .await
            .unwrap()
            .hits
            .into_iter()
            .map(|hit| hit.document.id)
            .collect()
    }

    #[tokio::test]
    async fn test_crud() {
        let provider = InMemoryProvider::new();
        let doc = project("p-1", "Logo Designer", None, None);

        assert!(provider.get_document("p-1").await.unwrap().is_none());
        provider.upsert_document(&doc).await.unwrap();
        assert_eq!(provider.get_document("p-1").await.unwrap(), Some(doc));

        provider.delete_document("p-1").await.unwrap();
        assert!(provider.get_document("p-1").await.unwrap().is_none());

        // Deleting a missing document is not an error
        provider.delete_document("p-1").await.unwrap();
        assert!(provider.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_upsert_rejects_empty_id() {
        let provider = InMemoryProvider::new();
        let result = provider
            .upsert_document(&project("", "Nameless", None, None))
            .await;
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_salary_range_overlap() {
        let provider =
            InMemoryProvider::with_documents([project("p-1", "Dev", Some(2000.0), Some(4000.0))]);
        let base = ProjectSearchRequest::default();

        let ids = search_ids(&provider, base.clone().with_salary_range(Some(3000.0), None)).await;
        assert_eq!(ids, vec!["p-1"]);

        let ids = search_ids(&provider, base.clone().with_salary_range(None, Some(2500.0))).await;
        assert_eq!(ids, vec!["p-1"]);

        let ids = search_ids(&provider, base.with_salary_range(Some(4500.0), None)).await;
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_range_excludes_missing_salary() {
        let provider = InMemoryProvider::with_documents([project("p-1", "Dev", None, None)]);
        let request = ProjectSearchRequest::default().with_salary_range(Some(1.0), None);
        assert!(search_ids(&provider, request).await.is_empty());
    }

    #[tokio::test]
    async fn test_set_filters_require_all_values() {
        let mut doc = project("p-1", "Dev", None, None);
        doc.project.required_skills = ["rust".to_string(), "sql".to_string()].into_iter().collect();
        doc.apply_categorization(
            CategorizationFields::new(Some("Backend".to_string()), vec!["api".to_string()]),
            at(1),
        );
        let provider = InMemoryProvider::with_documents([doc]);

        let request = ProjectSearchRequest {
            required_skills: vec!["rust".to_string(), "sql".to_string()],
            tags: vec!["api".to_string()],
            main_category: Some("Backend".to_string()),
            ..Default::default()
        };
        assert_eq!(search_ids(&provider, request).await, vec!["p-1"]);

        let request = ProjectSearchRequest {
            required_skills: vec!["rust".to_string(), "go".to_string()],
            ..Default::default()
        };
        assert!(search_ids(&provider, request).await.is_empty());
    }

    #[tokio::test]
    async fn test_location_and_remote_filters() {
        let mut doc = project("p-1", "Dev", None, None);
        doc.project.location = Some("Medellin, Colombia".to_string());
        doc.project.is_remote = Some(true);
        let provider = InMemoryProvider::with_documents([doc]);

        let request = ProjectSearchRequest {
            location: Some("medellin".to_string()),
            is_remote: Some(true),
            ..Default::default()
        };
        assert_eq!(search_ids(&provider, request).await, vec!["p-1"]);

        let request = ProjectSearchRequest {
            is_remote: Some(false),
            ..Default::default()
        };
        assert!(search_ids(&provider, request).await.is_empty());
    }

    #[tokio::test]
    async fn test_free_text_scores_by_boost() {
        let mut in_description = project("p-2", "Writer", None, None);
        in_description.project.description = Some("Needs a backend mindset".to_string());
        let provider = InMemoryProvider::with_documents([
            project("p-1", "Backend Engineer", None, None),
            in_description,
            project("p-3", "Painter", None, None),
        ]);

        let query = query::build(&ProjectSearchRequest::term("backend")).unwrap();
        let hits = provider.search(&query).await.unwrap();

        assert_eq!(hits.total, 2);
        let scores: HashMap<_, _> = hits
            .hits
            .iter()
            .map(|hit| (hit.document.id.as_str(), hit.score))
            .collect();
        // Title boost plus description boost, since the description repeats the title
        assert_eq!(scores["p-1"], Some(5.0));
        assert_eq!(scores["p-2"], Some(2.0));
    }

    #[tokio::test]
    async fn test_sort_and_pagination() {
        let provider = InMemoryProvider::with_documents([
            project("p-1", "A", Some(300.0), None),
            project("p-2", "B", Some(100.0), None),
            project("p-3", "C", None, None),
            project("p-4", "D", Some(200.0), None),
        ]);

        let request = ProjectSearchRequest::default()
            .sorted_by("minSalary", SortDirection::Asc)
            .with_page(0, 10);
        assert_eq!(
            search_ids(&provider, request).await,
            vec!["p-2", "p-4", "p-1", "p-3"]
        );

        // Missing values stay last in descending order too
        let request = ProjectSearchRequest::default()
            .sorted_by("minSalary", SortDirection::Desc)
            .with_page(1, 2);
        assert_eq!(search_ids(&provider, request).await, vec!["p-2", "p-3"]);
    }

    #[tokio::test]
    async fn test_default_sort_most_recent_first() {
        let mut older = project("p-1", "Old", None, None);
        older.last_indexed_at = at(10);
        let mut newer = project("p-2", "New", None, None);
        newer.last_indexed_at = at(20);
        let provider = InMemoryProvider::with_documents([older, newer]);

        let ids = search_ids(&provider, ProjectSearchRequest::default()).await;
        assert_eq!(ids, vec!["p-2", "p-1"]);
    }
}
