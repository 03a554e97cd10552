//! Sortable fields and sort rendering.

use serde_json::{json, Value};

use project_search_shared::SortDirection;

use super::clause::fields;
use crate::errors::SearchError;

/// Fields a caller may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    LastIndexedAt,
    MinSalary,
    MaxSalary,
    Title,
    Status,
    JobLevel,
    Currency,
}

impl SortField {
    /// Resolve a request-level field name.
    ///
    /// Only whitelisted fields can be sorted on; analyzed text fields are sorted
    /// through their keyword sub-field.
    pub fn parse(name: &str) -> Result<Self, SearchError> {
        match name {
            fields::LAST_INDEXED_AT => Ok(Self::LastIndexedAt),
            fields::MIN_SALARY => Ok(Self::MinSalary),
            fields::MAX_SALARY => Ok(Self::MaxSalary),
            fields::TITLE => Ok(Self::Title),
            fields::STATUS => Ok(Self::Status),
            fields::JOB_LEVEL => Ok(Self::JobLevel),
            fields::CURRENCY => Ok(Self::Currency),
            other => Err(SearchError::invalid(format!(
                "Unsupported sort field: {}",
                other
            ))),
        }
    }

    /// The document field holding the value.
    pub fn document_field(&self) -> &'static str {
        match self {
            Self::LastIndexedAt => fields::LAST_INDEXED_AT,
            Self::MinSalary => fields::MIN_SALARY,
            Self::MaxSalary => fields::MAX_SALARY,
            Self::Title => fields::TITLE,
            Self::Status => fields::STATUS,
            Self::JobLevel => fields::JOB_LEVEL,
            Self::Currency => fields::CURRENCY,
        }
    }

    /// The index field the store sorts on.
    pub fn index_field(&self) -> &'static str {
        match self {
            Self::Title => "title.raw",
            other => other.document_field(),
        }
    }
}

/// A resolved sort: one field and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    /// Most recently indexed first.
    fn default() -> Self {
        Self {
            field: SortField::LastIndexedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl SortSpec {
    /// Resolve the requested sort. A missing field falls back to the default sort and a
    /// missing direction means ascending.
    pub fn from_request(
        sort_by: Option<&str>,
        direction: Option<SortDirection>,
    ) -> Result<Self, SearchError> {
        match sort_by {
            None => Ok(Self::default()),
            Some(name) => Ok(Self {
                field: SortField::parse(name)?,
                direction: direction.unwrap_or(SortDirection::Asc),
            }),
        }
    }

    /// Render the sort in OpenSearch DSL. Documents missing the field sort last.
    pub fn to_json(&self) -> Value {
        json!([{
            self.field.index_field(): {
                "order": self.direction.as_str(),
                "missing": "_last"
            }
        }])
    }
}
