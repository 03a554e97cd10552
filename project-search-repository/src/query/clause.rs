//! Boolean query clauses and their OpenSearch DSL form.

use serde_json::{json, Value};

/// Field names of the indexed project document.
pub mod fields {
    pub const ID: &str = "id";
    pub const OWNER_ID: &str = "ownerId";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const STATUS: &str = "status";
    pub const MIN_SALARY: &str = "minSalary";
    pub const MAX_SALARY: &str = "maxSalary";
    pub const CURRENCY: &str = "currency";
    pub const LOCATION: &str = "location";
    pub const IS_REMOTE: &str = "isRemote";
    pub const REQUIRED_SKILLS: &str = "requiredSkills";
    pub const JOB_LEVEL: &str = "jobLevel";
    pub const MAIN_CATEGORY: &str = "mainCategory";
    pub const TAGS: &str = "tags";
    pub const LAST_INDEXED_AT: &str = "lastIndexedAt";
}

/// A field searched by a multi-field match, with its relevance boost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostedField {
    pub name: &'static str,
    pub boost: f64,
}

impl BoostedField {
    pub const fn new(name: &'static str, boost: f64) -> Self {
        Self { name, boost }
    }

    /// The `field^boost` notation used by `multi_match`.
    pub fn to_dsl(&self) -> String {
        format!("{}^{}", self.name, self.boost)
    }
}

/// Exact value matched by a term clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TermValue {
    Keyword(String),
    Bool(bool),
}

impl TermValue {
    fn to_json(&self) -> Value {
        match self {
            TermValue::Keyword(value) => json!(value),
            TermValue::Bool(value) => json!(value),
        }
    }
}

/// A single clause of the boolean query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Weighted free-text match across several analyzed fields.
    MultiMatch {
        query: String,
        fields: Vec<BoostedField>,
        fuzzy: bool,
    },
    /// Exact match on a keyword or boolean field. On a multi-valued field the
    /// document must contain the value.
    Term {
        field: &'static str,
        value: TermValue,
    },
    /// Analyzed-text match on a text field.
    Match { field: &'static str, query: String },
    /// Numeric range with inclusive bounds.
    Range {
        field: &'static str,
        gte: Option<f64>,
        lte: Option<f64>,
    },
}

impl Clause {
    pub fn keyword(field: &'static str, value: impl Into<String>) -> Self {
        Clause::Term {
            field,
            value: TermValue::Keyword(value.into()),
        }
    }

    pub fn flag(field: &'static str, value: bool) -> Self {
        Clause::Term {
            field,
            value: TermValue::Bool(value),
        }
    }

    /// Render the clause in OpenSearch query DSL.
    pub fn to_json(&self) -> Value {
        match self {
            Clause::MultiMatch {
                query,
                fields,
                fuzzy,
            } => {
                let mut body = json!({
                    "query": query,
                    "fields": fields.iter().map(BoostedField::to_dsl).collect::<Vec<_>>(),
                });
                if *fuzzy {
                    body["fuzziness"] = json!("AUTO");
                }
                json!({ "multi_match": body })
            }
            Clause::Term { field, value } => json!({ "term": { *field: value.to_json() } }),
            Clause::Match { field, query } => json!({ "match": { *field: { "query": query } } }),
            Clause::Range { field, gte, lte } => {
                let mut bounds = serde_json::Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), json!(gte));
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), json!(lte));
                }
                json!({ "range": { *field: bounds } })
            }
        }
    }
}
