//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the project search index.

use serde_json::{json, Value};

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The alias name for the search index (used for all operations).
    pub alias: String,
    /// The version number for the index (e.g., 0 for "projects_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version` - The version number
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }

    /// The physical index the alias points to.
    pub fn index_name(&self) -> String {
        get_versioned_index_name(Some(self.version))
    }
}

/// The base name of the search index (without version).
pub const INDEX_NAME: &str = "projects";

/// Get the versioned index name (e.g. "projects_v0"). Defaults to version 0.
pub fn get_versioned_index_name(version: Option<u32>) -> String {
    format!("{}_v{}", INDEX_NAME, version.unwrap_or(0))
}

/// Get the index settings, mappings and alias for the project search index.
///
/// - **keyword** fields are used for exact filters and set membership
/// - **text** fields are analyzed for free-text and location search; `title` and
///   `description` carry a `raw` keyword sub-field for sorting
/// - salary bounds are `double` so range filters compare numerically
pub fn get_index_settings(alias: &str) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "aliases": {
            alias: {}
        },
        "mappings": {
            "properties": {
                "id": { "type": "keyword" },
                "ownerId": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "fields": {
                        "raw": { "type": "keyword", "ignore_above": 256 }
                    }
                },
                "description": {
                    "type": "text",
                    "fields": {
                        "raw": { "type": "keyword", "ignore_above": 256 }
                    }
                },
                "status": { "type": "keyword" },
                "minSalary": { "type": "double" },
                "maxSalary": { "type": "double" },
                "currency": { "type": "keyword" },
                "location": { "type": "text" },
                "isRemote": { "type": "boolean" },
                "requiredSkills": { "type": "keyword" },
                "jobLevel": { "type": "keyword" },
                "mainCategory": { "type": "keyword" },
                "tags": { "type": "keyword" },
                "lastIndexedAt": { "type": "date" }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings("projects");
        let properties = &settings["mappings"]["properties"];

        assert!(settings["settings"]["number_of_shards"].is_number());
        assert!(settings["aliases"]["projects"].is_object());

        for keyword in ["id", "status", "currency", "jobLevel", "mainCategory", "tags"] {
            assert_eq!(properties[keyword]["type"], "keyword", "{}", keyword);
        }
        assert_eq!(properties["requiredSkills"]["type"], "keyword");
        assert_eq!(properties["title"]["type"], "text");
        assert_eq!(properties["title"]["fields"]["raw"]["type"], "keyword");
        // Oversized titles must not make the whole document unindexable
        assert_eq!(properties["title"]["fields"]["raw"]["ignore_above"], 256);
        assert_eq!(properties["description"]["fields"]["raw"]["ignore_above"], 256);
        assert_eq!(properties["location"]["type"], "text");
        assert_eq!(properties["minSalary"]["type"], "double");
        assert_eq!(properties["isRemote"]["type"], "boolean");
        assert_eq!(properties["lastIndexedAt"]["type"], "date");
    }

    #[test]
    fn test_versioned_index_name() {
        assert_eq!(get_versioned_index_name(None), "projects_v0");
        assert_eq!(get_versioned_index_name(Some(1)), "projects_v1");
        assert_eq!(IndexConfig::new("projects", 42).index_name(), "projects_v42");
    }
}
