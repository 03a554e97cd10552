//! Event normalizer.
//!
//! Decodes raw payloads from the two event streams into a [`CanonicalUpdate`]. A
//! project event only ever yields project-owned fields and a categorization event only
//! ever yields categorization-owned fields; the merge engine relies on this to keep the
//! two field groups independent.
//!
//! Normalization is pure: no I/O, no clock.

use tracing::debug;

use project_search_repository::parse_project_id;
use project_search_repository::utils::non_blank;
use project_search_shared::{CategorizationFields, ProjectFields};

use crate::consumer::{CategorizationEventMessage, EventStream, ProjectEventMessage, RawEvent};
use crate::errors::IngestError;

/// A partial update to one project document.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalUpdate {
    /// Replace the project-owned field group.
    ProjectUpsert { id: String, fields: ProjectFields },
    /// Remove the whole document.
    ProjectDelete { id: String },
    /// Replace the categorization-owned field group.
    CategorizationUpsert {
        id: String,
        fields: CategorizationFields,
    },
    /// A valid event that must not change the index.
    Skip { id: String, reason: &'static str },
}

impl CanonicalUpdate {
    pub fn project_id(&self) -> &str {
        match self {
            Self::ProjectUpsert { id, .. }
            | Self::ProjectDelete { id }
            | Self::CategorizationUpsert { id, .. }
            | Self::Skip { id, .. } => id,
        }
    }

    /// Short name of the update kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProjectUpsert { .. } => "project_upsert",
            Self::ProjectDelete { .. } => "project_delete",
            Self::CategorizationUpsert { .. } => "categorization_upsert",
            Self::Skip { .. } => "skip",
        }
    }
}

/// Project lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectEventType {
    Created,
    Updated,
    Deleted,
}

impl ProjectEventType {
    /// Parse the `eventType` discriminator, ignoring case.
    pub fn parse(value: &str) -> Result<Self, IngestError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CREATED" => Ok(Self::Created),
            "UPDATED" => Ok(Self::Updated),
            "DELETED" => Ok(Self::Deleted),
            other => Err(IngestError::unknown_kind(other)),
        }
    }
}

/// Normalize a raw event from either stream.
pub fn normalize(event: &RawEvent) -> Result<CanonicalUpdate, IngestError> {
    let update = match event.stream {
        EventStream::Project => normalize_project(&event.payload)?,
        EventStream::Categorization => normalize_categorization(&event.payload)?,
    };

    debug!(
        topic = %event.topic,
        offset = event.offset,
        project_id = %update.project_id(),
        kind = update.kind(),
        "Normalized event"
    );
    Ok(update)
}

/// Normalize a project lifecycle payload.
pub fn normalize_project(payload: &[u8]) -> Result<CanonicalUpdate, IngestError> {
    let message: ProjectEventMessage = decode(payload)?;

    let event_type = non_blank(message.event_type.as_deref())
        .ok_or_else(|| IngestError::malformed("eventType is required"))?;
    let event_type = ProjectEventType::parse(event_type)?;
    let id = project_id(message.project_id.as_deref())?;

    if event_type == ProjectEventType::Deleted {
        return Ok(CanonicalUpdate::ProjectDelete { id });
    }

    let fields = ProjectFields {
        owner_id: message.employer_id,
        title: message.title,
        description: message.description,
        status: message.status,
        min_salary: message.min_salary,
        max_salary: message.max_salary,
        currency: message.currency,
        location: message.location,
        is_remote: message.is_remote,
        required_skills: message
            .required_skills
            .unwrap_or_default()
            .into_iter()
            .filter(|skill| !skill.trim().is_empty())
            .collect(),
        job_level: message.job_level,
    };

    Ok(CanonicalUpdate::ProjectUpsert { id, fields })
}

/// Normalize a categorization payload.
///
/// Categorization of a deleted project is skipped, so it cannot bring the document back.
pub fn normalize_categorization(payload: &[u8]) -> Result<CanonicalUpdate, IngestError> {
    let message: CategorizationEventMessage = decode(payload)?;
    let id = project_id(message.project_id.as_deref())?;

    let original = non_blank(message.original_event_type.as_deref())
        .and_then(|value| ProjectEventType::parse(value).ok());
    if original == Some(ProjectEventType::Deleted) {
        return Ok(CanonicalUpdate::Skip {
            id,
            reason: "categorization of a deleted project",
        });
    }

    let main_category = non_blank(message.main_category.as_deref()).map(str::to_string);
    let tags = message
        .tags
        .iter()
        .flatten()
        .filter_map(|tag| non_blank(Some(tag.as_str())))
        .map(str::to_string);

    Ok(CanonicalUpdate::CategorizationUpsert {
        id,
        fields: CategorizationFields::new(main_category, tags),
    })
}

fn decode<'a, T: serde::Deserialize<'a>>(payload: &'a [u8]) -> Result<T, IngestError> {
    serde_json::from_slice(payload)
        .map_err(|e| IngestError::malformed(format!("undecodable payload: {}", e)))
}

fn project_id(value: Option<&str>) -> Result<String, IngestError> {
    let value = non_blank(value).ok_or_else(|| IngestError::malformed("projectId is required"))?;
    parse_project_id(value).map_err(|e| IngestError::malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn project_payload(event_type: &str) -> Vec<u8> {
        serde_json::json!({
            "eventType": event_type,
            "projectId": ID,
            "employerId": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "title": "Logo Designer",
            "status": "OPEN",
            "minSalary": 500,
            "maxSalary": 1500,
            "requiredSkills": ["figma", " "],
            "createdAt": "2025-01-01T10:00:00"
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_created_and_updated_are_upserts() {
        for event_type in ["CREATED", "UPDATED", "updated"] {
            let update = normalize_project(&project_payload(event_type)).unwrap();
            match update {
                CanonicalUpdate::ProjectUpsert { id, fields } => {
                    assert_eq!(id, ID);
                    assert_eq!(fields.title.as_deref(), Some("Logo Designer"));
                    assert_eq!(fields.min_salary, Some(500.0));
                    assert!(fields.owner_id.is_some());
                    assert_eq!(fields.required_skills.len(), 1);
                }
                other => panic!("unexpected update: {:?}", other),
            }
        }
    }

    #[test]
    fn test_deleted_is_delete() {
        let update = normalize_project(&project_payload("DELETED")).unwrap();
        assert_eq!(
            update,
            CanonicalUpdate::ProjectDelete { id: ID.to_string() }
        );
    }

    #[test]
    fn test_unknown_event_type() {
        let result = normalize_project(&project_payload("ARCHIVED"));
        assert!(matches!(result, Err(IngestError::UnknownEventKind(kind)) if kind == "ARCHIVED"));
    }

    #[test]
    fn test_missing_identifying_fields() {
        let no_type = format!(r#"{{"projectId":"{}"}}"#, ID);
        assert!(matches!(
            normalize_project(no_type.as_bytes()),
            Err(IngestError::MalformedEvent(_))
        ));

        assert!(matches!(
            normalize_project(br#"{"eventType":"CREATED"}"#),
            Err(IngestError::MalformedEvent(_))
        ));

        assert!(matches!(
            normalize_project(br#"{"eventType":"CREATED","projectId":"not-a-uuid"}"#),
            Err(IngestError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_undecodable_payload() {
        assert!(matches!(
            normalize_project(b"not json"),
            Err(IngestError::MalformedEvent(_))
        ));
        assert!(matches!(
            normalize_categorization(b""),
            Err(IngestError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_project_id_is_canonical() {
        let payload = format!(r#"{{"eventType":"DELETED","projectId":"{}"}}"#, ID.to_uppercase());
        let update = normalize_project(payload.as_bytes()).unwrap();
        assert_eq!(update.project_id(), ID);
    }

    #[test]
    fn test_categorization() {
        let payload = format!(
            r#"{{"projectId":"{}","mainCategory":"Design","tags":["ui","ux","ui",""]}}"#,
            ID
        );
        let update = normalize_categorization(payload.as_bytes()).unwrap();

        match update {
            CanonicalUpdate::CategorizationUpsert { id, fields } => {
                assert_eq!(id, ID);
                assert_eq!(fields.main_category.as_deref(), Some("Design"));
                assert_eq!(fields.tags.len(), 2);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn test_null_lists_are_empty() {
        let payload = format!(
            r#"{{"eventType":"CREATED","projectId":"{}","employerId":null,"title":"API Dev","requiredSkills":null}}"#,
            ID
        );
        match normalize_project(payload.as_bytes()).unwrap() {
            CanonicalUpdate::ProjectUpsert { fields, .. } => {
                assert!(fields.required_skills.is_empty());
                assert!(fields.owner_id.is_none());
                assert_eq!(fields.title.as_deref(), Some("API Dev"));
            }
            other => panic!("unexpected update: {:?}", other),
        }

        let payload = format!(r#"{{"projectId":"{}","mainCategory":"Design","tags":null}}"#, ID);
        match normalize_categorization(payload.as_bytes()).unwrap() {
            CanonicalUpdate::CategorizationUpsert { fields, .. } => {
                assert!(fields.tags.is_empty());
                assert_eq!(fields.main_category.as_deref(), Some("Design"));
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn test_categorization_of_deleted_project_is_skipped() {
        for original in ["DELETED", "deleted"] {
            let payload = format!(
                r#"{{"projectId":"{}","mainCategory":"Design","tags":["ui"],"originalEventType":"{}"}}"#,
                ID, original
            );
            let update = normalize_categorization(payload.as_bytes()).unwrap();
            assert!(matches!(update, CanonicalUpdate::Skip { ref id, .. } if id == ID));
        }

        // Other or unrecognised origins still carry categorization data
        for original in ["CREATED", "UPDATED", "REOPENED"] {
            let payload = format!(
                r#"{{"projectId":"{}","mainCategory":"Design","originalEventType":"{}"}}"#,
                ID, original
            );
            let update = normalize_categorization(payload.as_bytes()).unwrap();
            assert_eq!(update.kind(), "categorization_upsert");
        }
    }

    #[test]
    fn test_normalize_dispatches_on_stream() {
        let event = RawEvent::new(EventStream::Project, "projects.events", 0, 7, project_payload("CREATED"));
        assert_eq!(normalize(&event).unwrap().kind(), "project_upsert");

        // A project payload on the categorization stream only yields categorization data
        let event = RawEvent::new(
            EventStream::Categorization,
            "projects.categorization",
            0,
            8,
            project_payload("CREATED"),
        );
        match normalize(&event).unwrap() {
            CanonicalUpdate::CategorizationUpsert { fields, .. } => {
                assert_eq!(fields, CategorizationFields::default());
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }
}
