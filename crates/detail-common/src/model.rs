use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing key. The backend fills these
/// columns straight from nullable database rows.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single architectural construction-detail record as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detail {
    pub id: i64,
    pub title: String,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Host element options offered by the suggestion form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum HostElement {
    #[serde(rename = "External Wall")]
    ExternalWall,
    #[serde(rename = "Internal Wall")]
    InternalWall,
    Window,
}

impl HostElement {
    pub fn as_str(self) -> &'static str {
        match self {
            HostElement::ExternalWall => "External Wall",
            HostElement::InternalWall => "Internal Wall",
            HostElement::Window => "Window",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum AdjacentElement {
    Slab,
    Floor,
    #[serde(rename = "External Wall")]
    ExternalWall,
}

impl AdjacentElement {
    pub fn as_str(self) -> &'static str {
        match self {
            AdjacentElement::Slab => "Slab",
            AdjacentElement::Floor => "Floor",
            AdjacentElement::ExternalWall => "External Wall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Exposure {
    External,
    Internal,
}

impl Exposure {
    pub fn as_str(self) -> &'static str {
        match self {
            Exposure::External => "External",
            Exposure::Internal => "Internal",
        }
    }
}

impl fmt::Display for HostElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AdjacentElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Exposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawing context submitted to the recommendation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestionContext {
    pub host_element: HostElement,
    pub adjacent_element: AdjacentElement,
    pub exposure: Exposure,
}

/// One entry of a ranked suggestion list. `rank` starts at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedDetail {
    pub id: i64,
    pub rank: u32,
    pub title: String,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

/// Recommendation payload, resolved once from whichever shape the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SuggestionResult {
    /// Current shape: `{ summary, suggestions: [...] }`, sorted by rank.
    Ranked {
        summary: String,
        suggestions: Vec<RankedDetail>,
    },
    /// Legacy shape: `{ detail, explanation }`. `detail` is `None` when nothing matched.
    Single {
        detail: Option<Detail>,
        explanation: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ResultShapeError {
    #[error("suggestion payload is not a JSON object")]
    NotAnObject,

    #[error("suggestion payload has neither `suggestions` nor `detail`/`explanation`")]
    UnknownShape,

    #[error("malformed suggestion payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RankedWire {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    suggestions: Option<Vec<RankedDetail>>,
}

#[derive(Deserialize)]
struct SingleWire {
    #[serde(default)]
    detail: Option<Detail>,
    #[serde(default)]
    explanation: String,
}

impl SuggestionResult {
    /// Resolve the payload shape by key presence: a `suggestions` key wins,
    /// then `detail`/`explanation`. A `null` suggestion list means no matches.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ResultShapeError> {
        let obj = value.as_object().ok_or(ResultShapeError::NotAnObject)?;

        if obj.contains_key("suggestions") {
            let wire: RankedWire = serde_json::from_value(value)?;
            let mut suggestions = wire.suggestions.unwrap_or_default();
            suggestions.sort_by_key(|s| s.rank);
            return Ok(SuggestionResult::Ranked {
                summary: wire.summary,
                suggestions,
            });
        }

        if obj.contains_key("detail") || obj.contains_key("explanation") {
            let wire: SingleWire = serde_json::from_value(value)?;
            return Ok(SuggestionResult::Single {
                detail: wire.detail,
                explanation: wire.explanation,
            });
        }

        Err(ResultShapeError::UnknownShape)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SuggestionResult::Ranked { suggestions, .. } => suggestions.is_empty(),
            SuggestionResult::Single { detail, .. } => detail.is_none(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Caller identity for the secured listing, sent as request headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SecureIdentity {
    pub role: String,
    pub email: String,
}

/// Backend root document (`GET /`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceInfo {
    pub message: String,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_serializes_display_strings() {
        let ctx = SuggestionContext {
            host_element: HostElement::ExternalWall,
            adjacent_element: AdjacentElement::Slab,
            exposure: Exposure::External,
        };
        let value = serde_json::to_value(ctx).unwrap();
        assert_eq!(
            value,
            json!({
                "host_element": "External Wall",
                "adjacent_element": "Slab",
                "exposure": "External"
            })
        );
    }

    #[test]
    fn test_option_strings_match_serde_names() {
        for h in [
            HostElement::ExternalWall,
            HostElement::InternalWall,
            HostElement::Window,
        ] {
            assert_eq!(serde_json::to_value(h).unwrap(), json!(h.as_str()));
        }
        for a in [
            AdjacentElement::Slab,
            AdjacentElement::Floor,
            AdjacentElement::ExternalWall,
        ] {
            assert_eq!(serde_json::to_value(a).unwrap(), json!(a.as_str()));
        }
        for e in [Exposure::External, Exposure::Internal] {
            assert_eq!(serde_json::to_value(e).unwrap(), json!(e.as_str()));
        }
    }

    #[test]
    fn test_detail_missing_tags_defaults_empty() {
        let d: Detail =
            serde_json::from_value(json!({"id": 3, "title": "Sill", "category": "Openings"}))
                .unwrap();
        assert!(d.tags.is_empty());
        assert!(d.description.is_empty());
    }

    #[test]
    fn test_detail_null_columns_default() {
        let d: Detail = serde_json::from_value(json!({
            "id": 4, "title": "Sill", "category": "Openings",
            "description": null, "tags": null
        }))
        .unwrap();
        assert!(d.description.is_empty());
        assert!(d.tags.is_empty());
    }

    #[test]
    fn test_ranked_null_columns_default() {
        let value = json!({
            "summary": "1 match",
            "suggestions": [{
                "id": 1, "rank": 1, "title": "X", "category": "Y",
                "description": null, "tags": null, "reason": "R"
            }]
        });
        let result = SuggestionResult::from_value(value).unwrap();
        let SuggestionResult::Ranked { suggestions, .. } = result else {
            panic!("expected ranked shape");
        };
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].description.is_empty());
        assert!(suggestions[0].tags.is_empty());
        assert_eq!(suggestions[0].reason, "R");
    }

    #[test]
    fn test_ranked_shape_sorted_by_rank() {
        let value = json!({
            "summary": "2 matches",
            "suggestions": [
                {"id": 2, "rank": 2, "title": "B", "category": "C", "description": "", "tags": [], "reason": "second"},
                {"id": 1, "rank": 1, "title": "A", "category": "C", "description": "", "tags": [], "reason": "first"}
            ]
        });
        let result = SuggestionResult::from_value(value).unwrap();
        let SuggestionResult::Ranked { summary, suggestions } = result else {
            panic!("expected ranked shape");
        };
        assert_eq!(summary, "2 matches");
        assert_eq!(suggestions[0].title, "A");
        assert_eq!(suggestions[1].title, "B");
    }

    #[test]
    fn test_null_suggestions_is_empty_ranked() {
        let value = json!({"summary": "No matching details found", "suggestions": null});
        let result = SuggestionResult::from_value(value).unwrap();
        assert!(matches!(result, SuggestionResult::Ranked { .. }));
        assert!(result.is_empty());
    }

    #[test]
    fn test_legacy_shape_with_and_without_detail() {
        let hit = json!({
            "detail": {"id": 1, "title": "Flashing A", "category": "Waterproofing", "description": "d", "tags": ["flashing"]},
            "explanation": "because"
        });
        let result = SuggestionResult::from_value(hit).unwrap();
        let SuggestionResult::Single { detail, explanation } = result else {
            panic!("expected legacy shape");
        };
        assert_eq!(detail.unwrap().title, "Flashing A");
        assert_eq!(explanation, "because");

        let miss = json!({"detail": null, "explanation": "No matching detail found"});
        let result = SuggestionResult::from_value(miss).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_unknown_shape_rejected() {
        assert!(matches!(
            SuggestionResult::from_value(json!({"foo": 1})),
            Err(ResultShapeError::UnknownShape)
        ));
        assert!(matches!(
            SuggestionResult::from_value(json!([1, 2])),
            Err(ResultShapeError::NotAnObject)
        ));
        assert!(matches!(
            SuggestionResult::from_value(json!({"suggestions": "nope"})),
            Err(ResultShapeError::Json(_))
        ));
    }
}
