/// View models for the listing and suggestion panels.
///
/// Controllers hold raw state; everything a surface needs to draw (cards,
/// badges, tag chips, notices) is derived here, along with a plain-text form.
use std::fmt::Write as _;

use schemars::JsonSchema;
use serde::Serialize;

use detail_common::model::{
    AdjacentElement, Detail, Exposure, HostElement, RankedDetail, SuggestionResult,
};

use crate::search::{SearchPhase, SearchSnapshot};
use crate::suggest::{SuggestForm, SuggestPhase};

const LOADING_NOTICE: &str = "Loading details...";
const EMPTY_NOTICE: &str = "No details found";
const SUBMITTING_NOTICE: &str = "Getting Suggestion...";
const NO_MATCH_NOTICE: &str = "No matching detail found";

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DetailCard {
    pub id: i64,
    pub title: String,
    pub category_badge: String,
    pub description: String,
    pub tag_chips: Vec<String>,
}

impl From<&Detail> for DetailCard {
    fn from(d: &Detail) -> Self {
        Self {
            id: d.id,
            title: d.title.clone(),
            category_badge: d.category.clone(),
            description: d.description.clone(),
            tag_chips: d.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SearchView {
    pub query: String,
    /// One of "idle", "searching", "results", "error".
    pub status: String,
    pub error: Option<String>,
    /// Placeholder text shown instead of cards (loading or empty).
    pub notice: Option<String>,
    pub cards: Vec<DetailCard>,
    pub suggestions: Vec<String>,
    pub suggestions_visible: bool,
    pub focused: bool,
    pub autocomplete_pending: bool,
    /// Plain-text rendering of the panel.
    pub text: String,
}

pub fn search_view(snapshot: &SearchSnapshot) -> SearchView {
    let (status, error) = match &snapshot.phase {
        SearchPhase::Idle => ("idle", None),
        SearchPhase::Searching => ("searching", None),
        SearchPhase::Results => ("results", None),
        SearchPhase::Error(message) => ("error", Some(message.clone())),
    };

    let (notice, cards) = if snapshot.phase == SearchPhase::Searching {
        (Some(LOADING_NOTICE.to_string()), Vec::new())
    } else if snapshot.details.is_empty() {
        (Some(EMPTY_NOTICE.to_string()), Vec::new())
    } else {
        (None, snapshot.details.iter().map(DetailCard::from).collect())
    };

    let mut view = SearchView {
        query: snapshot.query.clone(),
        status: status.to_string(),
        error,
        notice,
        cards,
        suggestions: if snapshot.suggestions_visible {
            snapshot.suggestions.clone()
        } else {
            Vec::new()
        },
        suggestions_visible: snapshot.suggestions_visible,
        focused: snapshot.focused,
        autocomplete_pending: snapshot.autocomplete_pending,
        text: String::new(),
    };
    view.text = view.to_text();
    view
}

impl SearchView {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {error}");
        }
        if self.suggestions_visible {
            let _ = writeln!(out, "Suggestions: {}", self.suggestions.join(" | "));
        }
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "{notice}");
        }
        for card in &self.cards {
            write_card(
                &mut out,
                None,
                &card.title,
                &card.category_badge,
                &card.description,
                &card.tag_chips,
            );
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct RankedCard {
    /// Rank as displayed ("1", "2", ...). `None` for the legacy single-detail shape.
    pub rank_label: Option<String>,
    pub id: i64,
    pub title: String,
    pub category_badge: String,
    pub description: String,
    pub tag_chips: Vec<String>,
    pub reason: Option<String>,
}

impl From<&RankedDetail> for RankedCard {
    fn from(d: &RankedDetail) -> Self {
        Self {
            rank_label: Some(d.rank.to_string()),
            id: d.id,
            title: d.title.clone(),
            category_badge: d.category.clone(),
            description: d.description.clone(),
            tag_chips: d.tags.clone(),
            reason: Some(d.reason.clone()),
        }
    }
}

impl From<&Detail> for RankedCard {
    fn from(d: &Detail) -> Self {
        Self {
            rank_label: None,
            id: d.id,
            title: d.title.clone(),
            category_badge: d.category.clone(),
            description: d.description.clone(),
            tag_chips: d.tags.clone(),
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SuggestionView {
    pub host_element: Option<HostElement>,
    pub adjacent_element: Option<AdjacentElement>,
    pub exposure: Option<Exposure>,
    /// One of "idle", "submitting", "success", "failure".
    pub status: String,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub summary: Option<String>,
    pub cards: Vec<RankedCard>,
    /// Free-text explanation of the legacy single-detail shape.
    pub explanation: Option<String>,
    /// Plain-text rendering of the panel.
    pub text: String,
}

pub fn suggestion_view(form: &SuggestForm, phase: &SuggestPhase) -> SuggestionView {
    let mut view = SuggestionView {
        host_element: form.host_element,
        adjacent_element: form.adjacent_element,
        exposure: form.exposure,
        status: String::new(),
        error: None,
        notice: None,
        summary: None,
        cards: Vec::new(),
        explanation: None,
        text: String::new(),
    };

    match phase {
        SuggestPhase::Idle => view.status = "idle".to_string(),
        SuggestPhase::Submitting => {
            view.status = "submitting".to_string();
            view.notice = Some(SUBMITTING_NOTICE.to_string());
        }
        SuggestPhase::Failure(message) => {
            view.status = "failure".to_string();
            view.error = Some(message.clone());
        }
        SuggestPhase::Success(result) => {
            view.status = "success".to_string();
            match result {
                SuggestionResult::Ranked {
                    summary,
                    suggestions,
                } => {
                    view.summary = Some(summary.clone());
                    view.cards = suggestions.iter().map(RankedCard::from).collect();
                }
                SuggestionResult::Single {
                    detail,
                    explanation,
                } => {
                    view.cards = detail.iter().map(RankedCard::from).collect();
                    view.explanation = Some(explanation.clone());
                }
            }
            if view.cards.is_empty() {
                view.notice = Some(NO_MATCH_NOTICE.to_string());
            }
        }
    }

    view.text = view.to_text();
    view
}

impl SuggestionView {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(error) = &self.error {
            let _ = writeln!(out, "! {error}");
        }
        if let Some(summary) = &self.summary {
            let _ = writeln!(out, "{summary}");
        }
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "{notice}");
        }
        for card in &self.cards {
            write_card(
                &mut out,
                card.rank_label.as_deref(),
                &card.title,
                &card.category_badge,
                &card.description,
                &card.tag_chips,
            );
            if let Some(reason) = &card.reason {
                let _ = writeln!(out, "    Why: {reason}");
            }
        }
        if let Some(explanation) = &self.explanation {
            let _ = writeln!(out, "Explanation:\n{explanation}");
        }
        out
    }
}

fn write_card(
    out: &mut String,
    rank: Option<&str>,
    title: &str,
    category: &str,
    description: &str,
    tags: &[String],
) {
    match rank {
        Some(rank) => {
            let _ = writeln!(out, "#{rank} {title} [{category}]");
        }
        None => {
            let _ = writeln!(out, "- {title} [{category}]");
        }
    }
    if !description.is_empty() {
        let _ = writeln!(out, "    {description}");
    }
    if !tags.is_empty() {
        let chips: Vec<String> = tags.iter().map(|t| format!("({t})")).collect();
        let _ = writeln!(out, "    {}", chips.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::search::tests::{detail, FakeApi};
    use crate::search::SearchController;
    use crate::suggest::SuggestController;

    #[tokio::test]
    async fn test_listing_renders_card_with_badge_and_chips() {
        let api = Arc::new(FakeApi {
            details: vec![Detail {
                id: 1,
                title: "Flashing A".to_string(),
                category: "Waterproofing".to_string(),
                description: "...".to_string(),
                tags: vec!["flashing".to_string(), "external".to_string()],
            }],
            ..FakeApi::default()
        });
        let search = SearchController::new(api, Config::default());
        search.load_all().await;

        let view = search_view(&search.snapshot().await);
        assert_eq!(view.status, "idle");
        assert_eq!(view.notice, None);
        assert_eq!(view.cards.len(), 1);
        let card = &view.cards[0];
        assert_eq!(card.title, "Flashing A");
        assert_eq!(card.category_badge, "Waterproofing");
        assert_eq!(card.tag_chips, vec!["flashing", "external"]);

        let text = &view.text;
        assert!(text.contains("- Flashing A [Waterproofing]"));
        assert!(text.contains("(flashing) (external)"));
    }

    #[test]
    fn test_empty_and_loading_notices() {
        let mut snapshot = SearchSnapshot {
            phase: SearchPhase::Results,
            query: "zzz".to_string(),
            details: vec![],
            suggestions: vec!["hidden".to_string()],
            suggestions_visible: false,
            focused: true,
            autocomplete_pending: false,
        };
        let view = search_view(&snapshot);
        assert_eq!(view.notice.as_deref(), Some("No details found"));
        assert!(view.suggestions.is_empty());

        snapshot.phase = SearchPhase::Searching;
        snapshot.details = vec![detail(1, "Flashing A")];
        let view = search_view(&snapshot);
        assert_eq!(view.notice.as_deref(), Some("Loading details..."));
        assert!(view.cards.is_empty());
    }

    #[test]
    fn test_error_keeps_previous_cards() {
        let snapshot = SearchSnapshot {
            phase: SearchPhase::Error("Search failed. Try again.".to_string()),
            query: "fl".to_string(),
            details: vec![detail(1, "Flashing A")],
            suggestions: vec![],
            suggestions_visible: false,
            focused: false,
            autocomplete_pending: false,
        };
        let view = search_view(&snapshot);
        assert_eq!(view.status, "error");
        assert_eq!(view.error.as_deref(), Some("Search failed. Try again."));
        assert_eq!(view.cards.len(), 1);
        assert!(view.to_text().starts_with("! Search failed. Try again."));
    }

    #[tokio::test]
    async fn test_ranked_suggestion_renders_labeled_card() {
        let api = Arc::new(FakeApi {
            suggest_result: Some(Ok(SuggestionResult::Ranked {
                summary: "2 matches".to_string(),
                suggestions: vec![RankedDetail {
                    id: 1,
                    rank: 1,
                    title: "X".to_string(),
                    category: "Y".to_string(),
                    description: "Z".to_string(),
                    tags: vec![],
                    reason: "R".to_string(),
                }],
            })),
            ..FakeApi::default()
        });
        let controller = SuggestController::new(api);
        controller.set_host_element(HostElement::ExternalWall).await;
        controller.set_adjacent_element(AdjacentElement::Slab).await;
        controller.set_exposure(Exposure::External).await;
        controller.submit().await.unwrap();

        let view = suggestion_view(&controller.form().await, &controller.phase().await);
        assert_eq!(view.status, "success");
        assert_eq!(view.host_element, Some(HostElement::ExternalWall));
        assert_eq!(view.summary.as_deref(), Some("2 matches"));
        assert_eq!(view.cards.len(), 1);
        let card = &view.cards[0];
        assert_eq!(card.rank_label.as_deref(), Some("1"));
        assert_eq!(card.title, "X");
        assert_eq!(card.reason.as_deref(), Some("R"));
        assert!(view.text.contains("#1 X [Y]"));
        assert!(view.text.contains("Why: R"));
    }

    #[test]
    fn test_legacy_shape_renders_explanation() {
        let phase = SuggestPhase::Success(SuggestionResult::Single {
            detail: Some(detail(7, "Sill B")),
            explanation: "Fits the junction.".to_string(),
        });
        let view = suggestion_view(&SuggestForm::default(), &phase);
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.cards[0].rank_label, None);
        assert_eq!(view.explanation.as_deref(), Some("Fits the junction."));
        assert_eq!(view.notice, None);

        let miss = SuggestPhase::Success(SuggestionResult::Single {
            detail: None,
            explanation: "Try different combinations.".to_string(),
        });
        let view = suggestion_view(&SuggestForm::default(), &miss);
        assert!(view.cards.is_empty());
        assert_eq!(view.notice.as_deref(), Some("No matching detail found"));
    }

    #[test]
    fn test_failure_and_submitting_views() {
        let view = suggestion_view(&SuggestForm::default(), &SuggestPhase::Failure("Failed to get suggestion.".to_string()));
        assert_eq!(view.status, "failure");
        assert!(view.cards.is_empty());
        assert_eq!(view.error.as_deref(), Some("Failed to get suggestion."));

        let view = suggestion_view(&SuggestForm::default(), &SuggestPhase::Submitting);
        assert_eq!(view.notice.as_deref(), Some("Getting Suggestion..."));
    }
}
