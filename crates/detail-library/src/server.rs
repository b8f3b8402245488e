/// MCP server exposing the detail library interaction surface.
///
/// Each tool is one user event (typing, focus, picking a suggestion,
/// submitting a form) delivered to the controllers, and returns the
/// rendered view that results from it.
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use detail_common::api::DetailApi;
use detail_common::model::{
    AdjacentElement, Exposure, HostElement, SecureIdentity, ServiceInfo,
};

use crate::render::{self, DetailCard, SearchView, SuggestionView};
use crate::search::SearchController;
use crate::suggest::SuggestController;

#[derive(Clone)]
pub struct DetailLibraryServer {
    api: Arc<dyn DetailApi>,
    search: SearchController,
    suggest: SuggestController,
    tool_router: ToolRouter<DetailLibraryServer>,
}

impl DetailLibraryServer {
    pub fn new(api: Arc<dyn DetailApi>, search: SearchController, suggest: SuggestController) -> Self {
        Self {
            api,
            search,
            suggest,
            tool_router: Self::tool_router(),
        }
    }

    async fn current_search_view(&self) -> SearchView {
        render::search_view(&self.search.snapshot().await)
    }

    async fn current_suggestion_view(&self) -> SuggestionView {
        render::suggestion_view(&self.suggest.form().await, &self.suggest.phase().await)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct TypeQueryParams {
    /// Full current contents of the search field.
    text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SelectSuggestionParams {
    /// Suggestion text exactly as listed in the dropdown.
    text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SuggestDetailParams {
    host_element: HostElement,
    adjacent_element: AdjacentElement,
    exposure: Exposure,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SecureDetailsParams {
    role: String,
    email: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DetailListResponse {
    cards: Vec<DetailCard>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct EmbeddingsResponse {
    /// Whatever the backend reported for the maintenance run.
    result: serde_json::Value,
}

#[tool_router]
impl DetailLibraryServer {
    #[tool(description = "Load the full, unfiltered detail listing (GET /details) and return the listing view.")]
    async fn list_details(&self) -> Result<Json<SearchView>, String> {
        self.search.load_all().await;
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Type into the search field. Autocomplete is requested once the trimmed text has at least 2 characters and typing pauses for 300ms; call search_view afterwards to see the dropdown.")]
    async fn type_query(
        &self,
        Parameters(params): Parameters<TypeQueryParams>,
    ) -> Result<Json<SearchView>, String> {
        self.search.input(&params.text).await;
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Focus the search field. Reopens the suggestion dropdown if suggestions are loaded.")]
    async fn focus_search(&self) -> Result<Json<SearchView>, String> {
        self.search.focus().await;
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Move focus away from the search field. The dropdown hides after a short grace delay.")]
    async fn blur_search(&self) -> Result<Json<SearchView>, String> {
        self.search.blur().await;
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Pick a suggestion from the dropdown. Sets the query to its text, closes the dropdown and searches for that exact text.")]
    async fn select_suggestion(
        &self,
        Parameters(params): Parameters<SelectSuggestionParams>,
    ) -> Result<Json<SearchView>, String> {
        if params.text.trim().is_empty() {
            return Err("text must not be empty".to_string());
        }
        self.search.select_suggestion(&params.text).await;
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Submit the search form. A blank query shows the full listing; otherwise searches by title, tags or description.")]
    async fn submit_search(&self) -> Result<Json<SearchView>, String> {
        self.search.submit().await;
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Clear the search field and suggestions, then reload the full listing.")]
    async fn clear_search(&self) -> Result<Json<SearchView>, String> {
        self.search.clear().await;
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Return the current listing view, including any autocomplete suggestions that have arrived.")]
    async fn search_view(&self) -> Result<Json<SearchView>, String> {
        Ok(Json(self.current_search_view().await))
    }

    #[tool(description = "Get ranked detail suggestions for a drawing context (POST /suggest-detail-rag). Each suggestion carries a rank and a reason.")]
    async fn suggest_detail(
        &self,
        Parameters(params): Parameters<SuggestDetailParams>,
    ) -> Result<Json<SuggestionView>, String> {
        self.suggest.set_host_element(params.host_element).await;
        self.suggest
            .set_adjacent_element(params.adjacent_element)
            .await;
        self.suggest.set_exposure(params.exposure).await;
        self.suggest.submit().await.map_err(|e| e.to_string())?;
        Ok(Json(self.current_suggestion_view().await))
    }

    #[tool(description = "Clear the suggestion form and any previous result.")]
    async fn reset_suggestion(&self) -> Result<Json<SuggestionView>, String> {
        self.suggest.reset().await;
        Ok(Json(self.current_suggestion_view().await))
    }

    #[tool(description = "Return the current suggestion view.")]
    async fn suggestion_view(&self) -> Result<Json<SuggestionView>, String> {
        Ok(Json(self.current_suggestion_view().await))
    }

    #[tool(description = "List details from the secured endpoint (GET /secure/details), identifying the caller by role and email headers.")]
    async fn secure_details(
        &self,
        Parameters(params): Parameters<SecureDetailsParams>,
    ) -> Result<Json<DetailListResponse>, String> {
        let identity = SecureIdentity {
            role: params.role.trim().to_string(),
            email: params.email.trim().to_string(),
        };
        if identity.role.is_empty() || identity.email.is_empty() {
            return Err("role and email must not be empty".to_string());
        }
        let details = self
            .api
            .fetch_secure_details(&identity)
            .await
            .map_err(|e| e.display_message("Failed to load secure details."))?;
        Ok(Json(DetailListResponse {
            cards: details.iter().map(DetailCard::from).collect(),
        }))
    }

    #[tool(description = "Ask the backend to (re)generate detail embeddings (POST /generate-embeddings).")]
    async fn generate_embeddings(&self) -> Result<Json<EmbeddingsResponse>, String> {
        let result = self
            .api
            .generate_embeddings()
            .await
            .map_err(|e| e.display_message("Failed to generate embeddings."))?;
        Ok(Json(EmbeddingsResponse { result }))
    }

    #[tool(description = "Describe the backend service (GET /).")]
    async fn service_info(&self) -> Result<Json<ServiceInfo>, String> {
        let info = self
            .api
            .service_info()
            .await
            .map_err(|e| e.display_message("Failed to reach the backend."))?;
        Ok(Json(info))
    }
}

#[tool_handler]
impl ServerHandler for DetailLibraryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "detail-library".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Architectural detail library. Use list_details to browse, type_query / \
search_view / select_suggestion / submit_search / clear_search to search with autocomplete, \
and suggest_detail with host_element, adjacent_element and exposure to get ranked \
recommendations."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DetailLibraryServer;

    #[test]
    fn tools_publish_output_schemas() {
        let tools = DetailLibraryServer::tool_router().list_all();
        for name in [
            "list_details",
            "type_query",
            "focus_search",
            "blur_search",
            "select_suggestion",
            "submit_search",
            "clear_search",
            "search_view",
            "suggest_detail",
            "suggestion_view",
            "reset_suggestion",
            "secure_details",
            "generate_embeddings",
            "service_info",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }
}
