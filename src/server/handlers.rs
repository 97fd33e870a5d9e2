//! MCP tool handlers for the Ketomed server.
//!
//! This module implements all the MCP tools using the rmcp SDK's tool_router pattern.

use crate::domain::KetoStatus;
use crate::error::ServiceError;
use crate::models::{Drug, SearchHistoryEntry};
use crate::refine::RefineFilters;
use crate::search::SearchOutcome;
use crate::services::{BookmarkService, HistoryService, LookupService, SessionResponse};
use crate::session::BookmarkChange;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::sync::Arc;

const INACTIVITY_NOTICE: &str = "Sessies zijn gereset vanwege inactiviteit.";

/// The Ketomed MCP server that exposes drug catalog lookup tools.
#[derive(Clone)]
pub struct KetomedMcpServer {
    lookup_service: Arc<dyn LookupService>,
    bookmark_service: Arc<dyn BookmarkService>,
    history_service: Arc<dyn HistoryService>,
    tool_router: ToolRouter<Self>,
}

// Implement ServerHandler using the tool_handler macro
#[tool_handler]
impl ServerHandler for KetomedMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "ketomed-mcp-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some("MCP server for the Ketomed drug catalog - search products by name, substance, ATC code or identifier, check whether they are compatible with a ketogenic diet, and keep per-session bookmarks.".into()),
        }
    }
}

// Helper structs for tool parameters
#[derive(Debug, Deserialize, JsonSchema)]
struct SearchDrugsParams {
    session_id: String,
    query: String,
    /// Keep only these administration routes
    #[serde(default)]
    routes: Option<Vec<String>>,
    /// Keep only these statuses (Yes, No, Unknown)
    #[serde(default)]
    statuses: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DrugIdParams {
    session_id: String,
    drug_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SessionParams {
    session_id: String,
}

// Helper function to convert errors to MCP errors
fn to_mcp_error(e: impl std::fmt::Display) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: None,
    }
}

fn service_error(e: ServiceError) -> McpError {
    match e {
        ServiceError::UnknownDrug(_) | ServiceError::InvalidRequest(_) => McpError {
            code: ErrorCode::INVALID_PARAMS,
            message: Cow::from(e.to_string()),
            data: None,
        },
        ServiceError::Persistence(_) => {
            tracing::error!("Request failed: {}", e);
            to_mcp_error(e)
        }
    }
}

fn drug_json(drug: &Drug) -> Value {
    let indicator = drug.status.indicator();
    json!({
        "id": drug.id,
        "name": drug.display_name(),
        "brand_name": drug.brand_name,
        "active_substance": drug.active_substance,
        "atc_code": drug.atc_code,
        "administration_route": drug.administration_route,
        "status": drug.status,
        "indicator": format!("{} {}", indicator.marker(), indicator.label()),
        "excipients": drug.excipients,
        "non_ketogenic_excipients": drug.non_ketogenic_excipients,
        "unknown_excipients": drug.unknown_excipients,
    })
}

fn history_json(entry: &SearchHistoryEntry) -> Value {
    json!({
        "term": entry.term,
        "timestamp": entry.formatted_timestamp(),
    })
}

fn change_message(change: BookmarkChange) -> &'static str {
    match change {
        BookmarkChange::Added => "Bookmark toegevoegd.",
        BookmarkChange::AlreadyBookmarked => "Bookmark bestond al.",
        BookmarkChange::Removed => "Bookmark verwijderd.",
        BookmarkChange::NotBookmarked => "Geen bookmark om te verwijderen.",
    }
}

/// Add the session flags to a tool body.
fn with_session_flags<T>(response: &SessionResponse<T>, mut body: Value) -> Value {
    if let Value::Object(map) = &mut body {
        map.insert("session_reset".into(), json!(response.session_reset));
        if response.session_reset {
            map.insert("notice".into(), json!(INACTIVITY_NOTICE));
        }
        if let Some(warning) = &response.store_warning {
            map.insert("store_warning".into(), json!(warning));
        }
    }
    body
}

fn respond<T>(response: &SessionResponse<T>, body: Value) -> Result<CallToolResult, McpError> {
    let body = with_session_flags(response, body);
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(&body).map_err(to_mcp_error)?,
    )]))
}

// Tool router implementation
#[tool_router]
impl KetomedMcpServer {
    /// Create a new Ketomed MCP server.
    pub fn new(
        lookup_service: Arc<dyn LookupService>,
        bookmark_service: Arc<dyn BookmarkService>,
        history_service: Arc<dyn HistoryService>,
    ) -> Self {
        Self {
            lookup_service,
            bookmark_service,
            history_service,
            tool_router: Self::tool_router(),
        }
    }

    /// Search the drug catalog.
    #[tool(
        description = "Search the drug catalog by brand name, active substance, identifier or ATC code. Results are ordered ketogenic first, unknown next, non-ketogenic last, and can be narrowed by administration route and status."
    )]
    async fn search_drugs(
        &self,
        params: Parameters<SearchDrugsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::debug!(
            "search_drugs: session={}, query={:?}, routes={:?}, statuses={:?}",
            params.session_id,
            params.query,
            params.routes,
            params.statuses
        );

        let filters = RefineFilters::from_raw(
            params.routes.unwrap_or_default(),
            params.statuses.unwrap_or_default(),
        );

        let response = self
            .lookup_service
            .search(&params.session_id, &params.query, &filters)
            .await
            .map_err(service_error)?;

        let body = match &response.value {
            SearchOutcome::InsufficientQuery { min_length } => json!({
                "query": params.query,
                "outcome": "insufficient_query",
                "message": format!("Voer minstens {} tekens in om te zoeken.", min_length),
                "results": [],
            }),
            SearchOutcome::EmptyResult => json!({
                "query": params.query,
                "outcome": "empty_result",
                "message": "Geen resultaten gevonden voor uw zoekopdracht.",
                "results": [],
            }),
            SearchOutcome::Found(rows) => json!({
                "query": params.query,
                "outcome": "found",
                "result_count": rows.len(),
                "results": rows.iter().map(drug_json).collect::<Vec<_>>(),
            }),
        };

        respond(&response, body)
    }

    /// Retrieve one catalog product by identifier.
    #[tool(description = "Retrieve complete information for a catalog product by its identifier, including excipients and bookmark state")]
    async fn get_drug(&self, params: Parameters<DrugIdParams>) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let response = self
            .lookup_service
            .get_drug(&params.session_id, &params.drug_id)
            .await
            .map_err(service_error)?;

        let mut body = drug_json(&response.value.drug);
        if let Value::Object(map) = &mut body {
            map.insert("bookmarked".into(), json!(response.value.bookmarked));
        }

        respond(&response, body)
    }

    /// List the values accepted by the search filters.
    #[tool(description = "List the administration routes and ketogenic statuses present in the catalog, for use as search filters")]
    async fn list_filter_options(
        &self,
        params: Parameters<SessionParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let response = self
            .lookup_service
            .filter_options(&params.session_id)
            .await
            .map_err(service_error)?;

        let body = json!({
            "routes": response.value.routes,
            "statuses": response.value.statuses.iter().map(|status: &KetoStatus| {
                let indicator = status.indicator();
                json!({
                    "status": status,
                    "indicator": format!("{} {}", indicator.marker(), indicator.label()),
                })
            }).collect::<Vec<_>>(),
        });

        respond(&response, body)
    }

    /// Bookmark a product for this session.
    #[tool(description = "Bookmark a catalog product for this session. Bookmarking an already bookmarked product changes nothing.")]
    async fn add_bookmark(
        &self,
        params: Parameters<DrugIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let response = self
            .bookmark_service
            .add(&params.session_id, &params.drug_id)
            .await
            .map_err(service_error)?;

        let body = json!({
            "drug_id": params.drug_id.trim(),
            "changed": response.value.changed(),
            "message": change_message(response.value),
        });

        respond(&response, body)
    }

    /// Remove a bookmark from this session.
    #[tool(description = "Remove a bookmark from this session. Removing a product that is not bookmarked changes nothing.")]
    async fn remove_bookmark(
        &self,
        params: Parameters<DrugIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let response = self
            .bookmark_service
            .remove(&params.session_id, &params.drug_id)
            .await
            .map_err(service_error)?;

        let body = json!({
            "drug_id": params.drug_id.trim(),
            "changed": response.value.changed(),
            "message": change_message(response.value),
        });

        respond(&response, body)
    }

    /// List this session's bookmarks.
    #[tool(description = "List the products bookmarked in this session, ordered ketogenic first")]
    async fn list_bookmarks(
        &self,
        params: Parameters<SessionParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let response = self
            .bookmark_service
            .list(&params.session_id)
            .await
            .map_err(service_error)?;

        let mut body = json!({
            "bookmark_count": response.value.len(),
            "bookmarks": response.value.iter().map(drug_json).collect::<Vec<_>>(),
        });
        if response.value.is_empty() {
            body["message"] = json!("U heeft nog geen bookmarks.");
        }

        respond(&response, body)
    }

    /// List this session's recent searches.
    #[tool(description = "List the most recent searches of this session that returned results, newest first")]
    async fn recent_searches(
        &self,
        params: Parameters<SessionParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;

        let response = self
            .history_service
            .recent(&params.session_id)
            .await
            .map_err(service_error)?;

        let mut body = json!({
            "searches": response.value.iter().map(history_json).collect::<Vec<_>>(),
        });
        if response.value.is_empty() {
            body["message"] = json!("Geen recente zoekopdrachten gevonden.");
        }

        respond(&response, body)
    }

    /// Clear this session's bookmarks and history.
    #[tool(description = "Clear all bookmarks and search history of this session")]
    async fn reset_session(
        &self,
        params: Parameters<SessionParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: reset_session called for {}", params.session_id);

        let response = self
            .history_service
            .reset(&params.session_id)
            .await
            .map_err(service_error)?;

        respond(&response, json!({ "message": "Sessies zijn gereset." }))
    }
}
