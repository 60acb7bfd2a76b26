//! MCP (Model Context Protocol) server for keyphrase.
//!
//! Exposes tagging, extraction and the text utilities as MCP tools so that
//! AI assistants (Claude Desktop, Cursor, etc.) can invoke them over stdio
//! JSON-RPC. Models are trained with the CLI and referenced by path.
//!
//! Start with: `keyphrase --mcp`

use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::ops;

// ── Parameter structs ───────────────────────────────────────────────────────
// Each struct maps 1:1 with a CLI subcommand. `JsonSchema` is required by
// rmcp so that the tool's input schema is auto-generated for the AI client.

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TagParams {
    /// JSON array of objects to tag.
    pub records: Vec<serde_json::Value>,
    /// Path to a tagger model trained with `keyphrase train-tagger`
    /// (or a model name when `store` is given).
    pub model: String,
    /// SQLite model store path.
    pub store: Option<String>,
    /// Field name containing text (default: "content").
    #[serde(default = "default_field")]
    pub field: String,
    /// Assign exactly this many tags instead of the model's setting.
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExtractParams {
    /// JSON array of objects to extract keyphrases from.
    pub records: Vec<serde_json::Value>,
    /// Path to an extractor model trained with `keyphrase train-extractor`
    /// (or a model name when `store` is given).
    pub model: String,
    /// SQLite model store path.
    pub store: Option<String>,
    /// Field name containing text (default: "content").
    #[serde(default = "default_field")]
    pub field: String,
    /// Assign exactly this many keyphrases instead of the model's setting.
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StemParams {
    /// Words or phrases to stem.
    pub phrases: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollocationsParams {
    /// JSON array of objects to scan.
    pub records: Vec<serde_json::Value>,
    /// Field name containing text (default: "content").
    #[serde(default = "default_field")]
    pub field: String,
    /// Shortest collocation in words (default: 2).
    #[serde(default = "default_min_length")]
    pub min: usize,
    /// Longest collocation in words (default: 5).
    #[serde(default = "default_max_length")]
    pub max: usize,
}

// ── Default helpers ─────────────────────────────────────────────────────────

fn default_field() -> String {
    "content".into()
}
fn default_min_length() -> usize {
    2
}
fn default_max_length() -> usize {
    5
}

// ── Shared helpers ──────────────────────────────────────────────────────────

fn json_text(v: &serde_json::Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}

// ── MCP Server ──────────────────────────────────────────────────────────────

/// The MCP server struct. Holds only the auto-generated tool router.
#[derive(Clone)]
pub struct KeyphraseMcp {
    #[allow(dead_code)] // accessed at runtime by the #[tool_router] macro
    tool_router: ToolRouter<Self>,
}

impl Default for KeyphraseMcp {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl KeyphraseMcp {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    // ── tag ─────────────────────────────────────────────────────────────

    #[tool(
        name = "tag",
        description = "Assign tags from a trained controlled vocabulary to JSON records. Vocabulary terms found in the text (including concatenated multi-word forms like 'losangeles') are ranked by TF-IDF, boosted by tag popularity and optionally re-ranked by tag co-occurrence. Returns the records with a `_tags` column of {value, weight}."
    )]
    async fn tag(&self, params: Parameters<TagParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || {
            ops::op_tag(&p.records, &p.field, &p.model, p.store.as_deref(), p.count)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?
        .map_err(|e| McpError::invalid_params(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── extract ─────────────────────────────────────────────────────────

    #[tool(
        name = "extract",
        description = "Extract keyphrases from JSON records with a trained extractor. Candidate words and collocations are scored by a regression model over position, frequency, IDF, keyphrase prior and correlation features. Returns the records with a `_keyphrases` column of {value, weight}."
    )]
    async fn extract(&self, params: Parameters<ExtractParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || {
            ops::op_extract(&p.records, &p.field, &p.model, p.store.as_deref(), p.count)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?
        .map_err(|e| McpError::invalid_params(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── stem ────────────────────────────────────────────────────────────

    #[tool(
        name = "stem",
        description = "Stem words or phrases with the English Snowball stemmer. Returns per phrase the stems and the canonical key (stopwords removed, stems sorted) used to match keyphrases."
    )]
    async fn stem(&self, params: Parameters<StemParams>) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || ops::op_stem(&p.phrases))
            .await
            .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }

    // ── collocations ────────────────────────────────────────────────────

    #[tool(
        name = "collocations",
        description = "Find collocations (frequent multi-word phrases such as 'machine learning') in each JSON record. A phrase must occur at least three times, must not start or end with a stopword, and is dropped when a longer accepted phrase covers it. Returns the records with a `_collocations` column of {value, stem, count}."
    )]
    async fn collocations(
        &self,
        params: Parameters<CollocationsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let result = tokio::task::spawn_blocking(move || {
            ops::op_collocations(&p.records, &p.field, p.min, p.max)
        })
        .await
        .map_err(|e| McpError::internal_error(format!("task join error: {e}"), None))?
        .map_err(|e| McpError::invalid_params(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(json_text(
            &result,
        ))]))
    }
}

impl ServerHandler for KeyphraseMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Keyphrase engine. Tools: tag, extract, stem, collocations. \
                 Pass JSON records and a model path (trained with the keyphrase CLI) \
                 for tag/extract; stem takes plain strings."
                    .into(),
            ),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "keyphrase".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Keyphrase Engine".into()),
                description: Some(
                    "Controlled tagging and keyphrase extraction engine".into(),
                ),
                icons: None,
                website_url: None,
            },
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: Default::default(),
        }))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_context = ToolCallContext::new(self, request, context);
        async move { self.tool_router.call(tool_context).await }
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tool_router.get(name).cloned()
    }
}

// ── Entry point ─────────────────────────────────────────────────────────────

/// Start the MCP server on stdio. Called from `cli.rs` when `--mcp` is passed.
pub async fn serve_stdio() -> Result<(), Box<dyn std::error::Error>> {
    let server = KeyphraseMcp::new();
    let transport = rmcp::transport::io::stdio();
    let service = server.serve(transport).await.inspect_err(|e| {
        eprintln!("MCP serve error: {e}");
    })?;
    tracing::info!("MCP server running on stdio");
    service.waiting().await?;
    Ok(())
}
