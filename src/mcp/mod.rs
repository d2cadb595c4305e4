//! MCP tool server relaying CAD commands to the command endpoint.
//!
//! Every endpoint command is one tool with the same name. Parameters are
//! range-checked here, so an out-of-range request never reaches the
//! endpoint.

mod client;
mod types;

pub use client::{CadClient, ClientError};
pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};

use crate::dispatch::Command;

#[derive(Clone)]
pub struct CadMcpServer {
    client: CadClient,
    tool_router: ToolRouter<Self>,
}

impl CadMcpServer {
    pub fn new(client: CadClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    fn client_err(e: ClientError) -> McpError {
        match e {
            ClientError::Rejected(msg) => McpError::invalid_params(msg, None),
            ClientError::Http(e) => {
                McpError::internal_error(format!("Could not reach CAD server: {}", e), None)
            }
            ClientError::Server(msg) => {
                McpError::internal_error(format!("Could not reach CAD server: {}", msg), None)
            }
        }
    }

    /// Send an already validated command and return the endpoint's result line.
    pub async fn relay(&self, command: Command) -> Result<String, McpError> {
        self.client
            .execute(&command)
            .await
            .map_err(Self::client_err)
    }

    /// Tool result carrying the result line as text and as `{"result": ...}`.
    pub async fn reply(&self, command: Command) -> Result<CallToolResult, McpError> {
        let result = self.relay(command).await?;
        let structured = serde_json::json!({ "result": result });
        let mut reply = CallToolResult::success(vec![Content::text(result)]);
        reply.structured_content = Some(structured);
        Ok(reply)
    }
}

#[tool_router]
impl CadMcpServer {
    // ============================================================
    // Sketching
    // ============================================================

    #[tool(
        description = "Create a new sketch on one of the origin planes. The new sketch becomes the active sketch that create_circle, draw_rectangle, extrude and revolve work on.",
        annotations(title = "Create sketch", read_only_hint = false, destructive_hint = false)
    )]
    async fn create_sketch(
        &self,
        params: Parameters<CreateSketchRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Draw a circle in the active sketch. Adds one closed profile. Fails if no sketch exists.",
        annotations(title = "Create circle", read_only_hint = false, destructive_hint = false)
    )]
    async fn create_circle(
        &self,
        params: Parameters<CreateCircleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Draw an axis-aligned rectangle in the active sketch from its lower-left corner. Adds one closed profile. Fails if no sketch exists.",
        annotations(title = "Draw rectangle", read_only_hint = false, destructive_hint = false)
    )]
    async fn draw_rectangle(
        &self,
        params: Parameters<DrawRectangleRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Create a construction plane offset from the XY plane. The first construction plane is the one split_body uses.",
        annotations(title = "Create offset plane", read_only_hint = false, destructive_hint = false)
    )]
    async fn create_offset_plane(
        &self,
        params: Parameters<CreateOffsetPlaneRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()).await
    }

    // ============================================================
    // Features
    // ============================================================

    #[tool(
        description = "Extrude the first profile of the active sketch. Use 'new' for a new body, or 'join', 'cut', 'intersect' against the last body.",
        annotations(title = "Extrude", read_only_hint = false, destructive_hint = false)
    )]
    async fn extrude(
        &self,
        params: Parameters<ExtrudeRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Revolve the first profile of the active sketch around the X axis.",
        annotations(title = "Revolve", read_only_hint = false, destructive_hint = false)
    )]
    async fn revolve(
        &self,
        params: Parameters<RevolveRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Sweep the first profile of the active sketch along the first curve of the sketch created before it. Draw the path sketch first, then the profile sketch.",
        annotations(title = "Sweep", read_only_hint = false, destructive_hint = false)
    )]
    async fn sweep(&self) -> Result<CallToolResult, McpError> {
        self.reply(Command::Sweep {}).await
    }

    #[tool(
        description = "Loft between the profiles used by the two most recent timeline features.",
        annotations(title = "Loft", read_only_hint = false, destructive_hint = false)
    )]
    async fn loft(&self) -> Result<CallToolResult, McpError> {
        self.reply(Command::Loft {}).await
    }

    #[tool(
        description = "Add a draft angle to the faces of the last body, e.g. to ease removal from a mold.",
        annotations(title = "Add draft", read_only_hint = false, destructive_hint = false)
    )]
    async fn add_draft(
        &self,
        params: Parameters<AddDraftRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Round every edge of the last body with a constant-radius fillet.",
        annotations(title = "Fillet", read_only_hint = false, destructive_hint = false)
    )]
    async fn fillet(
        &self,
        params: Parameters<FilletRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Split the last body with the first construction plane. Create an offset plane through the body first.",
        annotations(title = "Split body", read_only_hint = false, destructive_hint = false)
    )]
    async fn split_body(&self) -> Result<CallToolResult, McpError> {
        self.reply(Command::SplitBody {}).await
    }

    #[tool(
        description = "Combine the last two bodies. The most recent body is the target; the one before it is consumed as the tool.",
        annotations(title = "Combine bodies", read_only_hint = false, destructive_hint = true)
    )]
    async fn combine(
        &self,
        params: Parameters<CombineRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    #[tool(
        description = "Repeat the last body along the X axis. Quantity counts the original.",
        annotations(title = "Rectangular pattern", read_only_hint = false, destructive_hint = false)
    )]
    async fn pattern(
        &self,
        params: Parameters<PatternRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()?).await
    }

    // ============================================================
    // Editing
    // ============================================================

    #[tool(
        description = "Undo the most recent modeling operation.",
        annotations(title = "Undo", read_only_hint = false, destructive_hint = true)
    )]
    async fn undo(&self) -> Result<CallToolResult, McpError> {
        self.reply(Command::Undo {}).await
    }

    #[tool(
        description = "Delete a timeline feature by name, or the most recent feature when no name is given. Bodies created by the feature are removed with it.",
        annotations(title = "Delete feature", read_only_hint = false, destructive_hint = true)
    )]
    async fn delete_feature(
        &self,
        params: Parameters<DeleteFeatureRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()).await
    }

    #[tool(
        description = "Copy a body by name, or the most recent body when no name is given. The copy becomes the last body.",
        annotations(title = "Copy body", read_only_hint = false, destructive_hint = false)
    )]
    async fn copy_body(
        &self,
        params: Parameters<CopyBodyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()).await
    }

    // ============================================================
    // Inspection and output
    // ============================================================

    #[tool(
        description = "Measure the minimum distance in cm between the last two bodies.",
        annotations(title = "Measure distance", read_only_hint = true)
    )]
    async fn measure_distance(&self) -> Result<CallToolResult, McpError> {
        self.reply(Command::MeasureDistance {}).await
    }

    #[tool(
        description = "Export every body in the document to a binary STL file.",
        annotations(title = "Export STL", read_only_hint = false, destructive_hint = false)
    )]
    async fn export_stl(
        &self,
        params: Parameters<ExportStlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.reply(params.0.into_command()).await
    }
}

#[tool_handler]
impl ServerHandler for CadMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "cadlink".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Parametric CAD modeling on a single open document.

Commands never name their targets. They act on the most recent entities:
- create_circle / draw_rectangle draw into the latest sketch
- extrude / revolve use the first profile of the latest sketch
- add_draft, fillet, pattern, split_body act on the latest body
- combine and measure_distance use the two latest bodies
- split_body cuts with the first construction plane

TYPICAL FLOW:
1. create_sketch, then create_circle or draw_rectangle
2. extrude (or revolve) to make a body
3. refine with fillet, add_draft, pattern, combine
4. export_stl when done

Lengths are in cm, angles in degrees."#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(client: CadClient) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!(url = %client.url(), "Starting MCP server via stdio");

    let service = CadMcpServer::new(client);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
