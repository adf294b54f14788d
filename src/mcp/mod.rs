use chrono::NaiveDate;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};

use plant_tracker_core::models::*;
use plant_tracker_core::{Database, Error};

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetPlantRequest {
    #[schemars(description = "The plant ID")]
    pub plant_id: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindPotRequest {
    #[schemars(description = "The QR code id printed on the pot's label")]
    pub qr_code_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MovePlantRequest {
    #[schemars(description = "The plant to move")]
    pub plant_id: i64,
    #[schemars(description = "The destination pot ID")]
    pub pot_id: i64,
    #[schemars(description = "The soil mix used in the destination pot")]
    pub soil_id: i64,
    #[schemars(description = "Date of the move as YYYY-MM-DD; defaults to today")]
    pub start_date: Option<String>,
    #[schemars(description = "Optional notes about the repotting")]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoveSummary {
    pub plant: String,
    pub pot: Option<String>,
    pub room: Option<String>,
    pub soil: Option<String>,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_date(s: &str) -> Result<NaiveDate, McpError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| McpError::invalid_params(format!("Invalid date: {}", e), None))
    }

    fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

fn to_mcp_error(err: Error) -> McpError {
    match err {
        Error::Validation(msg) | Error::NotFound(msg) | Error::Conflict(msg) => {
            McpError::invalid_params(msg, None)
        }
        other => McpError::internal_error(other.to_string(), None),
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "Get a plant with its current pot, soil and full pot history")]
    async fn get_plant(
        &self,
        params: Parameters<GetPlantRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let plant = self
            .db
            .get_plant_detail(req.plant_id)
            .map_err(to_mcp_error)?
            .ok_or_else(|| McpError::invalid_params("Plant not found", None))?;

        Self::to_json(&plant)
    }

    #[tool(description = "Find a pot by its QR code and list the plants currently in it")]
    async fn find_pot(
        &self,
        params: Parameters<FindPotRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let pot = self
            .db
            .get_pot_by_qr(&req.qr_code_id)
            .map_err(to_mcp_error)?
            .ok_or_else(|| McpError::invalid_params("Pot not found", None))?;

        Self::to_json(&pot)
    }

    #[tool(description = "Move a plant into a pot, closing its previous placement")]
    async fn move_plant(
        &self,
        params: Parameters<MovePlantRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let start_date = req.start_date.as_deref().map(Self::parse_date).transpose()?;

        let moved = self
            .db
            .move_plant(MoveInput {
                plant_id: req.plant_id,
                pot_id: req.pot_id,
                soil_id: req.soil_id,
                start_date,
                notes: req.notes,
            })
            .map_err(to_mcp_error)?;

        Self::to_json(&MoveSummary {
            plant: moved.plant.name,
            pot: moved.current_pot.as_ref().map(|p| p.qr_code_id.clone()),
            room: moved.current_pot.map(|p| p.room),
            soil: moved.current_soil.map(|s| s.name),
        })
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Plant Tracker MCP server: look up plants and pots, and record repottings".into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
