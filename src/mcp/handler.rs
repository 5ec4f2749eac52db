//! # MCP Handler Module
//!
//! Implements the Model Context Protocol dispatch for the CCIP server.
//! Incoming JSON-RPC requests are routed to one of two tools:
//!
//! - `find_supported_chain` - Resolve free-form text to a canonical chain
//! - `execute_ccip_transfer` - Deploy, configure and fund the CCIP contract pair,
//!   then send a cross-chain transfer
//!
//! Tool outcomes, including every validation and step failure, come back as a
//! text result with `isError` set; only malformed protocol input produces a
//! JSON-RPC error object.

use crate::{
    ccip::{
        report,
        transfer::{self, TransferOrchestrator},
        TransferError, TransferRequest,
    },
    mcp::protocol::{error_codes, Request, Response, PROTOCOL_VERSION},
    utils, AppState,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use tracing::{info, warn};

pub const SERVER_NAME: &str = "ccip_mcp";

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "ping" => Response::success(req.id, json!({})),
        "tools/list" => handle_tools_list(&req, &state),
        "tools/call" => handle_tool_call(req, state).await,
        // Direct method calls are rewritten into tools/call to reuse the same logic
        "find_supported_chain" | "execute_ccip_transfer" => {
            let name = req.method.clone();
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": name,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;

    match tool_name {
        "find_supported_chain" => {
            let res: Result<Response, Response> = (|| {
                let chain_input = utils::get_required_arg::<String>(args, "chain_input", req_id)?;
                let resolved = state.registry.resolve(&chain_input);
                let text = report::render_resolution(&chain_input, resolved, state.registry);
                // No match is a valid answer, not a tool error
                Ok(Response::tool_text(req_id.clone(), text, false))
            })();
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "execute_ccip_transfer" => execute_transfer(args, req_id, &state)
            .await
            .unwrap_or_else(|err_resp| err_resp),
        other => {
            let err = TransferError::UnknownOperation(other.to_string());
            warn!("{}", err);
            let text = report::render_unknown_tool(&err, state.registry);
            Response::tool_text(req_id.clone(), text, true)
        }
    }
}

/// Validates, connects a client only for a sound plan, runs the pipeline and
/// renders the outcome as tool text.
async fn execute_transfer(args: &Value, req_id: &Value, state: &AppState) -> Result<Response, Response> {
    let request = transfer_request_from_args(args, req_id, state)?;
    let orchestrator = TransferOrchestrator::new(state.registry);

    let run = match orchestrator.plan(&request) {
        Err(err) => transfer::rejected(None, err),
        Ok(plan) => match state.client_factory.connect(&request.private_key) {
            Ok(client) => transfer::run(plan, client.as_ref()).await,
            Err(e) => transfer::rejected(Some(plan), TransferError::ClientSetup(format!("{:#}", e))),
        },
    };

    let text = report::render_transfer(&run, state.registry);
    Ok(Response::tool_text(req_id.clone(), text, !run.outcome.is_success()))
}

fn transfer_request_from_args(
    args: &Value,
    req_id: &Value,
    state: &AppState,
) -> Result<TransferRequest, Response> {
    let defaults = &state.config.transfer_defaults;
    Ok(TransferRequest {
        sender_chain: utils::get_required_arg(args, "sender_chain", req_id)?,
        receiver_chain: utils::get_required_arg(args, "receiver_chain", req_id)?,
        private_key: SecretString::new(utils::get_required_arg(args, "private_key", req_id)?),
        token_type: utils::get_optional_arg(args, "token_type", defaults.token_type.clone(), req_id)?,
        token_amount: utils::get_optional_arg(args, "token_amount", defaults.token_amount, req_id)?,
        eth_amount: utils::get_optional_arg(args, "eth_amount", defaults.eth_amount, req_id)?,
        transfer_amount: utils::get_optional_arg(
            args,
            "transfer_amount",
            defaults.transfer_amount,
            req_id,
        )?,
        message: utils::get_optional_arg(args, "message", defaults.message.clone(), req_id)?,
    })
}

fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "Chainlink CCIP MCP server: resolve chain names and run complete cross-chain token transfers on testnets.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request, state: &AppState) -> Response {
    let defaults = &state.config.transfer_defaults;
    let tools = json!([
        {
            "name": "execute_ccip_transfer",
            "description": "Execute a complete CCIP cross-chain transfer: deploy and configure sender and receiver contracts, fund the sender, then transfer.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "sender_chain": {"type": "string", "description": "Source blockchain (ethereum, arbitrum, base, avalanche, etc.)"},
                    "receiver_chain": {"type": "string", "description": "Destination blockchain"},
                    "private_key": {"type": "string", "description": "Private key used to sign every transaction"},
                    "token_type": {"type": "string", "description": "Token to transfer (LINK, CCIP-BnM, USDC, CCIP-LnM)", "default": defaults.token_type},
                    "token_amount": {"type": "number", "description": "Amount of tokens to fund the sender contract with", "default": defaults.token_amount},
                    "eth_amount": {"type": "number", "description": "Amount of native currency for CCIP fees", "default": defaults.eth_amount},
                    "transfer_amount": {"type": "number", "description": "Amount to transfer cross-chain", "default": defaults.transfer_amount},
                    "message": {"type": "string", "description": "Message to send with the transfer", "default": defaults.message}
                },
                "required": ["sender_chain", "receiver_chain", "private_key"]
            }
        },
        {
            "name": "find_supported_chain",
            "description": "Find the supported chain matching a free-form chain name.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "chain_input": {"type": "string", "description": "User input for chain name"}
                },
                "required": ["chain_input"]
            }
        }
    ]);

    Response::success(req.id.clone(), json!({ "tools": tools }))
}
