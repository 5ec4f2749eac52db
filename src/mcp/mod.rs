// JSON-RPC protocol types and the MCP tool dispatcher
pub mod handler;
pub mod protocol;
