//! MCP Hub
//!
//! A multi-server client for the Model Context Protocol (MCP). The hub
//! keeps an ordered registry of configured servers, speaks JSON-RPC 2.0 or
//! REST to each, and aggregates context, prompts, tools, and health across
//! all of them concurrently.

pub mod commands;
pub mod config;
pub mod mcp;

pub use config::Config;
pub use mcp::{ClientManager, McpClient, McpError};
