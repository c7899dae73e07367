/// Core Server Framework Module
///
/// This module contains the core server implementation including:
/// - server.rs: MCP server implementation with HTTP and STDIO transport
/// - utils.rs: Configuration and utility functions
/// - error.rs: Error types shared by the stores, calculators and tools

pub mod error;
pub mod server;
pub mod utils;
