//! Data-lookup MCP servers for DIY home projects.
//!
//! One binary serves either the building codes tools or the material specs
//! tools over JSON-RPC 2.0 (stdio or HTTP). Records are loaded once at
//! startup and shared read-only between requests.

pub mod calculators;
pub mod core;
pub mod matcher;
pub mod store;
pub mod tools;
