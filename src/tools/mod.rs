/// Tools Module
///
/// This module contains the MCP tools of both servers. Each server module
/// exports a tool catalog and a `register` function that adds the catalog to
/// the registry during server initialization.

pub mod building_codes;
pub mod material_specs;
pub mod schema;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::ToolError;
use crate::core::server::{MCPTool, ToolHandler, ToolRegistry};
use crate::store::{CodeStore, ProductStore};
use building_codes::BuildingCodes;
use material_specs::MaterialSpecs;
use schema::{ArgSpec, Arguments};

/// Result of a successful tool call: markdown for people, JSON for programs.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub data: Value,
}

/// One entry of a tool catalog. `handler` tags which operation to run.
#[derive(Debug, Clone)]
pub struct ToolSpec<H> {
    pub name: &'static str,
    pub description: &'static str,
    pub args: Vec<ArgSpec>,
    pub handler: H,
}

/// Which of the two servers a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    BuildingCodes,
    MaterialSpecs,
}

impl ServerKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "building-codes" => Some(ServerKind::BuildingCodes),
            "material-specs" => Some(ServerKind::MaterialSpecs),
            _ => None,
        }
    }

    /// Name reported in `initialize` when `SERVER_NAME` is unset.
    pub fn default_name(self) -> &'static str {
        match self {
            ServerKind::BuildingCodes => "building-codes-server",
            ServerKind::MaterialSpecs => "material-specs-server",
        }
    }
}

pub fn to_data<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// The `limit` argument, or `default` when absent.
pub(crate) fn result_limit(args: &Arguments, default: usize) -> Result<usize, ToolError> {
    match args.i64("limit") {
        Some(n) if n >= 1 => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
        Some(n) => Err(ToolError::invalid_argument("limit", format!("must be at least 1, got {}", n))),
        None => Ok(default),
    }
}

/// Register every tool of `catalog`. Arguments are validated against the
/// tool's declared schema before `call` runs.
fn register_catalog<H, F>(registry: &mut ToolRegistry, catalog: Vec<ToolSpec<H>>, call: F)
where
    H: Copy + Send + Sync + 'static,
    F: Fn(H, &Arguments) -> Result<ToolOutput, ToolError> + Clone + Send + Sync + 'static,
{
    for spec in catalog {
        let tool = MCPTool {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            input_schema: schema::input_schema(&spec.args),
        };

        let call = call.clone();
        let ToolSpec { args: specs, handler: tag, .. } = spec;
        let handler: ToolHandler = Box::new(move |raw: Value| {
            let args = Arguments::validate(&specs, &raw)?;
            call(tag, &args)
        });

        registry.register(tool, handler);
    }
}

/// Register the building codes tools backed by `server`.
pub fn register_building_codes(registry: &mut ToolRegistry, server: BuildingCodes<CodeStore>) {
    let server = Arc::new(server);
    register_catalog(registry, building_codes::catalog(), move |tool, args| server.call(tool, args));
}

/// Register the material specs tools backed by `server`.
pub fn register_material_specs(registry: &mut ToolRegistry, server: MaterialSpecs<ProductStore>) {
    let server = Arc::new(server);
    register_catalog(registry, material_specs::catalog(), move |tool, args| server.call(tool, args));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_kind_parse() {
        assert_eq!(ServerKind::parse("building-codes"), Some(ServerKind::BuildingCodes));
        assert_eq!(ServerKind::parse(" material-specs "), Some(ServerKind::MaterialSpecs));
        assert_eq!(ServerKind::parse("home-depot"), None);
        assert_eq!(ServerKind::MaterialSpecs.default_name(), "material-specs-server");
    }

    #[test]
    fn test_result_limit() {
        let specs = vec![ArgSpec::optional("limit", schema::ArgKind::Integer, "Limit")];

        let args = Arguments::validate(&specs, &json!({})).unwrap();
        assert_eq!(result_limit(&args, 5).unwrap(), 5);

        let args = Arguments::validate(&specs, &json!({"limit": 2})).unwrap();
        assert_eq!(result_limit(&args, 5).unwrap(), 2);

        let args = Arguments::validate(&specs, &json!({"limit": 0})).unwrap();
        let err = result_limit(&args, 5).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "limit"));
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<&str> = building_codes::catalog().iter().map(|t| t.name).collect();
        names.extend(material_specs::catalog().iter().map(|t| t.name));
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }
}
