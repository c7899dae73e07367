/// Utility Functions for Configuration and Environment Management
///
/// This module provides functions for loading configuration from YAML files
/// and accessing environment variables. Configuration is organized hierarchically
/// with tool-specific sections.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

/// Default configuration file, overridden by `KMCP_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "kmcp.yaml";

/// Load configuration from the YAML file named by `KMCP_CONFIG`.
///
/// A missing file means an empty configuration. A malformed file is logged
/// and ignored.
pub fn load_config() -> HashMap<String, Value> {
    load_config_from(get_env_var("KMCP_CONFIG", DEFAULT_CONFIG_PATH))
}

/// Load configuration from a specific YAML file.
pub fn load_config_from(path: impl AsRef<Path>) -> HashMap<String, Value> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no configuration file");
            return HashMap::new();
        }
    };

    // an empty document parses as null
    match serde_yaml::from_str::<Option<HashMap<String, Value>>>(&raw) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed configuration file");
            HashMap::new()
        }
    }
}

/// Get tool-specific configuration from the loaded configuration.
///
/// # Example
/// If kmcp.yaml contains:
/// ```yaml
/// tools:
///   search_materials:
///     max_results: 20
/// ```
/// Then `get_tool_config("search_materials")` returns `{"max_results": 20}`
pub fn get_tool_config(tool_name: &str) -> HashMap<String, Value> {
    tool_config_in(&load_config(), tool_name)
}

fn tool_config_in(config: &HashMap<String, Value>, tool_name: &str) -> HashMap<String, Value> {
    // config -> tools -> tool_name
    config
        .get("tools")
        .and_then(|v| v.as_object())
        .and_then(|tools| tools.get(tool_name))
        .and_then(|v| v.as_object())
        .map(|tool_config| tool_config.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// Configured `max_results` of a search tool, or `default`.
pub fn max_results(tool_name: &str, default: usize) -> usize {
    max_results_in(&get_tool_config(tool_name), default)
}

fn max_results_in(tool_config: &HashMap<String, Value>, default: usize) -> usize {
    match tool_config.get("max_results") {
        None => default,
        Some(value) => match value.as_u64().filter(|n| *n >= 1) {
            Some(n) => usize::try_from(n).unwrap_or(default),
            None => {
                tracing::warn!(%value, "max_results must be a positive integer, using default");
                default
            }
        },
    }
}

/// Get environment variable value with a default fallback.
///
/// # Example
/// ```rust
/// let port = diy_mcp::core::utils::get_env_var("PORT", "3000");
/// ```
pub fn get_env_var(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_tool_section_is_read() {
        let file = write_config("tools:\n  search_materials:\n    max_results: 20\n");
        let config = load_config_from(file.path());
        let tool = tool_config_in(&config, "search_materials");
        assert_eq!(tool.get("max_results"), Some(&json!(20)));
        assert_eq!(max_results_in(&tool, 10), 20);
        assert!(tool_config_in(&config, "search_building_codes").is_empty());
    }

    #[test]
    fn test_missing_empty_and_malformed_files_are_empty() {
        assert!(load_config_from("/definitely/not/here/kmcp.yaml").is_empty());
        assert!(load_config_from(write_config("").path()).is_empty());
        assert!(load_config_from(write_config("tools: [unclosed").path()).is_empty());
    }

    #[test]
    fn test_invalid_max_results_falls_back() {
        let tool: HashMap<String, Value> = [("max_results".to_string(), json!(0))].into();
        assert_eq!(max_results_in(&tool, 5), 5);
        let tool: HashMap<String, Value> = [("max_results".to_string(), json!("many"))].into();
        assert_eq!(max_results_in(&tool, 5), 5);
        assert_eq!(max_results_in(&HashMap::new(), 5), 5);
    }

    #[test]
    fn test_get_env_var_default() {
        assert_eq!(get_env_var("DIY_MCP_SURELY_UNSET_VARIABLE", "fallback"), "fallback");
    }
}
