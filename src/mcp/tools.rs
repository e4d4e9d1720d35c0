//! MCP tool implementations: maps tool calls to service operations.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use super::types::{ToolDefinition, ToolsCallResult};
use crate::error::{FileRankError, Result};
use crate::service::FileRankService;

fn path_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "file_path": { "type": "string", "description": description }
        },
        "required": ["file_path"]
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Every tool with its JSON schema.
pub fn list_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "rank_file",
            description: "Rank a file's importance from 1 (most important) to 10 (least \
                important), optionally with a short summary.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "File to rank" },
                    "rank": { "type": "integer", "minimum": 1, "maximum": 10 },
                    "summary": { "type": "string", "description": "Optional description of the file" }
                },
                "required": ["file_path", "rank"]
            }),
        },
        ToolDefinition {
            name: "get_file",
            description: "Get a ranked file's rank, summary, dependencies and the files that import it.",
            input_schema: path_schema("Ranked file to show"),
        },
        ToolDefinition {
            name: "delete_file",
            description: "Remove a file's ranking and its own dependency entry. Other files' \
                imports of it are left in place.",
            input_schema: path_schema("File to forget"),
        },
        ToolDefinition {
            name: "get_all_files",
            description: "List every ranked file.",
            input_schema: empty_schema(),
        },
        ToolDefinition {
            name: "get_files_by_dir",
            description: "List ranked files at or below a directory.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "directory": { "type": "string", "description": "Directory to list" }
                },
                "required": ["directory"]
            }),
        },
        ToolDefinition {
            name: "update_dependencies",
            description: "Re-read one file, extract its imports and replace its dependency entry.",
            input_schema: path_schema("File to analyze"),
        },
        ToolDefinition {
            name: "scan_all_dependencies",
            description: "Update dependencies for every ranked file. Files that fail are \
                reported and skipped.",
            input_schema: empty_schema(),
        },
        ToolDefinition {
            name: "get_dependencies",
            description: "Files a file imports (certain) and import tokens that could not be \
                resolved (possible).",
            input_schema: path_schema("File to inspect"),
        },
        ToolDefinition {
            name: "get_dependents",
            description: "Files that import the given file, with their ranks and summaries.",
            input_schema: path_schema("File to inspect"),
        },
        ToolDefinition {
            name: "visualize_dependencies",
            description: "Dependency tree of a file as a structure and as text, sorted by \
                rank, with cycles marked.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "Root of the tree" },
                    "max_depth": { "type": "integer", "minimum": 0, "description": "Levels to expand (default 3, at most 10)" }
                },
                "required": ["file_path"]
            }),
        },
        ToolDefinition {
            name: "find_cycles",
            description: "Groups of files that import each other, directly or transitively.",
            input_schema: empty_schema(),
        },
        ToolDefinition {
            name: "graph_stats",
            description: "Counts of graph nodes, edges, possible imports and ranked files.",
            input_schema: empty_schema(),
        },
    ]
}

/// Dispatch a tool call. Failures become `isError` results, never panics.
pub fn call_tool(service: &mut FileRankService, name: &str, args: &Value) -> ToolsCallResult {
    match dispatch(service, name, args) {
        Ok(value) => ToolsCallResult::json(&value),
        Err(e) => {
            warn!(tool = name, kind = e.kind(), error = %e, "tool call failed");
            ToolsCallResult::error(&e.to_json())
        }
    }
}

fn dispatch(service: &mut FileRankService, name: &str, args: &Value) -> Result<Value> {
    match name {
        "rank_file" => {
            let path = required_str(args, "file_path")?;
            let rank = args
                .get("rank")
                .and_then(Value::as_i64)
                .ok_or_else(|| missing("rank"))?;
            let summary = optional_str(args, "summary").map(String::from);
            to_value(&service.rank_file(path, rank, summary)?)
        }
        "get_file" => to_value(&service.get_file(required_str(args, "file_path")?)?),
        "delete_file" => to_value(&service.delete_node(required_str(args, "file_path")?)?),
        "get_all_files" => to_value(&service.get_all_files()),
        "get_files_by_dir" => to_value(&service.get_files_by_dir(required_str(args, "directory")?)),
        "update_dependencies" => {
            to_value(&service.update_dependencies(required_str(args, "file_path")?)?)
        }
        "scan_all_dependencies" => to_value(&service.scan_all_dependencies()?),
        "get_dependencies" => to_value(&service.get_dependencies(required_str(args, "file_path")?)?),
        "get_dependents" => to_value(&service.get_dependents(required_str(args, "file_path")?)?),
        "visualize_dependencies" => {
            let path = required_str(args, "file_path")?;
            let depth = match args.get("max_depth") {
                None | Some(Value::Null) => None,
                Some(v) => Some(
                    v.as_u64()
                        .and_then(|d| usize::try_from(d).ok())
                        .ok_or_else(|| {
                            FileRankError::InvalidParams(
                                "max_depth must be a non-negative integer".into(),
                            )
                        })?,
                ),
            };
            to_value(&service.visualize_dependencies(path, depth)?)
        }
        "find_cycles" => {
            let cycles = service.find_cycles();
            Ok(json!({ "count": cycles.len(), "cycles": cycles }))
        }
        "graph_stats" => to_value(&service.stats()),
        other => Err(FileRankError::InvalidParams(format!("unknown tool: {}", other))),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    optional_str(args, key).ok_or_else(|| missing(key))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn missing(key: &str) -> FileRankError {
    FileRankError::InvalidParams(format!("missing required parameter: {}", key))
}
