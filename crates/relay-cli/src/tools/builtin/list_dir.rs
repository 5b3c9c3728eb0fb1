//! Directory listing tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fs;

use crate::tools::{parse_args, ParamKind, ParameterSchema, Tool, ToolContext, ToolError};

#[derive(Debug, Deserialize)]
struct ListArgs {
    #[serde(default = "default_directory")]
    directory: String,
}

fn default_directory() -> String {
    ".".to_string()
}

/// Tool for listing the direct children of a directory
pub struct ListDirTool;

#[async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &str {
        "get_files_info"
    }

    fn description(&self) -> &str {
        "Lists files in the specified directory along with their sizes, constrained to the working directory."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new().with_optional(
            "directory",
            ParamKind::String,
            "The directory to list files from, relative to the working directory. If not provided, lists files in the working directory itself.",
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: ListArgs = parse_args(self.name(), args)?;
        let dir = ctx.root.resolve(&args.directory, "list")?;

        if !dir.is_dir() {
            return Err(ToolError::NotADirectory {
                path: args.directory,
            });
        }

        let mut names: Vec<_> = fs::read_dir(&dir)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<Result<_, _>>()?;
        names.sort();

        let mut lines = Vec::with_capacity(names.len());
        for name in names {
            // Links are described, not followed
            let meta = fs::symlink_metadata(dir.join(&name))?;
            lines.push(format!(
                "- {}: file_size={} bytes, is_dir={}",
                name.to_string_lossy(),
                meta.len(),
                meta.is_dir()
            ));
        }

        Ok(lines.join("\n"))
    }
}
