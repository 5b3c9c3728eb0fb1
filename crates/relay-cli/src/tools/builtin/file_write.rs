//! File write tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fs;

use crate::tools::{parse_args, ParamKind, ParameterSchema, Tool, ToolContext, ToolError};

#[derive(Debug, Deserialize)]
struct WriteArgs {
    file_path: String,
    content: String,
}

/// Tool for writing file contents
pub struct FileWriteTool;

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file, constrained to the working directory. Creates the file if it doesn't exist, overwrites it if it does."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .with_required(
                "file_path",
                ParamKind::String,
                "The path of the file to write, relative to the working directory.",
            )
            .with_required("content", ParamKind::String, "The content to write to the file.")
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: WriteArgs = parse_args(self.name(), args)?;
        let path = ctx.root.resolve(&args.file_path, "write to")?;

        // Parents resolve inside the root as well, since the target does
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&path, &args.content)?;

        Ok(format!(
            "Successfully wrote to \"{}\" ({} characters written)",
            args.file_path,
            args.content.chars().count()
        ))
    }
}
